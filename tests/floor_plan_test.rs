//! Integration tests for floor plans, bulk save, sharing, and edit leases.

mod helpers;

use axum::http::StatusCode;
use serde_json::json;

use helpers::{TestApp, TestUser};

/// Acme with alice as owner, bob as member, carol as viewer, and a shared
/// "Gala" plan created by alice.
async fn acme(app: &TestApp) -> (TestUser, TestUser, TestUser, String) {
    let alice = TestUser::new("alice");
    let bob = TestUser::new("bob");
    let carol = TestUser::new("carol");
    let org = app.create_organization(&alice, "Acme").await;
    app.add_member(&alice, &org, &bob, "member").await;
    app.add_member(&alice, &org, &carol, "viewer").await;
    let plan = app.create_plan(&alice, "Gala", Some(&org)).await;
    (alice, bob, carol, plan)
}

#[tokio::test]
async fn test_create_defaults_name() {
    let app = TestApp::new();
    let alice = TestUser::new("alice");

    let response = app
        .as_user(&alice, "POST", "/api/floor-plans", Some(json!({})))
        .await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["name"], "Untitled Floor Plan");
    assert_eq!(response.body["userId"], alice.id.to_string());
}

#[tokio::test]
async fn test_personal_plan_is_private() {
    let app = TestApp::new();
    let alice = TestUser::new("alice");
    let mallory = TestUser::new("mallory");
    let plan = app.create_plan(&alice, "Wedding", None).await;

    let own = app
        .as_user(&alice, "GET", &format!("/api/floor-plans/{plan}"), None)
        .await;
    assert_eq!(own.status, StatusCode::OK);
    assert_eq!(own.body["tables"], json!([]));

    let other = app
        .as_user(&mallory, "GET", &format!("/api/floor-plans/{plan}"), None)
        .await;
    assert_eq!(other.status, StatusCode::FORBIDDEN);

    let listed = app.as_user(&mallory, "GET", "/api/floor-plans", None).await;
    assert_eq!(listed.body, json!([]));
}

#[tokio::test]
async fn test_missing_plan_is_forbidden_not_found() {
    let app = TestApp::new();
    let alice = TestUser::new("alice");
    let missing = uuid::Uuid::new_v4();

    let response = app
        .as_user(&alice, "GET", &format!("/api/floor-plans/{missing}"), None)
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_organization_roles_on_shared_plan() {
    let app = TestApp::new();
    let (_alice, bob, carol, plan) = acme(&app).await;

    let listed = app.as_user(&carol, "GET", "/api/floor-plans", None).await;
    assert_eq!(listed.body[0]["organizationName"], "Acme");
    assert_eq!(listed.body[0]["isPersonal"], false);

    let viewer_read = app
        .as_user(&carol, "GET", &format!("/api/floor-plans/{plan}"), None)
        .await;
    assert_eq!(viewer_read.status, StatusCode::OK);

    let viewer_save = app
        .as_user(
            &carol,
            "PUT",
            &format!("/api/floor-plans/{plan}/save"),
            Some(json!({ "tables": [] })),
        )
        .await;
    assert_eq!(viewer_save.status, StatusCode::FORBIDDEN);

    let viewer_lock = app
        .as_user(&carol, "POST", &format!("/api/floor-plans/{plan}/lock"), None)
        .await;
    assert_eq!(viewer_lock.status, StatusCode::FORBIDDEN);

    let member_rename = app
        .as_user(
            &bob,
            "PUT",
            &format!("/api/floor-plans/{plan}"),
            Some(json!({ "name": "Gala 2026" })),
        )
        .await;
    assert_eq!(member_rename.status, StatusCode::OK);
    assert_eq!(member_rename.body["name"], "Gala 2026");
}

#[tokio::test]
async fn test_bulk_save_replaces_collections() {
    let app = TestApp::new();
    let alice = TestUser::new("alice");
    let plan = app.create_plan(&alice, "Gala", None).await;
    let keep = uuid::Uuid::new_v4();
    let drop = uuid::Uuid::new_v4();
    let path = format!("/api/floor-plans/{plan}/save");

    let first = app
        .as_user(
            &alice,
            "PUT",
            &path,
            Some(json!({
                "tables": [{ "id": keep, "seats": 8 }, { "id": drop, "seats": 6 }],
                "guests": [{ "name": "No id yet" }],
            })),
        )
        .await;
    assert_eq!(first.status, StatusCode::OK, "{:?}", first.body);
    assert_eq!(first.body["status"], "saved");
    assert_eq!(first.body["tables"], 2);
    assert_eq!(first.body["assignedIds"][0]["collection"], "guests");
    assert_eq!(first.body["assignedIds"][0]["index"], 0);
    let assigned = first.body["assignedIds"][0]["id"].clone();

    let second = app
        .as_user(
            &alice,
            "POST",
            &path,
            Some(json!({
                "tables": [{ "id": keep, "seats": 10 }],
                "guests": [{ "id": assigned, "name": "Now with id" }],
            })),
        )
        .await;
    assert_eq!(second.status, StatusCode::OK);
    assert_eq!(second.body["assignedIds"], json!([]));

    let detail = app
        .as_user(&alice, "GET", &format!("/api/floor-plans/{plan}"), None)
        .await;
    assert_eq!(detail.body["tables"], json!([{ "id": keep, "seats": 10 }]));
    assert_eq!(detail.body["guests"][0]["id"], assigned);
    assert_eq!(detail.body["labels"], json!([]));
}

#[tokio::test]
async fn test_bulk_save_rejects_oversized_collection() {
    let app = TestApp::new();
    let alice = TestUser::new("alice");
    let plan = app.create_plan(&alice, "Stadium", None).await;
    let max = app.config.planner.max_items_per_collection;
    let guests: Vec<_> = (0..=max).map(|i| json!({ "seat": i })).collect();

    let response = app
        .as_user(
            &alice,
            "PUT",
            &format!("/api/floor-plans/{plan}/save"),
            Some(json!({ "guests": guests })),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["details"]["collection"], "guests");
}

#[tokio::test]
async fn test_lock_conflict_names_holder() {
    let app = TestApp::new();
    let (alice, bob, carol, plan) = acme(&app).await;
    let lock = format!("/api/floor-plans/{plan}/lock");

    let acquired = app.as_user(&alice, "POST", &lock, None).await;
    assert_eq!(acquired.status, StatusCode::OK);
    assert_eq!(acquired.body["userEmail"], alice.email);

    let again = app.as_user(&alice, "POST", &lock, None).await;
    assert_eq!(again.status, StatusCode::OK);

    let blocked = app.as_user(&bob, "POST", &lock, None).await;
    assert_eq!(blocked.status, StatusCode::CONFLICT);
    assert_eq!(blocked.body["details"]["lock"]["userEmail"], alice.email);

    let save = app
        .as_user(
            &bob,
            "PUT",
            &format!("/api/floor-plans/{plan}/save"),
            Some(json!({})),
        )
        .await;
    assert_eq!(save.status, StatusCode::CONFLICT);

    let status = app.as_user(&carol, "GET", &lock, None).await;
    assert_eq!(status.body["locked"], true);

    let not_holder = app.as_user(&bob, "DELETE", &lock, None).await;
    assert_eq!(not_holder.status, StatusCode::NOT_FOUND);

    let refresh = app.as_user(&bob, "PUT", &lock, None).await;
    assert_eq!(refresh.status, StatusCode::NOT_FOUND);

    let released = app.as_user(&alice, "DELETE", &lock, None).await;
    assert_eq!(released.status, StatusCode::NO_CONTENT);

    let status = app.as_user(&carol, "GET", &lock, None).await;
    assert_eq!(status.body, json!({ "locked": false }));

    let taken = app.as_user(&bob, "POST", &lock, None).await;
    assert_eq!(taken.status, StatusCode::OK);
}

#[tokio::test]
async fn test_holder_can_refresh_lock() {
    let app = TestApp::new();
    let alice = TestUser::new("alice");
    let plan = app.create_plan(&alice, "Gala", None).await;
    let lock = format!("/api/floor-plans/{plan}/lock");

    let none = app.as_user(&alice, "PUT", &lock, None).await;
    assert_eq!(none.status, StatusCode::NOT_FOUND);

    app.as_user(&alice, "POST", &lock, None).await;
    let refreshed = app.as_user(&alice, "PUT", &lock, None).await;
    assert_eq!(refreshed.status, StatusCode::OK);
    assert!(refreshed.body["expiresAt"].is_string());
}

#[tokio::test]
async fn test_share_and_unshare() {
    let app = TestApp::new();
    let alice = TestUser::new("alice");
    let bob = TestUser::new("bob");
    let org = app.create_organization(&alice, "Acme").await;
    app.add_member(&alice, &org, &bob, "member").await;
    let plan = app.create_plan(&alice, "Gala", None).await;
    let share = format!("/api/floor-plans/{plan}/share");

    let not_creator = app
        .as_user(&bob, "POST", &share, Some(json!({ "organizationId": org })))
        .await;
    assert_eq!(not_creator.status, StatusCode::FORBIDDEN);

    let shared = app
        .as_user(&alice, "POST", &share, Some(json!({ "organizationId": org })))
        .await;
    assert_eq!(shared.status, StatusCode::OK);
    assert_eq!(shared.body["status"], "shared");

    let visible = app
        .as_user(&bob, "GET", &format!("/api/floor-plans/{plan}"), None)
        .await;
    assert_eq!(visible.status, StatusCode::OK);
    assert_eq!(visible.body["organizationName"], "Acme");

    let unshared = app.as_user(&alice, "DELETE", &share, None).await;
    assert_eq!(unshared.body["status"], "unshared");

    let twice = app.as_user(&alice, "DELETE", &share, None).await;
    assert_eq!(twice.status, StatusCode::BAD_REQUEST);

    let hidden = app
        .as_user(&bob, "GET", &format!("/api/floor-plans/{plan}"), None)
        .await;
    assert_eq!(hidden.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_delete_detaches_shared_then_deletes_personal() {
    let app = TestApp::new();
    let (alice, bob, _carol, plan) = acme(&app).await;
    let path = format!("/api/floor-plans/{plan}");

    let member = app.as_user(&bob, "DELETE", &path, None).await;
    assert_eq!(member.status, StatusCode::FORBIDDEN);

    let detached = app.as_user(&alice, "DELETE", &path, None).await;
    assert_eq!(detached.body["status"], "unshared");

    let deleted = app.as_user(&alice, "DELETE", &path, None).await;
    assert_eq!(deleted.body["status"], "deleted");

    let gone = app.as_user(&alice, "DELETE", &path, None).await;
    assert_eq!(gone.status, StatusCode::FORBIDDEN);
    assert_eq!(gone.body["message"], "You do not have access to this floor plan");
}
