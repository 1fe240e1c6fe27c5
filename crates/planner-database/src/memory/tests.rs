use chrono::{Duration, Utc};
use serde_json::json;
use uuid::Uuid;

use planner_core::types::{OrganizationId, UserId};
use planner_entity::Principal;
use planner_entity::floor_plan::{CollectionBatch, CollectionItem, EntityCollection, NewFloorPlan};
use planner_entity::organization::{InvitationAcceptance, MembershipChange, NewInvitation, Role};

use super::MemoryStore;
use crate::store::{
    CollectionStore, FloorPlanStore, InvitationStore, LeaseStore, MembershipStore,
    OrganizationStore,
};

fn principal() -> Principal {
    Principal::anonymous(UserId::new())
}

async fn personal_plan(store: &MemoryStore, owner: &Principal) -> planner_entity::floor_plan::FloorPlan {
    FloorPlanStore::create(
        store,
        NewFloorPlan {
            user_id: owner.id,
            name: "Gala".to_string(),
            organization_id: None,
            created_at: Utc::now(),
        },
    )
    .await
    .expect("create plan")
}

#[tokio::test]
async fn test_acquire_is_exclusive_until_expiry() {
    let store = MemoryStore::new();
    let alice = principal();
    let bob = principal();
    let plan = personal_plan(&store, &alice).await;
    let now = Utc::now();

    let first = store
        .acquire(plan.id, &alice, now, now + Duration::minutes(15))
        .await
        .expect("acquire");
    assert!(first.is_some());

    let blocked = store
        .acquire(plan.id, &bob, now, now + Duration::minutes(15))
        .await
        .expect("acquire");
    assert!(blocked.is_none());

    let later = now + Duration::minutes(16);
    let taken = store
        .acquire(plan.id, &bob, later, later + Duration::minutes(15))
        .await
        .expect("acquire");
    assert_eq!(taken.map(|l| l.user_id), Some(bob.id));
}

#[tokio::test]
async fn test_refresh_by_non_holder_changes_nothing() {
    let store = MemoryStore::new();
    let alice = principal();
    let bob = principal();
    let plan = personal_plan(&store, &alice).await;
    let now = Utc::now();
    let expires = now + Duration::minutes(15);

    store
        .acquire(plan.id, &alice, now, expires)
        .await
        .expect("acquire");
    let refreshed = store
        .refresh(plan.id, bob.id, now, now + Duration::hours(1))
        .await
        .expect("refresh");
    assert!(refreshed.is_none());

    let active = store.find_active(plan.id, now).await.expect("status");
    assert_eq!(active.map(|l| l.expires_at), Some(expires));
}

#[tokio::test]
async fn test_release_requires_holder() {
    let store = MemoryStore::new();
    let alice = principal();
    let bob = principal();
    let plan = personal_plan(&store, &alice).await;
    let now = Utc::now();

    store
        .acquire(plan.id, &alice, now, now + Duration::minutes(15))
        .await
        .expect("acquire");
    assert!(!store.release(plan.id, bob.id).await.expect("release"));
    assert!(store.release(plan.id, alice.id).await.expect("release"));
    assert!(!store.release(plan.id, alice.id).await.expect("release"));
}

#[tokio::test]
async fn test_last_owner_cannot_be_demoted_or_removed() {
    let store = MemoryStore::new();
    let alice = principal();
    let org = store
        .create_with_owner("Acme", &alice, Utc::now())
        .await
        .expect("create org");

    let demote = store
        .update_role(org.id, alice.id, Role::Admin, Role::Owner)
        .await
        .expect("update");
    assert_eq!(demote, MembershipChange::LastOwner);

    let remove = store
        .remove(org.id, alice.id, Role::Owner)
        .await
        .expect("remove");
    assert_eq!(remove, MembershipChange::LastOwner);
    assert_eq!(
        store.role_of(org.id, alice.id).await.expect("role"),
        Some(Role::Owner)
    );
}

async fn join(store: &MemoryStore, org: OrganizationId, role: Role) -> Principal {
    let user = principal();
    let now = Utc::now();
    let token = format!("token-{}", user.id);
    InvitationStore::create(
        store,
        NewInvitation {
            organization_id: org,
            email: format!("{}@example.com", user.id),
            role,
            token: token.clone(),
            invited_by: user.id,
            created_at: now,
            expires_at: now + Duration::days(7),
        },
    )
    .await
    .expect("invite");
    store.accept(&token, &user, now).await.expect("accept");
    user
}

#[tokio::test]
async fn test_owner_role_changes_are_checked_against_stored_role() {
    let store = MemoryStore::new();
    let alice = principal();
    let org = store
        .create_with_owner("Acme", &alice, Utc::now())
        .await
        .expect("create org");
    let carol = join(&store, org.id, Role::Member).await;

    let grant = store
        .update_role(org.id, carol.id, Role::Owner, Role::Admin)
        .await
        .expect("update");
    assert_eq!(grant, MembershipChange::Forbidden);

    let promoted = store
        .update_role(org.id, carol.id, Role::Owner, Role::Owner)
        .await
        .expect("update");
    assert!(matches!(promoted, MembershipChange::Applied(ref m) if m.role == Role::Owner));

    // An admin acting on a stale view of carol as a member is still refused.
    let demote = store
        .update_role(org.id, carol.id, Role::Viewer, Role::Admin)
        .await
        .expect("update");
    assert_eq!(demote, MembershipChange::Forbidden);
    let remove = store
        .remove(org.id, carol.id, Role::Admin)
        .await
        .expect("remove");
    assert_eq!(remove, MembershipChange::Forbidden);
    assert_eq!(
        store.role_of(org.id, carol.id).await.expect("role"),
        Some(Role::Owner)
    );

    let removed = store
        .remove(org.id, carol.id, Role::Owner)
        .await
        .expect("remove");
    assert!(matches!(removed, MembershipChange::Applied(_)));
}

#[tokio::test]
async fn test_invitation_is_consumed_once() {
    let store = MemoryStore::new();
    let alice = principal();
    let bob = principal();
    let now = Utc::now();
    let org = store
        .create_with_owner("Acme", &alice, now)
        .await
        .expect("create org");
    InvitationStore::create(
        &store,
        NewInvitation {
            organization_id: org.id,
            email: "bob@example.com".to_string(),
            role: Role::Member,
            token: "token-1".to_string(),
            invited_by: alice.id,
            created_at: now,
            expires_at: now + Duration::days(7),
        },
    )
    .await
    .expect("invite");

    let first = store.accept("token-1", &bob, now).await.expect("accept");
    assert!(matches!(first, InvitationAcceptance::Joined(ref m) if m.role == Role::Member));

    let second = store.accept("token-1", &bob, now).await.expect("accept");
    assert_eq!(second, InvitationAcceptance::NotFound);
    assert_eq!(store.list_members(org.id).await.expect("members").len(), 2);
}

#[tokio::test]
async fn test_delete_organization_detaches_plans() {
    let store = MemoryStore::new();
    let alice = principal();
    let now = Utc::now();
    let org = store
        .create_with_owner("Acme", &alice, now)
        .await
        .expect("create org");
    let plan = personal_plan(&store, &alice).await;
    store
        .set_organization(plan.id, Some(org.id), now)
        .await
        .expect("share");

    let deleted_at = now + Duration::minutes(5);
    assert!(
        store
            .delete_detaching(org.id, deleted_at)
            .await
            .expect("delete")
    );
    let plan = FloorPlanStore::find(&store, plan.id)
        .await
        .expect("find")
        .expect("plan survives");
    assert!(plan.is_personal());
    assert_eq!(plan.updated_at, deleted_at);
    assert!(store.role_of(org.id, alice.id).await.expect("role").is_none());
}

#[tokio::test]
async fn test_replace_all_keeps_submission_order() {
    let store = MemoryStore::new();
    let alice = principal();
    let plan = personal_plan(&store, &alice).await;
    let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
    let batch = CollectionBatch {
        collection: EntityCollection::Guests,
        items: vec![
            CollectionItem { id: b, data: json!({ "id": b, "name": "Bea" }) },
            CollectionItem { id: a, data: json!({ "id": a, "name": "Al" }) },
        ],
    };

    store
        .replace_all(plan.id, &[batch], Utc::now())
        .await
        .expect("save");
    let guests = store
        .load(plan.id, EntityCollection::Guests)
        .await
        .expect("load");
    assert_eq!(guests[0]["name"], "Bea");
    assert_eq!(guests[1]["name"], "Al");
    assert!(
        store
            .load(plan.id, EntityCollection::Tables)
            .await
            .expect("load")
            .is_empty()
    );
}
