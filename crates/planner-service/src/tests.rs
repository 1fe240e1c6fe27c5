//! Service-level scenarios over the in-memory store.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use proptest::prelude::*;
use serde_json::json;
use uuid::Uuid;

use planner_auth::AuthorizationEngine;
use planner_core::error::ErrorKind;
use planner_core::result::AppResult;
use planner_core::types::{FloorPlanId, OrganizationId, UserId};
use planner_database::store::MembershipStore;
use planner_database::{MemoryStore, Stores};
use planner_entity::Principal;
use planner_entity::organization::{Membership, MembershipChange, Role};

use crate::context::RequestContext;
use crate::floor_plan::{DeleteOutcome, FloorPlanService, LeaseService, Snapshot, SyncEngine};
use crate::organization::{InvitationService, MemberService, OrganizationService};

struct Harness {
    plans: FloorPlanService,
    leases: LeaseService,
    organizations: OrganizationService,
    members: MemberService,
    invitations: InvitationService,
    stores: Stores,
    authz: AuthorizationEngine,
}

impl Harness {
    fn new() -> Self {
        let stores = Stores::memory(MemoryStore::new());
        let authz = AuthorizationEngine::new(stores.memberships.clone(), stores.floor_plans.clone());
        let leases = LeaseService::new(stores.leases.clone(), authz.clone(), Duration::minutes(15));
        let sync = SyncEngine::new(stores.collections.clone(), 500);
        Self {
            plans: FloorPlanService::new(
                stores.floor_plans.clone(),
                stores.collections.clone(),
                stores.organizations.clone(),
                authz.clone(),
                leases.clone(),
                sync,
                200,
            ),
            leases,
            organizations: OrganizationService::new(stores.organizations.clone(), authz.clone(), 100),
            members: MemberService::new(stores.memberships.clone(), authz.clone()),
            invitations: InvitationService::new(
                stores.invitations.clone(),
                authz.clone(),
                Duration::days(7),
            ),
            stores,
            authz,
        }
    }

    /// Create an organization owned by `owner` with `others` joined at `role`.
    async fn organization(&self, owner: &Principal, others: &[(&Principal, Role)]) -> OrganizationId {
        let org = self
            .organizations
            .create(&ctx(owner), "Acme")
            .await
            .expect("create org");
        for (member, role) in others {
            let invitation = self
                .invitations
                .invite(&ctx(owner), org.id, "someone@example.com", Role::Member)
                .await
                .expect("invite");
            self.invitations
                .accept(&ctx(member), &invitation.token)
                .await
                .expect("accept");
            if *role != Role::Member {
                self.members
                    .update_role(&ctx(owner), org.id, member.id, *role)
                    .await
                    .expect("set role");
            }
        }
        org.id
    }
}

fn user(name: &str) -> Principal {
    Principal {
        id: UserId::new(),
        email: Some(format!("{name}@example.com")),
        display_name: Some(name.to_string()),
    }
}

fn ctx(principal: &Principal) -> RequestContext {
    RequestContext::new(principal.clone())
}

#[tokio::test]
async fn test_acme_gala_scenario() {
    let h = Harness::new();
    let (alice, bob) = (user("alice"), user("bob"));

    let acme = h.organizations.create(&ctx(&alice), "Acme").await.unwrap();
    let invitation = h
        .invitations
        .invite(&ctx(&alice), acme.id, "bob@example.com", Role::Member)
        .await
        .unwrap();
    let accepted = h.invitations.accept(&ctx(&bob), &invitation.token).await.unwrap();
    assert!(!accepted.already_member);
    assert_eq!(accepted.membership.role, Role::Member);

    let gala = h
        .plans
        .create(&ctx(&alice), Some("Gala".to_string()), None)
        .await
        .unwrap();
    assert_eq!(
        h.plans.get(&ctx(&bob), gala.id).await.unwrap_err().kind,
        ErrorKind::Authorization
    );

    h.plans.share(&ctx(&alice), gala.id, acme.id).await.unwrap();
    let detail = h.plans.get(&ctx(&bob), gala.id).await.unwrap();
    assert_eq!(detail.organization_name.as_deref(), Some("Acme"));

    h.leases.acquire_or_refresh(&ctx(&bob), gala.id).await.unwrap();
    let snapshot = Snapshot {
        guests: vec![json!({ "id": Uuid::new_v4(), "name": "Carol" })],
        ..Snapshot::default()
    };
    h.plans.bulk_save(&ctx(&bob), gala.id, snapshot).await.unwrap();

    let err = h.organizations.delete(&ctx(&bob), acme.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authorization);
}

#[tokio::test]
async fn test_concurrent_acquire_has_one_winner() {
    let h = Harness::new();
    let (alice, bob) = (user("alice"), user("bob"));
    let org = h.organization(&alice, &[(&bob, Role::Member)]).await;
    let plan = h
        .plans
        .create(&ctx(&alice), None, Some(org))
        .await
        .unwrap();

    let now = Utc::now();
    let (ca, cb) = (
        RequestContext::at(alice.clone(), now),
        RequestContext::at(bob.clone(), now),
    );
    let (a, b) = tokio::join!(
        h.leases.acquire_or_refresh(&ca, plan.id),
        h.leases.acquire_or_refresh(&cb, plan.id),
    );

    assert!(a.is_ok() != b.is_ok());
    let loser = a.err().or(b.err()).unwrap();
    assert_eq!(loser.kind, ErrorKind::Conflict);
    assert!(loser.details.unwrap()["lock"]["userId"].is_string());
}

#[tokio::test]
async fn test_save_rejected_while_another_holds_lease() {
    let h = Harness::new();
    let (alice, bob) = (user("alice"), user("bob"));
    let org = h.organization(&alice, &[(&bob, Role::Member)]).await;
    let plan = h.plans.create(&ctx(&alice), None, Some(org)).await.unwrap();

    h.leases.acquire_or_refresh(&ctx(&alice), plan.id).await.unwrap();
    let err = h
        .plans
        .bulk_save(&ctx(&bob), plan.id, Snapshot::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);

    let refresh = h.leases.refresh(&ctx(&bob), plan.id).await.unwrap_err();
    assert_eq!(refresh.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_viewer_can_read_but_not_lock() {
    let h = Harness::new();
    let (alice, vera) = (user("alice"), user("vera"));
    let org = h.organization(&alice, &[(&vera, Role::Viewer)]).await;
    let plan = h.plans.create(&ctx(&alice), None, Some(org)).await.unwrap();

    assert!(h.plans.get(&ctx(&vera), plan.id).await.is_ok());
    assert!(h.leases.status(&ctx(&vera), plan.id).await.unwrap().is_none());
    let err = h.leases.acquire_or_refresh(&ctx(&vera), plan.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authorization);
    let err = h.plans.create(&ctx(&vera), None, Some(org)).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authorization);
}

#[tokio::test]
async fn test_delete_detaches_shared_and_removes_personal() {
    let h = Harness::new();
    let (alice, bob, adam) = (user("alice"), user("bob"), user("adam"));
    let org = h
        .organization(&alice, &[(&bob, Role::Member), (&adam, Role::Admin)])
        .await;

    let shared = h.plans.create(&ctx(&bob), None, Some(org)).await.unwrap();
    let other = h.plans.create(&ctx(&alice), None, Some(org)).await.unwrap();

    let err = h.plans.delete(&ctx(&bob), other.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authorization);
    assert_eq!(
        h.plans.delete(&ctx(&adam), shared.id).await.unwrap(),
        DeleteOutcome::Detached
    );
    // Detached plans are personal to their creator again.
    assert!(h.plans.get(&ctx(&adam), shared.id).await.is_err());
    assert!(h.plans.get(&ctx(&bob), shared.id).await.is_ok());

    assert_eq!(
        h.plans.delete(&ctx(&bob), shared.id).await.unwrap(),
        DeleteOutcome::Deleted
    );
    let gone = h.plans.delete(&ctx(&bob), shared.id).await.unwrap_err();
    assert_eq!(gone.kind, ErrorKind::Authorization);
}

#[tokio::test]
async fn test_missing_and_hidden_plans_are_refused_alike() {
    let h = Harness::new();
    let (alice, eve) = (user("alice"), user("eve"));
    let eve_org = h.organizations.create(&ctx(&eve), "Evil").await.unwrap();
    let hidden = h.plans.create(&ctx(&alice), None, None).await.unwrap();
    let missing = FloorPlanId::new();

    for plan in [hidden.id, missing] {
        let delete = h.plans.delete(&ctx(&eve), plan).await.unwrap_err();
        let share = h.plans.share(&ctx(&eve), plan, eve_org.id).await.unwrap_err();
        let unshare = h.plans.unshare(&ctx(&eve), plan).await.unwrap_err();
        for err in [delete, share, unshare] {
            assert_eq!(err.kind, ErrorKind::Authorization);
            assert_eq!(err.message, "You do not have access to this floor plan");
        }
    }
    assert!(h.plans.get(&ctx(&alice), hidden.id).await.is_ok());
}

#[tokio::test]
async fn test_plan_names() {
    let h = Harness::new();
    let alice = user("alice");
    let plan = h
        .plans
        .create(&ctx(&alice), Some("   ".to_string()), None)
        .await
        .unwrap();
    assert_eq!(plan.name, "Untitled Floor Plan");

    let long = "x".repeat(201);
    assert!(h.plans.create(&ctx(&alice), Some(long.clone()), None).await.is_err());
    assert!(h.plans.rename(&ctx(&alice), plan.id, &long).await.is_err());
    assert!(h.plans.rename(&ctx(&alice), plan.id, "").await.is_err());
    let renamed = h.plans.rename(&ctx(&alice), plan.id, " Gala ").await.unwrap();
    assert_eq!(renamed.name, "Gala");
}

#[tokio::test]
async fn test_share_and_unshare_rules() {
    let h = Harness::new();
    let (alice, bob) = (user("alice"), user("bob"));
    let org = h.organization(&alice, &[(&bob, Role::Admin)]).await;
    let outsider_org = h.organizations.create(&ctx(&bob), "Bobco").await.unwrap();
    let plan = h.plans.create(&ctx(&alice), None, None).await.unwrap();

    let err = h.plans.unshare(&ctx(&alice), plan.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
    let err = h.plans.share(&ctx(&alice), plan.id, outsider_org.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authorization);
    let err = h
        .plans
        .share(&ctx(&alice), plan.id, OrganizationId::from_uuid(Uuid::nil()))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);

    h.plans.share(&ctx(&alice), plan.id, org).await.unwrap();
    let err = h.plans.unshare(&ctx(&bob), plan.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authorization);
    assert!(h.plans.unshare(&ctx(&alice), plan.id).await.unwrap().is_personal());
}

#[tokio::test]
async fn test_only_owners_touch_owner_role() {
    let h = Harness::new();
    let (alice, adam, bob) = (user("alice"), user("adam"), user("bob"));
    let org = h
        .organization(&alice, &[(&adam, Role::Admin), (&bob, Role::Member)])
        .await;

    let err = h
        .members
        .update_role(&ctx(&adam), org, bob.id, Role::Owner)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authorization);
    let err = h.members.remove_member(&ctx(&adam), org, alice.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authorization);

    let err = h
        .members
        .update_role(&ctx(&alice), org, alice.id, Role::Admin)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);

    h.members
        .update_role(&ctx(&alice), org, bob.id, Role::Owner)
        .await
        .unwrap();
    h.members
        .update_role(&ctx(&alice), org, alice.id, Role::Viewer)
        .await
        .unwrap();
    let err = h.members.list_members(&ctx(&user("eve")), org).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authorization);
}

/// Membership store that lets another owner promote `target` to owner
/// after the caller is authorized but before its write lands.
#[derive(Debug)]
struct PromotedBeforeWrite {
    inner: Arc<dyn MembershipStore>,
    target: UserId,
}

impl PromotedBeforeWrite {
    async fn promote(&self, organization: OrganizationId) -> AppResult<()> {
        let change = self
            .inner
            .update_role(organization, self.target, Role::Owner, Role::Owner)
            .await?;
        assert!(matches!(change, MembershipChange::Applied(_)));
        Ok(())
    }
}

#[async_trait]
impl MembershipStore for PromotedBeforeWrite {
    async fn role_of(
        &self,
        organization: OrganizationId,
        user: UserId,
    ) -> AppResult<Option<Role>> {
        self.inner.role_of(organization, user).await
    }

    async fn list_members(&self, organization: OrganizationId) -> AppResult<Vec<Membership>> {
        self.inner.list_members(organization).await
    }

    async fn update_role(
        &self,
        organization: OrganizationId,
        user: UserId,
        role: Role,
        actor: Role,
    ) -> AppResult<MembershipChange> {
        self.promote(organization).await?;
        self.inner.update_role(organization, user, role, actor).await
    }

    async fn remove(
        &self,
        organization: OrganizationId,
        user: UserId,
        actor: Role,
    ) -> AppResult<MembershipChange> {
        self.promote(organization).await?;
        self.inner.remove(organization, user, actor).await
    }
}

#[tokio::test]
async fn test_admin_cannot_touch_member_promoted_mid_request() {
    let h = Harness::new();
    let (alice, adam, carol) = (user("alice"), user("adam"), user("carol"));
    let org = h
        .organization(&alice, &[(&adam, Role::Admin), (&carol, Role::Member)])
        .await;
    let members = MemberService::new(
        Arc::new(PromotedBeforeWrite {
            inner: h.stores.memberships.clone(),
            target: carol.id,
        }),
        h.authz.clone(),
    );

    let err = members
        .update_role(&ctx(&adam), org, carol.id, Role::Viewer)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authorization);
    let err = members.remove_member(&ctx(&adam), org, carol.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authorization);
    assert_eq!(
        h.stores.memberships.role_of(org, carol.id).await.unwrap(),
        Some(Role::Owner)
    );

    // Owners are unaffected by the same interleaving.
    let demoted = members
        .update_role(&ctx(&alice), org, carol.id, Role::Member)
        .await
        .unwrap();
    assert_eq!(demoted.role, Role::Member);
}

#[tokio::test]
async fn test_invitation_edge_cases() {
    let h = Harness::new();
    let (alice, bob) = (user("alice"), user("bob"));
    let org = h.organizations.create(&ctx(&alice), "Acme").await.unwrap();

    let err = h
        .invitations
        .invite(&ctx(&alice), org.id, "bob@example.com", Role::Owner)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
    let err = h
        .invitations
        .invite(&ctx(&bob), org.id, "bob@example.com", Role::Member)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authorization);

    let invitation = h
        .invitations
        .invite(&ctx(&alice), org.id, "bob@example.com", Role::Viewer)
        .await
        .unwrap();
    let late = RequestContext::at(bob.clone(), Utc::now() + Duration::days(8));
    let err = h.invitations.accept(&late, &invitation.token).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
    let err = h.invitations.accept(&ctx(&bob), &invitation.token).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    let again = h
        .invitations
        .invite(&ctx(&alice), org.id, "alice@example.com", Role::Viewer)
        .await
        .unwrap();
    let accepted = h.invitations.accept(&ctx(&alice), &again.token).await.unwrap();
    assert!(accepted.already_member);
    assert_eq!(accepted.membership.role, Role::Owner);
}

#[derive(Debug, Clone)]
enum MemberOp {
    Update { actor: usize, target: usize, role: Role },
    Remove { actor: usize, target: usize },
}

fn member_op() -> impl Strategy<Value = MemberOp> {
    let role = prop_oneof![
        Just(Role::Owner),
        Just(Role::Admin),
        Just(Role::Member),
        Just(Role::Viewer),
    ];
    prop_oneof![
        (0..3usize, 0..3usize, role).prop_map(|(actor, target, role)| MemberOp::Update {
            actor,
            target,
            role
        }),
        (0..3usize, 0..3usize).prop_map(|(actor, target)| MemberOp::Remove { actor, target }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn organization_always_keeps_an_owner(ops in proptest::collection::vec(member_op(), 1..20)) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        runtime.block_on(async {
            let h = Harness::new();
            let people = [user("alice"), user("adam"), user("bob")];
            let org = h
                .organization(&people[0], &[(&people[1], Role::Admin), (&people[2], Role::Member)])
                .await;

            for op in ops {
                // Failures are expected; only the invariant matters.
                let _ = match op {
                    MemberOp::Update { actor, target, role } => h
                        .members
                        .update_role(&ctx(&people[actor]), org, people[target].id, role)
                        .await
                        .map(|_| ()),
                    MemberOp::Remove { actor, target } => h
                        .members
                        .remove_member(&ctx(&people[actor]), org, people[target].id)
                        .await
                        .map(|_| ()),
                };

                let mut owners = 0;
                for person in &people {
                    if let Ok(members) = h.members.list_members(&ctx(person), org).await {
                        owners = members.iter().filter(|m| m.role == Role::Owner).count();
                        break;
                    }
                }
                assert!(owners >= 1, "organization lost its last owner");
            }
        });
    }
}

