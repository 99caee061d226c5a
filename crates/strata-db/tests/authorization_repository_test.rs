//! Integration tests for the Authorization repository.

use strata_core::StrataError;
use strata_core::models::authorization::CreateAuthorization;
use strata_core::models::organization::CreateOrganization;
use strata_core::models::permission::{Action, Permission, ResourceKind, operator_permissions};
use strata_core::models::status::Status;
use strata_core::models::user::CreateUser;
use strata_core::repository::{AuthorizationRepository, OrganizationRepository, UserRepository};
use strata_db::repository::{
    SurrealAuthorizationRepository, SurrealOrganizationRepository, SurrealUserRepository,
};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

/// Helper: in-memory DB with one user and one org.
async fn setup() -> (SurrealAuthorizationRepository<Db>, Uuid, Uuid) {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    strata_db::run_migrations(&db).await.unwrap();

    let user = SurrealUserRepository::new(db.clone())
        .create(CreateUser { name: "admin".into() })
        .await
        .unwrap();
    let org = SurrealOrganizationRepository::new(db.clone())
        .create(CreateOrganization {
            name: "acme".into(),
            description: None,
        })
        .await
        .unwrap();

    (SurrealAuthorizationRepository::new(db), user.id, org.id)
}

fn input(user_id: Uuid, org_id: Uuid, permissions: Vec<Permission>) -> CreateAuthorization {
    CreateAuthorization {
        user_id,
        org_id,
        description: "admin's Token".into(),
        permissions,
    }
}

#[tokio::test]
async fn create_returns_token_and_stores_only_its_hash() {
    let (repo, user_id, org_id) = setup().await;

    let (auth, token) = repo
        .create(input(user_id, org_id, operator_permissions()))
        .await
        .unwrap();

    assert!(!token.is_empty());
    assert_ne!(auth.token_hash, token);
    assert_eq!(auth.token_hash, strata_auth::token::hash_token(&token));
    assert_eq!(auth.status, Status::Active);
    assert_eq!(auth.user_id, user_id);
    assert_eq!(auth.org_id, org_id);
    assert_eq!(auth.description, "admin's Token");
}

#[tokio::test]
async fn permissions_round_trip_in_order() {
    let (repo, user_id, org_id) = setup().await;
    let bucket_id = Uuid::new_v4();
    let mut permissions = operator_permissions();
    permissions.push(Permission::at_id(bucket_id, Action::Write, ResourceKind::Buckets).unwrap());
    permissions.push(Permission::at_id(bucket_id, Action::Read, ResourceKind::Buckets).unwrap());

    let (created, _) = repo
        .create(input(user_id, org_id, permissions.clone()))
        .await
        .unwrap();
    let fetched = repo.get_by_id(created.id).await.unwrap();

    assert_eq!(fetched.permissions, permissions);
}

#[tokio::test]
async fn invalid_permission_is_rejected() {
    let (repo, user_id, org_id) = setup().await;
    let mut bad = Permission::new(Action::Read, ResourceKind::Buckets);
    bad.resource.id = Some(Uuid::nil());

    let err = repo
        .create(input(user_id, org_id, vec![bad]))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "invalid");
}

#[tokio::test]
async fn lookup_by_token() {
    let (repo, user_id, org_id) = setup().await;
    let (created, token) = repo
        .create(input(user_id, org_id, vec![]))
        .await
        .unwrap();

    let found = repo.get_by_token(&token).await.unwrap();
    assert_eq!(found.id, created.id);

    let err = repo.get_by_token("not-a-token").await.unwrap_err();
    assert!(matches!(err, StrataError::NotFound { .. }));
}

#[tokio::test]
async fn status_list_and_delete() {
    let (repo, user_id, org_id) = setup().await;
    let (first, _) = repo.create(input(user_id, org_id, vec![])).await.unwrap();
    repo.create(input(user_id, org_id, vec![])).await.unwrap();

    let updated = repo.set_status(first.id, Status::Inactive).await.unwrap();
    assert_eq!(updated.status, Status::Inactive);
    assert!(!updated.is_active());

    assert_eq!(repo.list_by_user(user_id).await.unwrap().len(), 2);
    assert!(repo.list_by_user(Uuid::new_v4()).await.unwrap().is_empty());

    repo.delete(first.id).await.unwrap();
    assert_eq!(repo.list_by_user(user_id).await.unwrap().len(), 1);

    let err = repo
        .set_status(first.id, Status::Active)
        .await
        .unwrap_err();
    assert!(matches!(err, StrataError::NotFound { .. }));
}
