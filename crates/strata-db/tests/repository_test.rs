//! Integration tests for user, organization and bucket repositories
//! using in-memory SurrealDB.

use std::time::Duration;

use strata_core::StrataError;
use strata_core::models::bucket::CreateBucket;
use strata_core::models::organization::CreateOrganization;
use strata_core::models::status::Status;
use strata_core::models::user::CreateUser;
use strata_core::repository::{
    BucketRepository, OrganizationRepository, Pagination, UserRepository,
};
use strata_db::repository::{
    SurrealBucketRepository, SurrealOrganizationRepository, SurrealUserRepository,
};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

async fn setup() -> Surreal<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    strata_db::run_migrations(&db).await.unwrap();
    db
}

// -----------------------------------------------------------------------
// Users
// -----------------------------------------------------------------------

#[tokio::test]
async fn user_is_created_without_password() {
    let repo = SurrealUserRepository::new(setup().await);

    let user = repo
        .create(CreateUser {
            name: "admin".into(),
        })
        .await
        .unwrap();

    assert_eq!(user.name, "admin");
    assert_eq!(user.status, Status::Active);
    assert!(!user.has_password());

    let by_name = repo.get_by_name("admin").await.unwrap();
    assert_eq!(by_name.id, user.id);
    let by_id = repo.get_by_id(user.id).await.unwrap();
    assert_eq!(by_id.name, "admin");
}

#[tokio::test]
async fn duplicate_user_name_is_rejected() {
    let repo = SurrealUserRepository::new(setup().await);
    repo.create(CreateUser { name: "admin".into() })
        .await
        .unwrap();

    let err = repo
        .create(CreateUser { name: "admin".into() })
        .await
        .unwrap_err();
    assert!(matches!(err, StrataError::AlreadyExists { .. }));
    assert_eq!(err.code(), "conflict");
}

#[tokio::test]
async fn set_password_stores_argon2_hash() {
    let repo = SurrealUserRepository::new(setup().await);
    let user = repo
        .create(CreateUser { name: "admin".into() })
        .await
        .unwrap();

    repo.set_password(user.id, "pw123").await.unwrap();

    let user = repo.get_by_id(user.id).await.unwrap();
    let hash = user.password_hash.expect("password hash should be set");
    assert!(hash.starts_with("$argon2id$"));
    assert!(!hash.contains("pw123"));
}

#[tokio::test]
async fn set_password_on_missing_user_is_not_found() {
    let repo = SurrealUserRepository::new(setup().await);
    let err = repo.set_password(Uuid::new_v4(), "pw").await.unwrap_err();
    assert!(matches!(err, StrataError::NotFound { .. }));
}

#[tokio::test]
async fn users_list_and_delete() {
    let repo = SurrealUserRepository::new(setup().await);
    let a = repo.create(CreateUser { name: "a".into() }).await.unwrap();
    repo.create(CreateUser { name: "b".into() }).await.unwrap();

    let page = repo.list(Pagination::default()).await.unwrap();
    assert_eq!(page.total, 2);
    assert_eq!(page.items.len(), 2);

    repo.delete(a.id).await.unwrap();
    assert!(repo.get_by_id(a.id).await.is_err());
    assert_eq!(repo.list(Pagination::default()).await.unwrap().total, 1);
}

// -----------------------------------------------------------------------
// Organizations
// -----------------------------------------------------------------------

#[tokio::test]
async fn organization_crud() {
    let repo = SurrealOrganizationRepository::new(setup().await);

    let org = repo
        .create(CreateOrganization {
            name: "acme".into(),
            description: None,
        })
        .await
        .unwrap();
    assert_eq!(org.name, "acme");
    assert_eq!(org.description, "");

    assert_eq!(repo.get_by_name("acme").await.unwrap().id, org.id);
    assert_eq!(repo.get_by_id(org.id).await.unwrap().name, "acme");

    let err = repo
        .create(CreateOrganization {
            name: "acme".into(),
            description: Some("again".into()),
        })
        .await
        .unwrap_err();
    assert_eq!(err.code(), "conflict");

    let page = repo.list(Pagination::default()).await.unwrap();
    assert_eq!(page.total, 1);

    repo.delete(org.id).await.unwrap();
    let err = repo.get_by_name("acme").await.unwrap_err();
    assert_eq!(err.code(), "not found");
}

// -----------------------------------------------------------------------
// Buckets
// -----------------------------------------------------------------------

#[tokio::test]
async fn bucket_belongs_to_existing_org() {
    let db = setup().await;
    let orgs = SurrealOrganizationRepository::new(db.clone());
    let buckets = SurrealBucketRepository::new(db);

    let org = orgs
        .create(CreateOrganization {
            name: "acme".into(),
            description: None,
        })
        .await
        .unwrap();

    let bucket = buckets
        .create(CreateBucket {
            org_id: org.id,
            organization: org.name.clone(),
            name: "default".into(),
            retention_period: Duration::from_secs(24 * 3600),
        })
        .await
        .unwrap();

    assert_eq!(bucket.org_id, org.id);
    assert_eq!(bucket.organization, "acme");
    assert_eq!(bucket.retention_period, Duration::from_secs(86_400));

    let fetched = buckets.get_by_name(org.id, "default").await.unwrap();
    assert_eq!(fetched.id, bucket.id);
    assert_eq!(buckets.get_by_id(bucket.id).await.unwrap().name, "default");
}

#[tokio::test]
async fn bucket_for_unknown_org_is_not_found() {
    let buckets = SurrealBucketRepository::new(setup().await);

    let err = buckets
        .create(CreateBucket {
            org_id: Uuid::new_v4(),
            organization: "ghost".into(),
            name: "default".into(),
            retention_period: Duration::ZERO,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, StrataError::NotFound { .. }));
}

#[tokio::test]
async fn bucket_names_are_unique_per_org() {
    let db = setup().await;
    let orgs = SurrealOrganizationRepository::new(db.clone());
    let buckets = SurrealBucketRepository::new(db);

    let mut org_ids = Vec::new();
    for name in ["acme", "globex"] {
        let org = orgs
            .create(CreateOrganization {
                name: name.into(),
                description: None,
            })
            .await
            .unwrap();
        org_ids.push(org.id);
    }

    let input = |org_id| CreateBucket {
        org_id,
        organization: String::new(),
        name: "default".into(),
        retention_period: Duration::ZERO,
    };

    buckets.create(input(org_ids[0])).await.unwrap();
    // Same name in another org is fine.
    buckets.create(input(org_ids[1])).await.unwrap();

    let err = buckets.create(input(org_ids[0])).await.unwrap_err();
    assert!(matches!(err, StrataError::AlreadyExists { .. }));

    let page = buckets
        .list_by_organization(org_ids[0], Pagination::default())
        .await
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].name, "default");

    buckets.delete(page.items[0].id).await.unwrap();
    let page = buckets
        .list_by_organization(org_ids[0], Pagination::default())
        .await
        .unwrap();
    assert_eq!(page.total, 0);
}

#[tokio::test]
async fn bucket_retention_beyond_signed_seconds_is_invalid() {
    let db = setup().await;
    let org = SurrealOrganizationRepository::new(db.clone())
        .create(CreateOrganization {
            name: "acme".into(),
            description: None,
        })
        .await
        .unwrap();
    let buckets = SurrealBucketRepository::new(db);

    let err = buckets
        .create(CreateBucket {
            org_id: org.id,
            organization: org.name.clone(),
            name: "default".into(),
            retention_period: Duration::from_secs(i64::MAX as u64 + 1),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, StrataError::Invalid { .. }));

    let largest = Duration::from_secs(i64::MAX as u64);
    let bucket = buckets
        .create(CreateBucket {
            org_id: org.id,
            organization: org.name,
            name: "forever-ish".into(),
            retention_period: largest,
        })
        .await
        .unwrap();
    assert_eq!(bucket.retention_period, largest);
    assert_eq!(
        buckets.get_by_id(bucket.id).await.unwrap().retention_period,
        largest
    );
}
