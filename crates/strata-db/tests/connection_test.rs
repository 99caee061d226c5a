//! Opening an embedded store through `DbManager`.

use strata_core::repository::OnboardingStatusStore;
use strata_db::repository::SurrealOnboardingStatusStore;
use strata_db::{DbConfig, DbManager};

#[tokio::test]
async fn connect_applies_migrations() {
    let manager = DbManager::connect(&DbConfig::in_memory("test", "test"))
        .await
        .unwrap();

    let mut result = manager
        .client()
        .query("SELECT * FROM _migration")
        .await
        .unwrap();
    let records: Vec<surrealdb_types::Value> = result.take(0).unwrap();
    assert_eq!(records.len(), 1);

    let store = SurrealOnboardingStatusStore::new(manager.client().clone());
    assert!(!store.is_onboarding_complete().await.unwrap());
    store.set_onboarding_complete(true).await.unwrap();
    assert!(store.is_onboarding_complete().await.unwrap());
}

#[tokio::test]
async fn unsupported_scheme_is_a_database_error() {
    let config = DbConfig {
        url: "nosuchengine://somewhere".into(),
        ..DbConfig::in_memory("test", "test")
    };

    let err = DbManager::connect(&config).await.err().unwrap();
    assert!(matches!(err, strata_db::DbError::Surreal(_)));
}
