//! SurrealDB implementation of [`OnboardingStatusStore`].

use strata_core::error::StrataResult;
use strata_core::repository::OnboardingStatusStore;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;

use crate::error::DbError;

/// Record id of the single onboarding status record.
pub const ONBOARDING_KEY: &str = "onboarding_key";

#[derive(Debug, SurrealValue)]
struct OnboardingRow {
    completed: bool,
}

/// Stores the onboarding flag as one record in the `onboarding` table.
///
/// Each operation is a single statement, so concurrent callers cannot
/// leave the record half-written.
#[derive(Clone)]
pub struct SurrealOnboardingStatusStore<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealOnboardingStatusStore<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> OnboardingStatusStore for SurrealOnboardingStatusStore<C> {
    async fn is_onboarding_complete(&self) -> StrataResult<bool> {
        let mut result = self
            .db
            .query("SELECT completed FROM type::record('onboarding', $key)")
            .bind(("key", ONBOARDING_KEY))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<OnboardingRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.first().is_some_and(|r| r.completed))
    }

    async fn set_onboarding_complete(&self, complete: bool) -> StrataResult<()> {
        self.db
            .query(
                "UPSERT type::record('onboarding', $key) SET \
                 completed = $completed, updated_at = time::now()",
            )
            .bind(("key", ONBOARDING_KEY))
            .bind(("completed", complete))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        Ok(())
    }
}
