//! Strata Server: application entry point.

mod cli;

use anyhow::Context;
use clap::Parser;
use strata_db::repository::{
    SurrealAuthorizationRepository, SurrealBucketRepository, SurrealOnboardingStatusStore,
    SurrealOrganizationRepository, SurrealUserRepository,
};
use strata_db::DbManager;
use strata_onboarding::OnboardingService;
use tracing_subscriber::EnvFilter;

use crate::cli::Args;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("strata=info".parse()?))
        .json()
        .init();

    let manager = DbManager::connect(&args.db_config())
        .await
        .context("failed to open the store")?;
    let db = manager.client().clone();

    let user_repo = match args.auth_config().pepper {
        Some(pepper) => SurrealUserRepository::with_pepper(db.clone(), pepper),
        None => SurrealUserRepository::new(db.clone()),
    };
    let service = OnboardingService::new(
        SurrealOnboardingStatusStore::new(db.clone()),
        user_repo,
        SurrealOrganizationRepository::new(db.clone()),
        SurrealBucketRepository::new(db.clone()),
        SurrealAuthorizationRepository::new(db),
        args.onboarding_config(),
    );

    match args.command.onboarding_request() {
        None => {
            let allowed = service.is_onboarding().await?;
            println!("{}", serde_json::json!({ "allowed": allowed }));
        }
        Some(request) => {
            let result = service
                .generate(request)
                .await
                .context("onboarding failed")?;
            tracing::info!(user = %result.user.name, org = %result.org.name, "Setup complete");
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
    }

    Ok(())
}
