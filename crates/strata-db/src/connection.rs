//! Opening the store Strata runs against.
//!
//! The endpoint scheme picks the engine: `ws://host:port` for a
//! SurrealDB server, `mem://` for an embedded in-memory store.

use std::fmt;

use surrealdb::Surreal;
use surrealdb::engine::any::{self, Any};
use surrealdb::opt::auth::Root;
use tracing::info;

use crate::error::DbError;
use crate::schema::run_migrations;

/// Root account used to sign in to a SurrealDB server.
#[derive(Clone)]
pub struct RootCredentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for RootCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RootCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Where the store lives and which namespace/database to use.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Endpoint such as `ws://127.0.0.1:8000` or `mem://`.
    pub url: String,
    pub namespace: String,
    pub database: String,
    /// Embedded engines have no accounts, so sign-in is skipped when unset.
    pub credentials: Option<RootCredentials>,
}

impl DbConfig {
    /// Embedded in-memory store with no sign-in.
    pub fn in_memory(namespace: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            url: "mem://".into(),
            namespace: namespace.into(),
            database: database.into(),
            credentials: None,
        }
    }
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: "ws://127.0.0.1:8000".into(),
            namespace: "strata".into(),
            database: "main".into(),
            credentials: Some(RootCredentials {
                username: "root".into(),
                password: "root".into(),
            }),
        }
    }
}

/// An open store with the schema brought up to date.
#[derive(Clone)]
pub struct DbManager {
    db: Surreal<Any>,
}

impl DbManager {
    /// Open the configured endpoint, sign in if credentials are set,
    /// select the namespace and database, then apply pending migrations.
    pub async fn connect(config: &DbConfig) -> Result<Self, DbError> {
        info!(
            url = %config.url,
            namespace = %config.namespace,
            database = %config.database,
            "Opening store"
        );

        let db = any::connect(config.url.as_str()).await?;

        if let Some(credentials) = &config.credentials {
            db.signin(Root {
                username: credentials.username.clone(),
                password: credentials.password.clone(),
            })
            .await?;
        }

        db.use_ns(&config.namespace)
            .use_db(&config.database)
            .await?;

        run_migrations(&db).await?;

        info!("Store ready");

        Ok(Self { db })
    }

    pub fn client(&self) -> &Surreal<Any> {
        &self.db
    }
}
