//! SurrealDB-backed config table.

use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use surrealdb::{
    Surreal,
    engine::any::{self, Any},
    opt::auth::Root,
};
use tracing::{info, instrument};

use crate::base::{
    config::Config,
    types::{BotProfile, Res, Void},
};

use super::{DbClient, GenericDbClient};

// Extra methods on `DbClient` applied by the surreal implementation.

impl DbClient {
    /// Connects to the configured SurrealDB endpoint.
    pub async fn surreal(config: &Config) -> Res<Self> {
        let client = SurrealDbClient::connect(config).await?;
        Ok(Self { inner: Arc::new(client) })
    }

    /// Creates an in-memory SurrealDB instance, mostly for tests.
    pub async fn surreal_memory() -> Res<Self> {
        let client = SurrealDbClient::open("mem://", "relay", "relay", None, None, "bot_config").await?;
        Ok(Self { inner: Arc::new(client) })
    }
}

// Specific implementations.

/// SurrealDB client implementation.
#[derive(Clone)]
pub struct SurrealDbClient {
    db: Surreal<Any>,
    table: String,
}

impl SurrealDbClient {
    /// Connects using the database settings in the config.
    #[instrument(name = "SurrealDbClient::connect", skip_all)]
    pub async fn connect(config: &Config) -> Res<Self> {
        Self::open(
            &config.db_endpoint,
            &config.db_namespace,
            &config.db_database,
            config.db_username.as_deref(),
            config.db_password.as_deref(),
            &config.config_table,
        )
        .await
    }

    async fn open(endpoint: &str, namespace: &str, database: &str, username: Option<&str>, password: Option<&str>, table: &str) -> Res<Self> {
        let db = any::connect(endpoint).await.with_context(|| format!("Failed to connect to database at `{endpoint}`"))?;

        if let (Some(username), Some(password)) = (username, password) {
            db.signin(Root { username, password }).await.context("Database sign-in failed")?;
        }

        db.use_ns(namespace).use_db(database).await?;

        info!("Connected to database at `{}`", endpoint);

        Ok(Self { db, table: table.to_string() })
    }
}

#[async_trait]
impl GenericDbClient for SurrealDbClient {
    #[instrument(skip(self))]
    async fn get_bot_profile(&self, key: &str) -> Res<Option<BotProfile>> {
        let profile: Option<BotProfile> = self.db.select((self.table.as_str(), key)).await?;
        Ok(profile)
    }

    #[instrument(skip(self, profile))]
    async fn put_bot_profile(&self, key: &str, profile: &BotProfile) -> Void {
        let _: Option<BotProfile> = self.db.upsert((self.table.as_str(), key)).content(profile.clone()).await?;
        Ok(())
    }
}

// Tests.
