use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;

use crate::base::types::{BotProfile, Res, Void};

pub mod surreal;

// Traits.

/// Generic database client trait that clients must implement.
///
/// The relay only reads from its database: the config table maps a profile
/// key to the secret identifiers of the chat app credentials.  Writing is
/// there for seeding and operator tooling.
#[async_trait]
pub trait GenericDbClient: Send + Sync + 'static {
    /// Gets the bot profile stored under `key`, if any.
    async fn get_bot_profile(&self, key: &str) -> Res<Option<BotProfile>>;

    /// Creates or replaces the bot profile stored under `key`.
    async fn put_bot_profile(&self, key: &str, profile: &BotProfile) -> Void;
}

/// Database client for relay-bot.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct DbClient {
    /// The database client instance.
    pub inner: Arc<dyn GenericDbClient>,
}

impl Deref for DbClient {
    type Target = dyn GenericDbClient;

    fn deref(&self) -> &Self::Target {
        self.inner.as_ref()
    }
}

impl DbClient {
    pub fn new(inner: Arc<dyn GenericDbClient>) -> Self {
        Self { inner }
    }
}
