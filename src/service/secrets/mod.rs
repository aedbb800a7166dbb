//! Secret lookup for the chat platform credentials.

pub mod file;

use std::{collections::HashMap, ops::Deref, sync::Arc};

use async_trait::async_trait;
use secrecy::Secret;

use crate::base::{config::Config, types::Res};

// Traits.

/// Generic secrets store trait that clients must implement.
#[async_trait]
pub trait GenericSecretStore: Send + Sync + 'static {
    /// Look up a secret by its identifier.
    async fn get_secret(&self, id: &str) -> Res<Secret<String>>;
}

// Structs.

/// Secrets store for the application.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct SecretStore {
    inner: Arc<dyn GenericSecretStore>,
}

impl Deref for SecretStore {
    type Target = dyn GenericSecretStore;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl SecretStore {
    pub fn new(inner: Arc<dyn GenericSecretStore>) -> Self {
        Self { inner }
    }

    /// Build the store the configuration asks for: a secrets directory if one is set, the inline table otherwise.
    pub fn from_config(config: &Config) -> Self {
        match &config.secrets_dir {
            Some(dir) => Self::directory(dir),
            None => Self::inline(config.secrets.clone()),
        }
    }

    /// A store backed by an in-memory table.
    pub fn inline(secrets: HashMap<String, String>) -> Self {
        Self { inner: Arc::new(InlineSecretStore { secrets }) }
    }
}

// Specific implementations.

/// Secrets kept in the configuration itself.
struct InlineSecretStore {
    secrets: HashMap<String, String>,
}

#[async_trait]
impl GenericSecretStore for InlineSecretStore {
    async fn get_secret(&self, id: &str) -> Res<Secret<String>> {
        self.secrets
            .get(id)
            .map(|value| Secret::new(value.clone()))
            .ok_or_else(|| anyhow::anyhow!("Secret `{id}` is not configured"))
    }
}

// Tests.
