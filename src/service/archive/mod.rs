//! Object storage for question/answer transcripts.

pub mod directory;
pub mod http;

use std::{ops::Deref, path::Path, sync::Arc};

use async_trait::async_trait;

use crate::base::{config::Config, types::Void};

// Traits.

/// Generic object storage trait that clients must implement.
#[async_trait]
pub trait GenericArchiveClient: Send + Sync + 'static {
    /// Upload the file at `local_path` under the object key `key`.
    async fn upload(&self, local_path: &Path, key: &str) -> Void;
}

// Structs.

/// Archive client for the application.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct ArchiveClient {
    inner: Arc<dyn GenericArchiveClient>,
}

impl Deref for ArchiveClient {
    type Target = dyn GenericArchiveClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl ArchiveClient {
    pub fn new(inner: Arc<dyn GenericArchiveClient>) -> Self {
        Self { inner }
    }

    /// Build the archive client the configuration asks for, or `None` when archiving is off.
    ///
    /// An HTTP endpoint wins over a directory bucket when both are set.
    pub fn from_config(config: &Config) -> Option<Self> {
        if !config.archive_enabled {
            return None;
        }

        match (&config.archive_endpoint, &config.archive_dir) {
            (Some(_), _) => Some(Self::http(config)),
            (None, Some(dir)) => Some(Self::directory(dir)),
            (None, None) => None,
        }
    }
}
