//! Object storage over plain HTTP `PUT {endpoint}/{key}`.

use std::{path::Path, sync::Arc};

use anyhow::Context;
use async_trait::async_trait;
use secrecy::{ExposeSecret, Secret};
use tracing::{info, instrument};

use crate::base::{config::Config, types::Void};

use super::{ArchiveClient, GenericArchiveClient};

impl ArchiveClient {
    /// An archive that `PUT`s objects to `archive_endpoint`.
    pub fn http(config: &Config) -> Self {
        Self {
            inner: Arc::new(HttpArchiveClient::new(config)),
        }
    }
}

/// HTTP object storage implementation.
pub struct HttpArchiveClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<Secret<String>>,
}

impl HttpArchiveClient {
    pub fn new(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: config.archive_endpoint.clone().unwrap_or_default().trim_end_matches('/').to_string(),
            api_key: config.archive_api_key.clone().map(Secret::new),
        }
    }
}

#[async_trait]
impl GenericArchiveClient for HttpArchiveClient {
    #[instrument(skip(self))]
    async fn upload(&self, local_path: &Path, key: &str) -> Void {
        let body = tokio::fs::read(local_path).await.with_context(|| format!("Failed to read {}", local_path.display()))?;

        let mut request = self.client.put(format!("{}/{}", self.endpoint, key)).header(reqwest::header::CONTENT_TYPE, "text/plain; charset=utf-8").body(body);

        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key.expose_secret());
        }

        request.send().await.context("Archive upload failed")?.error_for_status()?;

        info!("Archived transcript to `{}`", key);

        Ok(())
    }
}

// Tests.
