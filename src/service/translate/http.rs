//! HTTP JSON machine translation client.
//!
//! Speaks the `TranslateText` JSON shape (`Text`, `SourceLanguageCode`,
//! `TargetLanguageCode` in; `TranslatedText` out).  Request signing, if the
//! provider needs it, is left to a gateway in front of `translate_endpoint`.

use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::base::{config::Config, types::Res};

use super::{GenericTranslateClient, TranslateClient};

// Extra methods on `TranslateClient` applied by the http implementation.

impl TranslateClient {
    pub fn http(config: &Config) -> Self {
        let client = HttpTranslateClient::new(config);
        Self { inner: Arc::new(client) }
    }
}

// Wire types.

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct TranslateTextRequest<'a> {
    text: &'a str,
    source_language_code: &'a str,
    target_language_code: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct TranslateTextResponse {
    translated_text: String,
}

// Specific implementations.

/// HTTP machine translation client implementation.
#[derive(Clone)]
pub struct HttpTranslateClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<Arc<Secret<String>>>,
}

impl HttpTranslateClient {
    pub fn new(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: config.translate_endpoint.clone(),
            api_key: config.translate_api_key.clone().map(|key| Arc::new(Secret::new(key))),
        }
    }
}

#[async_trait]
impl GenericTranslateClient for HttpTranslateClient {
    #[instrument(skip(self, text))]
    async fn translate_text(&self, text: &str, source: &str, target: &str) -> Res<String> {
        let body = TranslateTextRequest {
            text,
            source_language_code: source,
            target_language_code: target,
        };

        let mut request = self.client.post(&self.endpoint).json(&body);

        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key.expose_secret());
        }

        let response = request.send().await.context("Translation service request failed")?.error_for_status()?;
        let response: TranslateTextResponse = response.json().await.context("Translation service returned an unexpected body")?;

        Ok(response.translated_text)
    }
}

// Tests.
