//! Integration with OpenAI-compatible chat completion endpoints.
//!
//! This module provides a thin wrapper around `async-openai` for prompting a
//! model to translate text.  Any endpoint that speaks the chat completions
//! protocol can be used by setting `openai_api_base`.

use std::sync::Arc;

use crate::base::{
    config::Config,
    prompts::{get_translation_directive, translation_request},
    types::Res,
};
use anyhow::Context;
use async_openai::{
    Client,
    config::OpenAIConfig,
    types::{ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs},
};
use async_trait::async_trait;
use tracing::{debug, instrument};

use super::{GenericLlmClient, LlmClient};

// Extra methods on `LlmClient` applied by the openai implementation.

impl LlmClient {
    pub fn openai(config: &Config) -> Self {
        let client = OpenAiLlmClient::new(config);
        Self { inner: Arc::new(client) }
    }
}

// Specific implementations.

/// OpenAI LLM client implementation.
#[derive(Clone)]
pub struct OpenAiLlmClient {
    client: Client<OpenAIConfig>,
    config: Config,
}

impl OpenAiLlmClient {
    /// Create a new OpenAI LLM client.
    #[instrument(name = "OpenAiLlmClient::new", skip_all)]
    pub fn new(config: &Config) -> Self {
        let mut cfg = OpenAIConfig::new().with_api_key(config.openai_api_key.clone());

        if let Some(api_base) = &config.openai_api_base {
            cfg = cfg.with_api_base(api_base.trim_end_matches('/'));
        }

        Self {
            client: Client::with_config(cfg),
            config: config.clone(),
        }
    }
}

#[async_trait]
impl GenericLlmClient for OpenAiLlmClient {
    #[instrument(skip(self, text))]
    async fn translate(&self, text: &str, language_tag: &str) -> Res<String> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.config.translation_model)
            .temperature(self.config.translation_temperature)
            .max_completion_tokens(self.config.translation_max_tokens)
            .messages([
                ChatCompletionRequestSystemMessageArgs::default().content(get_translation_directive(&self.config)).build()?.into(),
                ChatCompletionRequestUserMessageArgs::default().content(translation_request(text, language_tag)).build()?.into(),
            ])
            .build()?;

        let response = self.client.chat().create(request).await.context("Translation model request failed")?;
        let content = response.choices.first().and_then(|choice| choice.message.content.clone()).context("Translation model returned no content")?;

        debug!("Translation model returned {} bytes", content.len());

        Ok(content)
    }
}

// Tests.
