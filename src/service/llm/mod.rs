pub mod openai;

use crate::base::types::Res;
use async_trait::async_trait;
use std::{ops::Deref, sync::Arc};

// Traits.

/// Generic LLM client trait that clients must implement.
///
/// This trait defines the core functionality for prompting a large language model to translate text.
/// Implementing this trait allows different LLM providers to be used with the relay-bot.
#[async_trait]
pub trait GenericLlmClient: Send + Sync + 'static {
    /// Ask the model to translate `text` into the language named by `language_tag` (e.g., `EN`, `CN`).
    ///
    /// Returns the raw model output, which is expected (but not guaranteed) to wrap the
    /// translation in `<res></res>`.
    async fn translate(&self, text: &str, language_tag: &str) -> Res<String>;
}

// Structs.

/// LLM client for the application.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct LlmClient {
    inner: Arc<dyn GenericLlmClient>,
}

impl Deref for LlmClient {
    type Target = dyn GenericLlmClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl LlmClient {
    pub fn new(inner: Arc<dyn GenericLlmClient>) -> Self {
        Self { inner }
    }
}
