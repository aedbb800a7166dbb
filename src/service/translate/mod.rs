pub mod http;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;

use crate::base::types::Res;

/// Source language code that asks the translation service to detect the language itself.
pub const AUTO_DETECT: &str = "auto";

// Traits.

/// Generic machine translation trait that clients must implement.
///
/// This is the dedicated translation service used when the language model's
/// output is not a usable translation.
#[async_trait]
pub trait GenericTranslateClient: Send + Sync + 'static {
    /// Translate `text` from `source` (or [`AUTO_DETECT`]) into `target`.
    async fn translate_text(&self, text: &str, source: &str, target: &str) -> Res<String>;
}

// Structs.

/// Machine translation client for the application.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct TranslateClient {
    inner: Arc<dyn GenericTranslateClient>,
}

impl Deref for TranslateClient {
    type Target = dyn GenericTranslateClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl TranslateClient {
    pub fn new(inner: Arc<dyn GenericTranslateClient>) -> Self {
        Self { inner }
    }
}
