pub mod lark;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;
use secrecy::Secret;

use crate::base::types::{AppCredentials, Res, Void};

// Traits.

/// Generic "chat" trait that clients must implement.
///
/// This trait defines the core functionality for replying on a chat platform
/// like Feishu or Lark.  Implementing this trait allows different chat services
/// to be used with the relay-bot.
#[async_trait]
pub trait GenericChatClient: Send + Sync + 'static {
    /// Exchange app credentials for a tenant access token.
    ///
    /// Tokens are short-lived; callers fetch a fresh one for every reply.
    async fn tenant_access_token(&self, credentials: &AppCredentials) -> Res<Secret<String>>;

    /// Post `text` as a threaded reply to the message `message_id`.
    async fn reply_in_thread(&self, token: &Secret<String>, message_id: &str, text: &str) -> Void;
}

// Structs.

/// Chat client for the application.
///
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct ChatClient {
    inner: Arc<dyn GenericChatClient>,
}

impl Deref for ChatClient {
    type Target = dyn GenericChatClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl ChatClient {
    pub fn new(inner: Arc<dyn GenericChatClient>) -> Self {
        Self { inner }
    }
}
