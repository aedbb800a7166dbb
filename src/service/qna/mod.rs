pub mod http;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;

use crate::base::types::{ConversationSession, QnaAnswer, Res};

// Traits.

/// Generic conversational Q&A trait that clients must implement.
///
/// The backend is session based: a conversation is opened first, and each
/// message is sent with the conversation id and token it handed out.
#[async_trait]
pub trait GenericQnaClient: Send + Sync + 'static {
    /// Open a new conversation session.
    async fn start_conversation(&self) -> Res<ConversationSession>;

    /// Send an utterance within a session, returning the answer and its references.
    async fn send_message(&self, session: &ConversationSession, utterance: &str) -> Res<QnaAnswer>;
}

// Structs.

/// Q&A client for the application.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct QnaClient {
    inner: Arc<dyn GenericQnaClient>,
}

impl Deref for QnaClient {
    type Target = dyn GenericQnaClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl QnaClient {
    pub fn new(inner: Arc<dyn GenericQnaClient>) -> Self {
        Self { inner }
    }

    /// Ask a single question in a fresh conversation.
    pub async fn ask(&self, utterance: &str) -> Res<QnaAnswer> {
        let session = self.start_conversation().await?;
        self.send_message(&session, utterance).await
    }
}
