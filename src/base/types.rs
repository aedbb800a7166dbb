use secrecy::Secret;
use serde::{Deserialize, Serialize};

pub type Err = anyhow::Error;
pub type Res<T> = Result<T, Err>;
pub type Void = Res<()>;

/// A chat message pulled out of one queue record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    /// The user's text, in whatever language they wrote it.
    pub text: String,
    /// The message the reply is posted under.
    pub thread_id: String,
}

/// Which tier produced a translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranslationTier {
    /// The language model returned a usable translation.
    Model,
    /// The dedicated translation service was used.
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationResult {
    pub text: String,
    pub tier: TranslationTier,
}

/// A citation returned alongside a Q&A answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub title: String,
    pub url: String,
}

/// An answer from the Q&A backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QnaAnswer {
    pub answer: String,
    pub references: Vec<Reference>,
}

/// A conversation session opened against the Q&A backend.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSession {
    pub conversation_id: String,
    pub conversation_token: String,
}

/// Chat platform app credentials.
///
/// Both values are redacted from `Debug` output.
#[derive(Debug)]
pub struct AppCredentials {
    pub app_id: Secret<String>,
    pub app_secret: Secret<String>,
}

/// Config-table record naming the secrets that hold the app credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct BotProfile {
    /// Secret identifier holding the app id.
    #[serde(alias = "app_id_arn")]
    pub app_id_secret: String,
    /// Secret identifier holding the app secret.
    #[serde(alias = "app_secret_arn")]
    pub app_secret_secret: String,
}

/// What one successful relay produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayOutcome {
    pub thread_id: String,
    pub question: String,
    pub reply: String,
    pub archive_key: Option<String>,
}

/// The structured status returned to the invoker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationStatus {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: String,
}

impl InvocationStatus {
    pub fn success() -> Self {
        Self {
            status_code: 200,
            body: "Message processed successfully".to_string(),
        }
    }

    pub fn failure() -> Self {
        Self {
            status_code: 500,
            body: "Error processing message".to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status_code == 200
    }
}
