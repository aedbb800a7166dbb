//! HTTP client for the conversational Q&A backend.
//!
//! Two calls make up one question: `StartConversation` hands out a
//! conversation id and token, `SendMessage` submits the utterance and returns
//! `result.content.text.{body, references}`.

use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::{info, instrument};

use crate::base::{
    config::Config,
    types::{ConversationSession, QnaAnswer, Reference, Res},
};

use super::{GenericQnaClient, QnaClient};

// Extra methods on `QnaClient` applied by the http implementation.

impl QnaClient {
    pub fn http(config: &Config) -> Self {
        let client = HttpQnaClient::new(config);
        Self { inner: Arc::new(client) }
    }
}

// Wire types.

#[derive(Debug, Serialize)]
struct StartConversationRequest<'a> {
    source: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SendMessageRequest<'a> {
    source: &'a str,
    conversation_id: &'a str,
    utterance: &'a str,
    conversation_token: &'a str,
}

#[derive(Debug, Deserialize)]
struct SendMessageResponse {
    result: SendMessageResult,
}

#[derive(Debug, Deserialize)]
struct SendMessageResult {
    content: SendMessageContent,
}

#[derive(Debug, Deserialize)]
struct SendMessageContent {
    text: SendMessageText,
}

#[derive(Debug, Deserialize)]
struct SendMessageText {
    body: String,
    #[serde(default)]
    references: Vec<Reference>,
}

// Specific implementations.

/// HTTP Q&A client implementation.
#[derive(Clone)]
pub struct HttpQnaClient {
    client: reqwest::Client,
    endpoint: String,
    source: String,
    api_key: Option<Arc<Secret<String>>>,
}

impl HttpQnaClient {
    pub fn new(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: config.qna_endpoint.trim_end_matches('/').to_string(),
            source: config.qna_source.clone(),
            api_key: config.qna_api_key.clone().map(|key| Arc::new(Secret::new(key))),
        }
    }

    async fn post<B, R>(&self, operation: &str, body: &B) -> Res<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let mut request = self.client.post(format!("{}/{}", self.endpoint, operation)).json(body);

        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key.expose_secret());
        }

        let response = request.send().await.with_context(|| format!("Q&A `{operation}` request failed"))?.error_for_status()?;

        response.json::<R>().await.with_context(|| format!("Q&A `{operation}` returned an unexpected body"))
    }
}

#[async_trait]
impl GenericQnaClient for HttpQnaClient {
    #[instrument(skip(self))]
    async fn start_conversation(&self) -> Res<ConversationSession> {
        let session: ConversationSession = self.post("StartConversation", &StartConversationRequest { source: &self.source }).await?;

        info!("Started Q&A conversation `{}`", session.conversation_id);

        Ok(session)
    }

    #[instrument(skip_all, fields(conversation_id = %session.conversation_id))]
    async fn send_message(&self, session: &ConversationSession, utterance: &str) -> Res<QnaAnswer> {
        let request = SendMessageRequest {
            source: &self.source,
            conversation_id: &session.conversation_id,
            utterance,
            conversation_token: &session.conversation_token,
        };

        let response: SendMessageResponse = self.post("SendMessage", &request).await?;
        let text = response.result.content.text;

        info!("Q&A answered with {} reference(s)", text.references.len());

        Ok(QnaAnswer {
            answer: text.body,
            references: text.references,
        })
    }
}

// Tests.

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{body_json, method, path},
    };

    use super::*;
    use crate::base::config::ConfigInner;

    fn create_test_config(endpoint: &str) -> Config {
        Config::from(ConfigInner {
            qna_endpoint: endpoint.to_string(),
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn test_ask_runs_both_session_steps() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/StartConversation"))
            .and(body_json(json!({ "source": "CONSOLE" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "conversationId": "conv-1", "conversationToken": "tok-1" })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/SendMessage"))
            .and(body_json(json!({
                "source": "CONSOLE",
                "conversationId": "conv-1",
                "utterance": "How do I create a bucket?",
                "conversationToken": "tok-1"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": {
                    "content": {
                        "text": {
                            "body": "Use the console.",
                            "references": [
                                { "title": "Creating a bucket", "url": "https://docs.example.com/bucket" },
                                { "title": "Bucket naming", "url": "https://docs.example.com/naming" }
                            ]
                        }
                    }
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = QnaClient::http(&create_test_config(&server.uri()));
        let answer = client.ask("How do I create a bucket?").await.unwrap();

        assert_eq!(answer.answer, "Use the console.");
        assert_eq!(answer.references.len(), 2);
        assert_eq!(answer.references[1].title, "Bucket naming");
    }

    #[tokio::test]
    async fn test_missing_body_is_an_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/StartConversation"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "conversationId": "conv-1", "conversationToken": "tok-1" })))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/SendMessage"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": { "content": { "text": { "references": [] } } } })))
            .mount(&server)
            .await;

        let client = QnaClient::http(&create_test_config(&server.uri()));

        assert!(client.ask("anything").await.is_err());
    }
}
