//! Feishu / Lark open API integration for relay-bot.
//!
//! Both platforms share one API surface and differ only in their base URL:
//! - `POST /open-apis/auth/v3/tenant_access_token/internal` exchanges app credentials for a token
//! - `POST /open-apis/im/v1/messages/{message_id}/reply` posts a threaded reply

use std::sync::Arc;

use anyhow::{Context, anyhow};
use async_trait::async_trait;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, instrument};

use crate::base::{
    config::Config,
    types::{AppCredentials, Res, Void},
};

use super::{ChatClient, GenericChatClient};

// Extra methods on `ChatClient` applied by the lark implementation.

impl ChatClient {
    /// Creates a Feishu or Lark chat client, depending on `chat_platform`.
    pub fn lark(config: &Config) -> Self {
        let client = LarkChatClient::new(config.chat_base_url());
        Self { inner: Arc::new(client) }
    }
}

impl From<LarkChatClient> for ChatClient {
    fn from(client: LarkChatClient) -> Self {
        Self { inner: Arc::new(client) }
    }
}

// Wire types.

#[derive(Debug, Serialize)]
struct TenantAccessTokenRequest<'a> {
    app_id: &'a str,
    app_secret: &'a str,
}

#[derive(Debug, Deserialize)]
struct TenantAccessTokenResponse {
    code: i64,
    #[serde(default)]
    msg: String,
    tenant_access_token: Option<String>,
}

#[derive(Debug, Serialize)]
struct ReplyRequest {
    content: String,
    msg_type: &'static str,
    reply_in_thread: bool,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    code: i64,
    #[serde(default)]
    msg: String,
}

/// Encode reply text as the `content` string of a text message.
pub fn text_content(text: &str) -> Res<String> {
    Ok(serde_json::to_string(&json!({ "text": text }))?)
}

/// Check that a message id is safe to use as a URL path segment.
pub fn validate_message_id(message_id: &str) -> Res<()> {
    if message_id.is_empty() || !message_id.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-')) {
        return Err(anyhow!("Message id `{message_id}` is not a valid reply target"));
    }

    Ok(())
}

// Specific implementations.

/// Feishu / Lark client implementation.
#[derive(Clone)]
pub struct LarkChatClient {
    client: reqwest::Client,
    base_url: String,
}

impl LarkChatClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl GenericChatClient for LarkChatClient {
    #[instrument(skip_all)]
    async fn tenant_access_token(&self, credentials: &AppCredentials) -> Res<Secret<String>> {
        let request = TenantAccessTokenRequest {
            app_id: credentials.app_id.expose_secret(),
            app_secret: credentials.app_secret.expose_secret(),
        };

        let response = self
            .client
            .post(format!("{}/open-apis/auth/v3/tenant_access_token/internal", self.base_url))
            .json(&request)
            .send()
            .await
            .context("Tenant access token request failed")?
            .error_for_status()?;

        let response: TenantAccessTokenResponse = response.json().await.context("Tenant access token response was malformed")?;

        if response.code != 0 {
            return Err(anyhow!("Tenant access token request was rejected ({}): {}", response.code, response.msg));
        }

        let token = response.tenant_access_token.filter(|token| !token.is_empty()).ok_or_else(|| anyhow!("Tenant access token response carried no token"))?;

        Ok(Secret::new(token))
    }

    #[instrument(skip(self, token, text))]
    async fn reply_in_thread(&self, token: &Secret<String>, message_id: &str, text: &str) -> Void {
        validate_message_id(message_id)?;

        let request = ReplyRequest {
            content: text_content(text)?,
            msg_type: "text",
            reply_in_thread: true,
        };

        let response = self
            .client
            .post(format!("{}/open-apis/im/v1/messages/{}/reply", self.base_url, message_id))
            .bearer_auth(token.expose_secret())
            .json(&request)
            .send()
            .await
            .context("Reply request failed")?
            .error_for_status()?;

        let response: ApiResponse = response.json().await.context("Reply response was malformed")?;

        if response.code != 0 {
            return Err(anyhow!("Reply was rejected ({}): {}", response.code, response.msg));
        }

        info!("Replied in thread `{}`", message_id);

        Ok(())
    }
}

// Tests.

#[cfg(test)]
mod tests {
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{body_json, header, method, path},
    };

    use super::*;

    fn credentials() -> AppCredentials {
        AppCredentials {
            app_id: Secret::new("cli_123".to_string()),
            app_secret: Secret::new("s3cr3t".to_string()),
        }
    }

    #[test]
    fn test_text_content_escapes_newlines() {
        assert_eq!(text_content("a\n\nb").unwrap(), r#"{"text":"a\n\nb"}"#);
    }

    #[tokio::test]
    async fn test_tenant_access_token() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/open-apis/auth/v3/tenant_access_token/internal"))
            .and(body_json(json!({ "app_id": "cli_123", "app_secret": "s3cr3t" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "code": 0, "msg": "ok", "tenant_access_token": "t-abc", "expire": 7200 })))
            .expect(1)
            .mount(&server)
            .await;

        let client = LarkChatClient::new(server.uri());
        let token = client.tenant_access_token(&credentials()).await.unwrap();

        assert_eq!(token.expose_secret(), "t-abc");
    }

    #[tokio::test]
    async fn test_tenant_access_token_rejected() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/open-apis/auth/v3/tenant_access_token/internal"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "code": 10003, "msg": "invalid param" })))
            .mount(&server)
            .await;

        let client = LarkChatClient::new(server.uri());
        let err = client.tenant_access_token(&credentials()).await.unwrap_err();

        assert!(err.to_string().contains("10003"));
    }

    #[tokio::test]
    async fn test_reply_in_thread() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/open-apis/im/v1/messages/om_123/reply"))
            .and(header("authorization", "Bearer t-abc"))
            .and(body_json(json!({
                "content": "{\"text\":\"翻译A\\n\\nA\"}",
                "msg_type": "text",
                "reply_in_thread": true
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "code": 0, "msg": "success", "data": { "message_id": "om_456" } })))
            .expect(1)
            .mount(&server)
            .await;

        let client = ChatClient::from(LarkChatClient::new(server.uri()));

        client.reply_in_thread(&Secret::new("t-abc".to_string()), "om_123", "翻译A\n\nA").await.unwrap();
    }

    #[test]
    fn test_validate_message_id() {
        assert!(validate_message_id("om_dc13264520392913993dd051dba21dcf").is_ok());
        assert!(validate_message_id("om-1").is_ok());
        assert!(validate_message_id("").is_err());
        assert!(validate_message_id("om_1/../x").is_err());
        assert!(validate_message_id("om_1?x=1").is_err());
    }

    #[tokio::test]
    async fn test_reply_in_thread_rejects_unsafe_message_id() {
        let server = MockServer::start().await;

        Mock::given(method("POST")).respond_with(ResponseTemplate::new(200).set_body_json(json!({ "code": 0, "msg": "success" }))).expect(0).mount(&server).await;

        let client = LarkChatClient::new(server.uri());

        assert!(client.reply_in_thread(&Secret::new("t-abc".to_string()), "om_1/../../auth", "hi").await.is_err());
    }

    #[tokio::test]
    async fn test_reply_in_thread_fails_on_http_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/open-apis/im/v1/messages/om_123/reply"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({ "code": 230001, "msg": "bad message id" })))
            .mount(&server)
            .await;

        let client = LarkChatClient::new(server.uri());

        assert!(client.reply_in_thread(&Secret::new("t-abc".to_string()), "om_123", "hi").await.is_err());
    }
}
