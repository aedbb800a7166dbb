//! Queue envelope parsing.
//!
//! The relay is fed queue batches of the shape
//! `{ "Records": [ { "messageId", "body", "attributes": { "MessageGroupId" } } ] }`,
//! where each `body` is itself JSON carrying the user's text in `content`.

use std::collections::HashMap;

use anyhow::{Context, anyhow};
use serde::Deserialize;

use crate::base::types::{IncomingMessage, Res};

/// The attribute naming the message a reply goes under.
pub const MESSAGE_GROUP_ID: &str = "MessageGroupId";

/// A batch of queue records.
#[derive(Debug, Clone, Deserialize)]
pub struct QueueEvent {
    #[serde(rename = "Records")]
    pub records: Vec<QueueRecord>,
}

/// One queue record.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueRecord {
    #[serde(default)]
    pub message_id: Option<String>,
    pub body: String,
    #[serde(default)]
    pub attributes: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct MessageBody {
    content: String,
}

impl QueueEvent {
    /// Parse a raw queue payload.
    pub fn parse(payload: &str) -> Res<Self> {
        let event: QueueEvent = serde_json::from_str(payload).context("Queue payload is not a valid envelope")?;

        if event.records.is_empty() {
            return Err(anyhow!("Queue payload carried no records"));
        }

        Ok(event)
    }
}

impl QueueRecord {
    /// Extract the chat message this record carries.
    pub fn message(&self) -> Res<IncomingMessage> {
        let body: MessageBody = serde_json::from_str(&self.body).context("Queue record body is not a valid message")?;

        let thread_id = self
            .attributes
            .get(MESSAGE_GROUP_ID)
            .filter(|id| !id.is_empty())
            .cloned()
            .ok_or_else(|| anyhow!("Queue record is missing the `{MESSAGE_GROUP_ID}` attribute"))?;

        Ok(IncomingMessage { text: body.content, thread_id })
    }
}

// Tests.

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn envelope(body: &str, group_id: Option<&str>) -> String {
        let mut attributes = serde_json::Map::new();
        attributes.insert("ApproximateReceiveCount".to_string(), json!("1"));
        if let Some(group_id) = group_id {
            attributes.insert(MESSAGE_GROUP_ID.to_string(), json!(group_id));
        }

        json!({
            "Records": [{
                "messageId": "8c0f7a47-0000-0000-0000-000000000000",
                "body": body,
                "attributes": attributes,
                "eventSource": "aws:sqs"
            }]
        })
        .to_string()
    }

    #[test]
    fn test_parse_extracts_text_and_thread() {
        let event = QueueEvent::parse(&envelope(r#"{"content":"如何创建S3桶？"}"#, Some("om_123"))).unwrap();
        let message = event.records[0].message().unwrap();

        assert_eq!(message.text, "如何创建S3桶？");
        assert_eq!(message.thread_id, "om_123");
    }

    #[test]
    fn test_parse_rejects_malformed_payloads() {
        assert!(QueueEvent::parse("not json").is_err());
        assert!(QueueEvent::parse(r#"{"Records":[]}"#).is_err());
    }

    #[test]
    fn test_message_requires_content_and_group_id() {
        let event = QueueEvent::parse(&envelope(r#"{"text":"hi"}"#, Some("om_123"))).unwrap();
        assert!(event.records[0].message().is_err());

        let event = QueueEvent::parse(&envelope(r#"{"content":"hi"}"#, None)).unwrap();
        assert!(event.records[0].message().is_err());

        let event = QueueEvent::parse(&envelope("plain text", Some("om_123"))).unwrap();
        assert!(event.records[0].message().is_err());
    }
}
