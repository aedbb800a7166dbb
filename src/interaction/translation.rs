//! Two-tier translation: the language model first, the dedicated translator as fallback.

use tracing::{info, instrument, warn};

use crate::{
    base::{
        config::MarkerPolicy,
        prompts::model_language_tag,
        types::{Res, TranslationResult, TranslationTier},
    },
    service::{
        llm::LlmClient,
        translate::{AUTO_DETECT, TranslateClient},
    },
};

const OPEN_MARKER: &str = "<res>";
const CLOSE_MARKER: &str = "</res>";

/// The shape of a translation model response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelOutput {
    /// The response wrapped its answer in `<res></res>`; this is the (trimmed) inner text.
    Marked(String),
    /// The response had no complete `<res></res>` pair; this is the whole (trimmed) response.
    Unmarked(String),
}

/// Parse a raw model response.
pub fn parse_model_output(raw: &str) -> ModelOutput {
    if let Some(start) = raw.find(OPEN_MARKER) {
        let rest = &raw[start + OPEN_MARKER.len()..];

        if let Some(end) = rest.find(CLOSE_MARKER) {
            return ModelOutput::Marked(rest[..end].trim().to_string());
        }
    }

    ModelOutput::Unmarked(raw.trim().to_string())
}

/// Decide whether a parsed response is usable under `policy`.
///
/// Returns `None` when the dedicated translator should be used instead.  Under
/// [`MarkerPolicy::TrustUnmarked`], any `<res>` in the output sends it to the
/// translator, and a stray `</res>` is stripped from accepted text.
pub fn accept_model_output(output: ModelOutput, policy: MarkerPolicy) -> Option<String> {
    let text = match (policy, output) {
        (MarkerPolicy::RequireMarker, ModelOutput::Marked(text)) => text,
        (MarkerPolicy::TrustUnmarked, ModelOutput::Unmarked(text)) if !text.contains(OPEN_MARKER) => text.replace(CLOSE_MARKER, "").trim().to_string(),
        _ => return None,
    };

    if text.is_empty() { None } else { Some(text) }
}

/// Translate `text` into `language`, falling back to the dedicated translator when the model output is not accepted.
#[instrument(skip(llm, translate, text))]
pub async fn translate_two_tier(llm: &LlmClient, translate: &TranslateClient, policy: MarkerPolicy, text: &str, language: &str) -> Res<TranslationResult> {
    let raw = llm.translate(text, &model_language_tag(language)).await?;

    if let Some(translated) = accept_model_output(parse_model_output(&raw), policy) {
        info!("Model translation accepted");

        return Ok(TranslationResult {
            text: translated,
            tier: TranslationTier::Model,
        });
    }

    warn!("Model translation not accepted under {:?}; using the translation service", policy);

    let translated = translate.translate_text(text, AUTO_DETECT, language).await?;

    Ok(TranslationResult {
        text: translated,
        tier: TranslationTier::Fallback,
    })
}

// Tests.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use mockall::mock;

    use super::*;
    use crate::service::{llm::GenericLlmClient, translate::GenericTranslateClient};

    mock! {
        pub Llm {}

        #[async_trait]
        impl GenericLlmClient for Llm {
            async fn translate(&self, text: &str, language_tag: &str) -> Res<String>;
        }
    }

    mock! {
        pub Translate {}

        #[async_trait]
        impl GenericTranslateClient for Translate {
            async fn translate_text(&self, text: &str, source: &str, target: &str) -> Res<String>;
        }
    }

    fn llm_returning(output: &'static str) -> LlmClient {
        let mut mock = MockLlm::new();
        mock.expect_translate().returning(move |_, _| Ok(output.to_string()));
        LlmClient::new(Arc::new(mock))
    }

    fn translate_returning(output: &'static str, calls: usize) -> TranslateClient {
        let mut mock = MockTranslate::new();
        mock.expect_translate_text()
            .withf(|_, source, _| source == AUTO_DETECT)
            .times(calls)
            .returning(move |_, _, _| Ok(output.to_string()));
        TranslateClient::new(Arc::new(mock))
    }

    #[test]
    fn test_parse_model_output() {
        assert_eq!(parse_model_output("<res> Hello </res>"), ModelOutput::Marked("Hello".to_string()));
        assert_eq!(parse_model_output("Sure!\n<res>Hello</res>\nDone."), ModelOutput::Marked("Hello".to_string()));
        assert_eq!(parse_model_output("Hello"), ModelOutput::Unmarked("Hello".to_string()));
        assert_eq!(parse_model_output("<res>Hello"), ModelOutput::Unmarked("<res>Hello".to_string()));
    }

    #[test]
    fn test_accept_model_output_require_marker() {
        let policy = MarkerPolicy::RequireMarker;

        assert_eq!(accept_model_output(ModelOutput::Marked("Hello".to_string()), policy), Some("Hello".to_string()));
        assert_eq!(accept_model_output(ModelOutput::Marked("".to_string()), policy), None);
        assert_eq!(accept_model_output(ModelOutput::Unmarked("Hello".to_string()), policy), None);
    }

    #[test]
    fn test_accept_model_output_trust_unmarked() {
        let policy = MarkerPolicy::TrustUnmarked;

        assert_eq!(accept_model_output(ModelOutput::Unmarked("Hello".to_string()), policy), Some("Hello".to_string()));
        assert_eq!(accept_model_output(ModelOutput::Marked("Hello".to_string()), policy), None);
        assert_eq!(accept_model_output(parse_model_output("<res>Hello"), policy), None);
        assert_eq!(accept_model_output(parse_model_output("Hello</res>"), policy), Some("Hello".to_string()));
        assert_eq!(accept_model_output(parse_model_output("</res>"), policy), None);
    }

    #[tokio::test]
    async fn test_marked_output_uses_model_under_require_marker() {
        let result = translate_two_tier(&llm_returning("<res>How do I create a bucket?</res>"), &translate_returning("unused", 0), MarkerPolicy::RequireMarker, "如何创建桶？", "en").await.unwrap();

        assert_eq!(result.text, "How do I create a bucket?");
        assert_eq!(result.tier, TranslationTier::Model);
    }

    #[tokio::test]
    async fn test_unmarked_output_falls_back_under_require_marker() {
        let result = translate_two_tier(&llm_returning("I apologize, I cannot."), &translate_returning("How do I create a bucket?", 1), MarkerPolicy::RequireMarker, "如何创建桶？", "en").await.unwrap();

        assert_eq!(result.text, "How do I create a bucket?");
        assert_eq!(result.tier, TranslationTier::Fallback);
    }

    #[tokio::test]
    async fn test_marked_output_falls_back_under_trust_unmarked() {
        let result = translate_two_tier(&llm_returning("<res>Hello</res>"), &translate_returning("Hello from service", 1), MarkerPolicy::TrustUnmarked, "你好", "en").await.unwrap();

        assert_eq!(result.text, "Hello from service");
        assert_eq!(result.tier, TranslationTier::Fallback);
    }

    #[tokio::test]
    async fn test_fallback_translates_original_text() {
        let mut mock = MockTranslate::new();
        mock.expect_translate_text()
            .withf(|text, source, target| text == "你好" && source == "auto" && target == "en")
            .times(1)
            .returning(|_, _, _| Ok("Hello".to_string()));

        let result = translate_two_tier(&llm_returning("garbage"), &TranslateClient::new(Arc::new(mock)), MarkerPolicy::RequireMarker, "你好", "en").await.unwrap();

        assert_eq!(result.text, "Hello");
    }

    #[tokio::test]
    async fn test_model_sees_language_tag() {
        let mut mock = MockLlm::new();
        mock.expect_translate().withf(|_, tag| tag == "CN").times(1).returning(|_, _| Ok("<res>你好</res>".to_string()));

        let result = translate_two_tier(&LlmClient::new(Arc::new(mock)), &translate_returning("unused", 0), MarkerPolicy::RequireMarker, "Hello", "zh").await.unwrap();

        assert_eq!(result.text, "你好");
    }
}
