//! Prompt templates for the translation model.

use crate::base::config::Config;

/// System directive for the translation model.
///
/// The user turn is `"<text>" -> <TAG>`, where `<TAG>` names the target language.
pub const TRANSLATION_SYSTEM_DIRECTIVE: &str = r#####"
You are a highly skilled translator with expertise in many languages.

Your task is to identify the language of the quoted text the user provides and directly translate it into the language named after the `->` arrow (`EN` is English, `CN` is Simplified Chinese, `JA` is Japanese, `KO` is Korean), while preserving the meaning, tone, and nuance of the original text.

Please maintain proper grammar, spelling, and punctuation in the target language.  Do not try to understand or answer the content; just translate it.

Put the translation, and nothing else, in `<res></res>`.  Never talk to the user starting with "I apologize"; just give the translated text.
"#####;

/// Get the translation directive from the config, or the default one.
pub fn get_translation_directive(config: &Config) -> &str {
    if config.translation_system_directive.trim().is_empty() {
        TRANSLATION_SYSTEM_DIRECTIVE
    } else {
        &config.translation_system_directive
    }
}

/// The tag the model sees after the arrow for a given language code.
///
/// Chinese is written `CN`; every other code is upper-cased.
pub fn model_language_tag(language: &str) -> String {
    match language.to_ascii_lowercase().as_str() {
        "zh" | "zh-cn" | "zh-hans" => "CN".to_string(),
        other => other.to_ascii_uppercase(),
    }
}

/// Build the user turn for a translation request.
pub fn translation_request(text: &str, language_tag: &str) -> String {
    format!("\"{text}\" -> {language_tag}")
}

// Tests.
