//! Load configuration via `config` crate with env-override support.

use std::{collections::HashMap, ops::Deref, path::PathBuf, sync::Arc};

use serde::Deserialize;

use crate::base::prompts;

use super::types::{BotProfile, Res};

/// Default OpenAI-compatible model used for translation.
fn default_translation_model() -> String {
    "gpt-4.1-mini".to_string()
}

/// Default sampling temperature for the translation model.
fn default_translation_temperature() -> f32 {
    0.0
}

/// Default max output tokens for the translation model.
fn default_translation_max_tokens() -> u32 {
    2000
}

/// Default system directive for the translation model.
fn default_translation_system_directive() -> String {
    prompts::TRANSLATION_SYSTEM_DIRECTIVE.to_string()
}

/// Default `source` value sent to the Q&A backend.
fn default_qna_source() -> String {
    "CONSOLE".to_string()
}

/// Default language questions are translated into before they reach the Q&A backend.
fn default_question_language() -> String {
    "en".to_string()
}

/// Default language answers are translated into for the reply.
fn default_reply_language() -> String {
    "zh".to_string()
}

/// Default config table holding bot profiles.
fn default_config_table() -> String {
    "bot_config".to_string()
}

/// Default bot profile key.
fn default_config_table_key() -> String {
    "LarkBotProfile-0".to_string()
}

/// Default database endpoint.
fn default_db_endpoint() -> String {
    "mem://".to_string()
}

/// Default database namespace.
fn default_db_namespace() -> String {
    "relay".to_string()
}

/// Default database name.
fn default_db_database() -> String {
    "relay".to_string()
}

/// Default listen address for the invocation server.
fn default_listen_address() -> String {
    "0.0.0.0:8080".to_string()
}

// Enums.

/// The chat platform replies are posted to.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ChatPlatform {
    /// Feishu (mainland China).
    #[default]
    Feishu,
    /// Lark (international).
    Lark,
}

impl ChatPlatform {
    /// The open API base URL of the platform.
    pub fn base_url(&self) -> &'static str {
        match self {
            ChatPlatform::Feishu => "https://open.feishu.cn",
            ChatPlatform::Lark => "https://open.larksuite.com",
        }
    }
}

/// How the chat app credentials are located.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CredentialLookup {
    /// Read the secret identifiers from `app_id_secret` and `app_secret_secret`.
    Direct,
    /// Read the secret identifiers from the bot profile stored under `config_table_key`.
    #[default]
    ConfigTable,
}

/// Which form of model output is trusted as a translation.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum MarkerPolicy {
    /// Trust text wrapped in `<res></res>`; anything else goes to the dedicated translator.
    #[default]
    RequireMarker,
    /// Trust output without `<res>` as-is; marked output goes to the dedicated translator.
    TrustUnmarked,
}

// Structs.

/// A bot profile seeded into the config table on startup.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct BotProfileSeed {
    /// The profile key.
    pub key: String,
    /// The profile record.
    #[serde(flatten)]
    pub profile: BotProfile,
}

/// Configuration for the relay-bot application.
#[derive(Debug, Clone)]
pub struct Config {
    pub inner: Arc<ConfigInner>,
}

impl Deref for Config {
    type Target = ConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl From<ConfigInner> for Config {
    fn from(inner: ConfigInner) -> Self {
        Self { inner: Arc::new(inner) }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ConfigInner {
    /// Chat platform to reply on (`CHAT_PLATFORM`): `feishu` or `lark`.
    #[serde(default)]
    pub chat_platform: ChatPlatform,
    /// Override for the chat platform base URL (`CHAT_BASE_URL`).
    #[serde(default)]
    pub chat_base_url: Option<String>,
    /// How app credentials are located (`CREDENTIAL_LOOKUP`): `direct` or `config_table`.
    #[serde(default)]
    pub credential_lookup: CredentialLookup,
    /// Config table holding bot profiles (`CONFIG_TABLE`).
    #[serde(default = "default_config_table")]
    pub config_table: String,
    /// Bot profile key (`CONFIG_TABLE_KEY`).
    #[serde(default = "default_config_table_key")]
    pub config_table_key: String,
    /// Secret identifier of the app id, for `direct` lookup (`APP_ID_SECRET`).
    #[serde(default)]
    pub app_id_secret: Option<String>,
    /// Secret identifier of the app secret, for `direct` lookup (`APP_SECRET_SECRET`).
    #[serde(default)]
    pub app_secret_secret: Option<String>,
    /// Directory holding one file per secret (`SECRETS_DIR`).
    #[serde(default)]
    pub secrets_dir: Option<PathBuf>,
    /// Inline secrets, used when no secrets directory is configured.
    #[serde(default)]
    pub secrets: HashMap<String, String>,
    /// Bot profiles upserted into the config table on startup.
    #[serde(default)]
    pub bot_profiles: Vec<BotProfileSeed>,
    /// Database endpoint URL (`DB_ENDPOINT`).
    #[serde(default = "default_db_endpoint")]
    pub db_endpoint: String,
    /// Database namespace (`DB_NAMESPACE`).
    #[serde(default = "default_db_namespace")]
    pub db_namespace: String,
    /// Database name (`DB_DATABASE`).
    #[serde(default = "default_db_database")]
    pub db_database: String,
    /// Database username (`DB_USERNAME`).
    #[serde(default)]
    pub db_username: Option<String>,
    /// Database password (`DB_PASSWORD`).
    #[serde(default)]
    pub db_password: Option<String>,
    /// OpenAI-compatible API key (`OPENAI_API_KEY`).
    pub openai_api_key: String,
    /// OpenAI-compatible API base URL (`OPENAI_API_BASE`).
    #[serde(default)]
    pub openai_api_base: Option<String>,
    /// Translation model (`TRANSLATION_MODEL`).
    #[serde(default = "default_translation_model")]
    pub translation_model: String,
    /// Sampling temperature for the translation model (`TRANSLATION_TEMPERATURE`).
    /// Value between 0 and 2.
    #[serde(default = "default_translation_temperature")]
    pub translation_temperature: f32,
    /// Max output tokens for the translation model (`TRANSLATION_MAX_TOKENS`).
    #[serde(default = "default_translation_max_tokens")]
    pub translation_max_tokens: u32,
    /// Optional custom translation directive (`TRANSLATION_SYSTEM_DIRECTIVE`).
    #[serde(default = "default_translation_system_directive")]
    pub translation_system_directive: String,
    /// Which model output is trusted (`TRANSLATION_MARKER_POLICY`).
    #[serde(default)]
    pub translation_marker_policy: MarkerPolicy,
    /// Dedicated translation service endpoint (`TRANSLATE_ENDPOINT`).
    pub translate_endpoint: String,
    /// Dedicated translation service API key (`TRANSLATE_API_KEY`).
    #[serde(default)]
    pub translate_api_key: Option<String>,
    /// Q&A backend base URL (`QNA_ENDPOINT`).
    pub qna_endpoint: String,
    /// Q&A backend API key (`QNA_API_KEY`).
    #[serde(default)]
    pub qna_api_key: Option<String>,
    /// `source` value sent to the Q&A backend (`QNA_SOURCE`).
    #[serde(default = "default_qna_source")]
    pub qna_source: String,
    /// Language the Q&A backend speaks (`QUESTION_LANGUAGE`).
    #[serde(default = "default_question_language")]
    pub question_language: String,
    /// Language replies are translated into (`REPLY_LANGUAGE`).
    #[serde(default = "default_reply_language")]
    pub reply_language: String,
    /// Whether transcripts are archived (`ARCHIVE_ENABLED`).
    #[serde(default)]
    pub archive_enabled: bool,
    /// Directory bucket transcripts are archived into (`ARCHIVE_DIR`).
    #[serde(default)]
    pub archive_dir: Option<PathBuf>,
    /// Object storage endpoint transcripts are `PUT` to (`ARCHIVE_ENDPOINT`).
    #[serde(default)]
    pub archive_endpoint: Option<String>,
    /// Object storage API key (`ARCHIVE_API_KEY`).
    #[serde(default)]
    pub archive_api_key: Option<String>,
    /// Scratch directory for transcript files (`SCRATCH_DIR`); the system temp dir if unset.
    #[serde(default)]
    pub scratch_dir: Option<PathBuf>,
    /// Listen address of the invocation server (`LISTEN_ADDRESS`).
    #[serde(default = "default_listen_address")]
    pub listen_address: String,
}

impl Default for ConfigInner {
    fn default() -> Self {
        Self {
            chat_platform: ChatPlatform::default(),
            chat_base_url: None,
            credential_lookup: CredentialLookup::default(),
            config_table: default_config_table(),
            config_table_key: default_config_table_key(),
            app_id_secret: None,
            app_secret_secret: None,
            secrets_dir: None,
            secrets: HashMap::new(),
            bot_profiles: Vec::new(),
            db_endpoint: default_db_endpoint(),
            db_namespace: default_db_namespace(),
            db_database: default_db_database(),
            db_username: None,
            db_password: None,
            openai_api_key: String::new(),
            openai_api_base: None,
            translation_model: default_translation_model(),
            translation_temperature: default_translation_temperature(),
            translation_max_tokens: default_translation_max_tokens(),
            translation_system_directive: default_translation_system_directive(),
            translation_marker_policy: MarkerPolicy::default(),
            translate_endpoint: String::new(),
            translate_api_key: None,
            qna_endpoint: String::new(),
            qna_api_key: None,
            qna_source: default_qna_source(),
            question_language: default_question_language(),
            reply_language: default_reply_language(),
            archive_enabled: false,
            archive_dir: None,
            archive_endpoint: None,
            archive_api_key: None,
            scratch_dir: None,
            listen_address: default_listen_address(),
        }
    }
}

impl ConfigInner {
    /// The effective chat platform base URL, without a trailing slash.
    pub fn chat_base_url(&self) -> String {
        self.chat_base_url.as_deref().unwrap_or(self.chat_platform.base_url()).trim_end_matches('/').to_string()
    }

    /// The effective scratch directory.
    pub fn scratch_dir(&self) -> PathBuf {
        self.scratch_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

impl Config {
    pub fn load(explicit_path: Option<&std::path::Path>) -> Res<Self> {
        let mut cfg = config::Config::builder().add_source(config::Environment::default().prefix("RELAY_BOT"));

        if let Some(p) = explicit_path {
            cfg = cfg.add_source(config::File::from(p.to_path_buf()));
        } else if std::path::Path::new(".hidden/config.toml").exists() {
            cfg = cfg.add_source(config::File::with_name(".hidden/config.toml"));
        }

        let result = Config {
            inner: Arc::new(cfg.build()?.try_deserialize()?),
        };

        result.validate()?;

        Ok(result)
    }

    /// Check the ranges and required values that serde cannot express.
    pub fn validate(&self) -> Res<()> {
        if self.translation_temperature < 0.0 || self.translation_temperature > 2.0 {
            return Err(anyhow::anyhow!("Translation temperature must be between 0 and 2."));
        }

        if self.translation_max_tokens < 1 || self.translation_max_tokens > 128000 {
            return Err(anyhow::anyhow!("Translation max tokens must be between 1 and 128000."));
        }

        if self.question_language.trim().is_empty() || self.reply_language.trim().is_empty() {
            return Err(anyhow::anyhow!("Question and reply languages must not be empty."));
        }

        if self.archive_enabled && self.archive_dir.is_none() && self.archive_endpoint.is_none() {
            return Err(anyhow::anyhow!("Archiving is enabled, but neither `archive_dir` nor `archive_endpoint` is set."));
        }

        Ok(())
    }
}

// Tests.

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        std::fs::write(file.path(), contents).unwrap();
        file
    }

    #[test]
    fn test_load_applies_defaults() {
        let file = write_config(
            r#"
            openai_api_key = "sk-test"
            translate_endpoint = "http://translate.local"
            qna_endpoint = "http://qna.local"
            "#,
        );

        let config = Config::load(Some(file.path())).unwrap();

        assert_eq!(config.chat_platform, ChatPlatform::Feishu);
        assert_eq!(config.credential_lookup, CredentialLookup::ConfigTable);
        assert_eq!(config.config_table_key, "LarkBotProfile-0");
        assert_eq!(config.translation_marker_policy, MarkerPolicy::RequireMarker);
        assert_eq!(config.reply_language, "zh");
        assert_eq!(config.chat_base_url(), "https://open.feishu.cn");
        assert!(!config.archive_enabled);
    }

    #[test]
    fn test_load_reads_platform_and_profiles() {
        let file = write_config(
            r#"
            openai_api_key = "sk-test"
            translate_endpoint = "http://translate.local"
            qna_endpoint = "http://qna.local"
            chat_platform = "lark"
            credential_lookup = "direct"
            translation_marker_policy = "trust_unmarked"

            [secrets]
            app-id = "cli_123"

            [[bot_profiles]]
            key = "LarkBotProfile-1"
            app_id_arn = "app-id"
            app_secret_arn = "app-secret"
            "#,
        );

        let config = Config::load(Some(file.path())).unwrap();

        assert_eq!(config.chat_base_url(), "https://open.larksuite.com");
        assert_eq!(config.credential_lookup, CredentialLookup::Direct);
        assert_eq!(config.translation_marker_policy, MarkerPolicy::TrustUnmarked);
        assert_eq!(config.secrets.get("app-id").map(String::as_str), Some("cli_123"));
        assert_eq!(config.bot_profiles.len(), 1);
        assert_eq!(config.bot_profiles[0].profile.app_secret_secret, "app-secret");
    }

    #[test]
    fn test_validate_rejects_out_of_range_temperature() {
        let config = Config::from(ConfigInner {
            translation_temperature: 3.0,
            ..Default::default()
        });

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_archive_without_target() {
        let config = Config::from(ConfigInner {
            archive_enabled: true,
            ..Default::default()
        });

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_chat_base_url_override_strips_trailing_slash() {
        let config = Config::from(ConfigInner {
            chat_base_url: Some("http://127.0.0.1:9999/".to_string()),
            ..Default::default()
        });

        assert_eq!(config.chat_base_url(), "http://127.0.0.1:9999");
    }
}
