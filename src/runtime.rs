//! Runtime services and shared state for the relay-bot.

use tracing::{info, instrument};

use crate::{
    base::{config::Config, types::Res},
    service::{archive::ArchiveClient, chat::ChatClient, db::DbClient, llm::LlmClient, qna::QnaClient, secrets::SecretStore, translate::TranslateClient},
};

/// Runtime service context that can be shared across the application.
///
/// This struct holds every external client the relay needs, plus the configuration.
/// It is built once per process and handed to each invocation.  It is designed to be
/// trivially cloneable, allowing it to be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct Runtime {
    /// The configuration for the application.
    pub config: Config,
    /// The config table client.
    pub db: DbClient,
    /// The translation model client.
    pub llm: LlmClient,
    /// The dedicated translation service client.
    pub translate: TranslateClient,
    /// The Q&A backend client.
    pub qna: QnaClient,
    /// The secrets store.
    pub secrets: SecretStore,
    /// The chat platform client.
    pub chat: ChatClient,
    /// The transcript archive, when archiving is enabled.
    pub archive: Option<ArchiveClient>,
}

impl Runtime {
    /// Create a new runtime instance.
    #[instrument(skip_all)]
    pub async fn new(config: Config) -> Res<Self> {
        // Initialize the database, and seed any configured profiles.
        let db = DbClient::surreal(&config).await?;

        for seed in &config.bot_profiles {
            db.put_bot_profile(&seed.key, &seed.profile).await?;
            info!("Seeded bot profile `{}`", seed.key);
        }

        // Initialize the translation clients.
        let llm = LlmClient::openai(&config);
        let translate = TranslateClient::http(&config);

        // Initialize the Q&A client.
        let qna = QnaClient::http(&config);

        // Initialize the secrets store and chat client.
        let secrets = SecretStore::from_config(&config);
        let chat = ChatClient::lark(&config);

        // Initialize the archive, if enabled.
        let archive = ArchiveClient::from_config(&config);

        info!("Replying on `{}` ({:?} credential lookup, archive {})", config.chat_base_url(), config.credential_lookup, if archive.is_some() { "on" } else { "off" });

        Ok(Self {
            config,
            db,
            llm,
            translate,
            qna,
            secrets,
            chat,
            archive,
        })
    }
}
