//! Chat app credential resolution.
//!
//! Credentials either come straight from two named secrets, or from the
//! secrets named by a bot profile in the config table.  Every identifier and
//! every resolved value must be non-empty before anything reaches the chat
//! platform.

use anyhow::{Context, anyhow};
use secrecy::{ExposeSecret, Secret};
use tracing::{info, instrument};

use crate::{
    base::{
        config::{Config, CredentialLookup},
        types::{AppCredentials, Res},
    },
    service::{db::DbClient, secrets::SecretStore},
};

/// Resolve the app credentials according to `credential_lookup`.
#[instrument(skip_all, fields(lookup = ?config.credential_lookup))]
pub async fn resolve_app_credentials(config: &Config, db: &DbClient, secrets: &SecretStore) -> Res<AppCredentials> {
    let (app_id_secret, app_secret_secret) = match config.credential_lookup {
        CredentialLookup::Direct => (
            config.app_id_secret.clone().unwrap_or_default(),
            config.app_secret_secret.clone().unwrap_or_default(),
        ),
        CredentialLookup::ConfigTable => {
            let profile = db
                .get_bot_profile(&config.config_table_key)
                .await?
                .with_context(|| format!("No bot profile stored under `{}`", config.config_table_key))?;

            (profile.app_id_secret, profile.app_secret_secret)
        }
    };

    let app_id = fetch_non_empty(secrets, "app id", &app_id_secret).await?;
    let app_secret = fetch_non_empty(secrets, "app secret", &app_secret_secret).await?;

    info!("Resolved app credentials");

    Ok(AppCredentials { app_id, app_secret })
}

async fn fetch_non_empty(secrets: &SecretStore, what: &str, id: &str) -> Res<Secret<String>> {
    if id.trim().is_empty() {
        return Err(anyhow!("The {what} secret identifier is empty"));
    }

    let value = secrets.get_secret(id).await?;

    if value.expose_secret().trim().is_empty() {
        return Err(anyhow!("The {what} secret `{id}` is empty"));
    }

    Ok(value)
}

// Tests.
