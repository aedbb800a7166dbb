//! Secrets read from a directory holding one file per secret.
//!
//! This is the layout secret managers use when they mount secrets into a
//! container.  Identifiers such as ARNs contain characters that are not valid
//! in file names, so every character outside `[A-Za-z0-9._-]` maps to `_`.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context;
use async_trait::async_trait;
use secrecy::Secret;
use tracing::instrument;

use crate::base::types::Res;

use super::{GenericSecretStore, SecretStore};

impl SecretStore {
    /// A store backed by a secrets directory.
    pub fn directory(root: impl AsRef<Path>) -> Self {
        Self {
            inner: Arc::new(FileSecretStore::new(root)),
        }
    }
}

/// Directory-backed secrets store.
pub struct FileSecretStore {
    root: PathBuf,
}

impl FileSecretStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }

    /// The file a secret identifier maps to.
    pub fn path_for(&self, id: &str) -> PathBuf {
        let file_name: String = id.chars().map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') { c } else { '_' }).collect();
        self.root.join(file_name)
    }
}

#[async_trait]
impl GenericSecretStore for FileSecretStore {
    #[instrument(skip(self))]
    async fn get_secret(&self, id: &str) -> Res<Secret<String>> {
        let path = self.path_for(id);
        let value = tokio::fs::read_to_string(&path).await.with_context(|| format!("Failed to read secret `{id}` from {}", path.display()))?;

        Ok(Secret::new(value.trim_end_matches(['\r', '\n']).to_string()))
    }
}

// Tests.

#[cfg(test)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    #[test]
    fn test_path_for_sanitizes_arns() {
        let store = FileSecretStore::new("/run/secrets");

        assert_eq!(
            store.path_for("arn:aws:secretsmanager:ap-northeast-1:123:secret:AppID-abc"),
            PathBuf::from("/run/secrets/arn_aws_secretsmanager_ap-northeast-1_123_secret_AppID-abc")
        );
    }

    #[tokio::test]
    async fn test_get_secret_trims_trailing_newline() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("app-secret"), "s3cr3t\n").unwrap();

        let store = SecretStore::directory(dir.path());

        assert_eq!(store.get_secret("app-secret").await.unwrap().expose_secret(), "s3cr3t");
        assert!(store.get_secret("missing").await.is_err());
    }
}
