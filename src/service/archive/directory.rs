//! A local directory used as a bucket: object keys become relative paths.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, anyhow};
use async_trait::async_trait;
use tracing::{info, instrument};

use crate::base::types::{Res, Void};

use super::{ArchiveClient, GenericArchiveClient};

impl ArchiveClient {
    /// An archive rooted at `root`.
    pub fn directory(root: impl AsRef<Path>) -> Self {
        Self {
            inner: Arc::new(DirectoryArchiveClient::new(root)),
        }
    }
}

/// Directory bucket implementation.
pub struct DirectoryArchiveClient {
    root: PathBuf,
}

impl DirectoryArchiveClient {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }

    /// Resolve an object key below the root, refusing keys that would escape it.
    fn object_path(&self, key: &str) -> Res<PathBuf> {
        let mut path = self.root.clone();

        for segment in key.split('/') {
            if segment.is_empty() || segment == "." || segment == ".." {
                return Err(anyhow!("Invalid object key `{key}`"));
            }

            path.push(segment);
        }

        Ok(path)
    }
}

#[async_trait]
impl GenericArchiveClient for DirectoryArchiveClient {
    #[instrument(skip(self))]
    async fn upload(&self, local_path: &Path, key: &str) -> Void {
        let destination = self.object_path(key)?;

        if let Some(parent) = destination.parent() {
            tokio::fs::create_dir_all(parent).await.with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        tokio::fs::copy(local_path, &destination).await.with_context(|| format!("Failed to archive {} to {}", local_path.display(), destination.display()))?;

        info!("Archived transcript to `{}`", key);

        Ok(())
    }
}

// Tests.

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upload_creates_date_partition() {
        let bucket = tempfile::tempdir().unwrap();
        let scratch = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(scratch.path(), "Question: q\nAnswer: a\n").unwrap();

        let archive = ArchiveClient::directory(bucket.path());
        archive.upload(scratch.path(), "2024-05-01/Q-2024-05-01-10-00-00-om_1.txt").await.unwrap();

        let stored = std::fs::read_to_string(bucket.path().join("2024-05-01").join("Q-2024-05-01-10-00-00-om_1.txt")).unwrap();

        assert_eq!(stored, "Question: q\nAnswer: a\n");
    }

    #[tokio::test]
    async fn test_upload_rejects_escaping_keys() {
        let bucket = tempfile::tempdir().unwrap();
        let scratch = tempfile::NamedTempFile::new().unwrap();

        let archive = ArchiveClient::directory(bucket.path());

        assert!(archive.upload(scratch.path(), "../outside.txt").await.is_err());
        assert!(archive.upload(scratch.path(), "/abs.txt").await.is_err());
    }
}
