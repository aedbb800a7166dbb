//! Transcript archival.
//!
//! A transcript is written to a scratch file, uploaded under a date-partitioned
//! key, and the scratch file is removed again.

use std::{io::Write, path::Path};

use anyhow::Context;
use chrono::{DateTime, Utc};
use tracing::instrument;

use crate::{base::types::Res, service::archive::ArchiveClient};

/// Render the transcript body.
pub fn transcript(question: &str, answer: &str) -> String {
    format!("Question: {question}\nAnswer: {answer}\n")
}

/// The object key a transcript is stored under: `YYYY-MM-DD/Q-YYYY-MM-DD-HH-MM-SS-<thread>.txt`.
pub fn object_key(now: DateTime<Utc>, thread_id: &str) -> String {
    let thread: String = thread_id.chars().filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-')).collect();

    format!("{}/Q-{}-{}.txt", now.format("%Y-%m-%d"), now.format("%Y-%m-%d-%H-%M-%S"), thread)
}

/// Archive one question/answer pair, returning the object key.
#[instrument(skip(archive, question, answer))]
pub async fn archive_transcript(archive: &ArchiveClient, scratch_dir: &Path, now: DateTime<Utc>, thread_id: &str, question: &str, answer: &str) -> Res<String> {
    let key = object_key(now, thread_id);

    let mut scratch = tempfile::Builder::new()
        .prefix("Q-")
        .suffix(".txt")
        .tempfile_in(scratch_dir)
        .with_context(|| format!("Failed to create a scratch file in {}", scratch_dir.display()))?;

    scratch.write_all(transcript(question, answer).as_bytes())?;
    scratch.flush()?;

    archive.upload(scratch.path(), &key).await?;

    scratch.close().context("Failed to remove the scratch transcript")?;

    Ok(key)
}

// Tests.
