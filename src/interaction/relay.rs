//! The relay handler: one queue message in, one threaded reply out.

use anyhow::Context;
use chrono::Utc;
use tracing::{Instrument, error, info, info_span, instrument};

use crate::{
    base::types::{IncomingMessage, InvocationStatus, RelayOutcome, Res},
    interaction::{credentials::resolve_app_credentials, queue_event::QueueEvent, reply::compose_reply, transcript::archive_transcript, translation::translate_two_tier},
    runtime::Runtime,
};

/// Handle a raw queue payload.
///
/// This is the catch-all: any failure, whether a malformed payload or a failed
/// service call, is logged here and turned into the generic failure status.
#[instrument(skip_all)]
pub async fn handle_payload(runtime: &Runtime, payload: &str) -> InvocationStatus {
    match handle_payload_internal(runtime, payload).await {
        Ok(outcomes) => {
            info!("Processed {} message(s)", outcomes.len());
            InvocationStatus::success()
        }
        Err(err) => {
            error!("Error processing message: {:#}", err);
            InvocationStatus::failure()
        }
    }
}

async fn handle_payload_internal(runtime: &Runtime, payload: &str) -> Res<Vec<RelayOutcome>> {
    let event = QueueEvent::parse(payload)?;

    // Extract every record up front, so a malformed batch fails before anything is posted.

    let messages = event
        .records
        .iter()
        .enumerate()
        .map(|(index, record)| record.message().with_context(|| format!("Queue record {index} is malformed")))
        .collect::<Res<Vec<_>>>()?;

    let mut outcomes = Vec::with_capacity(messages.len());

    for (record, message) in event.records.iter().zip(&messages) {
        let span = info_span!("record", message_id = record.message_id.as_deref().unwrap_or_default());

        outcomes.push(relay_message(runtime, message).instrument(span).await?);
    }

    Ok(outcomes)
}

/// Relay one message: translate, ask, translate back, reply, and optionally archive.
#[instrument(skip_all, fields(thread_id = %message.thread_id))]
pub async fn relay_message(runtime: &Runtime, message: &IncomingMessage) -> Res<RelayOutcome> {
    let config = &runtime.config;
    let policy = config.translation_marker_policy;

    // Translate the question.

    let question = translate_two_tier(&runtime.llm, &runtime.translate, policy, &message.text, &config.question_language).await?;
    info!("Question translated ({:?})", question.tier);

    // Ask the Q&A backend.

    let answer = runtime.qna.ask(&question.text).await?;

    // Translate the answer back.

    let translated = translate_two_tier(&runtime.llm, &runtime.translate, policy, &answer.answer, &config.reply_language).await?;
    info!("Answer translated ({:?})", translated.tier);

    let reply = compose_reply(&translated.text, &answer.answer, &answer.references);

    // Reply in the thread, with a fresh token.

    let credentials = resolve_app_credentials(config, &runtime.db, &runtime.secrets).await?;
    let token = runtime.chat.tenant_access_token(&credentials).await?;
    runtime.chat.reply_in_thread(&token, &message.thread_id, &reply).await?;

    // Archive the transcript, if enabled.

    let archive_key = match &runtime.archive {
        Some(archive) => Some(archive_transcript(archive, &config.scratch_dir(), Utc::now(), &message.thread_id, &question.text, &reply).await?),
        None => None,
    };

    Ok(RelayOutcome {
        thread_id: message.thread_id.clone(),
        question: question.text,
        reply,
        archive_key,
    })
}
