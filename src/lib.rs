//! Library root for `relay-bot`.
//!
//! Relay-bot is a queue-driven bridge between a chat platform and a
//! conversational Q&A backend.  For every queued chat message it:
//! - Translates the question into English (language model first, dedicated translator as fallback)
//! - Asks the Q&A backend, which answers with references
//! - Translates the answer back into the reply language
//! - Posts the combined reply into the originating Feishu / Lark thread
//! - Optionally archives the transcript
//!
//! Every external dependency sits behind a `Generic*Client` trait, so each one
//! can be swapped out (or mocked) independently.

pub mod base;
pub mod ingress;
pub mod interaction;
pub mod runtime;
pub mod service;

use base::{
    config::Config,
    types::{InvocationStatus, Res, Void},
};
use tracing::info;

/// Public async entry for the binary crate's `serve` command.
///
/// Sets up necessary services and starts the invocation server:
/// - Creates the runtime context with every service client
/// - Serves `POST /invoke` until Ctrl-C
pub async fn start(config: Config) -> Void {
    info!("Starting relay-bot ...");

    // Initialize the runtime.
    let runtime = runtime::Runtime::new(config).await?;

    // Start the server.
    ingress::serve(runtime).await
}

/// Public async entry for the binary crate's `handle` command: process one payload.
pub async fn handle_once(config: Config, payload: &str) -> Res<InvocationStatus> {
    let runtime = runtime::Runtime::new(config).await?;

    Ok(interaction::relay::handle_payload(&runtime, payload).await)
}
