//! Queue message handling for relay-bot.
//!
//! This module provides the relay flow and its parts:
//! - Parsing queue envelopes into chat messages
//! - Two-tier translation (language model, then the dedicated translator)
//! - Composing the reply and resolving the chat app credentials
//! - Archiving transcripts
//! - Coordinating all of the above in one invocation

pub mod credentials;
pub mod queue_event;
pub mod relay;
pub mod reply;
pub mod transcript;
pub mod translation;
