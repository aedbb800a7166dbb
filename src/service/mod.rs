//! Service integrations for external APIs and clients.
//!
//! This module contains implementations for the services the relay-bot talks to:
//! - Chat services (Feishu / Lark)
//! - The translation model (OpenAI-compatible) and the dedicated translation service
//! - The conversational Q&A backend
//! - Secrets, the config table (SurrealDB), and transcript archives
//!
//! Each service module defines both generic traits and concrete implementations,
//! allowing for extensibility and easy testing.

pub mod archive;
pub mod chat;
pub mod db;
pub mod llm;
pub mod qna;
pub mod secrets;
pub mod translate;
