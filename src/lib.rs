//! Conversational assistant facade.
//!
//! [`application::services::ConversationService`] loads recent history for a
//! conversation, asks a chat-completion provider for a reply and records the
//! new turn. Provider and storage faults degrade to a configured fallback
//! message instead of surfacing as errors.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
