use async_trait::async_trait;

use crate::domain::{ConversationId, Message};

use super::RepositoryError;

/// Append-only, per-conversation message history.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Up to `limit` most recent messages, newest first.
    async fn fetch_recent(
        &self,
        conversation_id: ConversationId,
        limit: usize,
    ) -> Result<Vec<Message>, RepositoryError>;

    /// Stores every message as a new turn, preserving batch order.
    async fn append_batch(
        &self,
        conversation_id: ConversationId,
        messages: &[Message],
    ) -> Result<(), RepositoryError>;
}
