use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::application::ports::{HistoryStore, RepositoryError};
use crate::domain::{ConversationId, Message, StoredTurn};

/// Process-local history, for running without a database.
#[derive(Default)]
pub struct InMemoryHistoryStore {
    turns: RwLock<HashMap<ConversationId, Vec<StoredTurn>>>,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored turns for a conversation, oldest first.
    pub async fn turns(&self, conversation_id: ConversationId) -> Vec<StoredTurn> {
        self.turns
            .read()
            .await
            .get(&conversation_id)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistoryStore {
    async fn fetch_recent(
        &self,
        conversation_id: ConversationId,
        limit: usize,
    ) -> Result<Vec<Message>, RepositoryError> {
        let turns = self.turns.read().await;
        Ok(turns
            .get(&conversation_id)
            .map(|stored| {
                stored
                    .iter()
                    .rev()
                    .take(limit)
                    .map(|turn| turn.message.clone())
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn append_batch(
        &self,
        conversation_id: ConversationId,
        messages: &[Message],
    ) -> Result<(), RepositoryError> {
        if let Some(index) = messages.iter().position(|m| !m.is_persistable()) {
            return Err(RepositoryError::ConstraintViolation(format!(
                "message {} in batch has empty content",
                index
            )));
        }

        let mut turns = self.turns.write().await;
        turns.entry(conversation_id).or_default().extend(
            messages
                .iter()
                .cloned()
                .map(|message| StoredTurn::new(conversation_id, message)),
        );
        Ok(())
    }
}
