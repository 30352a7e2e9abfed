use chrono::{DateTime, Utc};

use super::{ConversationId, Message, TurnId};

/// A message as written to the history store.
#[derive(Debug, Clone)]
pub struct StoredTurn {
    pub id: TurnId,
    pub conversation_id: ConversationId,
    pub message: Message,
    pub created_at: DateTime<Utc>,
}

impl StoredTurn {
    pub fn new(conversation_id: ConversationId, message: Message) -> Self {
        Self {
            id: TurnId::new(),
            conversation_id,
            message,
            created_at: Utc::now(),
        }
    }
}
