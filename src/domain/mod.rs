mod conversation_id;
mod message;
mod message_role;
mod stored_turn;
mod turn_id;

pub use conversation_id::ConversationId;
pub use message::Message;
pub use message_role::MessageRole;
pub use stored_turn::StoredTurn;
pub use turn_id::TurnId;
