mod assistant_config;
mod conversation_service;

pub use assistant_config::{AssistantConfig, ConfigError};
pub use conversation_service::{ConversationService, FORMAT_DIRECTIVE, HISTORY_WINDOW};
