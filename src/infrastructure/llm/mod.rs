mod openai_chat_client;

pub use openai_chat_client::{ChatAuth, OpenAiChatClient, create_llm_client};
