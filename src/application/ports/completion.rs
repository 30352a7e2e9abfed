use crate::domain::Message;

use super::LlmClientError;

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub max_tokens: Option<usize>,
}

impl CompletionRequest {
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            max_tokens: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionChoice {
    pub message: Message,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompletionResponse {
    pub choices: Vec<CompletionChoice>,
}

impl CompletionResponse {
    pub fn from_reply(content: impl Into<String>) -> Self {
        Self {
            choices: vec![CompletionChoice {
                message: Message::assistant(content),
            }],
        }
    }

    /// Content of choice 0. A missing choice or blank content is a malformed response.
    pub fn into_first_content(self) -> Result<String, LlmClientError> {
        let choice = self
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmClientError::InvalidResponse("empty choices".to_string()))?;

        if !choice.message.is_persistable() {
            return Err(LlmClientError::InvalidResponse(
                "empty message content".to_string(),
            ));
        }

        Ok(choice.message.into_content())
    }
}
