/// Process-wide assistant settings, validated once at startup.
#[derive(Debug, Clone)]
pub struct AssistantConfig {
    system_prompt: String,
    fallback_message: String,
    model: String,
    max_concurrent_answers: usize,
    max_tokens: Option<usize>,
}

impl AssistantConfig {
    pub const DEFAULT_MODEL: &'static str = "gpt-3.5-turbo";
    pub const DEFAULT_MAX_CONCURRENT_ANSWERS: usize = 16;

    pub fn new(
        system_prompt: impl Into<String>,
        fallback_message: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let system_prompt = required("system_prompt", system_prompt.into())?;
        let fallback_message = required("fallback_message", fallback_message.into())?;

        Ok(Self {
            system_prompt,
            fallback_message,
            model: Self::DEFAULT_MODEL.to_string(),
            max_concurrent_answers: Self::DEFAULT_MAX_CONCURRENT_ANSWERS,
            max_tokens: None,
        })
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Result<Self, ConfigError> {
        self.model = required("model", model.into())?;
        Ok(self)
    }

    pub fn with_max_concurrent_answers(mut self, limit: usize) -> Result<Self, ConfigError> {
        if limit == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_concurrent_answers",
                reason: "must be at least 1".to_string(),
            });
        }
        self.max_concurrent_answers = limit;
        Ok(self)
    }

    /// Caps `quick_answer` reply length. `None` leaves it to the provider.
    pub fn with_max_tokens(mut self, max_tokens: Option<usize>) -> Result<Self, ConfigError> {
        if max_tokens == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "max_tokens",
                reason: "must be at least 1".to_string(),
            });
        }
        self.max_tokens = max_tokens;
        Ok(self)
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn fallback_message(&self) -> &str {
        &self.fallback_message
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn max_concurrent_answers(&self) -> usize {
        self.max_concurrent_answers
    }

    pub fn max_tokens(&self) -> Option<usize> {
        self.max_tokens
    }
}

fn required(field: &'static str, value: String) -> Result<String, ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::MissingValue(field));
    }
    Ok(value)
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required configuration value: {0}")]
    MissingValue(&'static str),
    #[error("invalid configuration value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}
