use ::config::builder::DefaultState;
use ::config::{
    Config, ConfigBuilder, ConfigError as SourceError, Environment as EnvironmentSource, File,
};
use serde::Deserialize;

use super::Environment;
use crate::application::services::{AssistantConfig, ConfigError};
use crate::infrastructure::persistence::PgHistoryStore;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub assistant: AssistantSettings,
    #[serde(default)]
    pub llm: LlmSettings,
    #[serde(default)]
    pub database: DatabaseSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssistantSettings {
    pub system_prompt: String,
    pub fallback_message: String,
    #[serde(default = "default_max_concurrent_answers")]
    pub max_concurrent_answers: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmSettings {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub api_key: String,
    pub base_url: Option<String>,
    pub azure_endpoint: Option<String>,
    pub api_version: Option<String>,
    #[serde(default = "default_chat_model")]
    pub chat_model: String,
    pub max_tokens: Option<usize>,
    pub request_timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// History is kept in memory when unset.
    pub url: Option<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_table_name")]
    pub table_name: String,
    #[serde(default = "default_connect_retries")]
    pub connect_retries: u32,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    #[serde(default = "default_acquire_timeout_seconds")]
    pub acquire_timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub enable_json: bool,
}

impl Settings {
    /// Layers `appsettings.{environment}` (optional) under `APP_`-prefixed
    /// environment variables, e.g. `APP_ASSISTANT__SYSTEM_PROMPT`.
    pub fn load(environment: Environment) -> Result<Self, SourceError> {
        let builder = Config::builder()
            .add_source(
                File::with_name(&format!(
                    "appsettings.{}",
                    environment.as_str().to_lowercase()
                ))
                .required(false),
            )
            .add_source(Self::environment_source());

        Self::from_builder(builder)
    }

    /// `APP_` prefix, `__` between nested keys: `APP_LLM__CHAT_MODEL`.
    pub fn environment_source() -> EnvironmentSource {
        EnvironmentSource::with_prefix("APP")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
    }

    pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, SourceError> {
        builder.build()?.try_deserialize()
    }

    pub fn assistant_config(&self) -> Result<AssistantConfig, ConfigError> {
        AssistantConfig::new(
            self.assistant.system_prompt.clone(),
            self.assistant.fallback_message.clone(),
        )?
        .with_model(self.llm.chat_model.clone())?
        .with_max_tokens(self.llm.max_tokens)?
        .with_max_concurrent_answers(self.assistant.max_concurrent_answers)
    }
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            api_key: String::new(),
            base_url: None,
            azure_endpoint: None,
            api_version: None,
            chat_model: default_chat_model(),
            max_tokens: None,
            request_timeout_seconds: None,
        }
    }
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: default_max_connections(),
            table_name: default_table_name(),
            connect_retries: default_connect_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            acquire_timeout_seconds: default_acquire_timeout_seconds(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            enable_json: false,
        }
    }
}

fn default_max_concurrent_answers() -> usize {
    AssistantConfig::DEFAULT_MAX_CONCURRENT_ANSWERS
}

fn default_provider() -> String {
    "openai".to_string()
}

fn default_chat_model() -> String {
    AssistantConfig::DEFAULT_MODEL.to_string()
}

fn default_max_connections() -> u32 {
    5
}

fn default_table_name() -> String {
    PgHistoryStore::DEFAULT_TABLE.to_string()
}

fn default_connect_retries() -> u32 {
    5
}

fn default_retry_delay_ms() -> u64 {
    500
}

fn default_acquire_timeout_seconds() -> u64 {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}
