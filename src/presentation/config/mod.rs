mod environment;
mod settings;

pub use environment::Environment;
pub use settings::{AssistantSettings, DatabaseSettings, LlmSettings, LoggingSettings, Settings};
