mod completion;
mod diagnostics;
mod history_store;
mod llm_client;
mod repository_error;

pub use completion::{CompletionChoice, CompletionRequest, CompletionResponse};
pub use diagnostics::{DiagnosticSpan, Diagnostics};
pub use history_store::HistoryStore;
pub use llm_client::{LlmClient, LlmClientError};
pub use repository_error::RepositoryError;
