mod init_tracing;
mod prompt_sanitizer;
mod tracing_config;
mod tracing_diagnostics;

pub use init_tracing::init_tracing;
pub use prompt_sanitizer::sanitize_prompt;
pub use tracing_config::TracingConfig;
pub use tracing_diagnostics::TracingDiagnostics;
