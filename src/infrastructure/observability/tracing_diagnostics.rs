use std::error::Error;
use std::time::Instant;

use tracing::Span;

use crate::application::ports::{DiagnosticSpan, Diagnostics};

/// [`Diagnostics`] backed by `tracing` spans.
#[derive(Debug, Clone, Default)]
pub struct TracingDiagnostics;

impl TracingDiagnostics {
    pub fn new() -> Self {
        Self
    }
}

impl Diagnostics for TracingDiagnostics {
    fn begin_span(&self, name: &'static str) -> Box<dyn DiagnosticSpan> {
        let span = tracing::info_span!(
            "diagnostic_span",
            span_name = name,
            error = tracing::field::Empty,
            elapsed_ms = tracing::field::Empty,
        );
        tracing::debug!(parent: &span, "Span started");

        Box::new(TracingSpan {
            span,
            started_at: Instant::now(),
            errors: 0,
        })
    }
}

struct TracingSpan {
    span: Span,
    started_at: Instant,
    errors: usize,
}

impl DiagnosticSpan for TracingSpan {
    fn record_error(&mut self, error: &(dyn Error + 'static)) {
        self.errors += 1;
        self.span.record("error", tracing::field::display(error));
        tracing::error!(parent: &self.span, error = %error, "Error recorded on span");
    }
}

impl Drop for TracingSpan {
    fn drop(&mut self) {
        let elapsed_ms = self.started_at.elapsed().as_millis() as u64;
        self.span.record("elapsed_ms", elapsed_ms);
        tracing::debug!(parent: &self.span, errors = self.errors, elapsed_ms, "Span ended");
    }
}
