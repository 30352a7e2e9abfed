use std::error::Error;

/// Opens diagnostic spans around remote calls.
pub trait Diagnostics: Send + Sync {
    fn begin_span(&self, name: &'static str) -> Box<dyn DiagnosticSpan>;
}

/// A span held open for the duration of one operation. Dropping it ends the span.
pub trait DiagnosticSpan: Send {
    fn record_error(&mut self, error: &(dyn Error + 'static));
}
