// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Rill compiler diagnostics.
//!
//! Every phase's error type converts to one flat `Diagnostic` record via the
//! `ToDiagnostic` trait; the sink accumulates them in recording order and
//! decides, by mode, whether callers see only the first or all of them.

pub mod convert;
pub mod formatter;
pub mod json;

use rill_ast::Span;
use serde::Serialize;

/// The pipeline phase a diagnostic came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Lex,
    Parse,
    Resolve,
    Typecheck,
    Runtime,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Phase::Lex => "lex",
            Phase::Parse => "parse",
            Phase::Resolve => "resolve",
            Phase::Typecheck => "typecheck",
            Phase::Runtime => "runtime",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// A single diagnostic record.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub phase: Phase,
    pub severity: Severity,
    pub span: Span,
    pub message: String,
}

impl Diagnostic {
    pub fn error(phase: Phase, span: Span, message: impl Into<String>) -> Self {
        Self {
            phase,
            severity: Severity::Error,
            span,
            message: message.into(),
        }
    }
}

/// Convert a phase error into a diagnostic record.
pub trait ToDiagnostic {
    fn to_diagnostic(&self) -> Diagnostic;
}

/// Which diagnostics the sink surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SinkMode {
    /// Retain everything but surface only the first error.
    #[default]
    FirstOnly,
    /// Surface every recorded diagnostic (`--all-errors`).
    All,
}

/// Append-only store of diagnostics for one compilation.
#[derive(Debug, Default)]
pub struct DiagnosticSink {
    mode: SinkMode,
    records: Vec<Diagnostic>,
}

impl DiagnosticSink {
    pub fn new(mode: SinkMode) -> Self {
        Self {
            mode,
            records: Vec::new(),
        }
    }

    pub fn report(&mut self, diagnostic: Diagnostic) {
        self.records.push(diagnostic);
    }

    pub fn report_all<E: ToDiagnostic>(&mut self, errors: impl IntoIterator<Item = E>) {
        for e in errors {
            self.report(e.to_diagnostic());
        }
    }

    pub fn has_errors(&self) -> bool {
        self.records.iter().any(|d| d.severity == Severity::Error)
    }

    /// Everything ever recorded, in order.
    pub fn records(&self) -> &[Diagnostic] {
        &self.records
    }

    /// The diagnostics to show, per the sink mode: all of them, or just the
    /// first error.
    pub fn surfaced(&self) -> &[Diagnostic] {
        match self.mode {
            SinkMode::All => &self.records,
            SinkMode::FirstOnly => {
                match self
                    .records
                    .iter()
                    .position(|d| d.severity == Severity::Error)
                {
                    Some(first) => &self.records[first..first + 1],
                    None => &self.records,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(message: &str) -> Diagnostic {
        Diagnostic::error(Phase::Parse, Span::dummy(), message)
    }

    #[test]
    fn first_only_surfaces_one_error() {
        let mut sink = DiagnosticSink::new(SinkMode::FirstOnly);
        sink.report(record("first"));
        sink.report(record("second"));
        assert_eq!(sink.records().len(), 2);
        let surfaced = sink.surfaced();
        assert_eq!(surfaced.len(), 1);
        assert_eq!(surfaced[0].message, "first");
    }

    #[test]
    fn all_mode_surfaces_everything_in_order() {
        let mut sink = DiagnosticSink::new(SinkMode::All);
        sink.report(record("first"));
        sink.report(record("second"));
        let messages: Vec<_> = sink.surfaced().iter().map(|d| d.message.as_str()).collect();
        assert_eq!(messages, vec!["first", "second"]);
    }

    #[test]
    fn empty_sink_has_no_errors() {
        let sink = DiagnosticSink::new(SinkMode::FirstOnly);
        assert!(!sink.has_errors());
        assert!(sink.surfaced().is_empty());
    }
}
