// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! JSON diagnostic output for machine consumption.
//!
//! Produced by the CLI's `--format json`: a single report object per run,
//! with 1-based line/column locations resolved against the source map.

use rill_ast::SourceMap;
use serde::Serialize;

use crate::{Diagnostic, Severity};

/// A complete JSON diagnostic report for one compilation or run.
#[derive(Debug, Serialize)]
pub struct DiagnosticReport {
    /// The root file of the run.
    pub file: String,
    /// Whether the run finished without error diagnostics.
    pub success: bool,
    pub diagnostics: Vec<JsonDiagnostic>,
    pub error_count: usize,
}

/// One diagnostic in JSON form, enriched with its source location.
#[derive(Debug, Serialize)]
pub struct JsonDiagnostic {
    /// Phase: "lex", "parse", "resolve", "typecheck", or "runtime".
    pub phase: String,
    /// Severity: "error" or "warning".
    pub severity: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceLocation>,
}

/// A source location with 1-based line and column.
#[derive(Debug, Serialize)]
pub struct SourceLocation {
    pub file: String,
    pub line: u32,
    pub column: u32,
    pub byte_offset: u32,
}

impl DiagnosticReport {
    pub fn new(file: &str, diagnostics: &[Diagnostic], sources: &SourceMap) -> Self {
        let error_count = diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count();
        Self {
            file: file.to_string(),
            success: error_count == 0,
            diagnostics: diagnostics
                .iter()
                .map(|d| JsonDiagnostic {
                    phase: d.phase.to_string(),
                    severity: match d.severity {
                        Severity::Error => "error".to_string(),
                        Severity::Warning => "warning".to_string(),
                    },
                    message: d.message.clone(),
                    location: sources.locate(d.span).map(|(file, line, column)| {
                        SourceLocation {
                            file: file.to_string(),
                            line,
                            column,
                            byte_offset: d.span.start,
                        }
                    }),
                })
                .collect(),
            error_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Phase;
    use rill_ast::{SourceMap, Span};

    #[test]
    fn report_shape() {
        let mut sources = SourceMap::new();
        let id = sources.add("main.rill", "let\n");
        let diags = vec![Diagnostic::error(
            Phase::Parse,
            Span::new(id, 0, 3),
            "expected a name, found end of file",
        )];

        let report = DiagnosticReport::new("main.rill", &diags, &sources);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error_count"], 1);
        assert_eq!(json["diagnostics"][0]["phase"], "parse");
        assert_eq!(json["diagnostics"][0]["location"]["line"], 1);
        assert_eq!(json["diagnostics"][0]["location"]["column"], 1);
    }
}
