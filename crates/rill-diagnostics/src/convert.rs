// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Conversions from compiler error types to `Diagnostic`.
//!
//! The CLI (and any other host) renders diagnostics only through these, so
//! each phase crate stays free of presentation concerns.

use crate::{Diagnostic, Phase, ToDiagnostic};

impl ToDiagnostic for rill_lexer::LexError {
    fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error(Phase::Lex, self.span, &self.message)
    }
}

impl ToDiagnostic for rill_parser::ParseError {
    fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error(Phase::Parse, self.span, &self.message)
    }
}

impl ToDiagnostic for rill_resolve::ResolveError {
    fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error(Phase::Resolve, self.span, self.to_string())
    }
}

impl ToDiagnostic for rill_resolve::FrontendError {
    fn to_diagnostic(&self) -> Diagnostic {
        match self {
            rill_resolve::FrontendError::Lex(e) => e.to_diagnostic(),
            rill_resolve::FrontendError::Parse(e) => e.to_diagnostic(),
            rill_resolve::FrontendError::Resolve(e) => e.to_diagnostic(),
        }
    }
}

impl ToDiagnostic for rill_types::TypeError {
    fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error(Phase::Typecheck, self.span(), self.to_string())
    }
}

impl ToDiagnostic for rill_interp::RuntimeDiagnostic {
    fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error(Phase::Runtime, self.span, self.error.to_string())
    }
}
