// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Module loading and name resolution for Rill.
//!
//! Builds a graph of module namespaces from a root source plus a loader
//! callback, detects import cycles, applies export visibility, and checks
//! that every name in every module resolves.

mod error;
mod loader;
mod program;
mod resolver;

pub use error::{ResolveError, ResolveErrorKind};
pub use loader::{load_program, MemoryLoader, ModuleLoader};
pub use program::{ModuleUnit, ResolvedProgram, VariantRef};

use rill_ast::Span;

/// Any error from the frontend up to and including name resolution.
#[derive(Debug)]
pub enum FrontendError {
    Lex(rill_lexer::LexError),
    Parse(rill_parser::ParseError),
    Resolve(ResolveError),
}

impl FrontendError {
    pub fn span(&self) -> Span {
        match self {
            FrontendError::Lex(e) => e.span,
            FrontendError::Parse(e) => e.span,
            FrontendError::Resolve(e) => e.span,
        }
    }
}

impl From<ResolveError> for FrontendError {
    fn from(e: ResolveError) -> Self {
        FrontendError::Resolve(e)
    }
}

impl std::fmt::Display for FrontendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FrontendError::Lex(e) => write!(f, "{}", e),
            FrontendError::Parse(e) => write!(f, "{}", e),
            FrontendError::Resolve(e) => write!(f, "{}", e),
        }
    }
}
