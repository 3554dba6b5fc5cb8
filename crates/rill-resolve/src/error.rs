// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Resolution error types.

use rill_ast::Span;
use thiserror::Error;

/// A name resolution or module loading error.
#[derive(Debug, Clone, Error)]
#[error("{kind}")]
pub struct ResolveError {
    pub kind: ResolveErrorKind,
    pub span: Span,
}

/// What went wrong during resolution.
#[derive(Debug, Clone, Error)]
pub enum ResolveErrorKind {
    #[error("undefined name `{0}`")]
    Undefined(String),

    #[error("`{0}` is already defined in this scope")]
    DuplicateBinding(String),

    #[error("`{0}` is already defined in this module")]
    DuplicateItem(String),

    #[error("`print` is a built-in function and cannot be redefined")]
    ReservedName,

    #[error("import `{0}` collides with an existing name")]
    AliasCollision(String),

    #[error("import cycle detected: {0}")]
    CyclicImport(String),

    #[error("module `{module}` does not export `{name}`")]
    MissingExport { module: String, name: String },

    #[error("module `{0}` could not be loaded: {1}")]
    LoadFailed(String, String),

    #[error("module declares name `{declared}` but was imported as `{imported}`")]
    ModuleNameMismatch { declared: String, imported: String },

    #[error("unknown enum variant `{0}` in pattern")]
    UnknownVariant(String),

    #[error("cannot export `{0}`: no function or enum with that name")]
    UnknownExport(String),

    #[error("{0}")]
    NotAValue(String),
}

impl ResolveError {
    pub fn undefined(name: impl Into<String>, span: Span) -> Self {
        Self {
            kind: ResolveErrorKind::Undefined(name.into()),
            span,
        }
    }

    pub fn duplicate_binding(name: impl Into<String>, span: Span) -> Self {
        Self {
            kind: ResolveErrorKind::DuplicateBinding(name.into()),
            span,
        }
    }

    pub fn duplicate_item(name: impl Into<String>, span: Span) -> Self {
        Self {
            kind: ResolveErrorKind::DuplicateItem(name.into()),
            span,
        }
    }

    pub fn reserved_name(span: Span) -> Self {
        Self {
            kind: ResolveErrorKind::ReservedName,
            span,
        }
    }

    pub fn alias_collision(name: impl Into<String>, span: Span) -> Self {
        Self {
            kind: ResolveErrorKind::AliasCollision(name.into()),
            span,
        }
    }

    pub fn cyclic_import(chain: &[String], span: Span) -> Self {
        Self {
            kind: ResolveErrorKind::CyclicImport(chain.join(" -> ")),
            span,
        }
    }

    pub fn missing_export(module: impl Into<String>, name: impl Into<String>, span: Span) -> Self {
        Self {
            kind: ResolveErrorKind::MissingExport {
                module: module.into(),
                name: name.into(),
            },
            span,
        }
    }

    pub fn load_failed(name: impl Into<String>, reason: impl Into<String>, span: Span) -> Self {
        Self {
            kind: ResolveErrorKind::LoadFailed(name.into(), reason.into()),
            span,
        }
    }

    pub fn module_name_mismatch(
        declared: impl Into<String>,
        imported: impl Into<String>,
        span: Span,
    ) -> Self {
        Self {
            kind: ResolveErrorKind::ModuleNameMismatch {
                declared: declared.into(),
                imported: imported.into(),
            },
            span,
        }
    }

    pub fn unknown_variant(name: impl Into<String>, span: Span) -> Self {
        Self {
            kind: ResolveErrorKind::UnknownVariant(name.into()),
            span,
        }
    }

    pub fn unknown_export(name: impl Into<String>, span: Span) -> Self {
        Self {
            kind: ResolveErrorKind::UnknownExport(name.into()),
            span,
        }
    }

    pub fn not_a_value(message: impl Into<String>, span: Span) -> Self {
        Self {
            kind: ResolveErrorKind::NotAValue(message.into()),
            span,
        }
    }
}
