// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Type checker error types.

use rill_ast::Span;

use crate::types::Type;

/// A type error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TypeError {
    #[error("type mismatch: expected {expected}, found {found}")]
    Mismatch {
        expected: Type,
        found: Type,
        span: Span,
    },

    #[error("operator `{op}` expects {expected}, found {found}")]
    BadOperand {
        op: &'static str,
        expected: &'static str,
        found: Type,
        span: Span,
    },

    #[error("operator `{op}` operands must match: found {left} and {right}")]
    OperandsDiffer {
        op: &'static str,
        left: Type,
        right: Type,
        span: Span,
    },

    #[error("`+` expects integers or a string operand, found {left} and {right}")]
    BadConcat { left: Type, right: Type, span: Span },

    #[error("cannot use a value of unknown type with {context}; add a type annotation")]
    UnknownOperand { context: String, span: Span },

    #[error("unknown type `{0}`")]
    UnknownType(String, Span),

    #[error("{found} is not callable")]
    NotCallable { found: Type, span: Span },

    #[error("`{name}` expects {expected} argument(s), found {found}")]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
        span: Span,
    },

    #[error("no field `{field}` on {ty}")]
    NoSuchField { field: String, ty: Type, span: Span },

    #[error("field access expects a record, found {found}")]
    NotARecord { found: Type, span: Span },

    #[error("indexing expects a list, found {found}")]
    NotAList { found: Type, span: Span },

    #[error("pattern does not fit subject type {subject}")]
    PatternMismatch { subject: Type, span: Span },

    #[error("variant `{variant}` expects {expected} payload value(s), found {found}")]
    PayloadArity {
        variant: String,
        expected: usize,
        found: usize,
        span: Span,
    },

    #[error("variant `{variant}` carries a payload; construct it with arguments")]
    VariantNeedsPayload { variant: String, span: Span },

    #[error("function `{name}` declares return type {expected} but has no return statement")]
    MissingReturn {
        name: String,
        expected: Type,
        span: Span,
    },
}

impl TypeError {
    pub fn span(&self) -> Span {
        match self {
            TypeError::Mismatch { span, .. }
            | TypeError::BadOperand { span, .. }
            | TypeError::OperandsDiffer { span, .. }
            | TypeError::BadConcat { span, .. }
            | TypeError::UnknownOperand { span, .. }
            | TypeError::UnknownType(_, span)
            | TypeError::NotCallable { span, .. }
            | TypeError::ArityMismatch { span, .. }
            | TypeError::NoSuchField { span, .. }
            | TypeError::NotARecord { span, .. }
            | TypeError::NotAList { span, .. }
            | TypeError::PatternMismatch { span, .. }
            | TypeError::PayloadArity { span, .. }
            | TypeError::VariantNeedsPayload { span, .. }
            | TypeError::MissingReturn { span, .. } => *span,
        }
    }
}
