// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Abstract Syntax Tree types for the Rill language.
//!
//! This crate defines the span, token, and AST node types shared between
//! the lexer, parser, resolver, type checker, and interpreter.

pub mod span;
pub mod source;
pub mod token;
pub mod expr;
pub mod stmt;
pub mod decl;

pub use source::{SourceFile, SourceMap};
pub use span::{LineMap, SourceId, Span};
