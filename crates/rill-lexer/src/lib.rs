// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! The lexer for Rill source code.

mod lexer;

pub use lexer::{LexError, LexResult, Lexer};
