// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! The parser for Rill source code.

mod parser;

pub use parser::{ParseError, ParseResult, Parser};

#[cfg(test)]
mod tests;
