// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Tree-walk interpreter for the Rill language.
//!
//! Executes the resolved AST directly. Program output goes to stdout, or to
//! a capture buffer when tests want to compare it.

mod env;
mod interp;
mod value;

pub use interp::{Frame, Interpreter, RuntimeDiagnostic, RuntimeError};
pub use value::Value;
