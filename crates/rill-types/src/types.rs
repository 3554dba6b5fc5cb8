// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Type definitions for the type system.

use std::collections::BTreeMap;
use std::fmt;

/// A type in Rill.
///
/// Types compare structurally; enums compare by their qualified
/// `module.Enum` name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    /// Unit type
    Unit,
    /// Boolean
    Bool,
    /// Integer
    Int,
    /// String
    Str,
    /// A user-defined enum, by qualified name
    Enum(String),
    /// List type
    List(Box<Type>),
    /// Record type; the map keeps fields in name order so display and
    /// comparison ignore construction order
    Record(BTreeMap<String, Type>),
    /// Function type
    Fn { params: Vec<Type>, ret: Box<Type> },
    /// The type of an expression with no annotation to pin it down.
    /// Never inferred transitively.
    Unknown,
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Unit => write!(f, "Unit"),
            Type::Bool => write!(f, "Bool"),
            Type::Int => write!(f, "Int"),
            Type::Str => write!(f, "String"),
            Type::Enum(name) => write!(f, "{}", name),
            Type::List(elem) => write!(f, "[{}]", elem),
            Type::Record(fields) => {
                write!(f, "{{")?;
                for (i, (name, ty)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", name, ty)?;
                }
                write!(f, "}}")
            }
            Type::Fn { params, ret } => {
                write!(f, "fn(")?;
                for (i, p) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", p)?;
                }
                write!(f, ") -> {}", ret)
            }
            Type::Unknown => write!(f, "_"),
        }
    }
}
