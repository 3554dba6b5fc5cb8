// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Binary operators, truthiness, and value equality.
//!
//! The type checker already constrained operand types; everything here is
//! rechecked as a backstop because unannotated values can reach the
//! evaluator with their types unknown.

use rill_ast::expr::BinOp;

use crate::value::Value;

use super::{Interpreter, RuntimeError};

impl Interpreter {
    pub(super) fn eval_binop(&self, op: BinOp, l: Value, r: Value) -> Result<Value, RuntimeError> {
        match (op, &l, &r) {
            // A string on either side of `+` coerces the other side to its
            // display form.
            (BinOp::Add, Value::Str(_), _) | (BinOp::Add, _, Value::Str(_)) => {
                Ok(Value::str(format!("{}{}", l, r)))
            }
            (BinOp::Add, Value::Int(a), Value::Int(b)) => Ok(Value::Int(a.wrapping_add(*b))),
            (BinOp::Sub, Value::Int(a), Value::Int(b)) => Ok(Value::Int(a.wrapping_sub(*b))),
            (BinOp::Mul, Value::Int(a), Value::Int(b)) => Ok(Value::Int(a.wrapping_mul(*b))),
            (BinOp::Div, Value::Int(a), Value::Int(b)) => {
                if *b == 0 {
                    return Err(RuntimeError::DivisionByZero);
                }
                // Truncates toward zero.
                Ok(Value::Int(a.wrapping_div(*b)))
            }

            (BinOp::Eq, _, _) => {
                Self::ensure_comparable(&l, &r, "==")?;
                Ok(Value::Bool(Self::value_eq(&l, &r)))
            }
            (BinOp::Ne, _, _) => {
                Self::ensure_comparable(&l, &r, "!=")?;
                Ok(Value::Bool(!Self::value_eq(&l, &r)))
            }

            (BinOp::Lt, Value::Int(a), Value::Int(b)) => Ok(Value::Bool(a < b)),
            (BinOp::Le, Value::Int(a), Value::Int(b)) => Ok(Value::Bool(a <= b)),
            (BinOp::Gt, Value::Int(a), Value::Int(b)) => Ok(Value::Bool(a > b)),
            (BinOp::Ge, Value::Int(a), Value::Int(b)) => Ok(Value::Bool(a >= b)),

            (BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div, _, _) => {
                Err(Self::type_error(op.symbol(), "integers", &l, &r))
            }
            (BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge, _, _) => {
                Err(Self::type_error(op.symbol(), "integers", &l, &r))
            }
            // `&&`/`||` short-circuit in eval_expr and never reach here.
            (BinOp::And | BinOp::Or, _, _) => {
                Err(Self::type_error(op.symbol(), "booleans", &l, &r))
            }
        }
    }

    fn type_error(op: &str, expected: &str, l: &Value, r: &Value) -> RuntimeError {
        RuntimeError::TypeMismatch(format!(
            "operator `{}` expects {}, found {} and {}",
            op,
            expected,
            l.type_name(),
            r.type_name()
        ))
    }

    /// `==`/`!=` require operands of the same shape.
    fn ensure_comparable(l: &Value, r: &Value, op: &str) -> Result<(), RuntimeError> {
        if std::mem::discriminant(l) == std::mem::discriminant(r) {
            Ok(())
        } else {
            Err(RuntimeError::TypeMismatch(format!(
                "operator `{}` expects matching types, found {} and {}",
                op,
                l.type_name(),
                r.type_name()
            )))
        }
    }

    /// Deep structural equality.
    pub(super) fn value_eq(a: &Value, b: &Value) -> bool {
        match (a, b) {
            (Value::Unit, Value::Unit) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| Self::value_eq(x, y))
            }
            (Value::Record(a), Value::Record(b)) => {
                a.len() == b.len()
                    && a.iter().zip(b.iter()).all(|((ka, va), (kb, vb))| {
                        ka == kb && Self::value_eq(va, vb)
                    })
            }
            (
                Value::Enum {
                    enum_name: n1,
                    variant: v1,
                    fields: f1,
                },
                Value::Enum {
                    enum_name: n2,
                    variant: v2,
                    fields: f2,
                },
            ) => {
                n1 == n2
                    && v1 == v2
                    && f1.len() == f2.len()
                    && f1.iter().zip(f2.iter()).all(|(x, y)| Self::value_eq(x, y))
            }
            (
                Value::Function {
                    module: m1,
                    name: n1,
                },
                Value::Function {
                    module: m2,
                    name: n2,
                },
            ) => m1 == m2 && n1 == n2,
            _ => false,
        }
    }

    /// The closed truthiness table: `false`, `0`, and the empty string are
    /// falsy; everything else is truthy. Only consulted where the checker
    /// admitted an unannotated condition.
    pub(super) fn is_truthy(value: &Value) -> bool {
        match value {
            Value::Bool(b) => *b,
            Value::Int(n) => *n != 0,
            Value::Str(s) => !s.is_empty(),
            _ => true,
        }
    }

    pub(super) fn ensure_int(value: &Value, op: &str) -> Result<i64, RuntimeError> {
        match value {
            Value::Int(n) => Ok(*n),
            other => Err(RuntimeError::TypeMismatch(format!(
                "`{}` expects an integer, found {}",
                op,
                other.type_name()
            ))),
        }
    }

    pub(super) fn ensure_bool(value: &Value, op: &str) -> Result<bool, RuntimeError> {
        match value {
            Value::Bool(b) => Ok(*b),
            other => Err(RuntimeError::TypeMismatch(format!(
                "`{}` expects a boolean, found {}",
                op,
                other.type_name()
            ))),
        }
    }
}
