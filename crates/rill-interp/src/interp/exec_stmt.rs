// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Statement execution.

use rill_ast::stmt::{Stmt, StmtKind};

use crate::value::Value;

use super::{Interpreter, RuntimeDiagnostic, RuntimeError};

impl Interpreter {
    /// Execute a statement sequence; the result is the value of the last
    /// expression statement, or Unit when the sequence ends with anything
    /// else. This is what gives blocks their value.
    pub(super) fn exec_stmts(&mut self, stmts: &[Stmt]) -> Result<Value, RuntimeDiagnostic> {
        let mut last = Value::Unit;
        for stmt in stmts {
            last = self.exec_stmt(stmt)?;
        }
        Ok(last)
    }

    fn exec_stmt(&mut self, stmt: &Stmt) -> Result<Value, RuntimeDiagnostic> {
        self.tick(stmt.span)?;
        match &stmt.kind {
            StmtKind::Expr(expr) => self.eval_expr(expr),

            StmtKind::Let { name, init, .. } => {
                let value = self.eval_expr(init)?;
                self.env.define(name.clone(), value);
                Ok(Value::Unit)
            }

            StmtKind::Set {
                name,
                name_span,
                value,
            } => {
                let value = self.eval_expr(value)?;
                if !self.env.assign(name, value) {
                    return Err(RuntimeDiagnostic::new(
                        RuntimeError::UndefinedName(name.clone()),
                        *name_span,
                    ));
                }
                Ok(Value::Unit)
            }

            StmtKind::Return(expr) => {
                let value = match expr {
                    Some(e) => self.eval_expr(e)?,
                    None => Value::Unit,
                };
                Err(RuntimeDiagnostic::new(
                    RuntimeError::Return(value),
                    stmt.span,
                ))
            }

            StmtKind::Break => Err(RuntimeDiagnostic::new(RuntimeError::Break, stmt.span)),

            StmtKind::Continue => Err(RuntimeDiagnostic::new(RuntimeError::Continue, stmt.span)),

            StmtKind::While { cond, body } => {
                loop {
                    let cond_value = self.eval_expr(cond)?;
                    if !Self::is_truthy(&cond_value) {
                        break;
                    }
                    self.env.push_scope();
                    let result = self.exec_stmts(&body.stmts);
                    self.env.pop_scope();
                    match result {
                        Ok(_) => {}
                        Err(diag) if matches!(diag.error, RuntimeError::Break) => break,
                        Err(diag) if matches!(diag.error, RuntimeError::Continue) => continue,
                        Err(diag) => return Err(diag),
                    }
                }
                Ok(Value::Unit)
            }

            StmtKind::For {
                binding,
                start,
                end,
                inclusive,
                step,
                body,
                ..
            } => {
                // Bounds and step evaluate once, before the first iteration.
                let start_value = self.eval_expr(start)?;
                let from = Self::ensure_int(&start_value, "for range")
                    .map_err(|e| RuntimeDiagnostic::new(e, start.span))?;
                let end_value = self.eval_expr(end)?;
                let to = Self::ensure_int(&end_value, "for range")
                    .map_err(|e| RuntimeDiagnostic::new(e, end.span))?;

                let step_by = match step {
                    Some(expr) => {
                        let value = self.eval_expr(expr)?;
                        let step_by = Self::ensure_int(&value, "for step")
                            .map_err(|e| RuntimeDiagnostic::new(e, expr.span))?;
                        if step_by == 0 {
                            return Err(RuntimeDiagnostic::new(RuntimeError::ZeroStep, expr.span));
                        }
                        // The step must walk toward the end of the range.
                        if (from < to && step_by < 0) || (from > to && step_by > 0) {
                            return Err(RuntimeDiagnostic::new(
                                RuntimeError::StepDirection {
                                    increasing: from < to,
                                },
                                expr.span,
                            ));
                        }
                        step_by
                    }
                    None => {
                        if from <= to {
                            1
                        } else {
                            -1
                        }
                    }
                };

                let mut current = from;
                loop {
                    let in_range = if *inclusive {
                        if step_by > 0 {
                            current <= to
                        } else {
                            current >= to
                        }
                    } else if step_by > 0 {
                        current < to
                    } else {
                        current > to
                    };
                    if !in_range {
                        break;
                    }

                    self.env.push_scope();
                    self.env.define(binding.clone(), Value::Int(current));
                    let result = self.exec_stmts(&body.stmts);
                    self.env.pop_scope();
                    match result {
                        Ok(_) => {}
                        Err(diag) if matches!(diag.error, RuntimeError::Break) => break,
                        Err(diag) if matches!(diag.error, RuntimeError::Continue) => {}
                        Err(diag) => return Err(diag),
                    }

                    // Stop rather than wrap when the counter would overflow.
                    current = match current.checked_add(step_by) {
                        Some(next) => next,
                        None => break,
                    };
                }
                Ok(Value::Unit)
            }

            // Recovery sentinel: never executed, because any parse error
            // rejects the program before evaluation. Treated as Unit to keep
            // the evaluator total anyway.
            StmtKind::Err => Ok(Value::Unit),
        }
    }
}
