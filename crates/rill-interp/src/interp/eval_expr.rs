// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Expression evaluation.

use std::collections::BTreeMap;
use std::rc::Rc;

use rill_ast::expr::{BinOp, Expr, ExprKind, UnaryOp};
use rill_ast::stmt::Block;
use rill_ast::Span;

use crate::value::Value;

use super::{Interpreter, RuntimeDiagnostic, RuntimeError};

impl Interpreter {
    pub(super) fn eval_expr(&mut self, expr: &Expr) -> Result<Value, RuntimeDiagnostic> {
        self.tick(expr.span)?;
        match &expr.kind {
            ExprKind::Int(n) => Ok(Value::Int(*n)),
            ExprKind::Str(s) => Ok(Value::str(s)),
            ExprKind::Bool(b) => Ok(Value::Bool(*b)),

            ExprKind::Ident(name) => self.eval_name(name, expr.span),

            ExprKind::Record(fields) => {
                let mut map = BTreeMap::new();
                for field in fields {
                    let value = self.eval_expr(&field.value)?;
                    if map.insert(field.name.clone(), value).is_some() {
                        return Err(RuntimeDiagnostic::new(
                            RuntimeError::DuplicateField(field.name.clone()),
                            field.name_span,
                        ));
                    }
                }
                Ok(Value::Record(Rc::new(map)))
            }

            ExprKind::List(elements) => {
                let mut values = Vec::with_capacity(elements.len());
                for e in elements {
                    values.push(self.eval_expr(e)?);
                }
                Ok(Value::List(Rc::new(values)))
            }

            ExprKind::Unary { op, operand } => {
                let value = self.eval_expr(operand)?;
                match op {
                    UnaryOp::Neg => {
                        let n = Self::ensure_int(&value, "-")
                            .map_err(|e| RuntimeDiagnostic::new(e, expr.span))?;
                        Ok(Value::Int(n.wrapping_neg()))
                    }
                    UnaryOp::Not => {
                        let b = Self::ensure_bool(&value, "!")
                            .map_err(|e| RuntimeDiagnostic::new(e, expr.span))?;
                        Ok(Value::Bool(!b))
                    }
                }
            }

            ExprKind::Binary { op, left, right } => {
                // `&&` and `||` short-circuit; everything else evaluates
                // both sides first.
                match op {
                    BinOp::And => {
                        let l = self.eval_expr(left)?;
                        let l = Self::ensure_bool(&l, "&&")
                            .map_err(|e| RuntimeDiagnostic::new(e, left.span))?;
                        if !l {
                            return Ok(Value::Bool(false));
                        }
                        let r = self.eval_expr(right)?;
                        let r = Self::ensure_bool(&r, "&&")
                            .map_err(|e| RuntimeDiagnostic::new(e, right.span))?;
                        Ok(Value::Bool(r))
                    }
                    BinOp::Or => {
                        let l = self.eval_expr(left)?;
                        let l = Self::ensure_bool(&l, "||")
                            .map_err(|e| RuntimeDiagnostic::new(e, left.span))?;
                        if l {
                            return Ok(Value::Bool(true));
                        }
                        let r = self.eval_expr(right)?;
                        let r = Self::ensure_bool(&r, "||")
                            .map_err(|e| RuntimeDiagnostic::new(e, right.span))?;
                        Ok(Value::Bool(r))
                    }
                    _ => {
                        let l = self.eval_expr(left)?;
                        let r = self.eval_expr(right)?;
                        self.eval_binop(*op, l, r)
                            .map_err(|e| RuntimeDiagnostic::new(e, expr.span))
                    }
                }
            }

            ExprKind::Field {
                object,
                field,
                field_span,
            } => {
                if let Some(target) = self.qualifier_of(object) {
                    return self.eval_qualified(target, field, *field_span);
                }
                let value = self.eval_expr(object)?;
                match value {
                    Value::Record(fields) => match fields.get(field) {
                        Some(v) => Ok(v.clone()),
                        None => Err(RuntimeDiagnostic::new(
                            RuntimeError::NoSuchField(field.clone()),
                            *field_span,
                        )),
                    },
                    other => Err(RuntimeDiagnostic::new(
                        RuntimeError::TypeMismatch(format!(
                            "field access expects a record, found {}",
                            other.type_name()
                        )),
                        expr.span,
                    )),
                }
            }

            ExprKind::Index { object, index } => {
                let value = self.eval_expr(object)?;
                let index_value = self.eval_expr(index)?;
                let i = Self::ensure_int(&index_value, "indexing")
                    .map_err(|e| RuntimeDiagnostic::new(e, index.span))?;
                match value {
                    Value::List(elements) => {
                        if i < 0 || i as usize >= elements.len() {
                            return Err(RuntimeDiagnostic::new(
                                RuntimeError::IndexOutOfBounds {
                                    index: i,
                                    len: elements.len(),
                                },
                                expr.span,
                            ));
                        }
                        Ok(elements[i as usize].clone())
                    }
                    other => Err(RuntimeDiagnostic::new(
                        RuntimeError::TypeMismatch(format!(
                            "indexing expects a list, found {}",
                            other.type_name()
                        )),
                        expr.span,
                    )),
                }
            }

            ExprKind::If {
                cond,
                then_block,
                else_block,
            } => {
                let cond_value = self.eval_expr(cond)?;
                let block = if Self::is_truthy(&cond_value) {
                    then_block
                } else {
                    else_block
                };
                self.eval_block(block)
            }

            ExprKind::Match { subject, arms } => {
                let value = self.eval_expr(subject)?;
                for arm in arms {
                    let Some(bindings) = self.match_pattern(&arm.pattern, &value, true) else {
                        continue;
                    };
                    self.env.push_scope();
                    for (name, bound) in bindings {
                        self.env.define(name, bound);
                    }
                    let result = self.exec_stmts(&arm.body.stmts);
                    self.env.pop_scope();
                    return result;
                }
                Err(RuntimeDiagnostic::new(
                    RuntimeError::NoMatchingArm,
                    expr.span,
                ))
            }

            ExprKind::Call { callee, args } => self.eval_call(callee, args, expr.span),

            ExprKind::Paren(inner) => self.eval_expr(inner),
        }
    }

    /// Evaluate a block in a fresh child scope.
    fn eval_block(&mut self, block: &Block) -> Result<Value, RuntimeDiagnostic> {
        self.env.push_scope();
        let result = self.exec_stmts(&block.stmts);
        self.env.pop_scope();
        result
    }

    /// A bare name: local binding first, then the module namespace.
    fn eval_name(&mut self, name: &str, span: Span) -> Result<Value, RuntimeDiagnostic> {
        if let Some(value) = self.env.get(name) {
            return Ok(value.clone());
        }
        let module = self.current_module;
        if let Some(decl) = self.modules[module].fns.get(name) {
            return Ok(Value::Function {
                module,
                name: Rc::from(decl.name.as_str()),
            });
        }
        self.eval_module_variant(module, name, span)
    }

    /// `alias.name`: a function or payload-free variant of another module.
    fn eval_qualified(
        &mut self,
        target: usize,
        name: &str,
        span: Span,
    ) -> Result<Value, RuntimeDiagnostic> {
        if let Some(decl) = self.modules[target].fns.get(name) {
            return Ok(Value::Function {
                module: target,
                name: Rc::from(decl.name.as_str()),
            });
        }
        self.eval_module_variant(target, name, span)
    }

    /// A bare reference to a variant: its value for payload-free variants,
    /// an error for variants that carry a payload.
    fn eval_module_variant(
        &mut self,
        module: usize,
        name: &str,
        span: Span,
    ) -> Result<Value, RuntimeDiagnostic> {
        let vref = self.modules[module].variants.get(name).copied();
        let Some(vref) = vref else {
            return Err(RuntimeDiagnostic::new(
                RuntimeError::UndefinedName(name.to_string()),
                span,
            ));
        };
        let decl = &self.modules[module].enums[vref.enum_idx].variants[vref.variant_idx];
        if !decl.payload.is_empty() {
            return Err(RuntimeDiagnostic::new(
                RuntimeError::VariantNeedsPayload(decl.name.clone()),
                span,
            ));
        }
        self.construct_variant(module, vref, Vec::new(), span)
    }

    fn eval_call(
        &mut self,
        callee: &Expr,
        args: &[Expr],
        span: Span,
    ) -> Result<Value, RuntimeDiagnostic> {
        // The builtin goes first so that `print` works even though it is
        // not a value; a local binding named `print` shadows it.
        if let ExprKind::Ident(name) = &callee.kind {
            if name == "print" && self.env.get(name).is_none() {
                let mut rendered = Vec::with_capacity(args.len());
                for arg in args {
                    rendered.push(self.eval_expr(arg)?.to_string());
                }
                self.write_line(&rendered.join(" "));
                return Ok(Value::Unit);
            }
        }

        // Direct calls to module functions and variant constructors.
        let direct = match &callee.kind {
            ExprKind::Ident(name) if self.env.get(name).is_none() => {
                Some((self.current_module, name.clone()))
            }
            ExprKind::Field { object, field, .. } => self
                .qualifier_of(object)
                .map(|target| (target, field.clone())),
            _ => None,
        };

        if let Some((module, name)) = direct {
            let decl = self.modules[module].fns.get(&name).cloned();
            if let Some(decl) = decl {
                let values = self.eval_args(args)?;
                return self.call_function(module, &decl, values, span);
            }
            let vref = self.modules[module].variants.get(&name).copied();
            if let Some(vref) = vref {
                let values = self.eval_args(args)?;
                return self.construct_variant(module, vref, values, span);
            }
            return Err(RuntimeDiagnostic::new(
                RuntimeError::UndefinedName(name),
                callee.span,
            ));
        }

        // Calls through values: `let f = double; f(21);`
        let callee_value = self.eval_expr(callee)?;
        match callee_value {
            Value::Function { module, name } => {
                let decl = self.modules[module]
                    .fns
                    .get(name.as_ref())
                    .cloned()
                    .expect("function values always name a registered function");
                let values = self.eval_args(args)?;
                self.call_function(module, &decl, values, span)
            }
            other => Err(RuntimeDiagnostic::new(
                RuntimeError::NotCallable(other.type_name()),
                callee.span,
            )),
        }
    }

    fn eval_args(&mut self, args: &[Expr]) -> Result<Vec<Value>, RuntimeDiagnostic> {
        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.eval_expr(arg)?);
        }
        Ok(values)
    }

    /// The import target of `expr` when it is an unshadowed alias reference.
    fn qualifier_of(&self, expr: &Expr) -> Option<usize> {
        let ExprKind::Ident(name) = &expr.kind else {
            return None;
        };
        if self.env.get(name).is_some() {
            return None;
        }
        self.modules[self.current_module].imports.get(name).copied()
    }
}
