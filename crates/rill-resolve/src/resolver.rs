// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! The per-module name resolution walk.
//!
//! Checks scope hygiene (duplicate `let` in one scope, `set` to an unbound
//! name), that every identifier reaches a local binding, the module
//! namespace, or an exported name behind an import alias, and that match
//! patterns name real variants. Types are not consulted here; that is the
//! checker's job.

use std::collections::HashMap;

use rill_ast::decl::FnDecl;
use rill_ast::expr::{Expr, ExprKind, Pattern, PatternKind};
use rill_ast::stmt::{Block, Stmt, StmtKind};
use rill_ast::Span;

use crate::error::ResolveError;
use crate::program::ModuleUnit;

/// Resolve all names in `unit`. `modules` holds the already-loaded imports
/// that `unit.imports` indexes into.
pub(crate) fn resolve_names(unit: &ModuleUnit, modules: &[ModuleUnit]) -> Vec<ResolveError> {
    let mut resolver = NameResolver {
        unit,
        modules,
        scopes: Vec::new(),
        errors: Vec::new(),
    };
    for f in &unit.fns {
        resolver.resolve_fn(f);
    }
    resolver.errors
}

struct NameResolver<'a> {
    unit: &'a ModuleUnit,
    modules: &'a [ModuleUnit],
    scopes: Vec<HashMap<String, Span>>,
    errors: Vec<ResolveError>,
}

impl NameResolver<'_> {
    fn resolve_fn(&mut self, f: &FnDecl) {
        // Parameters and the body share the function's top scope.
        self.scopes.push(HashMap::new());
        for p in &f.params {
            self.define(&p.name, p.span);
        }
        for stmt in &f.body.stmts {
            self.resolve_stmt(stmt);
        }
        self.scopes.pop();
    }

    fn resolve_block(&mut self, block: &Block) {
        self.scopes.push(HashMap::new());
        for stmt in &block.stmts {
            self.resolve_stmt(stmt);
        }
        self.scopes.pop();
    }

    fn resolve_stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Let {
                name,
                name_span,
                init,
                ..
            } => {
                // The initializer sees the outer binding, not the new one.
                self.resolve_expr(init);
                self.define(name, *name_span);
            }
            StmtKind::Set {
                name,
                name_span,
                value,
            } => {
                self.resolve_expr(value);
                if !self.is_local(name) {
                    self.errors.push(ResolveError::undefined(name, *name_span));
                }
            }
            StmtKind::Return(expr) => {
                if let Some(e) = expr {
                    self.resolve_expr(e);
                }
            }
            StmtKind::While { cond, body } => {
                self.resolve_expr(cond);
                self.resolve_block(body);
            }
            StmtKind::For {
                binding,
                binding_span,
                start,
                end,
                step,
                body,
                ..
            } => {
                self.resolve_expr(start);
                self.resolve_expr(end);
                if let Some(s) = step {
                    self.resolve_expr(s);
                }
                // The loop variable and the body share one scope.
                self.scopes.push(HashMap::new());
                self.define(binding, *binding_span);
                for stmt in &body.stmts {
                    self.resolve_stmt(stmt);
                }
                self.scopes.pop();
            }
            StmtKind::Expr(e) => self.resolve_expr(e),
            StmtKind::Break | StmtKind::Continue | StmtKind::Err => {}
        }
    }

    fn resolve_expr(&mut self, expr: &Expr) {
        match &expr.kind {
            ExprKind::Int(_) | ExprKind::Str(_) | ExprKind::Bool(_) => {}

            ExprKind::Ident(name) => self.resolve_value_name(name, expr.span),

            ExprKind::Field {
                object,
                field,
                field_span,
            } => {
                if let Some(target) = self.qualifier_of(object) {
                    self.resolve_qualified(target, field, *field_span);
                } else {
                    self.resolve_expr(object);
                }
            }

            ExprKind::Index { object, index } => {
                self.resolve_expr(object);
                self.resolve_expr(index);
            }

            ExprKind::Call { callee, args } => {
                // `print` is callable but is not a value, so skip the
                // identifier walk for direct builtin calls.
                let builtin_print =
                    matches!(&callee.kind, ExprKind::Ident(n) if n == "print" && !self.is_local(n));
                if !builtin_print {
                    self.resolve_expr(callee);
                }
                for arg in args {
                    self.resolve_expr(arg);
                }
            }

            ExprKind::Record(fields) => {
                for field in fields {
                    self.resolve_expr(&field.value);
                }
            }

            ExprKind::List(elements) => {
                for e in elements {
                    self.resolve_expr(e);
                }
            }

            ExprKind::Unary { operand, .. } => self.resolve_expr(operand),

            ExprKind::Binary { left, right, .. } => {
                self.resolve_expr(left);
                self.resolve_expr(right);
            }

            ExprKind::If {
                cond,
                then_block,
                else_block,
            } => {
                self.resolve_expr(cond);
                self.resolve_block(then_block);
                self.resolve_block(else_block);
            }

            ExprKind::Match { subject, arms } => {
                self.resolve_expr(subject);
                for arm in arms {
                    let mut bindings = Vec::new();
                    self.resolve_pattern(&arm.pattern, true, &mut bindings);
                    // Payload bindings live in the arm's scope, alongside
                    // anything the arm body defines.
                    self.scopes.push(HashMap::new());
                    for (name, span) in bindings {
                        self.define(&name, span);
                    }
                    for stmt in &arm.body.stmts {
                        self.resolve_stmt(stmt);
                    }
                    self.scopes.pop();
                }
            }

            ExprKind::Paren(inner) => self.resolve_expr(inner),
        }
    }

    /// A bare identifier in value position.
    fn resolve_value_name(&mut self, name: &str, span: Span) {
        if self.is_local(name) {
            return;
        }
        if self.unit.fn_index.contains_key(name) || self.unit.variants.contains_key(name) {
            return;
        }
        if self.unit.enum_index.contains_key(name) {
            self.errors.push(ResolveError::not_a_value(
                format!("enum `{}` is a type, not a value", name),
                span,
            ));
            return;
        }
        if self.unit.imports.contains_key(name) {
            self.errors.push(ResolveError::not_a_value(
                format!("module `{}` is not a value", name),
                span,
            ));
            return;
        }
        if name == "print" {
            self.errors.push(ResolveError::not_a_value(
                "`print` is a built-in function; call it",
                span,
            ));
            return;
        }
        self.errors.push(ResolveError::undefined(name, span));
    }

    /// `alias.name` where `alias` is an unshadowed import binding.
    fn resolve_qualified(&mut self, target: usize, name: &str, span: Span) {
        let module = &self.modules[target];
        if module.fn_index.contains_key(name) {
            if !module.exports_name(name) {
                self.errors
                    .push(ResolveError::missing_export(&module.name, name, span));
            }
            return;
        }
        if module.enum_index.contains_key(name) {
            self.errors.push(ResolveError::not_a_value(
                format!("enum `{}.{}` is a type, not a value", module.name, name),
                span,
            ));
            return;
        }
        if let Some(vref) = module.variant(name) {
            let owner = &module.enums[vref.enum_idx].name;
            if !module.exports_name(owner) {
                self.errors
                    .push(ResolveError::missing_export(&module.name, owner, span));
            }
            return;
        }
        self.errors
            .push(ResolveError::missing_export(&module.name, name, span));
    }

    /// Patterns. `top` is true for the arm's outermost pattern, where a bare
    /// name must be a variant; in payload position a bare name binds unless
    /// it names a known variant.
    fn resolve_pattern(
        &mut self,
        pattern: &Pattern,
        top: bool,
        bindings: &mut Vec<(String, Span)>,
    ) {
        match &pattern.kind {
            PatternKind::Wildcard
            | PatternKind::Int(_)
            | PatternKind::Str(_)
            | PatternKind::Bool(_) => {}

            PatternKind::Name {
                qualifier: Some(alias),
                name,
                args,
            } => {
                match self.import_target(alias) {
                    Some(target) => {
                        let module = &self.modules[target];
                        match module.variant(name) {
                            Some(vref) => {
                                let owner = &module.enums[vref.enum_idx].name;
                                if !module.exports_name(owner) {
                                    self.errors.push(ResolveError::missing_export(
                                        &module.name,
                                        owner,
                                        pattern.span,
                                    ));
                                }
                            }
                            None => {
                                self.errors.push(ResolveError::unknown_variant(
                                    format!("{}.{}", alias, name),
                                    pattern.span,
                                ));
                            }
                        }
                    }
                    None => {
                        self.errors
                            .push(ResolveError::undefined(alias, pattern.span));
                    }
                }
                if let Some(args) = args {
                    for arg in args {
                        self.resolve_pattern(arg, false, bindings);
                    }
                }
            }

            PatternKind::Name {
                qualifier: None,
                name,
                args,
            } => {
                let is_variant = self.unit.variants.contains_key(name);
                if args.is_some() || top {
                    if !is_variant {
                        self.errors
                            .push(ResolveError::unknown_variant(name, pattern.span));
                    }
                } else if !is_variant {
                    // Payload binding.
                    if bindings.iter().any(|(n, _)| n == name) {
                        self.errors
                            .push(ResolveError::duplicate_binding(name, pattern.span));
                    } else {
                        bindings.push((name.clone(), pattern.span));
                    }
                }
                if let Some(args) = args {
                    for arg in args {
                        self.resolve_pattern(arg, false, bindings);
                    }
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Scope helpers
    // ------------------------------------------------------------------

    fn define(&mut self, name: &str, span: Span) {
        let scope = self.scopes.last_mut().expect("scope stack is never empty");
        if scope.contains_key(name) {
            self.errors.push(ResolveError::duplicate_binding(name, span));
        } else {
            scope.insert(name.to_string(), span);
        }
    }

    fn is_local(&self, name: &str) -> bool {
        self.scopes.iter().rev().any(|s| s.contains_key(name))
    }

    /// The import target of `expr` when it is an unshadowed alias reference.
    fn qualifier_of(&self, expr: &Expr) -> Option<usize> {
        let ExprKind::Ident(name) = &expr.kind else {
            return None;
        };
        if self.is_local(name) {
            return None;
        }
        self.unit.imports.get(name).copied()
    }

    fn import_target(&self, alias: &str) -> Option<usize> {
        if self.is_local(alias) {
            return None;
        }
        self.unit.imports.get(alias).copied()
    }
}
