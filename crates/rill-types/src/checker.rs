// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! The type checker.
//!
//! A syntactic, annotation-driven check over the resolved program. No
//! unification: `let` acquires its initializer's type, parameters default to
//! `Unknown` when unannotated, and `Unknown` is never propagated
//! transitively. The checker accumulates every error it finds; it skips only
//! subtrees that parsing already replaced with recovery sentinels.

use std::collections::{BTreeMap, HashMap};

use rill_ast::decl::FnDecl;
use rill_ast::expr::{BinOp, Expr, ExprKind, MatchArm, Pattern, PatternKind, UnaryOp};
use rill_ast::stmt::{Stmt, StmtKind, TypeRef, TypeRefKind};
use rill_ast::Span;
use rill_resolve::{ModuleUnit, ResolvedProgram, VariantRef};

use crate::errors::TypeError;
use crate::types::Type;

/// Checker configuration.
///
/// With `strict_types` (the default), an operand whose type is `Unknown`
/// is itself an error wherever a specific type is required; without it,
/// `Unknown` matches anything.
#[derive(Debug, Clone)]
pub struct CheckOptions {
    pub strict_types: bool,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self { strict_types: true }
    }
}

/// Type-check every module of the program, imports before importers.
pub fn typecheck(program: &ResolvedProgram, options: &CheckOptions) -> Result<(), Vec<TypeError>> {
    let mut checker = TypeChecker {
        program,
        sigs: Vec::new(),
        errors: Vec::new(),
        strict: options.strict_types,
        module: 0,
        scopes: Vec::new(),
        current_return: Type::Unit,
        saw_return: false,
    };

    // Signatures first so calls resolve in any order, including recursion.
    for m in 0..program.modules.len() {
        checker.module = m;
        let sigs = checker.collect_signatures(&program.modules[m]);
        checker.sigs.push(sigs);
    }

    for m in 0..program.modules.len() {
        checker.module = m;
        for f in &program.modules[m].fns {
            checker.check_fn(f);
        }
    }

    if checker.errors.is_empty() {
        Ok(())
    } else {
        Err(checker.errors)
    }
}

/// A function signature derived from its annotations.
#[derive(Debug, Clone)]
struct FnSig {
    params: Vec<Type>,
    ret: Type,
}

impl FnSig {
    fn as_type(&self) -> Type {
        Type::Fn {
            params: self.params.clone(),
            ret: Box::new(self.ret.clone()),
        }
    }
}

struct TypeChecker<'a> {
    program: &'a ResolvedProgram,
    sigs: Vec<HashMap<String, FnSig>>,
    errors: Vec<TypeError>,
    strict: bool,

    // Per-function state.
    module: usize,
    scopes: Vec<HashMap<String, Type>>,
    current_return: Type,
    saw_return: bool,
}

impl TypeChecker<'_> {
    fn unit(&self) -> &ModuleUnit {
        &self.program.modules[self.module]
    }

    // ------------------------------------------------------------------
    // Signatures and annotations
    // ------------------------------------------------------------------

    fn collect_signatures(&mut self, unit: &ModuleUnit) -> HashMap<String, FnSig> {
        let mut sigs = HashMap::new();
        for f in &unit.fns {
            let params = f
                .params
                .iter()
                .map(|p| match &p.ty {
                    Some(tr) => self.resolve_type_ref(tr),
                    None => Type::Unknown,
                })
                .collect();
            let ret = match &f.ret {
                Some(tr) => self.resolve_type_ref(tr),
                None => Type::Unit,
            };
            sigs.insert(f.name.clone(), FnSig { params, ret });
        }
        sigs
    }

    /// Resolve a written annotation to a type, in the current module.
    fn resolve_type_ref(&mut self, tr: &TypeRef) -> Type {
        match &tr.kind {
            TypeRefKind::List(inner) => Type::List(Box::new(self.resolve_type_ref(inner))),
            TypeRefKind::Name {
                qualifier: None,
                name,
            } => match name.as_str() {
                "Int" => Type::Int,
                "Bool" => Type::Bool,
                "String" => Type::Str,
                "Unit" => Type::Unit,
                _ => {
                    let local_enum = self.unit().enum_index.get(name).copied();
                    match local_enum {
                        Some(idx) => Type::Enum(self.unit().qualified_enum_name(idx)),
                        None => {
                            self.errors
                                .push(TypeError::UnknownType(name.clone(), tr.span));
                            Type::Unknown
                        }
                    }
                }
            },
            TypeRefKind::Name {
                qualifier: Some(alias),
                name,
            } => {
                let target = self.unit().imports.get(alias).copied();
                let resolved = target.and_then(|t| {
                    let module = &self.program.modules[t];
                    module.enum_index.get(name).and_then(|&idx| {
                        module
                            .exports_name(name)
                            .then(|| Type::Enum(module.qualified_enum_name(idx)))
                    })
                });
                match resolved {
                    Some(ty) => ty,
                    None => {
                        self.errors.push(TypeError::UnknownType(
                            format!("{}.{}", alias, name),
                            tr.span,
                        ));
                        Type::Unknown
                    }
                }
            }
        }
    }

    /// Resolve a variant's payload annotations in its defining module.
    fn payload_types(&mut self, module: usize, vref: VariantRef) -> Vec<Type> {
        let payload = self.program.modules[module].variant_decl(vref).payload.clone();
        let saved = self.module;
        self.module = module;
        let types = payload.iter().map(|tr| self.resolve_type_ref(tr)).collect();
        self.module = saved;
        types
    }

    // ------------------------------------------------------------------
    // Functions and statements
    // ------------------------------------------------------------------

    fn check_fn(&mut self, f: &FnDecl) {
        let sig = self.sigs[self.module][&f.name].clone();

        self.scopes.clear();
        let mut top = HashMap::new();
        for (p, ty) in f.params.iter().zip(sig.params.iter()) {
            top.insert(p.name.clone(), ty.clone());
        }
        self.scopes.push(top);
        self.current_return = sig.ret.clone();
        self.saw_return = false;

        for stmt in &f.body.stmts {
            self.check_stmt(stmt);
        }
        self.scopes.pop();

        if !self.saw_return && !matches!(sig.ret, Type::Unit | Type::Unknown) {
            self.errors.push(TypeError::MissingReturn {
                name: f.name.clone(),
                expected: sig.ret,
                span: f.name_span,
            });
        }
    }

    fn check_stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Let {
                name, ty, init, ..
            } => {
                let init_ty = self.check_expr(init);
                let bound = match ty {
                    Some(tr) => {
                        let declared = self.resolve_type_ref(tr);
                        self.expect_type(&declared, &init_ty, init.span, "this `let` annotation");
                        if matches!(declared, Type::Unknown) {
                            init_ty
                        } else {
                            declared
                        }
                    }
                    None => init_ty,
                };
                self.define(name, bound);
            }

            StmtKind::Set { name, value, .. } => {
                let value_ty = self.check_expr(value);
                if let Some(bound) = self.lookup(name) {
                    self.expect_type(&bound, &value_ty, value.span, "this assignment");
                }
            }

            StmtKind::Return(expr) => {
                self.saw_return = true;
                let found = match expr {
                    Some(e) => self.check_expr(e),
                    None => Type::Unit,
                };
                let expected = self.current_return.clone();
                self.expect_type(&expected, &found, stmt.span, "this return");
            }

            StmtKind::While { cond, body } => {
                let cond_ty = self.check_expr(cond);
                self.check_condition(&cond_ty, cond.span);
                self.scopes.push(HashMap::new());
                for s in &body.stmts {
                    self.check_stmt(s);
                }
                self.scopes.pop();
            }

            StmtKind::For {
                binding,
                start,
                end,
                step,
                body,
                ..
            } => {
                let start_ty = self.check_expr(start);
                self.require_int(&start_ty, start.span, "for range");
                let end_ty = self.check_expr(end);
                self.require_int(&end_ty, end.span, "for range");
                if let Some(s) = step {
                    let step_ty = self.check_expr(s);
                    self.require_int(&step_ty, s.span, "for step");
                }
                self.scopes.push(HashMap::new());
                self.define(binding, Type::Int);
                for s in &body.stmts {
                    self.check_stmt(s);
                }
                self.scopes.pop();
            }

            StmtKind::Expr(e) => {
                self.check_expr(e);
            }

            StmtKind::Break | StmtKind::Continue | StmtKind::Err => {}
        }
    }

    /// Check a block in a fresh scope and compute its value type: the value
    /// of its last expression statement, Unit otherwise.
    fn check_block_value(&mut self, stmts: &[Stmt]) -> Type {
        self.scopes.push(HashMap::new());
        let ty = self.check_stmts_value(stmts);
        self.scopes.pop();
        ty
    }

    fn check_stmts_value(&mut self, stmts: &[Stmt]) -> Type {
        let mut last = Type::Unit;
        for stmt in stmts {
            match &stmt.kind {
                StmtKind::Expr(e) => last = self.check_expr(e),
                _ => {
                    self.check_stmt(stmt);
                    last = Type::Unit;
                }
            }
        }
        last
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    fn check_expr(&mut self, expr: &Expr) -> Type {
        match &expr.kind {
            ExprKind::Int(_) => Type::Int,
            ExprKind::Str(_) => Type::Str,
            ExprKind::Bool(_) => Type::Bool,

            ExprKind::Ident(name) => self.ident_type(name, expr.span),

            ExprKind::Record(fields) => {
                let mut map = BTreeMap::new();
                for field in fields {
                    let ty = self.check_expr(&field.value);
                    map.insert(field.name.clone(), ty);
                }
                Type::Record(map)
            }

            ExprKind::List(elements) => {
                let mut iter = elements.iter();
                let Some(first) = iter.next() else {
                    return Type::List(Box::new(Type::Unknown));
                };
                let elem_ty = self.check_expr(first);
                for e in iter {
                    let ty = self.check_expr(e);
                    self.expect_type(&elem_ty, &ty, e.span, "this list literal");
                }
                Type::List(Box::new(elem_ty))
            }

            ExprKind::Unary { op, operand } => {
                let ty = self.check_expr(operand);
                match op {
                    UnaryOp::Neg => {
                        self.require_int(&ty, expr.span, "-");
                        Type::Int
                    }
                    UnaryOp::Not => {
                        self.require_bool(&ty, expr.span, "!");
                        Type::Bool
                    }
                }
            }

            ExprKind::Binary { op, left, right } => self.binary_type(*op, left, right, expr.span),

            ExprKind::Field {
                object,
                field,
                field_span,
            } => {
                if let Some(target) = self.qualifier_of(object) {
                    return self.qualified_value_type(target, field, *field_span);
                }
                let object_ty = self.check_expr(object);
                match object_ty {
                    Type::Record(fields) => match fields.get(field) {
                        Some(ty) => ty.clone(),
                        None => {
                            self.errors.push(TypeError::NoSuchField {
                                field: field.clone(),
                                ty: Type::Record(fields.clone()),
                                span: *field_span,
                            });
                            Type::Unknown
                        }
                    },
                    Type::Unknown => {
                        self.unknown_operand("field access", expr.span);
                        Type::Unknown
                    }
                    other => {
                        self.errors.push(TypeError::NotARecord {
                            found: other,
                            span: expr.span,
                        });
                        Type::Unknown
                    }
                }
            }

            ExprKind::Index { object, index } => {
                let object_ty = self.check_expr(object);
                let index_ty = self.check_expr(index);
                self.require_int(&index_ty, index.span, "indexing");
                match object_ty {
                    Type::List(elem) => *elem,
                    Type::Unknown => {
                        self.unknown_operand("indexing", expr.span);
                        Type::Unknown
                    }
                    other => {
                        self.errors.push(TypeError::NotAList {
                            found: other,
                            span: expr.span,
                        });
                        Type::Unknown
                    }
                }
            }

            ExprKind::If {
                cond,
                then_block,
                else_block,
            } => {
                let cond_ty = self.check_expr(cond);
                self.check_condition(&cond_ty, cond.span);
                let then_ty = self.check_block_value(&then_block.stmts);
                let else_ty = self.check_block_value(&else_block.stmts);
                Self::join(then_ty, else_ty)
            }

            ExprKind::Match { subject, arms } => self.match_type(subject, arms),

            ExprKind::Call { callee, args } => self.call_type(callee, args, expr.span),

            ExprKind::Paren(inner) => self.check_expr(inner),
        }
    }

    fn ident_type(&mut self, name: &str, span: Span) -> Type {
        if let Some(ty) = self.lookup(name) {
            return ty;
        }
        if let Some(sig) = self.sigs[self.module].get(name) {
            return sig.as_type();
        }
        let vref = self.unit().variant(name);
        if let Some(vref) = vref {
            return self.variant_value_type(self.module, vref, span);
        }
        // Anything else was already reported by the resolver.
        Type::Unknown
    }

    /// The type of a bare reference to a variant: its enum for payload-free
    /// variants, an error otherwise.
    fn variant_value_type(&mut self, module: usize, vref: VariantRef, span: Span) -> Type {
        let unit = &self.program.modules[module];
        let decl = unit.variant_decl(vref);
        if decl.payload.is_empty() {
            Type::Enum(unit.qualified_enum_name(vref.enum_idx))
        } else {
            self.errors.push(TypeError::VariantNeedsPayload {
                variant: decl.name.clone(),
                span,
            });
            Type::Unknown
        }
    }

    fn qualified_value_type(&mut self, target: usize, name: &str, span: Span) -> Type {
        if let Some(sig) = self.sigs[target].get(name) {
            return sig.as_type();
        }
        if let Some(vref) = self.program.modules[target].variant(name) {
            return self.variant_value_type(target, vref, span);
        }
        Type::Unknown
    }

    fn binary_type(&mut self, op: BinOp, left: &Expr, right: &Expr, span: Span) -> Type {
        let l = self.check_expr(left);
        let r = self.check_expr(right);
        match op {
            BinOp::Add => {
                if l == Type::Str || r == Type::Str {
                    // The non-string side coerces to its display form.
                    return Type::Str;
                }
                if matches!(l, Type::Unknown) || matches!(r, Type::Unknown) {
                    self.unknown_operand("`+`", span);
                    return Type::Unknown;
                }
                if l == Type::Int && r == Type::Int {
                    Type::Int
                } else {
                    self.errors.push(TypeError::BadConcat {
                        left: l,
                        right: r,
                        span,
                    });
                    Type::Int
                }
            }
            BinOp::Sub | BinOp::Mul | BinOp::Div => {
                self.require_int(&l, left.span, op.symbol());
                self.require_int(&r, right.span, op.symbol());
                Type::Int
            }
            BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => {
                self.require_int(&l, left.span, op.symbol());
                self.require_int(&r, right.span, op.symbol());
                Type::Bool
            }
            BinOp::Eq | BinOp::Ne => {
                if !matches!(l, Type::Unknown) && !matches!(r, Type::Unknown) && l != r {
                    self.errors.push(TypeError::OperandsDiffer {
                        op: op.symbol(),
                        left: l,
                        right: r,
                        span,
                    });
                }
                Type::Bool
            }
            BinOp::And | BinOp::Or => {
                self.require_bool(&l, left.span, op.symbol());
                self.require_bool(&r, right.span, op.symbol());
                Type::Bool
            }
        }
    }

    fn match_type(&mut self, subject: &Expr, arms: &[MatchArm]) -> Type {
        let subject_ty = self.check_expr(subject);

        let mut result: Option<Type> = None;
        for arm in arms {
            let mut bindings = Vec::new();
            self.check_pattern(&arm.pattern, &subject_ty, true, &mut bindings);

            self.scopes.push(HashMap::new());
            for (name, ty) in bindings {
                self.define(&name, ty);
            }
            let arm_ty = self.check_stmts_value(&arm.body.stmts);
            self.scopes.pop();

            // Every arm must agree with the first.
            match result.clone() {
                None => result = Some(arm_ty),
                Some(first) => {
                    self.expect_type(&first, &arm_ty, arm.span, "this match arm");
                }
            }
        }
        result.unwrap_or(Type::Unit)
    }

    fn check_pattern(
        &mut self,
        pattern: &Pattern,
        subject: &Type,
        top: bool,
        bindings: &mut Vec<(String, Type)>,
    ) {
        match &pattern.kind {
            PatternKind::Wildcard => {}
            PatternKind::Int(_) => self.literal_pattern(subject, Type::Int, pattern.span),
            PatternKind::Str(_) => self.literal_pattern(subject, Type::Str, pattern.span),
            PatternKind::Bool(_) => self.literal_pattern(subject, Type::Bool, pattern.span),

            PatternKind::Name {
                qualifier,
                name,
                args,
            } => {
                let resolved = match qualifier {
                    Some(alias) => self
                        .unit()
                        .imports
                        .get(alias)
                        .copied()
                        .and_then(|t| self.program.modules[t].variant(name).map(|v| (t, v))),
                    None => self.unit().variant(name).map(|v| (self.module, v)),
                };

                let Some((module, vref)) = resolved else {
                    // A bare unqualified name in payload position binds.
                    if qualifier.is_none() && args.is_none() && !top {
                        bindings.push((name.clone(), subject.clone()));
                    }
                    // Unknown variants were reported by the resolver.
                    return;
                };

                let owner = Type::Enum(self.program.modules[module].qualified_enum_name(vref.enum_idx));
                if !matches!(subject, Type::Unknown) && *subject != owner {
                    self.errors.push(TypeError::PatternMismatch {
                        subject: subject.clone(),
                        span: pattern.span,
                    });
                }

                let payload = self.payload_types(module, vref);
                let args = args.as_deref().unwrap_or(&[]);
                if args.len() != payload.len() {
                    let variant = self.program.modules[module].variant_decl(vref).name.clone();
                    self.errors.push(TypeError::PayloadArity {
                        variant,
                        expected: payload.len(),
                        found: args.len(),
                        span: pattern.span,
                    });
                }
                for (arg, ty) in args.iter().zip(payload.iter()) {
                    self.check_pattern(arg, ty, false, bindings);
                }
            }
        }
    }

    fn literal_pattern(&mut self, subject: &Type, literal: Type, span: Span) {
        if !matches!(subject, Type::Unknown) && *subject != literal {
            self.errors.push(TypeError::PatternMismatch {
                subject: subject.clone(),
                span,
            });
        }
    }

    fn call_type(&mut self, callee: &Expr, args: &[Expr], span: Span) -> Type {
        // The builtin accepts anything and prints it.
        if let ExprKind::Ident(name) = &callee.kind {
            if name == "print" && self.lookup(name).is_none() {
                for arg in args {
                    self.check_expr(arg);
                }
                return Type::Unit;
            }
        }

        // Named function or variant constructor?
        let direct = match &callee.kind {
            ExprKind::Ident(name) if self.lookup(name).is_none() => {
                Some((self.module, name.clone()))
            }
            ExprKind::Field { object, field, .. } => self
                .qualifier_of(object)
                .map(|target| (target, field.clone())),
            _ => None,
        };

        if let Some((module, name)) = direct {
            let sig = self.sigs[module].get(&name).cloned();
            if let Some(sig) = sig {
                return self.check_call_args(&name, &sig.params, sig.ret, args, span);
            }
            if let Some(vref) = self.program.modules[module].variant(&name) {
                let payload = self.payload_types(module, vref);
                let result = Type::Enum(self.program.modules[module].qualified_enum_name(vref.enum_idx));
                return self.check_call_args(&name, &payload, result, args, span);
            }
            // Resolver reported this callee; still check the arguments.
            for arg in args {
                self.check_expr(arg);
            }
            return Type::Unknown;
        }

        let callee_ty = self.check_expr(callee);
        match callee_ty {
            Type::Fn { params, ret } => self.check_call_args("this function", &params, *ret, args, span),
            Type::Unknown => {
                self.unknown_operand("a call", span);
                for arg in args {
                    self.check_expr(arg);
                }
                Type::Unknown
            }
            other => {
                self.errors.push(TypeError::NotCallable {
                    found: other,
                    span: callee.span,
                });
                for arg in args {
                    self.check_expr(arg);
                }
                Type::Unknown
            }
        }
    }

    fn check_call_args(
        &mut self,
        name: &str,
        params: &[Type],
        ret: Type,
        args: &[Expr],
        span: Span,
    ) -> Type {
        if args.len() != params.len() {
            self.errors.push(TypeError::ArityMismatch {
                name: name.to_string(),
                expected: params.len(),
                found: args.len(),
                span,
            });
        }
        for (arg, param) in args.iter().zip(params.iter()) {
            let found = self.check_expr(arg);
            self.expect_type(param, &found, arg.span, "this argument");
        }
        for arg in args.iter().skip(params.len()) {
            self.check_expr(arg);
        }
        ret
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    fn define(&mut self, name: &str, ty: Type) {
        self.scopes
            .last_mut()
            .expect("scope stack is never empty")
            .insert(name.to_string(), ty);
    }

    fn lookup(&self, name: &str) -> Option<Type> {
        self.scopes
            .iter()
            .rev()
            .find_map(|s| s.get(name))
            .cloned()
    }

    /// The import target of `expr` when it is an unshadowed alias reference.
    fn qualifier_of(&self, expr: &Expr) -> Option<usize> {
        let ExprKind::Ident(name) = &expr.kind else {
            return None;
        };
        if self.lookup(name).is_some() {
            return None;
        }
        self.unit().imports.get(name).copied()
    }

    /// Equality check with the `Unknown` rules applied.
    fn expect_type(&mut self, expected: &Type, found: &Type, span: Span, context: &str) {
        if matches!(expected, Type::Unknown) {
            return;
        }
        if matches!(found, Type::Unknown) {
            self.unknown_operand(context, span);
            return;
        }
        if expected != found {
            self.errors.push(TypeError::Mismatch {
                expected: expected.clone(),
                found: found.clone(),
                span,
            });
        }
    }

    fn require_int(&mut self, found: &Type, span: Span, op: &'static str) {
        match found {
            Type::Int => {}
            Type::Unknown => self.unknown_operand(&format!("`{}`", op), span),
            _ => self.errors.push(TypeError::BadOperand {
                op,
                expected: "integers",
                found: found.clone(),
                span,
            }),
        }
    }

    fn require_bool(&mut self, found: &Type, span: Span, op: &'static str) {
        match found {
            Type::Bool => {}
            Type::Unknown => self.unknown_operand(&format!("`{}`", op), span),
            _ => self.errors.push(TypeError::BadOperand {
                op,
                expected: "booleans",
                found: found.clone(),
                span,
            }),
        }
    }

    /// Conditions admit Unknown in both modes; runtime truthiness is the
    /// backstop for unannotated values.
    fn check_condition(&mut self, found: &Type, span: Span) {
        if !matches!(found, Type::Bool | Type::Unknown) {
            self.errors.push(TypeError::Mismatch {
                expected: Type::Bool,
                found: found.clone(),
                span,
            });
        }
    }

    fn unknown_operand(&mut self, context: &str, span: Span) {
        if self.strict {
            self.errors.push(TypeError::UnknownOperand {
                context: context.to_string(),
                span,
            });
        }
    }

    /// The type of a two-armed `if`: the common type when the arms agree,
    /// Unit otherwise. An Unknown arm does not adopt the other arm's type;
    /// Unknown is never inferred transitively.
    fn join(a: Type, b: Type) -> Type {
        if a == b {
            a
        } else {
            Type::Unit
        }
    }
}
