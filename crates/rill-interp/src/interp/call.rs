// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Function calling.

use rill_ast::decl::FnDecl;
use rill_ast::Span;

use crate::value::Value;

use super::{Frame, Interpreter, RuntimeDiagnostic, RuntimeError};

impl Interpreter {
    /// Call a named function with already-evaluated arguments.
    ///
    /// The callee runs in a fresh environment whose fallback is its defining
    /// module's namespace, never the caller's scopes. The call frame is only
    /// popped on an orderly exit; on errors it stays so that `call_chain`
    /// reports where execution was.
    pub(super) fn call_function(
        &mut self,
        module: usize,
        decl: &FnDecl,
        args: Vec<Value>,
        call_site: Span,
    ) -> Result<Value, RuntimeDiagnostic> {
        if args.len() != decl.params.len() {
            return Err(RuntimeDiagnostic::new(
                RuntimeError::ArityMismatch {
                    expected: decl.params.len(),
                    got: args.len(),
                },
                call_site,
            ));
        }

        self.call_stack.push(Frame {
            function: decl.name.clone(),
            call_site,
        });

        let saved_env = std::mem::take(&mut self.env);
        let saved_module = self.current_module;
        self.current_module = module;
        for (param, value) in decl.params.iter().zip(args) {
            self.env.define(param.name.clone(), value);
        }

        let result = self.exec_stmts(&decl.body.stmts);

        self.env = saved_env;
        self.current_module = saved_module;

        match result {
            Ok(_) => {
                self.call_stack.pop();
                Ok(Value::Unit)
            }
            Err(diag) => match diag.error {
                RuntimeError::Return(value) => {
                    self.call_stack.pop();
                    Ok(value)
                }
                // Loop signals never cross a function boundary.
                RuntimeError::Break => Err(RuntimeDiagnostic::new(
                    RuntimeError::BreakOutsideLoop,
                    diag.span,
                )),
                RuntimeError::Continue => Err(RuntimeDiagnostic::new(
                    RuntimeError::ContinueOutsideLoop,
                    diag.span,
                )),
                error => Err(RuntimeDiagnostic::new(error, diag.span)),
            },
        }
    }

    /// Construct an enum variant value, checking the payload arity.
    pub(super) fn construct_variant(
        &mut self,
        module: usize,
        vref: rill_resolve::VariantRef,
        args: Vec<Value>,
        span: Span,
    ) -> Result<Value, RuntimeDiagnostic> {
        let decl = &self.modules[module].enums[vref.enum_idx].variants[vref.variant_idx];
        if args.len() != decl.payload.len() {
            return Err(RuntimeDiagnostic::new(
                RuntimeError::ArityMismatch {
                    expected: decl.payload.len(),
                    got: args.len(),
                },
                span,
            ));
        }
        let variant = std::rc::Rc::from(decl.name.as_str());
        Ok(Value::Enum {
            enum_name: self.qualified_enum(module, vref.enum_idx),
            variant,
            fields: std::rc::Rc::new(args),
        })
    }
}
