// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! The interpreter implementation.
//!
//! A tree-walk evaluator over the resolved program. Non-local control flow
//! (`break`, `continue`, `return`) travels as dedicated error variants; loop
//! bodies catch the first two and function calls catch the third, so a
//! signal that reaches anything else is a runtime error.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

mod call;
mod eval_expr;
mod exec_stmt;
mod operators;
mod pattern;

use rill_ast::decl::{EnumDecl, FnDecl};
use rill_ast::Span;
use rill_resolve::{ResolvedProgram, VariantRef};

use crate::env::Environment;
use crate::value::Value;

/// One module's runtime namespace: immutable after construction.
struct ModuleRt {
    fns: HashMap<String, Rc<FnDecl>>,
    enums: Vec<Rc<EnumDecl>>,
    /// Qualified `module.Enum` names, parallel to `enums`.
    qualified_enums: Vec<Rc<str>>,
    variants: HashMap<String, VariantRef>,
    imports: HashMap<String, usize>,
}

/// One entry of the call chain reported with runtime errors.
#[derive(Debug, Clone)]
pub struct Frame {
    pub function: String,
    pub call_site: Span,
}

/// The tree-walk interpreter.
pub struct Interpreter {
    modules: Vec<ModuleRt>,
    root: usize,
    /// Bindings of the current function activation.
    env: Environment,
    /// Module whose namespace backs the current activation.
    current_module: usize,
    call_stack: Vec<Frame>,
    /// Optional output buffer for capturing stdout (used in tests).
    output: Option<Rc<RefCell<String>>>,
    max_steps: Option<u64>,
    steps: u64,
}

impl Interpreter {
    pub fn new(program: &ResolvedProgram) -> Self {
        let modules = program
            .modules
            .iter()
            .map(|unit| ModuleRt {
                fns: unit
                    .fns
                    .iter()
                    .map(|f| (f.name.clone(), Rc::new(f.clone())))
                    .collect(),
                enums: unit.enums.iter().map(|e| Rc::new(e.clone())).collect(),
                qualified_enums: (0..unit.enums.len())
                    .map(|i| Rc::from(unit.qualified_enum_name(i)))
                    .collect(),
                variants: unit.variants.clone(),
                imports: unit.imports.clone(),
            })
            .collect();

        Self {
            modules,
            root: program.root,
            env: Environment::new(),
            current_module: program.root,
            call_stack: Vec::new(),
            output: None,
            max_steps: None,
            steps: 0,
        }
    }

    /// Returns interpreter and output buffer reference.
    pub fn with_captured_output(program: &ResolvedProgram) -> (Self, Rc<RefCell<String>>) {
        let buffer = Rc::new(RefCell::new(String::new()));
        let mut interp = Self::new(program);
        interp.output = Some(buffer.clone());
        (interp, buffer)
    }

    /// Abort execution after this many evaluation steps.
    pub fn with_max_steps(mut self, max_steps: Option<u64>) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Execute `main` of the root module.
    pub fn run(&mut self) -> Result<Value, RuntimeDiagnostic> {
        let main = self.modules[self.root].fns.get("main").cloned();
        let Some(main) = main else {
            return Err(RuntimeDiagnostic::new(
                RuntimeError::NoEntryPoint,
                Span::dummy(),
            ));
        };
        if !main.params.is_empty() {
            return Err(RuntimeDiagnostic::new(
                RuntimeError::EntryPointArity,
                main.name_span,
            ));
        }
        self.call_function(self.root, &main, Vec::new(), main.name_span)
    }

    /// The function-call chain at the time of the last error, innermost
    /// frame last. Frames are only unwound on orderly returns, so after a
    /// failed `run` this is the chain to report.
    pub fn call_chain(&self) -> &[Frame] {
        &self.call_stack
    }

    pub(super) fn write_line(&self, line: &str) {
        if let Some(buffer) = &self.output {
            let mut buffer = buffer.borrow_mut();
            buffer.push_str(line);
            buffer.push('\n');
        } else {
            println!("{}", line);
        }
    }

    /// Count one evaluation step against the optional ceiling.
    pub(super) fn tick(&mut self, span: Span) -> Result<(), RuntimeDiagnostic> {
        self.steps += 1;
        match self.max_steps {
            Some(limit) if self.steps > limit => Err(RuntimeDiagnostic::new(
                RuntimeError::StepLimit(limit),
                span,
            )),
            _ => Ok(()),
        }
    }

    pub(super) fn qualified_enum(&self, module: usize, enum_idx: usize) -> Rc<str> {
        self.modules[module].qualified_enums[enum_idx].clone()
    }
}

/// A runtime error.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("undefined name `{0}`")]
    UndefinedName(String),

    #[error("{0}")]
    TypeMismatch(String),

    #[error("division by zero")]
    DivisionByZero,

    #[error("index {index} out of bounds (length is {len})")]
    IndexOutOfBounds { index: i64, len: usize },

    #[error("no field `{0}` on this record")]
    NoSuchField(String),

    #[error("duplicate field `{0}` in record literal")]
    DuplicateField(String),

    #[error("no matching arm in match")]
    NoMatchingArm,

    #[error("expected {expected} argument{}, got {got}", if *.expected == 1 { "" } else { "s" })]
    ArityMismatch { expected: usize, got: usize },

    #[error("{0} is not callable")]
    NotCallable(&'static str),

    #[error("variant `{0}` carries a payload; construct it with arguments")]
    VariantNeedsPayload(String),

    #[error("no `main` function defined")]
    NoEntryPoint,

    #[error("`main` must take no parameters")]
    EntryPointArity,

    #[error("for step cannot be zero")]
    ZeroStep,

    #[error("for step must be {} for this range", if *.increasing { "positive" } else { "negative" })]
    StepDirection { increasing: bool },

    #[error("break used outside of a loop")]
    BreakOutsideLoop,

    #[error("continue used outside of a loop")]
    ContinueOutsideLoop,

    #[error("step limit exceeded ({0} steps)")]
    StepLimit(u64),

    // Control flow signals, not actual errors.
    #[error("return")]
    Return(Value),

    #[error("break")]
    Break,

    #[error("continue")]
    Continue,
}

/// Runtime error with source location for diagnostic display.
#[derive(Debug)]
pub struct RuntimeDiagnostic {
    pub error: RuntimeError,
    pub span: Span,
}

impl RuntimeDiagnostic {
    pub fn new(error: RuntimeError, span: Span) -> Self {
        Self { error, span }
    }
}

impl std::fmt::Display for RuntimeDiagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl std::error::Error for RuntimeDiagnostic {}
