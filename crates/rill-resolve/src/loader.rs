// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Module loading: builds the import graph depth-first, detecting cycles.

use std::collections::{HashMap, HashSet};

use rill_ast::decl::{ItemKind, Program};
use rill_ast::{SourceMap, Span};
use rill_lexer::Lexer;
use rill_parser::Parser;

use crate::error::ResolveError;
use crate::program::{ModuleUnit, ResolvedProgram, VariantRef};
use crate::resolver::resolve_names;
use crate::FrontendError;

/// Resolves an imported module name to its source text.
///
/// The core never touches the filesystem itself; the host injects whatever
/// lookup it wants (sibling files for the CLI, an in-memory map for tests).
pub trait ModuleLoader {
    fn load(&self, name: &str) -> Result<String, String>;

    /// Display name used in diagnostics for an imported module.
    fn display_name(&self, name: &str) -> String {
        format!("{}.rill", name)
    }
}

/// An in-memory loader, mainly for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryLoader {
    modules: HashMap<String, String>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, source: impl Into<String>) -> Self {
        self.modules.insert(name.into(), source.into());
        self
    }
}

impl ModuleLoader for MemoryLoader {
    fn load(&self, name: &str) -> Result<String, String> {
        self.modules
            .get(name)
            .cloned()
            .ok_or_else(|| "no such module".to_string())
    }
}

/// Load, parse, and name-resolve a root source and everything it imports.
///
/// The source map is returned even on failure so diagnostics can always be
/// rendered. Errors accumulate in discovery order: lex, then parse, then
/// resolve, per module, imports before importers.
pub fn load_program(
    root_name: &str,
    root_display: &str,
    root_source: String,
    loader: &dyn ModuleLoader,
) -> (SourceMap, Result<ResolvedProgram, Vec<FrontendError>>) {
    let mut builder = GraphBuilder {
        loader,
        sources: SourceMap::new(),
        modules: Vec::new(),
        by_name: HashMap::new(),
        loading: Vec::new(),
        errors: Vec::new(),
    };

    let root = builder.load_module(root_name, root_display.to_string(), root_source);

    let GraphBuilder {
        sources,
        modules,
        errors,
        ..
    } = builder;

    if errors.is_empty() {
        (
            sources,
            Ok(ResolvedProgram {
                modules,
                root,
            }),
        )
    } else {
        (sources, Err(errors))
    }
}

struct GraphBuilder<'a> {
    loader: &'a dyn ModuleLoader,
    sources: SourceMap,
    modules: Vec<ModuleUnit>,
    by_name: HashMap<String, usize>,
    /// Modules currently being loaded (the grey set of the DFS), in order.
    loading: Vec<String>,
    errors: Vec<FrontendError>,
}

impl GraphBuilder<'_> {
    /// Load one module and, first, everything it imports. Returns the index
    /// the module was assigned in `modules`.
    fn load_module(&mut self, name: &str, display: String, source: String) -> usize {
        self.loading.push(name.to_string());

        let source_id = self.sources.add(display, source);
        let lexed = {
            let file = self.sources.get(source_id).expect("just added");
            Lexer::new(&file.text, source_id).tokenize()
        };
        self.errors.extend(lexed.errors.into_iter().map(FrontendError::Lex));

        let parsed = Parser::new(lexed.tokens).parse();
        self.errors
            .extend(parsed.errors.into_iter().map(FrontendError::Parse));
        let program = parsed.program;

        if let Some((declared, decl_span)) = &program.module_name {
            if declared != name {
                self.push_resolve(ResolveError::module_name_mismatch(
                    declared, name, *decl_span,
                ));
            }
        }

        // Depth-first over imports: a module is only exposed once everything
        // it depends on is fully loaded and resolved.
        let mut import_bindings: Vec<(String, Span, usize)> = Vec::new();
        for item in &program.items {
            let ItemKind::Import(imp) = &item.kind else {
                continue;
            };

            if self.loading.iter().any(|m| m == &imp.name) {
                let first = self.loading.iter().position(|m| m == &imp.name).unwrap();
                let mut chain: Vec<String> = self.loading[first..].to_vec();
                chain.push(imp.name.clone());
                self.push_resolve(ResolveError::cyclic_import(&chain, imp.name_span));
                continue;
            }

            let target = match self.by_name.get(&imp.name).copied() {
                Some(idx) => idx,
                None => match self.loader.load(&imp.name) {
                    Ok(text) => {
                        let display = self.loader.display_name(&imp.name);
                        self.load_module(&imp.name, display, text)
                    }
                    Err(reason) => {
                        self.push_resolve(ResolveError::load_failed(
                            &imp.name,
                            reason,
                            imp.name_span,
                        ));
                        continue;
                    }
                },
            };

            let binding = imp.binding().to_string();
            let binding_span = imp
                .alias
                .as_ref()
                .map(|(_, s)| *s)
                .unwrap_or(imp.name_span);
            import_bindings.push((binding, binding_span, target));
        }

        let unit = self.build_namespace(name, source_id, program, import_bindings);

        let resolve_errors = resolve_names(&unit, &self.modules);
        self.errors
            .extend(resolve_errors.into_iter().map(FrontendError::Resolve));

        let idx = self.modules.len();
        self.modules.push(unit);
        self.by_name.insert(name.to_string(), idx);
        self.loading.pop();
        idx
    }

    /// Collect functions, enums, variants, exports, and import bindings into
    /// a namespace, reporting collisions.
    fn build_namespace(
        &mut self,
        name: &str,
        source_id: rill_ast::SourceId,
        program: Program,
        import_bindings: Vec<(String, Span, usize)>,
    ) -> ModuleUnit {
        let mut fns = Vec::new();
        let mut enums = Vec::new();
        let mut fn_index = HashMap::new();
        let mut enum_index = HashMap::new();
        let mut variants: HashMap<String, VariantRef> = HashMap::new();
        let mut exports = HashSet::new();
        let mut export_names: Vec<(String, Span)> = Vec::new();

        for item in program.items {
            match item.kind {
                ItemKind::Fn(f) => {
                    if f.name == "print" {
                        self.push_resolve(ResolveError::reserved_name(f.name_span));
                    } else if fn_index.contains_key(&f.name)
                        || enum_index.contains_key(&f.name)
                        || variants.contains_key(&f.name)
                    {
                        self.push_resolve(ResolveError::duplicate_item(&f.name, f.name_span));
                    } else {
                        fn_index.insert(f.name.clone(), fns.len());
                        fns.push(f);
                    }
                }
                ItemKind::Enum(e) => {
                    if fn_index.contains_key(&e.name) || enum_index.contains_key(&e.name) {
                        self.push_resolve(ResolveError::duplicate_item(&e.name, e.name_span));
                        continue;
                    }
                    let enum_idx = enums.len();
                    for (variant_idx, v) in e.variants.iter().enumerate() {
                        if variants.contains_key(&v.name) || fn_index.contains_key(&v.name) {
                            self.push_resolve(ResolveError::duplicate_item(&v.name, v.span));
                        } else {
                            variants.insert(
                                v.name.clone(),
                                VariantRef {
                                    enum_idx,
                                    variant_idx,
                                },
                            );
                        }
                    }
                    enum_index.insert(e.name.clone(), enum_idx);
                    enums.push(e);
                }
                ItemKind::Export(e) => {
                    export_names.extend(e.names);
                }
                ItemKind::Import(_) => {}
            }
        }

        for (export, span) in export_names {
            if !fn_index.contains_key(&export) && !enum_index.contains_key(&export) {
                self.push_resolve(ResolveError::unknown_export(&export, span));
                continue;
            }
            exports.insert(export);
        }

        let mut imports = HashMap::new();
        for (binding, span, target) in import_bindings {
            if imports.contains_key(&binding)
                || fn_index.contains_key(&binding)
                || enum_index.contains_key(&binding)
                || variants.contains_key(&binding)
            {
                self.push_resolve(ResolveError::alias_collision(&binding, span));
                continue;
            }
            imports.insert(binding, target);
        }

        ModuleUnit {
            name: name.to_string(),
            source_id,
            fns,
            enums,
            fn_index,
            enum_index,
            variants,
            imports,
            exports,
        }
    }

    fn push_resolve(&mut self, error: ResolveError) {
        self.errors.push(FrontendError::Resolve(error));
    }
}
