// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! The resolved program: one namespace per loaded module.

use std::collections::{HashMap, HashSet};

use rill_ast::decl::{EnumDecl, FnDecl, Variant};
use rill_ast::SourceId;

/// Points at one variant of one enum within a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantRef {
    pub enum_idx: usize,
    pub variant_idx: usize,
}

/// A loaded module and its namespace.
///
/// The namespace is built once during loading and read-only afterwards.
#[derive(Debug)]
pub struct ModuleUnit {
    pub name: String,
    pub source_id: SourceId,
    pub fns: Vec<FnDecl>,
    pub enums: Vec<EnumDecl>,
    pub fn_index: HashMap<String, usize>,
    pub enum_index: HashMap<String, usize>,
    /// Variant name → owning enum. Variant names are unique per module so
    /// that bare references like `G` and qualified ones like `alias.G`
    /// resolve without a type context.
    pub variants: HashMap<String, VariantRef>,
    /// Import binding (alias or module name) → index into `modules`.
    pub imports: HashMap<String, usize>,
    /// Names listed in `export { ... };` declarations.
    pub exports: HashSet<String>,
}

impl ModuleUnit {
    pub fn function(&self, name: &str) -> Option<&FnDecl> {
        self.fn_index.get(name).map(|&i| &self.fns[i])
    }

    pub fn enum_def(&self, name: &str) -> Option<(usize, &EnumDecl)> {
        self.enum_index.get(name).map(|&i| (i, &self.enums[i]))
    }

    pub fn variant(&self, name: &str) -> Option<VariantRef> {
        self.variants.get(name).copied()
    }

    pub fn variant_decl(&self, vref: VariantRef) -> &Variant {
        &self.enums[vref.enum_idx].variants[vref.variant_idx]
    }

    pub fn exports_name(&self, name: &str) -> bool {
        self.exports.contains(name)
    }

    /// `module.Enum`, the qualified name enum types compare by.
    pub fn qualified_enum_name(&self, enum_idx: usize) -> String {
        format!("{}.{}", self.name, self.enums[enum_idx].name)
    }
}

/// All modules of one compilation in dependency order (imports before
/// importers), plus which one is the root.
#[derive(Debug)]
pub struct ResolvedProgram {
    pub modules: Vec<ModuleUnit>,
    pub root: usize,
}

impl ResolvedProgram {
    pub fn root_module(&self) -> &ModuleUnit {
        &self.modules[self.root]
    }
}
