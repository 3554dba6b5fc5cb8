// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Top-level item AST nodes.

use crate::stmt::{Block, TypeRef};
use crate::Span;

/// The parse result for one source buffer: an optional module declaration
/// followed by top-level items.
#[derive(Debug, Clone)]
pub struct Program {
    /// Name from a leading `module X;`, with its span.
    pub module_name: Option<(String, Span)>,
    pub items: Vec<Item>,
}

/// A top-level item.
#[derive(Debug, Clone)]
pub struct Item {
    pub kind: ItemKind,
    pub span: Span,
}

/// The kind of top-level item.
#[derive(Debug, Clone)]
pub enum ItemKind {
    Import(ImportDecl),
    Export(ExportDecl),
    Enum(EnumDecl),
    Fn(FnDecl),
}

/// `import name;` or `import name as alias;`
#[derive(Debug, Clone)]
pub struct ImportDecl {
    pub name: String,
    pub name_span: Span,
    pub alias: Option<(String, Span)>,
}

impl ImportDecl {
    /// The identifier the importing module binds the namespace to.
    pub fn binding(&self) -> &str {
        self.alias.as_ref().map(|(a, _)| a.as_str()).unwrap_or(&self.name)
    }
}

/// `export { a, b };`
#[derive(Debug, Clone)]
pub struct ExportDecl {
    pub names: Vec<(String, Span)>,
}

/// `enum Name { Variant, Variant(Type, ...), ... }`
#[derive(Debug, Clone)]
pub struct EnumDecl {
    pub name: String,
    pub name_span: Span,
    pub variants: Vec<Variant>,
}

/// One enum variant with an optional payload tuple.
#[derive(Debug, Clone)]
pub struct Variant {
    pub name: String,
    pub payload: Vec<TypeRef>,
    pub span: Span,
}

/// `fn name(params) -> Ret { body }`
#[derive(Debug, Clone)]
pub struct FnDecl {
    pub name: String,
    pub name_span: Span,
    pub params: Vec<Param>,
    pub ret: Option<TypeRef>,
    pub body: Block,
}

/// One function parameter with an optional annotation.
#[derive(Debug, Clone)]
pub struct Param {
    pub name: String,
    pub ty: Option<TypeRef>,
    pub span: Span,
}
