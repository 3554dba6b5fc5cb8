// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Registry of source buffers seen during one compilation.

use crate::span::{LineMap, SourceId, Span};

/// One loaded source buffer.
#[derive(Debug)]
pub struct SourceFile {
    /// Display name for diagnostics, e.g. `main.rill`.
    pub name: String,
    pub text: String,
    pub line_map: LineMap,
}

/// All source buffers of a compilation, indexed by `SourceId`.
///
/// Module loading registers each imported buffer here so that any span can
/// be rendered back to `file:line:col` long after parsing.
#[derive(Debug, Default)]
pub struct SourceMap {
    files: Vec<SourceFile>,
}

impl SourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a buffer and return its id.
    pub fn add(&mut self, name: impl Into<String>, text: impl Into<String>) -> SourceId {
        let text = text.into();
        let line_map = LineMap::new(&text);
        self.files.push(SourceFile {
            name: name.into(),
            text,
            line_map,
        });
        SourceId((self.files.len() - 1) as u32)
    }

    pub fn get(&self, id: SourceId) -> Option<&SourceFile> {
        self.files.get(id.0 as usize)
    }

    /// Render a span's start as (name, line, col); None for dummy spans.
    pub fn locate(&self, span: Span) -> Option<(&str, u32, u32)> {
        let file = self.get(span.source)?;
        let (line, col) = file.line_map.offset_to_line_col(span.start);
        Some((&file.name, line, col))
    }
}
