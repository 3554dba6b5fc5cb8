// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Plain-text diagnostic rendering.
//!
//! The first line is the stable, machine-checked format:
//!
//! ```text
//! main.rill:3:13: typecheck: type mismatch: expected Int, found String
//!     let x: Int = "hi";
//!                  ^^^^
//! ```
//!
//! followed by the offending source line and a caret underline. Runtime
//! errors additionally render the call chain.

use rill_ast::SourceMap;
use rill_interp::Frame;

use crate::Diagnostic;

/// Render one diagnostic: stable header line, source snippet, caret range.
pub fn render(diagnostic: &Diagnostic, sources: &SourceMap) -> String {
    let mut out = String::new();

    let Some((name, line, col)) = sources.locate(diagnostic.span) else {
        // Spans synthesized outside any buffer (e.g. a missing `main`).
        out.push_str(&format!(
            "{}: {}\n",
            diagnostic.phase, diagnostic.message
        ));
        return out;
    };

    out.push_str(&format!(
        "{}:{}:{}: {}: {}\n",
        name, line, col, diagnostic.phase, diagnostic.message
    ));

    let file = sources.get(diagnostic.span.source).expect("located above");
    if let Some(text) = file.line_map.line_text(&file.text, line) {
        out.push_str(&format!("    {}\n", text));

        // Caret width: the span clipped to this line, at least one column.
        let col = col as usize;
        let span_len = (diagnostic.span.end - diagnostic.span.start) as usize;
        let remaining = text.len().saturating_sub(col - 1).max(1);
        let width = span_len.clamp(1, remaining);
        out.push_str(&format!("    {}{}\n", " ".repeat(col - 1), "^".repeat(width)));
    }

    out
}

/// Render a runtime call chain, innermost call last reported first.
pub fn render_call_chain(frames: &[Frame], sources: &SourceMap) -> String {
    let mut out = String::new();
    for frame in frames.iter().rev() {
        match sources.locate(frame.call_site) {
            Some((name, line, col)) => {
                out.push_str(&format!(
                    "  in {} ({}:{}:{})\n",
                    frame.function, name, line, col
                ));
            }
            None => {
                out.push_str(&format!("  in {}\n", frame.function));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Phase;
    use rill_ast::{SourceMap, Span};

    #[test]
    fn stable_header_and_caret() {
        let mut sources = SourceMap::new();
        let source = "fn main() {\n    let x: Int = \"hi\";\n}\n";
        let id = sources.add("main.rill", source);

        // Span of the string literal on line 2.
        let start = source.find('"').unwrap();
        let diag = Diagnostic::error(
            Phase::Typecheck,
            Span::new(id, start, start + 4),
            "type mismatch: expected Int, found String",
        );

        let rendered = render(&diag, &sources);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(
            lines[0],
            "main.rill:2:18: typecheck: type mismatch: expected Int, found String"
        );
        assert_eq!(lines[1], "        let x: Int = \"hi\";");
        // 4 spaces of gutter plus 17 columns into the line.
        assert_eq!(lines[2], format!("    {}^^^^", " ".repeat(17)));
    }

    #[test]
    fn dummy_span_renders_without_location() {
        let sources = SourceMap::new();
        let diag = Diagnostic::error(Phase::Runtime, Span::dummy(), "no `main` function defined");
        assert_eq!(render(&diag, &sources), "runtime: no `main` function defined\n");
    }
}
