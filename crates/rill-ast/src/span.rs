// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Source location tracking.

/// Identifies a source buffer registered in the diagnostics source map.
///
/// Multiple buffers are in flight when a program imports sibling modules,
/// so every span records which buffer its offsets index into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceId(pub u32);

impl SourceId {
    /// Placeholder for spans synthesized outside any source buffer.
    pub const DUMMY: SourceId = SourceId(u32::MAX);
}

/// A byte range in a source buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub source: SourceId,
    pub start: u32,
    pub end: u32,
}

impl Span {
    pub fn new(source: SourceId, start: usize, end: usize) -> Self {
        Self {
            source,
            start: start as u32,
            end: end as u32,
        }
    }

    /// The smallest span covering both `self` and `other`.
    ///
    /// Joining spans from different sources keeps `self`'s location; this
    /// only arises for synthesized nodes.
    pub fn to(self, other: Span) -> Span {
        if self.source != other.source {
            return self;
        }
        Span {
            source: self.source,
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    pub fn dummy() -> Span {
        Span {
            source: SourceId::DUMMY,
            start: 0,
            end: 0,
        }
    }
}

/// Byte-offset → 1-based line/column lookup for one source buffer.
///
/// Built once per buffer when it is registered; each lookup is a binary
/// search over the recorded line starts, so rendering a batch of
/// diagnostics never rescans the text.
#[derive(Debug, Clone)]
pub struct LineMap {
    /// Where each line begins. The first entry is always 0, so the table
    /// is never empty and every offset lands on some line.
    line_starts: Vec<u32>,
}

impl LineMap {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0u32];
        line_starts.extend(
            source
                .bytes()
                .enumerate()
                .filter(|&(_, b)| b == b'\n')
                .map(|(i, _)| (i + 1) as u32),
        );
        LineMap { line_starts }
    }

    /// Map a byte offset to (line, column), both 1-based. An offset sitting
    /// on a newline counts as the last column of its line.
    pub fn offset_to_line_col(&self, offset: u32) -> (u32, u32) {
        // Count the lines that start at or before the offset; the first
        // entry is 0, so this is always at least one.
        let line_idx = self.line_starts.partition_point(|&start| start <= offset) - 1;
        let line = line_idx as u32 + 1;
        let col = offset - self.line_starts[line_idx] + 1;
        (line, col)
    }

    /// The text of a 1-based line, without its newline.
    pub fn line_text<'a>(&self, source: &'a str, line: u32) -> Option<&'a str> {
        let idx = line.checked_sub(1)? as usize;
        let start = *self.line_starts.get(idx)? as usize;
        source.get(start..).and_then(|rest| rest.split('\n').next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_source() {
        let lm = LineMap::new("");
        assert_eq!(lm.offset_to_line_col(0), (1, 1));
    }

    #[test]
    fn multi_line() {
        let src = "abc\ndef\nghi";
        let lm = LineMap::new(src);
        assert_eq!(lm.offset_to_line_col(0), (1, 1)); // 'a'
        assert_eq!(lm.offset_to_line_col(4), (2, 1)); // 'd'
        assert_eq!(lm.offset_to_line_col(6), (2, 3)); // 'f'
        assert_eq!(lm.offset_to_line_col(8), (3, 1)); // 'g'

        assert_eq!(lm.line_text(src, 1), Some("abc"));
        assert_eq!(lm.line_text(src, 2), Some("def"));
        assert_eq!(lm.line_text(src, 3), Some("ghi"));
        assert_eq!(lm.line_text(src, 4), None);
    }

    #[test]
    fn offset_at_newline_belongs_to_its_line() {
        let src = "ab\ncd\n";
        let lm = LineMap::new(src);
        assert_eq!(lm.offset_to_line_col(2), (1, 3));
        assert_eq!(lm.offset_to_line_col(3), (2, 1));
    }

    #[test]
    fn span_join() {
        let sid = SourceId(0);
        let a = Span::new(sid, 4, 7);
        let b = Span::new(sid, 10, 12);
        assert_eq!(a.to(b), Span::new(sid, 4, 12));
        assert_eq!(b.to(a), Span::new(sid, 4, 12));
    }
}
