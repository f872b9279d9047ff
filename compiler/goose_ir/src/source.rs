//! Source text with line/column lookup.

use std::sync::Arc;

use crate::Span;

/// One loaded source file.
///
/// `name` is the canonical module specifier (`file:/abs/path.goose`,
/// `std:math`, ...) or a display name such as `<eval>`.
#[derive(Debug, Clone)]
pub struct SourceFile {
    name: Arc<str>,
    text: Arc<str>,
    line_starts: Vec<u32>,
}

/// 1-based line and column of a byte offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineCol {
    pub line: u32,
    pub col: u32,
}

impl SourceFile {
    pub fn new(name: impl Into<Arc<str>>, text: impl Into<Arc<str>>) -> Self {
        let text: Arc<str> = text.into();
        let mut line_starts = vec![0];
        for (i, b) in text.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(u32::try_from(i + 1).unwrap_or(u32::MAX));
            }
        }
        SourceFile {
            name: name.into(),
            text,
            line_starts,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Line and column (both 1-based, column counted in chars) of `offset`.
    pub fn line_col(&self, offset: u32) -> LineCol {
        let line_index = match self.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i.saturating_sub(1),
        };
        let line_start = self.line_starts[line_index] as usize;
        let end = (offset as usize).min(self.text.len());
        let col = self
            .text
            .get(line_start..end)
            .map_or(end - line_start, |s| s.chars().count());
        LineCol {
            line: u32::try_from(line_index + 1).unwrap_or(u32::MAX),
            col: u32::try_from(col + 1).unwrap_or(u32::MAX),
        }
    }

    /// Source text covered by `span`, or the empty string if out of range.
    pub fn snippet(&self, span: Span) -> &str {
        self.text.get(span.to_range()).unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_line_col_first_and_later_lines() {
        let file = SourceFile::new("main.goose", "let x = 1\nprint(x)\n");
        assert_eq!(file.line_col(0), LineCol { line: 1, col: 1 });
        assert_eq!(file.line_col(4), LineCol { line: 1, col: 5 });
        assert_eq!(file.line_col(10), LineCol { line: 2, col: 1 });
        assert_eq!(file.line_col(16), LineCol { line: 2, col: 7 });
    }

    #[test]
    fn test_line_col_counts_chars_not_bytes() {
        let file = SourceFile::new("u.goose", "\"é\" + x");
        assert_eq!(file.line_col(6), LineCol { line: 1, col: 6 });
    }

    #[test]
    fn test_snippet() {
        let file = SourceFile::new("s.goose", "print(value)");
        assert_eq!(file.snippet(Span::new(6, 11)), "value");
        assert_eq!(file.snippet(Span::new(6, 99)), "");
    }
}
