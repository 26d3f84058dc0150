//! Source positions attached to tokens and AST nodes for diagnostics.

use std::fmt;

/// A location in a source file: a line number plus a start/end column range
/// on that line, along with the full text of the line for caret rendering.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Span {
    pub line_num: u32,
    pub start_col: u32,
    pub end_col: u32,
    pub line_text: String,
}

impl Span {
    pub fn new(line_num: u32, start_col: u32, end_col: u32, line_text: impl Into<String>) -> Self {
        Self {
            line_num,
            start_col,
            end_col,
            line_text: line_text.into(),
        }
    }

    /// Combine two spans: the minimum start, the maximum end, keeping the
    /// first span's line number and line text.
    pub fn combine(a: &Span, b: &Span) -> Span {
        Span {
            line_num: a.line_num,
            start_col: a.start_col.min(b.start_col),
            end_col: a.end_col.max(b.end_col),
            line_text: a.line_text.clone(),
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}-{}", self.line_num, self.start_col, self.end_col)
    }
}
