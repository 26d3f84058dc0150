//! The four error kinds `spec.md` §7 names, plus the `Diagnostics` sink that
//! collects them for a source file and renders caret-underlined output.
//!
//! Grounded on the original `errors.hpp`/`diagnostics.hpp` pair: one error
//! class hierarchy (`Error` -> `SyntaxError` -> `MissingTerminatorError`,
//! `IdentifierError`, `TypeError`) collapsed into a single `thiserror` enum,
//! and a `Diagnostics` sink that owns an ordered `Vec` of them.

use std::fmt;

use thiserror::Error;

use crate::span::Span;

/// One of the four error kinds the language's pipeline can raise.
#[derive(Debug, Clone, Error)]
pub enum ErrorKind {
    #[error("SyntaxError: {0}")]
    Syntax(String),
    #[error("MissingTerminatorError: {0}")]
    MissingTerminator(String),
    #[error("IdentifierError: {0}")]
    Identifier(String),
    #[error("TypeError: {0}")]
    Type(String),
}

impl ErrorKind {
    pub fn class_name(&self) -> &'static str {
        match self {
            ErrorKind::Syntax(_) => "SyntaxError",
            ErrorKind::MissingTerminator(_) => "MissingTerminatorError",
            ErrorKind::Identifier(_) => "IdentifierError",
            ErrorKind::Type(_) => "TypeError",
        }
    }

    fn message(&self) -> &str {
        match self {
            ErrorKind::Syntax(m)
            | ErrorKind::MissingTerminator(m)
            | ErrorKind::Identifier(m)
            | ErrorKind::Type(m) => m,
        }
    }
}

/// A single diagnostic record: an [`ErrorKind`], the span it occurred at,
/// the source filename, and an optional hint.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub kind: ErrorKind,
    pub span: Span,
    pub filename: String,
    pub hint: Option<String>,
}

impl Diagnostic {
    pub fn new(kind: ErrorKind, span: Span, filename: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            filename: filename.into(),
            hint: None,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}: {} ({}:{})",
            self.kind.class_name(),
            self.kind.message(),
            self.filename,
            self.span.line_num
        )?;
        if !self.span.line_text.is_empty() {
            writeln!(f, "  {}", self.span.line_text)?;
            let start = self.span.start_col as usize;
            let width = (self.span.end_col.saturating_sub(self.span.start_col)).max(1) as usize;
            writeln!(f, "  {}{}", " ".repeat(start), "^".repeat(width))?;
        }
        if let Some(hint) = &self.hint {
            writeln!(f, "  hint: {hint}")?;
        }
        Ok(())
    }
}

/// Collects diagnostics for one pipeline run, in the order they were raised.
#[derive(Debug, Default)]
pub struct Diagnostics {
    pub errors: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, diagnostic: Diagnostic) {
        self.errors.push(diagnostic);
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn print_errors(&self) {
        for err in &self.errors {
            eprint!("{err}");
        }
    }
}
