//! glint-util - spans and diagnostics shared by every pipeline crate.
//!
//! This crate is deliberately small: the language's runtime has no symbol
//! table to intern and no source-map spanning multiple files at once (each
//! `load` re-enters the lexer/parser independently), so this crate carries
//! only the two things every other crate needs regardless of pipeline
//! stage: [`Span`] and the [`Diagnostics`] sink.

pub mod diagnostic;
pub mod ext;
pub mod span;

pub use diagnostic::{Diagnostic, Diagnostics, ErrorKind};
pub use ext::{COMPILED_EXT, SOURCE_EXT};
pub use span::Span;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_combine_takes_min_start_max_end() {
        let a = Span::new(1, 3, 5, "x = 1;");
        let b = Span::new(1, 4, 8, "x = 1;");
        let combined = Span::combine(&a, &b);
        assert_eq!(combined.start_col, 3);
        assert_eq!(combined.end_col, 8);
        assert_eq!(combined.line_text, "x = 1;");
    }

    #[test]
    fn diagnostics_sink_collects_in_order() {
        let mut diags = Diagnostics::new();
        diags.report(Diagnostic::new(
            ErrorKind::Syntax("bad token".into()),
            Span::default(),
            "a.gln",
        ));
        diags.report(Diagnostic::new(
            ErrorKind::Identifier("unknown name x".into()),
            Span::default(),
            "a.gln",
        ));
        assert!(diags.has_errors());
        assert_eq!(diags.errors.len(), 2);
        assert_eq!(diags.errors[0].kind.class_name(), "SyntaxError");
        assert_eq!(diags.errors[1].kind.class_name(), "IdentifierError");
    }
}
