//! Error handling for the `glintc` driver binary.
//!
//! `glintc`'s own concerns (config loading, CLI argument validation) get a
//! small `thiserror` enum, grounded on `faxt::error::FaxtError`'s shape;
//! the pipeline's own errors (`glint_drv::DriverError` and everything it
//! wraps) are surfaced through `main`'s top-level `anyhow::Result` instead
//! of being re-wrapped here, per `SPEC_FULL.md` §7's ambient addition.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GlintcError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, GlintcError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let err = GlintcError::Config("missing field".to_string());
        assert_eq!(err.to_string(), "configuration error: missing field");
    }

    #[test]
    fn io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let glintc_err: GlintcError = io_err.into();
        assert!(matches!(glintc_err, GlintcError::Io(_)));
    }
}
