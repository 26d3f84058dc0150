use thiserror::Error;

use glint_value::OpError;

/// Runtime errors the tree-walking evaluator can raise, grounded on
/// `original_source/src/evaluator.cpp`'s handful of `std::cerr`/throw sites
/// plus the control-flow/class surface `spec.md` §4.5 adds on top of them.
#[derive(Debug, Error)]
pub enum EvalError {
    #[error("unknown identifier '{0}'")]
    UnknownIdentifier(String),
    #[error("'{0}' is not a function, class, or native")]
    NotCallable(String),
    #[error("'{name}' expects {expected} argument(s), got too many ({got})")]
    TooManyArgs {
        name: String,
        expected: usize,
        got: usize,
    },
    #[error("'{name}' expects {expected} argument(s), got too few ({got})")]
    TooFewArgs {
        name: String,
        expected: usize,
        got: usize,
    },
    #[error("'++'/'--' require a variable operand")]
    NotAnLvalue,
    #[error("member access on a non-class-instance value of type '{0}'")]
    NotAnInstance(&'static str),
    #[error("'{0}' has no such field or method")]
    UnknownMember(String),
    #[error("'for' requires a vector to iterate over, got '{0}'")]
    NotIterable(&'static str),
    #[error(transparent)]
    Op(#[from] OpError),
}
