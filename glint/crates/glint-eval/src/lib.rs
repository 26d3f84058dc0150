//! glint-eval - the tree-walking evaluator that realizes the full language
//! surface (control flow, user functions, classes) the restricted bytecode
//! backend (`glint-compile`/`glint-vm`) deliberately does not.

pub mod error;
pub mod evaluator;

pub use error::EvalError;
pub use evaluator::Evaluator;
