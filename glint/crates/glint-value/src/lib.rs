//! glint-value - the runtime `Value` type and its shared operator semantics.
//!
//! Both the tree-walking evaluator and the bytecode VM depend on this crate
//! for a single definition of what a value is and how operators act on it,
//! so arithmetic/comparison bugs cannot diverge between the two backends.

pub mod ops;
pub mod value;

pub use ops::{eval_binary_op, eval_unary_op, ipow, OpError};
pub use value::{format_float, ClassInstance, ControlValue, FuncId, SharedVec, Value};
