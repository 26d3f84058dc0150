//! glint-native - the native-function registry and dynamic-loading ABI.
//!
//! `spec.md` §4.6: a process-wide `name -> native fn` mapping, populated
//! first by this crate's built-ins, then by whatever `load "<lib>"`
//! directives the parser encounters.

pub mod builtins;
pub mod loader;
pub mod registry;

pub use builtins::{register_builtins, set_program_args};
pub use loader::{load_library, search_dirs, LoadError};
pub use registry::{NativeFn, NativeRegistry, RegisterFunctionsFn};
