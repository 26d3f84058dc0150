//! The process-wide `name -> native fn` mapping, grounded on
//! `original_source/include/native.hpp`'s `nativeFunctions` global.

use rustc_hash::FxHashMap;

use glint_value::{ControlValue, Value};

/// The ABI shape a native function has, on both sides of a `load`ed
/// dynamic library: a slice of already-evaluated arguments in, a
/// [`ControlValue`] out — `is_exit` lets `exit` unwind the whole program,
/// `is_err` lets argument-validation failures be observed by `isErr`
/// without a dedicated `Value` variant, per `spec.md` §3's supplement.
pub type NativeFn = fn(&[Value]) -> ControlValue;

/// Owns every registered native function, built-in or dynamically loaded.
/// Built-ins are registered first, so a loaded library can shadow one by
/// registering the same name (last registration wins, matching a plain
/// `HashMap::insert` over `nativeFunctions`).
#[derive(Default)]
pub struct NativeRegistry {
    functions: FxHashMap<String, NativeFn>,
    /// Dynamic library handles are kept alive for the registry's whole
    /// lifetime and deliberately never dropped — see `loader::load_library`.
    _libraries: Vec<libloading::Library>,
}

impl NativeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, f: NativeFn) {
        self.functions.insert(name.into(), f);
    }

    pub fn get(&self, name: &str) -> Option<NativeFn> {
        self.functions.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn keep_library_alive(&mut self, lib: libloading::Library) {
        self._libraries.push(lib);
    }
}

/// The function pointer shape a `registerFunctions` ABI entry point must
/// have: `extern "C" fn(&mut NativeRegistry)`.
pub type RegisterFunctionsFn = unsafe extern "C" fn(&mut NativeRegistry);
