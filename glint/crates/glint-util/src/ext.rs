//! File extension conventions. `spec.md` §6 leaves these implementation-
//! chosen (the original artefacts used `.nl`/`.tn`) but requires they be
//! documented: source files are `.gln`, compiled bytecode is `.glnc`.

pub const SOURCE_EXT: &str = "gln";
pub const COMPILED_EXT: &str = "glnc";
