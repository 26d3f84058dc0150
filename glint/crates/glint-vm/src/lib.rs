//! glint-vm - the restricted stack machine that executes compiled
//! bytecode (`glint-compile`'s straight-line arithmetic/print subset).

pub mod error;
pub mod vm;

pub use error::VmError;
pub use vm::Vm;

use std::io::Read;

use glint_compile::bytecode::{read_program, BytecodeError};
use glint_compile::Instruction;

/// Reads a compiled bytecode stream, per `spec.md` §6's `.glnc` file
/// handling (the VM owns loading the binary file it executes).
pub fn load_program(r: &mut impl Read) -> Result<Vec<Instruction>, BytecodeError> {
    read_program(r)
}
