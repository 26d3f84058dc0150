//! glint-compile - AST -> bytecode lowering and the binary file format.

pub mod bytecode;
pub mod compiler;

pub use bytecode::{read_program, write_program, BytecodeError, Instruction, Operand};
pub use compiler::{compile_program, CompileError};
