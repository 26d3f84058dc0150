//! The linear instruction stream and its binary file encoding, per
//! `spec.md` §4.3/§6.
//!
//! An opcode is a [`TokenKind`] reused verbatim as the compiler emits it —
//! the same enum the lexer produces and the VM dispatches on (see that
//! type's doc comment). An instruction's operand shape is determined by
//! its opcode: `PUSH_INT` carries an `i64`, `PUSH_STRING`/`VAR`/every
//! assignment-family opcode carries a length-prefixed string, `PUSH_BOOL`
//! carries a `u8`, everything else carries nothing. `POW` is always a
//! plain two-operand instruction in bytecode even when its AST form used
//! the Variable-left assignment-form lowering (see `compiler.rs`) — the
//! fixed per-opcode operand shape here has no room to tell the two cases
//! apart, so that quirk is reproduced only by the tree-walking evaluator,
//! which inspects the AST directly.

use std::io::{self, Read, Write};
use std::string::FromUtf8Error;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use glint_lex::TokenKind;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    None,
    Int(i64),
    Float(f32),
    Str(String),
    Bool(bool),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    pub opcode: TokenKind,
    pub operand: Operand,
}

impl Instruction {
    pub fn new(opcode: TokenKind, operand: Operand) -> Self {
        Self { opcode, operand }
    }

    pub fn bare(opcode: TokenKind) -> Self {
        Self::new(opcode, Operand::None)
    }
}

#[derive(Debug, Error)]
pub enum BytecodeError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("invalid opcode {0:#06x} in bytecode stream")]
    InvalidOpcode(u16),
    #[error(transparent)]
    Utf8(#[from] FromUtf8Error),
}

/// Every opcode the compiler ever emits, in both directions. Punctuation,
/// keyword, and radix-literal `TokenKind`s never appear as opcodes and are
/// intentionally absent from this table.
macro_rules! opcode_table {
    ($($variant:ident),+ $(,)?) => {
        fn decode_opcode(n: u16) -> Option<TokenKind> {
            $(if n == TokenKind::$variant as u16 { return Some(TokenKind::$variant); })+
            None
        }
    };
}

opcode_table!(
    PushInt, PushFloat, PushString, PushBool, Not, BitNot, Increment, Decrement, Negate, Add,
    Sub, Mod, Pow, Mul, Div, FloorDiv, And, Or, BitAnd, BitXor, BitOr, LShift, RShift, Index, Dot,
    Less, LessEq, Greater, GreaterEq, EqEq, NotEq, Assign, AddAssign, SubAssign, ModAssign,
    PowAssign, MulAssign, DivAssign, FloorDivAssign, AndAssign, OrAssign, BitAndAssign,
    BitXorAssign, BitOrAssign, LShiftAssign, RShiftAssign, Var, Print, Println,
);

/// The operand shape an opcode implies, used only on the decode path (the
/// encode path reads it straight off the `Operand` the compiler built).
enum OperandKind {
    None,
    Int,
    Float,
    Str,
    Bool,
}

fn operand_kind(opcode: TokenKind) -> OperandKind {
    match opcode {
        TokenKind::PushInt => OperandKind::Int,
        TokenKind::PushFloat => OperandKind::Float,
        TokenKind::PushString | TokenKind::Var => OperandKind::Str,
        TokenKind::PushBool => OperandKind::Bool,
        op if op.is_assignment() => OperandKind::Str,
        _ => OperandKind::None,
    }
}

pub fn write_program(w: &mut impl Write, instrs: &[Instruction]) -> Result<(), BytecodeError> {
    w.write_u64::<LittleEndian>(instrs.len() as u64)?;
    for instr in instrs {
        w.write_u16::<LittleEndian>(instr.opcode as u16)?;
        match &instr.operand {
            Operand::None => {}
            Operand::Int(v) => w.write_i64::<LittleEndian>(*v)?,
            Operand::Float(v) => w.write_f32::<LittleEndian>(*v)?,
            Operand::Bool(v) => w.write_u8(*v as u8)?,
            Operand::Str(s) => {
                w.write_u64::<LittleEndian>(s.len() as u64)?;
                w.write_all(s.as_bytes())?;
            }
        }
    }
    Ok(())
}

pub fn read_program(r: &mut impl Read) -> Result<Vec<Instruction>, BytecodeError> {
    let count = r.read_u64::<LittleEndian>()?;
    let mut instrs = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let raw_opcode = r.read_u16::<LittleEndian>()?;
        let opcode = decode_opcode(raw_opcode).ok_or(BytecodeError::InvalidOpcode(raw_opcode))?;
        let operand = match operand_kind(opcode) {
            OperandKind::None => Operand::None,
            OperandKind::Int => Operand::Int(r.read_i64::<LittleEndian>()?),
            OperandKind::Float => Operand::Float(r.read_f32::<LittleEndian>()?),
            OperandKind::Bool => Operand::Bool(r.read_u8()? != 0),
            OperandKind::Str => {
                let len = r.read_u64::<LittleEndian>()? as usize;
                let mut buf = vec![0u8; len];
                r.read_exact(&mut buf)?;
                Operand::Str(String::from_utf8(buf)?)
            }
        };
        instrs.push(Instruction::new(opcode, operand));
    }
    Ok(instrs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_mixed_instruction_stream() {
        let instrs = vec![
            Instruction::new(TokenKind::PushInt, Operand::Int(42)),
            Instruction::new(TokenKind::PushFloat, Operand::Float(1.5)),
            Instruction::new(TokenKind::PushString, Operand::Str("hi".into())),
            Instruction::new(TokenKind::PushBool, Operand::Bool(true)),
            Instruction::bare(TokenKind::Add),
            Instruction::new(TokenKind::Assign, Operand::Str("x".into())),
            Instruction::bare(TokenKind::Println),
        ];
        let mut buf = Vec::new();
        write_program(&mut buf, &instrs).unwrap();
        let decoded = read_program(&mut &buf[..]).unwrap();
        assert_eq!(decoded, instrs);
    }

    #[test]
    fn rejects_unknown_opcode() {
        let mut buf = Vec::new();
        buf.write_u64::<LittleEndian>(1).unwrap();
        buf.write_u16::<LittleEndian>(0xffff).unwrap();
        let err = read_program(&mut &buf[..]).unwrap_err();
        assert!(matches!(err, BytecodeError::InvalidOpcode(0xffff)));
    }

    #[test]
    fn empty_stream_round_trips() {
        let mut buf = Vec::new();
        write_program(&mut buf, &[]).unwrap();
        assert_eq!(read_program(&mut &buf[..]).unwrap(), vec![]);
    }
}
