//! The stack machine, grounded on `original_source/src/vm.cpp`/
//! `include/vm.hpp`: dispatch checks whether an opcode falls in the
//! binary- or unary-operator range and, if so, hands it to the evaluator's
//! shared operator implementation rather than re-deriving it (`spec.md`
//! §9's first Open Question, resolved once in `glint_value::ops`).
//!
//! That source declares `variables`/`callStack`/`functions` fields on its
//! `VM` struct but its `run()` never actually reads or writes `VAR`/`ASSIGN`
//! — the compiler emits them, so a faithful bytecode round trip needs a VM
//! that handles them; that handling is this module's one addition beyond
//! what the original implemented. `callStack`/`functions` stay unused here
//! too: the compiler (`glint-compile::compiler`) never emits `CALL`, since
//! its surface is deliberately restricted to straight-line code.

use std::io::Write;

use rustc_hash::FxHashMap;

use glint_compile::bytecode::{Instruction, Operand};
use glint_value::{eval_binary_op, eval_unary_op, Value};

use crate::error::VmError;

/// Reserved for a future bytecode backend that compiles user functions;
/// the current compiler's restricted surface never emits `CALL`/`RET`
/// opcodes, so this never gets pushed to.
#[allow(dead_code)]
struct CallFrame {
    locals: FxHashMap<String, Value>,
}

pub struct Vm {
    stack: Vec<Value>,
    variables: FxHashMap<String, Value>,
    #[allow(dead_code)]
    call_stack: Vec<CallFrame>,
    #[allow(dead_code)]
    functions: FxHashMap<String, usize>,
}

impl Default for Vm {
    fn default() -> Self {
        Self::new()
    }
}

impl Vm {
    pub fn new() -> Self {
        Self {
            stack: Vec::new(),
            variables: FxHashMap::default(),
            call_stack: Vec::new(),
            functions: FxHashMap::default(),
        }
    }

    fn pop(&mut self) -> Result<Value, VmError> {
        self.stack.pop().ok_or(VmError::StackUnderflow)
    }

    fn push(&mut self, v: Value) {
        self.stack.push(v);
    }

    /// Executes `instrs` against this VM's stack and variable table,
    /// writing `print`/`println` output to `out`.
    pub fn run(&mut self, instrs: &[Instruction], out: &mut impl Write) -> Result<(), VmError> {
        for instr in instrs {
            self.step(instr, out)?;
        }
        Ok(())
    }

    fn step(&mut self, instr: &Instruction, out: &mut impl Write) -> Result<(), VmError> {
        use glint_lex::TokenKind::*;

        match instr.opcode {
            PushInt => {
                let Operand::Int(v) = instr.operand else { unreachable!("PushInt operand") };
                self.push(Value::Int(v));
            }
            PushFloat => {
                let Operand::Float(v) = instr.operand else { unreachable!("PushFloat operand") };
                self.push(Value::Float(v));
            }
            PushString => {
                let Operand::Str(ref v) = instr.operand else { unreachable!("PushString operand") };
                self.push(Value::String(v.clone()));
            }
            PushBool => {
                let Operand::Bool(v) = instr.operand else { unreachable!("PushBool operand") };
                self.push(Value::Bool(v));
            }
            Var => {
                let Operand::Str(ref name) = instr.operand else { unreachable!("Var operand") };
                let value = self
                    .variables
                    .get(name)
                    .cloned()
                    .ok_or_else(|| VmError::UnknownVariable(name.clone()))?;
                self.push(value);
            }
            Assign => {
                let Operand::Str(ref name) = instr.operand else { unreachable!("Assign operand") };
                let value = self.pop()?;
                self.variables.insert(name.clone(), value.clone());
                self.push(value);
            }
            op if op.is_assignment() => {
                let Operand::Str(ref name) = instr.operand else {
                    unreachable!("compound assign operand")
                };
                let rhs = self.pop()?;
                let current = self
                    .variables
                    .get(name)
                    .cloned()
                    .ok_or_else(|| VmError::UnknownVariable(name.clone()))?;
                let plain_op = op.compound_op().expect("non-Assign assignment form");
                let result = eval_binary_op(&current, &rhs, plain_op)?;
                self.variables.insert(name.clone(), result.clone());
                self.push(result);
            }
            Print => {
                let v = self.pop()?;
                write!(out, "{}", v.stringify())?;
                out.flush()?;
            }
            Println => {
                let v = self.pop()?;
                writeln!(out, "{}", v.stringify())?;
                out.flush()?;
            }
            op if op.is_binary_op() => {
                let right = self.pop()?;
                let left = self.pop()?;
                self.push(eval_binary_op(&left, &right, op)?);
            }
            op if op.is_unary_op() => {
                let operand = self.pop()?;
                self.push(eval_unary_op(&operand, op)?);
            }
            other => unreachable!("opcode {other:?} never appears in a compiled stream"),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glint_compile::compile_program;
    use glint_lex::Lexer;
    use glint_native::NativeRegistry;
    use glint_par::Node;
    use glint_util::Diagnostics;

    fn compile(src: &str) -> Vec<Instruction> {
        let mut diags = Diagnostics::new();
        let tokens = Lexer::new(src, "t.gln").tokenize(&mut diags);
        let mut registry = NativeRegistry::new();
        let program = glint_par::parse(tokens, "t.gln", vec![], &mut registry, &mut diags);
        assert!(!diags.has_errors());
        let Node::Program(p) = program else { panic!() };
        compile_program(&p).unwrap()
    }

    fn run_to_string(src: &str) -> String {
        let instrs = compile(src);
        let mut out = Vec::new();
        Vm::new().run(&instrs, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn arithmetic_and_println() {
        assert_eq!(run_to_string("println(1+2*3);"), "7\n");
    }

    #[test]
    fn variable_round_trips_through_bytecode() {
        assert_eq!(run_to_string("i = 0; i += 5; println(i);"), "5\n");
    }

    #[test]
    fn print_has_no_trailing_newline_but_println_does() {
        assert_eq!(run_to_string("println(1, 2);"), "12\n");
    }

    #[test]
    fn reading_an_unknown_variable_is_a_fatal_error() {
        let instrs = compile("println(i);");
        let mut out = Vec::new();
        let err = Vm::new().run(&instrs, &mut out).unwrap_err();
        assert!(matches!(err, VmError::UnknownVariable(n) if n == "i"));
    }

    #[test]
    fn division_by_zero_is_a_fatal_error() {
        let instrs = compile("println(1 / 0);");
        let mut out = Vec::new();
        let err = Vm::new().run(&instrs, &mut out).unwrap_err();
        assert!(matches!(err, VmError::Op(_)));
    }
}
