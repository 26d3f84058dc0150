//! AST -> bytecode lowering, per `spec.md` §4.3.
//!
//! Grounded on `original_source/src/compiler.cpp`: that compiler's
//! `compileStmt`/`compileExpr` pair only ever handles literals, variable
//! reads/assignments, unary/binary operators, and top-level `print`/
//! `println` calls — control flow, user functions, and classes are not
//! part of its surface at all. This compiler keeps that same narrow
//! scope; the full language is the tree-walking evaluator's job
//! (`glint-eval`), and `-c`/the VM are a deliberately restricted
//! straight-line-arithmetic subset.

use glint_lex::TokenKind;
use glint_par::{ExpressionStmt, FunctionCall, Node, Program, Variable};
use thiserror::Error;

use crate::bytecode::{Instruction, Operand};

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("cannot compile to bytecode: {0} is not supported by the bytecode backend")]
    Unsupported(String),
}

pub fn compile_program(program: &Program) -> Result<Vec<Instruction>, CompileError> {
    let mut out = Vec::new();
    for stmt in &program.stmts {
        compile_stmt(stmt, &mut out)?;
    }
    Ok(out)
}

fn compile_stmt(stmt: &ExpressionStmt, out: &mut Vec<Instruction>) -> Result<(), CompileError> {
    if stmt.is_break || stmt.is_continue {
        return Err(CompileError::Unsupported("break/continue".into()));
    }
    if stmt.no_op {
        return Ok(());
    }
    compile_expr(&stmt.expr, out)
}

fn compile_expr(node: &Node, out: &mut Vec<Instruction>) -> Result<(), CompileError> {
    match node {
        Node::IntLiteral(v) => out.push(Instruction::new(TokenKind::PushInt, Operand::Int(*v))),
        Node::FloatLiteral(v) => {
            out.push(Instruction::new(TokenKind::PushFloat, Operand::Float(*v)))
        }
        Node::StrLiteral(v) => out.push(Instruction::new(
            TokenKind::PushString,
            Operand::Str(v.clone()),
        )),
        Node::BoolLiteral(v) => out.push(Instruction::new(TokenKind::PushBool, Operand::Bool(*v))),
        Node::Variable(v) => compile_variable(v, out)?,
        Node::UnaryOp(u) => {
            compile_expr(&u.operand, out)?;
            out.push(Instruction::bare(u.op));
        }
        Node::BinaryOp(b) => {
            let assignment_form = b.op.is_right_assoc() && is_bare_variable(&b.left);
            if assignment_form {
                let Node::Variable(v) = b.left.as_ref() else {
                    unreachable!("is_bare_variable guarantees a Variable node")
                };
                if b.op.is_assignment() {
                    compile_expr(&b.right, out)?;
                    out.push(Instruction::new(b.op, Operand::Str(v.name.clone())));
                } else {
                    // POW in assignment-form: the fixed per-opcode operand
                    // shape has no way to distinguish this from plain POW,
                    // so only the evaluator reproduces the mutate-in-place
                    // quirk; here it falls back to the plain binary form.
                    compile_expr(&b.left, out)?;
                    compile_expr(&b.right, out)?;
                    out.push(Instruction::bare(b.op));
                }
            } else {
                compile_expr(&b.left, out)?;
                compile_expr(&b.right, out)?;
                out.push(Instruction::bare(b.op));
            }
        }
        Node::FunctionCall(c) if c.name == "print" || c.name == "println" => {
            compile_print_call(c, out)?;
        }
        other => return Err(CompileError::Unsupported(describe(other))),
    }
    Ok(())
}

fn compile_variable(v: &Variable, out: &mut Vec<Instruction>) -> Result<(), CompileError> {
    match &v.value {
        Some(value) => {
            compile_expr(value, out)?;
            out.push(Instruction::new(TokenKind::Assign, Operand::Str(v.name.clone())));
        }
        None => out.push(Instruction::new(TokenKind::Var, Operand::Str(v.name.clone()))),
    }
    Ok(())
}

fn is_bare_variable(node: &Node) -> bool {
    matches!(node, Node::Variable(v) if v.value.is_none())
}

/// `print(a, b, c)` pops and writes each argument with no separator;
/// `println(a, b, c)` does the same but the last argument's write appends
/// a newline and flushes, per `spec.md` §4.4's PRINT/PRINTLN contract.
fn compile_print_call(call: &FunctionCall, out: &mut Vec<Instruction>) -> Result<(), CompileError> {
    let newline = call.name == "println";
    for (i, arg) in call.args.iter().enumerate() {
        compile_expr(arg, out)?;
        let is_last = i + 1 == call.args.len();
        let opcode = if newline && is_last {
            TokenKind::Println
        } else {
            TokenKind::Print
        };
        out.push(Instruction::bare(opcode));
    }
    Ok(())
}

fn describe(node: &Node) -> String {
    match node {
        Node::IfLiteral(_) => "an if statement".into(),
        Node::WhileLiteral(_) => "a while loop".into(),
        Node::ForLiteral(_) => "a for loop".into(),
        Node::FunctionLiteral(f) => format!("function definition '{}'", f.name),
        Node::ClassLiteral(c) => format!("class definition '{}'", c.name),
        Node::ReturnLiteral(_) => "a return statement".into(),
        Node::VecLiteral(_) => "a vector literal".into(),
        Node::TypeLiteral(_) => "a type literal".into(),
        Node::FunctionCall(c) => format!("a call to '{}'", c.name),
        Node::Program(_) | Node::ExpressionStmt(_) | Node::NoOp => "this construct".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glint_lex::Lexer;
    use glint_native::NativeRegistry;
    use glint_util::Diagnostics;

    fn compile_source(src: &str) -> Result<Vec<Instruction>, CompileError> {
        let mut diags = Diagnostics::new();
        let tokens = Lexer::new(src, "t.gln").tokenize(&mut diags);
        let mut registry = NativeRegistry::new();
        let program = glint_par::parse(tokens, "t.gln", vec![], &mut registry, &mut diags);
        assert!(!diags.has_errors());
        let Node::Program(p) = program else { panic!() };
        compile_program(&p)
    }

    #[test]
    fn compiles_arithmetic_and_println() {
        let instrs = compile_source("println(1+2*3);").unwrap();
        assert_eq!(
            instrs,
            vec![
                Instruction::new(TokenKind::PushInt, Operand::Int(1)),
                Instruction::new(TokenKind::PushInt, Operand::Int(2)),
                Instruction::new(TokenKind::PushInt, Operand::Int(3)),
                Instruction::bare(TokenKind::Mul),
                Instruction::bare(TokenKind::Add),
                Instruction::bare(TokenKind::Println),
            ]
        );
    }

    #[test]
    fn plain_assignment_emits_assign_with_name_operand() {
        let instrs = compile_source("i = 0;").unwrap();
        assert_eq!(
            instrs,
            vec![
                Instruction::new(TokenKind::PushInt, Operand::Int(0)),
                Instruction::new(TokenKind::Assign, Operand::Str("i".into())),
            ]
        );
    }

    #[test]
    fn compound_assignment_only_pushes_rhs() {
        let instrs = compile_source("i += 1;").unwrap();
        assert_eq!(
            instrs,
            vec![
                Instruction::new(TokenKind::PushInt, Operand::Int(1)),
                Instruction::new(TokenKind::AddAssign, Operand::Str("i".into())),
            ]
        );
    }

    #[test]
    fn variable_read_emits_var_opcode() {
        let instrs = compile_source("println(i);").unwrap();
        assert_eq!(
            instrs,
            vec![
                Instruction::new(TokenKind::Var, Operand::Str("i".into())),
                Instruction::bare(TokenKind::Println),
            ]
        );
    }

    #[test]
    fn control_flow_is_rejected() {
        let err = compile_source("if 1 println(1);").unwrap_err();
        assert!(matches!(err, CompileError::Unsupported(_)));
    }

    #[test]
    fn multi_arg_println_newlines_only_the_last_write() {
        let instrs = compile_source("println(1, 2);").unwrap();
        assert_eq!(
            instrs,
            vec![
                Instruction::new(TokenKind::PushInt, Operand::Int(1)),
                Instruction::bare(TokenKind::Print),
                Instruction::new(TokenKind::PushInt, Operand::Int(2)),
                Instruction::bare(TokenKind::Println),
            ]
        );
    }
}
