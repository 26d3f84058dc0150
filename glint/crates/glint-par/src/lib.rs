//! glint-par - the Pratt parser: tokens in, a `Node::Program` AST out.
//!
//! `load` directives are resolved here rather than deferred to a later
//! pass: a source-file `load` re-enters the lexer/parser and splices the
//! resulting statements in place, while a native-library `load` resolves
//! and registers the library immediately against the [`glint_native`]
//! registry threaded through parsing.

pub mod ast;
pub mod parser;

pub use ast::{
    BinaryOp, ClassLiteral, ExpressionStmt, ForLiteral, FunctionCall, FunctionKind,
    FunctionLiteral, IfLiteral, Node, Program, TypeMarker, UnaryOp, Variable, WhileLiteral,
};
pub use parser::parse;
