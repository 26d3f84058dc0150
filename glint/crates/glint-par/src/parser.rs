//! A Pratt (operator-precedence) parser producing a [`Node::Program`],
//! grounded on `original_source/src/parser.cpp`'s `parse_program`/
//! `parse_statement`/`parse_expr` trio and on `faxc-par::expr`'s
//! binding-power-table idiom.
//!
//! # Operator precedence (low -> high)
//!
//! | Level | Operators | Associativity |
//! |---|---|---|
//! | assignment | `= += -= *= /= %= **= //= \|\|= &&= &= \|= ^= <<= >>=` | right |
//! | logical or | `\|\|` | left |
//! | logical and | `&&` | left |
//! | bitwise or | `\|` | left |
//! | bitwise xor | `^` | left |
//! | bitwise and | `&` | left |
//! | equality | `== !=` | left |
//! | comparison | `< <= > >=` | left |
//! | shift | `<< >>` | left |
//! | additive | `+ -` | left |
//! | multiplicative | `* / % //` | left |
//! | power | `**` | right |
//! | unary prefix | `- ! !! ++ --` | right |
//! | postfix | `++ --` | n/a |
//! | call/index/member | `() @ .` | left |

use std::path::PathBuf;

use glint_lex::{Lexer, Token, TokenKind};
use glint_native::NativeRegistry;
use glint_util::diagnostic::{Diagnostic, ErrorKind};
use glint_util::{Diagnostics, Span, SOURCE_EXT};

use crate::ast::{
    BinaryOp, ClassLiteral, ExpressionStmt, ForLiteral, FunctionCall, FunctionKind,
    FunctionLiteral, IfLiteral, Node, Program, TypeMarker, UnaryOp, Variable, WhileLiteral,
};

#[doc(hidden)]
pub mod bp {
    pub const MIN: u8 = 0;
    pub const ASSIGN: u8 = 2;
    pub const OR: u8 = 4;
    pub const AND: u8 = 6;
    pub const BIT_OR: u8 = 8;
    pub const BIT_XOR: u8 = 10;
    pub const BIT_AND: u8 = 12;
    pub const EQUALITY: u8 = 14;
    pub const COMPARISON: u8 = 16;
    pub const SHIFT: u8 = 18;
    pub const ADDITIVE: u8 = 20;
    pub const MULTIPLICATIVE: u8 = 22;
    pub const POWER: u8 = 24;
    pub const UNARY: u8 = 26;
    pub const POSTFIX: u8 = 28;
    pub const MEMBER: u8 = 30;
}

/// Returns `(left_bp, right_bp)` for an infix operator token, or `None` if
/// `kind` never appears in infix position. Right-associative operators
/// (assignment forms, `**`) return equal left/right powers so the
/// recursive call re-admits same-precedence operators on the right.
fn infix_binding_power(kind: TokenKind) -> Option<(u8, u8)> {
    use TokenKind::*;
    Some(match kind {
        k if k.is_assignment() => (bp::ASSIGN, bp::ASSIGN),
        Or => (bp::OR, bp::OR + 1),
        And => (bp::AND, bp::AND + 1),
        BitOr => (bp::BIT_OR, bp::BIT_OR + 1),
        BitXor => (bp::BIT_XOR, bp::BIT_XOR + 1),
        BitAnd => (bp::BIT_AND, bp::BIT_AND + 1),
        EqEq | NotEq => (bp::EQUALITY, bp::EQUALITY + 1),
        Less | LessEq | Greater | GreaterEq => (bp::COMPARISON, bp::COMPARISON + 1),
        LShift | RShift => (bp::SHIFT, bp::SHIFT + 1),
        Add | Sub => (bp::ADDITIVE, bp::ADDITIVE + 1),
        Mul | Div | Mod | FloorDiv => (bp::MULTIPLICATIVE, bp::MULTIPLICATIVE + 1),
        Pow => (bp::POWER, bp::POWER),
        Dot | Index => (bp::MEMBER, bp::MEMBER + 1),
        _ => return None,
    })
}

pub struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    filename: String,
    search_dirs: Vec<PathBuf>,
    native_registry: &'a mut NativeRegistry,
}

/// Parses a full token stream into a `Node::Program`, splicing in any
/// `load`-included source files and registering any `load`ed native
/// libraries along the way.
pub fn parse(
    tokens: Vec<Token>,
    filename: impl Into<String>,
    search_dirs: Vec<PathBuf>,
    native_registry: &mut NativeRegistry,
    diags: &mut Diagnostics,
) -> Node {
    let mut parser = Parser {
        tokens,
        pos: 0,
        filename: filename.into(),
        search_dirs,
        native_registry,
    };
    parser.parse_program(diags)
}

impl<'a> Parser<'a> {
    fn current(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn current_kind(&self) -> Option<TokenKind> {
        self.current().map(|t| t.kind)
    }

    fn advance(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn last_span(&self) -> Span {
        self.tokens.last().map(|t| t.span.clone()).unwrap_or_default()
    }

    fn current_span(&self) -> Span {
        self.current().map(|t| t.span.clone()).unwrap_or_else(|| self.last_span())
    }

    fn expect(&mut self, kind: TokenKind, diags: &mut Diagnostics) -> Token {
        match self.current() {
            Some(t) if t.kind == kind => self.advance().unwrap(),
            Some(t) => {
                let span = t.span.clone();
                let found = format!("{:?}", t.kind);
                diags.report(Diagnostic::new(
                    ErrorKind::Syntax(format!("expected {kind:?}, got {found}")),
                    span,
                    self.filename.clone(),
                ));
                self.advance();
                Token::new("", kind, self.last_span())
            }
            None => {
                diags.report(Diagnostic::new(
                    ErrorKind::Syntax(format!("expected {kind:?}, got end of input")),
                    self.last_span(),
                    self.filename.clone(),
                ));
                Token::new("", kind, self.last_span())
            }
        }
    }

    fn expect_semicolon(&mut self, diags: &mut Diagnostics) {
        match self.current_kind() {
            Some(TokenKind::Semicolon) => {
                self.advance();
            }
            _ => {
                diags.report(Diagnostic::new(
                    ErrorKind::MissingTerminator("missing ';' after statement".into()),
                    self.current_span(),
                    self.filename.clone(),
                ));
            }
        }
    }

    // -------------------------------------------------------------------
    // Top level
    // -------------------------------------------------------------------

    fn parse_program(&mut self, diags: &mut Diagnostics) -> Node {
        let mut stmts = Vec::new();
        while self.current().is_some() {
            let stmt = self.parse_statement(diags);
            if diags.has_errors() {
                break;
            }
            if stmt.no_op && !stmt.is_break && !stmt.is_continue {
                if let Node::Program(imported) = *stmt.expr {
                    stmts.extend(imported.stmts);
                    continue;
                }
            }
            stmts.push(stmt);
        }
        Node::Program(Program { stmts })
    }

    fn parse_block(&mut self, diags: &mut Diagnostics) -> Vec<ExpressionStmt> {
        self.expect(TokenKind::OpenBrace, diags);
        let mut stmts = Vec::new();
        loop {
            match self.current_kind() {
                Some(TokenKind::CloseBrace) => {
                    self.advance();
                    break;
                }
                None => {
                    diags.report(Diagnostic::new(
                        ErrorKind::Syntax("closing brace required for code block".into()),
                        self.last_span(),
                        self.filename.clone(),
                    ));
                    break;
                }
                _ => {
                    let stmt = self.parse_statement(diags);
                    if diags.has_errors() {
                        break;
                    }
                    if !stmt.no_op || stmt.is_break || stmt.is_continue {
                        stmts.push(stmt);
                    }
                }
            }
        }
        stmts
    }

    /// `if`/`while`/`for` accept either a `{ }` block or a single statement.
    fn parse_block_or_single(&mut self, diags: &mut Diagnostics) -> Vec<ExpressionStmt> {
        if self.current_kind() == Some(TokenKind::OpenBrace) {
            self.parse_block(diags)
        } else {
            vec![self.parse_statement(diags)]
        }
    }

    // -------------------------------------------------------------------
    // Statements
    // -------------------------------------------------------------------

    fn parse_statement(&mut self, diags: &mut Diagnostics) -> ExpressionStmt {
        match self.current_kind() {
            Some(TokenKind::Load) => self.parse_load(diags),
            Some(TokenKind::Form) => self.parse_function(FunctionKind::Form, diags),
            Some(TokenKind::Inline) => self.parse_function(FunctionKind::Inline, diags),
            Some(TokenKind::Class) => self.parse_class(diags),
            Some(TokenKind::Return) => self.parse_return(diags),
            Some(TokenKind::If) => ExpressionStmt::new(self.parse_if(diags)),
            Some(TokenKind::While) => ExpressionStmt::new(self.parse_while(diags)),
            Some(TokenKind::For) => ExpressionStmt::new(self.parse_for(diags)),
            Some(TokenKind::Break) => {
                self.advance();
                self.expect_semicolon(diags);
                ExpressionStmt::control(true, false)
            }
            Some(TokenKind::Continue) => {
                self.advance();
                self.expect_semicolon(diags);
                ExpressionStmt::control(false, true)
            }
            _ => {
                let expr = self.parse_expr(bp::MIN, diags);
                self.expect_semicolon(diags);
                ExpressionStmt::new(expr)
            }
        }
    }

    /// `load "<file>.<ext>";` splices a source file's `Program` into this
    /// one when `<ext>` matches [`SOURCE_EXT`]; otherwise `<file>` is a
    /// dynamic native-library basename, per `spec.md` §4.2/§4.6.
    fn parse_load(&mut self, diags: &mut Diagnostics) -> ExpressionStmt {
        self.advance();
        let tok = self.expect(TokenKind::Str, diags);
        let span = tok.span.clone();
        self.expect_semicolon(diags);

        let target = String::from_utf8_lossy(&glint_lex::decode_escapes(&tok.text)).into_owned();
        let is_source = std::path::Path::new(&target)
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| ext == SOURCE_EXT);

        if is_source {
            match std::fs::read_to_string(&target) {
                Ok(src) => {
                    let lexer = Lexer::new(&src, target.clone());
                    let tokens = lexer.tokenize(diags);
                    let program = parse(
                        tokens,
                        target.clone(),
                        self.search_dirs.clone(),
                        self.native_registry,
                        diags,
                    );
                    ExpressionStmt {
                        expr: Box::new(program),
                        no_op: true,
                        is_break: false,
                        is_continue: false,
                    }
                }
                Err(e) => {
                    diags.report(Diagnostic::new(
                        ErrorKind::Syntax(format!("failed to read load target '{target}': {e}")),
                        span,
                        self.filename.clone(),
                    ));
                    ExpressionStmt::no_op()
                }
            }
        } else {
            if let Err(e) =
                glint_native::load_library(&target, &self.search_dirs, self.native_registry)
            {
                diags.report(Diagnostic::new(
                    ErrorKind::Syntax(format!("load: {e}")),
                    span,
                    self.filename.clone(),
                ));
            }
            ExpressionStmt::no_op()
        }
    }

    fn parse_params(&mut self, diags: &mut Diagnostics) -> Vec<String> {
        self.expect(TokenKind::OpenParen, diags);
        let mut params = Vec::new();
        if self.current_kind() != Some(TokenKind::CloseParen) {
            loop {
                let name = self.expect(TokenKind::Ident, diags);
                params.push(name.text);
                if self.current_kind() == Some(TokenKind::Comma) {
                    self.advance();
                } else {
                    break;
                }
            }
        }
        self.expect(TokenKind::CloseParen, diags);
        params
    }

    fn parse_function(&mut self, kind: FunctionKind, diags: &mut Diagnostics) -> ExpressionStmt {
        self.advance();
        let name = self.expect(TokenKind::Ident, diags).text;
        let params = self.parse_params(diags);
        let stmts = self.parse_block(diags);
        ExpressionStmt::new(Node::FunctionLiteral(FunctionLiteral {
            kind,
            name,
            params,
            stmts,
        }))
    }

    fn parse_class(&mut self, diags: &mut Diagnostics) -> ExpressionStmt {
        self.advance();
        let name = self.expect(TokenKind::Ident, diags).text;
        let params = self.parse_params(diags);
        let stmts = self.parse_block(diags);
        ExpressionStmt::new(Node::ClassLiteral(ClassLiteral { name, params, stmts }))
    }

    fn parse_return(&mut self, diags: &mut Diagnostics) -> ExpressionStmt {
        self.advance();
        let value = self.parse_expr(bp::MIN, diags);
        self.expect_semicolon(diags);
        ExpressionStmt::new(Node::ReturnLiteral(Box::new(value)))
    }

    fn parse_if(&mut self, diags: &mut Diagnostics) -> Node {
        self.advance();
        let condition = Box::new(self.parse_expr(bp::MIN, diags));
        let then_stmts = self.parse_block_or_single(diags);
        let else_stmts = if self.current_kind() == Some(TokenKind::Else) {
            self.advance();
            self.parse_block_or_single(diags)
        } else {
            Vec::new()
        };
        Node::IfLiteral(IfLiteral {
            condition,
            then_stmts,
            else_stmts,
        })
    }

    fn parse_while(&mut self, diags: &mut Diagnostics) -> Node {
        self.advance();
        let condition = Box::new(self.parse_expr(bp::MIN, diags));
        let stmts = self.parse_block_or_single(diags);
        Node::WhileLiteral(WhileLiteral { condition, stmts })
    }

    fn parse_for(&mut self, diags: &mut Diagnostics) -> Node {
        self.advance();
        let var = self.expect(TokenKind::Ident, diags).text;
        self.expect(TokenKind::Iter, diags);
        let iter = Box::new(self.parse_expr(bp::MIN, diags));
        let stmts = self.parse_block_or_single(diags);
        Node::ForLiteral(ForLiteral { var, iter, stmts })
    }

    // -------------------------------------------------------------------
    // Expressions (Pratt)
    // -------------------------------------------------------------------

    fn parse_expr(&mut self, min_bp: u8, diags: &mut Diagnostics) -> Node {
        let mut lhs = self.parse_prefix(diags);

        loop {
            let Some(op) = self.current_kind() else { break };

            if matches!(op, TokenKind::Increment | TokenKind::Decrement) {
                if bp::POSTFIX < min_bp {
                    break;
                }
                self.advance();
                lhs = Node::UnaryOp(UnaryOp {
                    op,
                    operand: Box::new(lhs),
                });
                continue;
            }

            let Some((lbp, rbp)) = infix_binding_power(op) else { break };
            if lbp < min_bp {
                break;
            }
            let op_span = self.current_span();
            self.advance();

            if op == TokenKind::Assign {
                let rhs = self.parse_expr(rbp, diags);
                lhs = self.plain_assign(lhs, rhs, op_span, diags);
            } else if op.is_assignment() {
                let rhs = self.parse_expr(rbp, diags);
                lhs = self.compound_assign(op, lhs, rhs, op_span, diags);
            } else if op == TokenKind::Dot {
                let name = self.expect(TokenKind::Ident, diags).text;
                let right = Node::Variable(Variable { name, value: None });
                lhs = Node::BinaryOp(BinaryOp {
                    op,
                    left: Box::new(lhs),
                    right: Box::new(right),
                });
            } else {
                let rhs = self.parse_expr(rbp, diags);
                lhs = Node::BinaryOp(BinaryOp {
                    op,
                    left: Box::new(lhs),
                    right: Box::new(rhs),
                });
            }
        }

        lhs
    }

    fn plain_assign(
        &mut self,
        lhs: Node,
        rhs: Node,
        span: Span,
        diags: &mut Diagnostics,
    ) -> Node {
        match lhs {
            Node::Variable(v) if v.value.is_none() => Node::Variable(Variable {
                name: v.name,
                value: Some(Box::new(rhs)),
            }),
            other => {
                diags.report(Diagnostic::new(
                    ErrorKind::Syntax("assignment target must be a variable".into()),
                    span,
                    self.filename.clone(),
                ));
                other
            }
        }
    }

    fn compound_assign(
        &mut self,
        op: TokenKind,
        lhs: Node,
        rhs: Node,
        span: Span,
        diags: &mut Diagnostics,
    ) -> Node {
        match lhs {
            Node::Variable(v) if v.value.is_none() => Node::BinaryOp(BinaryOp {
                op,
                left: Box::new(Node::Variable(v)),
                right: Box::new(rhs),
            }),
            other => {
                diags.report(Diagnostic::new(
                    ErrorKind::Syntax("assignment target must be a variable".into()),
                    span,
                    self.filename.clone(),
                ));
                other
            }
        }
    }

    /// Prefix position: unary operators bind tighter than any infix
    /// operator (`bp::UNARY`), then fall through to a primary expression.
    fn parse_prefix(&mut self, diags: &mut Diagnostics) -> Node {
        match self.current_kind() {
            Some(TokenKind::Sub) => {
                self.advance();
                let operand = self.parse_expr(bp::UNARY, diags);
                Node::UnaryOp(UnaryOp {
                    op: TokenKind::Negate,
                    operand: Box::new(operand),
                })
            }
            Some(op @ (TokenKind::Not | TokenKind::BitNot | TokenKind::Increment | TokenKind::Decrement)) => {
                self.advance();
                let operand = self.parse_expr(bp::UNARY, diags);
                Node::UnaryOp(UnaryOp {
                    op,
                    operand: Box::new(operand),
                })
            }
            _ => self.parse_primary(diags),
        }
    }

    fn parse_primary(&mut self, diags: &mut Diagnostics) -> Node {
        let Some(tok) = self.current().cloned() else {
            diags.report(Diagnostic::new(
                ErrorKind::Syntax("expected expression, got end of input".into()),
                self.last_span(),
                self.filename.clone(),
            ));
            return Node::NoOp;
        };

        match tok.kind {
            TokenKind::IntHex => {
                self.advance();
                Node::IntLiteral(i64::from_str_radix(&tok.text, 16).unwrap_or(0))
            }
            TokenKind::IntOct => {
                self.advance();
                Node::IntLiteral(i64::from_str_radix(&tok.text, 8).unwrap_or(0))
            }
            TokenKind::IntBin => {
                self.advance();
                Node::IntLiteral(i64::from_str_radix(&tok.text, 2).unwrap_or(0))
            }
            TokenKind::IntDec => {
                self.advance();
                Node::IntLiteral(tok.text.parse().unwrap_or(0))
            }
            TokenKind::Float => {
                self.advance();
                Node::FloatLiteral(tok.text.parse().unwrap_or(0.0))
            }
            TokenKind::Str => {
                self.advance();
                let bytes = glint_lex::decode_escapes(&tok.text);
                Node::StrLiteral(String::from_utf8_lossy(&bytes).into_owned())
            }
            TokenKind::Chr => {
                self.advance();
                let bytes = glint_lex::decode_escapes(&tok.text);
                Node::IntLiteral(*bytes.first().unwrap_or(&0) as i64)
            }
            TokenKind::BoolLit => {
                self.advance();
                Node::BoolLiteral(tok.text == "true")
            }
            TokenKind::TypeInt => {
                self.advance();
                Node::TypeLiteral(TypeMarker::Int)
            }
            TokenKind::TypeFloat => {
                self.advance();
                Node::TypeLiteral(TypeMarker::Float)
            }
            TokenKind::TypeStr => {
                self.advance();
                Node::TypeLiteral(TypeMarker::Str)
            }
            TokenKind::TypeBool => {
                self.advance();
                Node::TypeLiteral(TypeMarker::Bool)
            }
            TokenKind::TypeVec => {
                self.advance();
                Node::TypeLiteral(TypeMarker::Vec)
            }
            TokenKind::Ident => {
                self.advance();
                if self.current_kind() == Some(TokenKind::OpenParen) {
                    let args = self.parse_call_args(diags);
                    Node::FunctionCall(FunctionCall {
                        name: tok.text,
                        args,
                    })
                } else {
                    Node::Variable(Variable {
                        name: tok.text,
                        value: None,
                    })
                }
            }
            TokenKind::OpenBracket => {
                self.advance();
                let mut elems = Vec::new();
                if self.current_kind() != Some(TokenKind::CloseBracket) {
                    loop {
                        elems.push(self.parse_expr(bp::MIN, diags));
                        if self.current_kind() == Some(TokenKind::Comma) {
                            self.advance();
                        } else {
                            break;
                        }
                    }
                }
                self.expect(TokenKind::CloseBracket, diags);
                Node::VecLiteral(elems)
            }
            TokenKind::OpenParen => {
                self.advance();
                let inner = self.parse_expr(bp::MIN, diags);
                self.expect(TokenKind::CloseParen, diags);
                inner
            }
            _ => {
                diags.report(Diagnostic::new(
                    ErrorKind::Syntax(format!("unexpected token {:?} in expression", tok.kind)),
                    tok.span,
                    self.filename.clone(),
                ));
                self.advance();
                Node::NoOp
            }
        }
    }

    fn parse_call_args(&mut self, diags: &mut Diagnostics) -> Vec<Node> {
        self.expect(TokenKind::OpenParen, diags);
        let mut args = Vec::new();
        if self.current_kind() != Some(TokenKind::CloseParen) {
            loop {
                args.push(self.parse_expr(bp::MIN, diags));
                if self.current_kind() == Some(TokenKind::Comma) {
                    self.advance();
                } else {
                    break;
                }
            }
        }
        self.expect(TokenKind::CloseParen, diags);
        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glint_lex::Lexer;

    fn parse_source(src: &str) -> (Node, Diagnostics) {
        let mut diags = Diagnostics::new();
        let tokens = Lexer::new(src, "test.gln").tokenize(&mut diags);
        let mut registry = NativeRegistry::new();
        let program = parse(tokens, "test.gln", vec![], &mut registry, &mut diags);
        (program, diags)
    }

    #[test]
    fn parses_arithmetic_precedence() {
        let (program, diags) = parse_source("1+2*3;");
        assert!(!diags.has_errors());
        let Node::Program(p) = program else { panic!() };
        assert_eq!(p.stmts.len(), 1);
        let Node::BinaryOp(b) = &*p.stmts[0].expr else { panic!() };
        assert_eq!(b.op, TokenKind::Add);
        assert!(matches!(&*b.right, Node::BinaryOp(inner) if inner.op == TokenKind::Mul));
    }

    #[test]
    fn parses_plain_assignment_into_variable_node() {
        let (program, diags) = parse_source("i = 0;");
        assert!(!diags.has_errors());
        let Node::Program(p) = program else { panic!() };
        let Node::Variable(v) = &*p.stmts[0].expr else { panic!() };
        assert_eq!(v.name, "i");
        assert!(matches!(v.value.as_deref(), Some(Node::IntLiteral(0))));
    }

    #[test]
    fn parses_compound_assignment_as_binary_op() {
        let (program, _) = parse_source("i += 1;");
        let Node::Program(p) = program else { panic!() };
        let Node::BinaryOp(b) = &*p.stmts[0].expr else { panic!() };
        assert_eq!(b.op, TokenKind::AddAssign);
        assert!(matches!(&*b.left, Node::Variable(v) if v.name == "i"));
    }

    #[test]
    fn parses_function_call() {
        let (program, diags) = parse_source("println(1, 2);");
        assert!(!diags.has_errors());
        let Node::Program(p) = program else { panic!() };
        let Node::FunctionCall(c) = &*p.stmts[0].expr else { panic!() };
        assert_eq!(c.name, "println");
        assert_eq!(c.args.len(), 2);
    }

    #[test]
    fn parses_if_else() {
        let (program, diags) = parse_source("if 2==2 println(\"ok\"); else println(\"bad\");");
        assert!(!diags.has_errors());
        let Node::Program(p) = program else { panic!() };
        let Node::IfLiteral(i) = &*p.stmts[0].expr else { panic!() };
        assert_eq!(i.then_stmts.len(), 1);
        assert_eq!(i.else_stmts.len(), 1);
    }

    #[test]
    fn parses_vec_literal() {
        let (program, diags) = parse_source("println([1,2,3]);");
        assert!(!diags.has_errors());
        let Node::Program(p) = program else { panic!() };
        let Node::FunctionCall(c) = &*p.stmts[0].expr else { panic!() };
        assert!(matches!(&c.args[0], Node::VecLiteral(elems) if elems.len() == 3));
    }

    #[test]
    fn missing_semicolon_is_diagnosed() {
        let (_, diags) = parse_source("println(1)");
        assert!(diags.has_errors());
        assert_eq!(diags.errors[0].kind.class_name(), "MissingTerminatorError");
    }

    #[test]
    fn power_is_right_associative() {
        let (program, _) = parse_source("2**3**2;");
        let Node::Program(p) = program else { panic!() };
        let Node::BinaryOp(b) = &*p.stmts[0].expr else { panic!() };
        assert!(matches!(&*b.right, Node::BinaryOp(inner) if inner.op == TokenKind::Pow));
    }

    #[test]
    fn for_loop_parses_iterator_variable_and_block() {
        let (program, diags) = parse_source("for x $ [1,2,3] { println(x); }");
        assert!(!diags.has_errors());
        let Node::Program(p) = program else { panic!() };
        let Node::ForLiteral(f) = &*p.stmts[0].expr else { panic!() };
        assert_eq!(f.var, "x");
        assert_eq!(f.stmts.len(), 1);
    }
}
