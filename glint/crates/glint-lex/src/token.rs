use glint_util::Span;

/// Every distinct lexical/operator category the language recognises, *and*
/// every opcode the compiler/VM speak — `spec.md` §4.3 has the bytecode
/// instruction reuse `TokenKind` as its opcode field directly, so this is
/// the single enum both the lexer and the compiler/VM dispatch on.
///
/// A handful of variants are never produced by the lexer (`PushInt`,
/// `Var`, `Print`, ...) and exist purely as opcodes emitted by the
/// compiler; a handful of others are lexer-only punctuation that never
/// appears in a bytecode stream (`OpenParen`, `Comma`, ...). Keeping them
/// in one enum is what lets the compiler reuse a unary/binary operator
/// token verbatim as the instruction it emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Compiler/VM push opcodes (never lexed directly).
    PushInt,
    PushFloat,
    PushString,
    PushBool,

    // Unary operators.
    Not,
    BitNot,
    Increment,
    Decrement,
    Negate,

    // Binary arithmetic / bitwise operators.
    Add,
    Sub,
    Mod,
    Pow,
    Mul,
    Div,
    FloorDiv,
    And,
    Or,
    BitAnd,
    BitXor,
    BitOr,
    LShift,
    RShift,
    Index,
    Dot,

    // Comparisons.
    Less,
    LessEq,
    Greater,
    GreaterEq,
    EqEq,
    NotEq,

    // Assignment forms.
    Assign,
    AddAssign,
    SubAssign,
    ModAssign,
    PowAssign,
    MulAssign,
    DivAssign,
    FloorDivAssign,
    AndAssign,
    OrAssign,
    BitAndAssign,
    BitXorAssign,
    BitOrAssign,
    LShiftAssign,
    RShiftAssign,

    // Punctuation.
    OpenParen,
    CloseParen,
    OpenBrace,
    CloseBrace,
    OpenBracket,
    CloseBracket,
    Comma,
    Semicolon,
    Colon,
    Iter,

    // Keywords.
    Load,
    Form,
    Inline,
    Return,
    Class,
    If,
    Else,
    While,
    For,
    Break,
    Continue,

    // Type markers.
    TypeInt,
    TypeStr,
    TypeFloat,
    TypeBool,
    TypeVec,

    // Literals and identifiers.
    IntHex,
    IntDec,
    IntOct,
    IntBin,
    Float,
    BoolLit,
    Str,
    Chr,
    Ident,

    // Compiler-only print opcodes.
    Var,
    Print,
    Println,
}

impl TokenKind {
    /// Keywords recognised after identifier scanning; unmatched text stays `Ident`.
    pub fn keyword(text: &str) -> Option<TokenKind> {
        Some(match text {
            "int" => TokenKind::TypeInt,
            "str" => TokenKind::TypeStr,
            "float" => TokenKind::TypeFloat,
            "bool" => TokenKind::TypeBool,
            "vec" => TokenKind::TypeVec,
            "load" => TokenKind::Load,
            "form" => TokenKind::Form,
            "inline" => TokenKind::Inline,
            "return" => TokenKind::Return,
            "class" => TokenKind::Class,
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "while" => TokenKind::While,
            "for" => TokenKind::For,
            "break" => TokenKind::Break,
            "continue" => TokenKind::Continue,
            "true" | "false" => TokenKind::BoolLit,
            _ => return None,
        })
    }

    /// `true` for every binary operator the compiler/VM evaluate through
    /// the shared `eval_binary_op` (i.e. everything an assignment form
    /// eventually reduces to plus the plain forms themselves).
    pub fn is_binary_op(self) -> bool {
        matches!(
            self,
            TokenKind::Add
                | TokenKind::Sub
                | TokenKind::Mod
                | TokenKind::Pow
                | TokenKind::Mul
                | TokenKind::Div
                | TokenKind::FloorDiv
                | TokenKind::And
                | TokenKind::Or
                | TokenKind::BitAnd
                | TokenKind::BitXor
                | TokenKind::BitOr
                | TokenKind::LShift
                | TokenKind::RShift
                | TokenKind::Less
                | TokenKind::LessEq
                | TokenKind::Greater
                | TokenKind::GreaterEq
                | TokenKind::EqEq
                | TokenKind::NotEq
                | TokenKind::Index
                | TokenKind::Dot
        )
    }

    pub fn is_unary_op(self) -> bool {
        matches!(
            self,
            TokenKind::Not
                | TokenKind::BitNot
                | TokenKind::Increment
                | TokenKind::Decrement
                | TokenKind::Negate
        )
    }

    /// Strips the `=` off an assignment-form binary opcode, returning the
    /// plain binary op it compounds (`+=` -> `+`). Plain `Assign` has no
    /// underlying binary op and returns `None`.
    pub fn compound_op(self) -> Option<TokenKind> {
        Some(match self {
            TokenKind::AddAssign => TokenKind::Add,
            TokenKind::SubAssign => TokenKind::Sub,
            TokenKind::ModAssign => TokenKind::Mod,
            TokenKind::PowAssign => TokenKind::Pow,
            TokenKind::MulAssign => TokenKind::Mul,
            TokenKind::DivAssign => TokenKind::Div,
            TokenKind::FloorDivAssign => TokenKind::FloorDiv,
            TokenKind::AndAssign => TokenKind::And,
            TokenKind::OrAssign => TokenKind::Or,
            TokenKind::BitAndAssign => TokenKind::BitAnd,
            TokenKind::BitXorAssign => TokenKind::BitXor,
            TokenKind::BitOrAssign => TokenKind::BitOr,
            TokenKind::LShiftAssign => TokenKind::LShift,
            TokenKind::RShiftAssign => TokenKind::RShift,
            _ => return None,
        })
    }

    pub fn is_assignment(self) -> bool {
        self == TokenKind::Assign || self.compound_op().is_some()
    }

    /// Right-associative operators: assignment forms and `**`.
    pub fn is_right_assoc(self) -> bool {
        self.is_assignment() || self == TokenKind::Pow
    }
}

/// A lexed token: the verbatim source text, its kind, and the span it came
/// from. String/char literal text is stored verbatim (escapes undecoded);
/// the parser decodes them via [`crate::escape::decode_escapes`].
#[derive(Debug, Clone)]
pub struct Token {
    pub text: String,
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(text: impl Into<String>, kind: TokenKind, span: Span) -> Self {
        Self {
            text: text.into(),
            kind,
            span,
        }
    }
}
