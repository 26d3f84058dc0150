//! Byte-level scanner: consumes a source string, produces a finite token
//! vector. Never suspends; fails fatally through the [`Diagnostics`] sink on
//! unterminated string/char literals or an illegal integer radix specifier.
//!
//! Grounded on `original_source/src/lexer.cpp`: operator lexing dispatches
//! per leading byte and peeks one or two characters ahead for the longest
//! match; number lexing swaps a radix-specific digit predicate rather than
//! branching per digit.

use glint_util::diagnostic::{Diagnostic, ErrorKind};
use glint_util::{Diagnostics, Span};

use crate::token::{Token, TokenKind};

pub struct Lexer<'a> {
    source: &'a [u8],
    pos: usize,
    line: u32,
    col: u32,
    line_start: usize,
    filename: String,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str, filename: impl Into<String>) -> Self {
        Self {
            source: source.as_bytes(),
            pos: 0,
            line: 1,
            col: 0,
            line_start: 0,
            filename: filename.into(),
            tokens: Vec::new(),
        }
    }

    fn cur(&self) -> u8 {
        *self.source.get(self.pos).unwrap_or(&0)
    }

    fn peek_at(&self, offset: usize) -> u8 {
        *self.source.get(self.pos + offset).unwrap_or(&0)
    }

    fn advance(&mut self) {
        if self.cur() == b'\n' {
            self.line += 1;
            self.col = 0;
            self.line_start = self.pos + 1;
        } else {
            self.col += 1;
        }
        self.pos += 1;
    }

    fn advance_n(&mut self, n: usize) {
        for _ in 0..n {
            self.advance();
        }
    }

    fn line_text(&self) -> String {
        let end = self.source[self.line_start..]
            .iter()
            .position(|&b| b == b'\n')
            .map(|p| self.line_start + p)
            .unwrap_or(self.source.len());
        String::from_utf8_lossy(&self.source[self.line_start..end]).into_owned()
    }

    fn span(&self, start_col: u32) -> Span {
        Span::new(self.line, start_col, self.col, self.line_text())
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.cur() {
                b' ' | b'\t' | b'\r' => self.advance(),
                b'~' => {
                    while self.cur() != b'\n' && self.cur() != 0 {
                        self.advance();
                    }
                }
                b'\n' => self.advance(),
                _ => break,
            }
        }
    }

    /// Scans the whole source into a finite token vector. Fatal lexical
    /// errors (unterminated literal, illegal radix specifier) are reported
    /// to `diags`; the offending token is skipped and scanning continues
    /// so later errors in the same file can also be reported.
    pub fn tokenize(mut self, diags: &mut Diagnostics) -> Vec<Token> {
        loop {
            self.skip_whitespace_and_comments();
            if self.pos >= self.source.len() {
                break;
            }
            self.scan_one(diags);
        }
        self.tokens
    }

    fn push(&mut self, text: impl Into<String>, kind: TokenKind, start_col: u32) {
        let span = self.span(start_col);
        self.tokens.push(Token::new(text, kind, span));
    }

    fn scan_one(&mut self, diags: &mut Diagnostics) {
        let start_col = self.col;
        let c = self.cur();

        macro_rules! two_char {
            ($second:expr, $text2:expr, $kind2:expr, $text1:expr, $kind1:expr) => {{
                if self.peek_at(1) == $second {
                    self.advance_n(2);
                    self.push($text2, $kind2, start_col);
                } else {
                    self.advance();
                    self.push($text1, $kind1, start_col);
                }
            }};
        }

        match c {
            b'+' => match self.peek_at(1) {
                b'+' => {
                    self.advance_n(2);
                    self.push("++", TokenKind::Increment, start_col);
                }
                b'=' => {
                    self.advance_n(2);
                    self.push("+=", TokenKind::AddAssign, start_col);
                }
                _ => {
                    self.advance();
                    self.push("+", TokenKind::Add, start_col);
                }
            },
            b'-' => match self.peek_at(1) {
                b'-' => {
                    self.advance_n(2);
                    self.push("--", TokenKind::Decrement, start_col);
                }
                b'=' => {
                    self.advance_n(2);
                    self.push("-=", TokenKind::SubAssign, start_col);
                }
                _ => {
                    self.advance();
                    self.push("-", TokenKind::Sub, start_col);
                }
            },
            b'*' => {
                if self.peek_at(1) == b'*' {
                    if self.peek_at(2) == b'=' {
                        self.advance_n(3);
                        self.push("**=", TokenKind::PowAssign, start_col);
                    } else {
                        self.advance_n(2);
                        self.push("**", TokenKind::Pow, start_col);
                    }
                } else {
                    two_char!(b'=', "*=", TokenKind::MulAssign, "*", TokenKind::Mul);
                }
            }
            b'/' => {
                if self.peek_at(1) == b'/' {
                    if self.peek_at(2) == b'=' {
                        self.advance_n(3);
                        self.push("//=", TokenKind::FloorDivAssign, start_col);
                    } else {
                        self.advance_n(2);
                        self.push("//", TokenKind::FloorDiv, start_col);
                    }
                } else {
                    two_char!(b'=', "/=", TokenKind::DivAssign, "/", TokenKind::Div);
                }
            }
            b'%' => two_char!(b'=', "%=", TokenKind::ModAssign, "%", TokenKind::Mod),
            b'&' => {
                if self.peek_at(1) == b'&' {
                    if self.peek_at(2) == b'=' {
                        self.advance_n(3);
                        self.push("&&=", TokenKind::AndAssign, start_col);
                    } else {
                        self.advance_n(2);
                        self.push("&&", TokenKind::And, start_col);
                    }
                } else {
                    two_char!(
                        b'=',
                        "&=",
                        TokenKind::BitAndAssign,
                        "&",
                        TokenKind::BitAnd
                    );
                }
            }
            b'|' => {
                if self.peek_at(1) == b'|' {
                    if self.peek_at(2) == b'=' {
                        self.advance_n(3);
                        self.push("||=", TokenKind::OrAssign, start_col);
                    } else {
                        self.advance_n(2);
                        self.push("||", TokenKind::Or, start_col);
                    }
                } else {
                    two_char!(b'=', "|=", TokenKind::BitOrAssign, "|", TokenKind::BitOr);
                }
            }
            b'^' => two_char!(
                b'=',
                "^=",
                TokenKind::BitXorAssign,
                "^",
                TokenKind::BitXor
            ),
            b'<' => {
                if self.peek_at(1) == b'<' {
                    if self.peek_at(2) == b'=' {
                        self.advance_n(3);
                        self.push("<<=", TokenKind::LShiftAssign, start_col);
                    } else {
                        self.advance_n(2);
                        self.push("<<", TokenKind::LShift, start_col);
                    }
                } else {
                    two_char!(b'=', "<=", TokenKind::LessEq, "<", TokenKind::Less);
                }
            }
            b'>' => {
                if self.peek_at(1) == b'>' {
                    if self.peek_at(2) == b'=' {
                        self.advance_n(3);
                        self.push(">>=", TokenKind::RShiftAssign, start_col);
                    } else {
                        self.advance_n(2);
                        self.push(">>", TokenKind::RShift, start_col);
                    }
                } else {
                    two_char!(b'=', ">=", TokenKind::GreaterEq, ">", TokenKind::Greater);
                }
            }
            b'!' => {
                if self.peek_at(1) == b'!' {
                    self.advance_n(2);
                    self.push("!!", TokenKind::BitNot, start_col);
                } else {
                    two_char!(b'=', "!=", TokenKind::NotEq, "!", TokenKind::Not);
                }
            }
            b'=' => two_char!(b'=', "==", TokenKind::EqEq, "=", TokenKind::Assign),
            b'.' => {
                self.advance();
                self.push(".", TokenKind::Dot, start_col);
            }
            b'@' => {
                self.advance();
                self.push("@", TokenKind::Index, start_col);
            }
            b'$' => {
                self.advance();
                self.push("$", TokenKind::Iter, start_col);
            }
            b'(' => {
                self.advance();
                self.push("(", TokenKind::OpenParen, start_col);
            }
            b')' => {
                self.advance();
                self.push(")", TokenKind::CloseParen, start_col);
            }
            b'{' => {
                self.advance();
                self.push("{", TokenKind::OpenBrace, start_col);
            }
            b'}' => {
                self.advance();
                self.push("}", TokenKind::CloseBrace, start_col);
            }
            b'[' => {
                self.advance();
                self.push("[", TokenKind::OpenBracket, start_col);
            }
            b']' => {
                self.advance();
                self.push("]", TokenKind::CloseBracket, start_col);
            }
            b',' => {
                self.advance();
                self.push(",", TokenKind::Comma, start_col);
            }
            b';' => {
                self.advance();
                self.push(";", TokenKind::Semicolon, start_col);
            }
            b':' => {
                self.advance();
                self.push(":", TokenKind::Colon, start_col);
            }
            b'"' => self.scan_string(diags, start_col),
            b'\'' => self.scan_char_or_string(diags, start_col),
            b'0'..=b'9' => self.scan_number(diags, start_col),
            c if c.is_ascii_alphabetic() || c == b'_' => self.scan_ident(start_col),
            _ => {
                // Unrecognised byte: report and skip so the rest of the file
                // can still be scanned.
                diags.report(Diagnostic::new(
                    ErrorKind::Syntax(format!("unexpected character '{}'", c as char)),
                    self.span(start_col),
                    self.filename.clone(),
                ));
                self.advance();
            }
        }
    }

    fn scan_string(&mut self, diags: &mut Diagnostics, start_col: u32) {
        self.advance(); // opening quote
        let body_start = self.pos;
        while self.cur() != b'"' && self.cur() != 0 {
            self.advance();
        }
        if self.cur() == 0 {
            diags.report(Diagnostic::new(
                ErrorKind::MissingTerminator("unterminated string literal".into()),
                self.span(start_col),
                self.filename.clone(),
            ));
            return;
        }
        let text = String::from_utf8_lossy(&self.source[body_start..self.pos]).into_owned();
        self.advance(); // closing quote
        self.push(text, TokenKind::Str, start_col);
    }

    fn scan_char_or_string(&mut self, diags: &mut Diagnostics, start_col: u32) {
        self.advance(); // opening quote
        let body_start = self.pos;
        while self.cur() != b'\'' && self.cur() != 0 {
            self.advance();
        }
        if self.cur() == 0 {
            diags.report(Diagnostic::new(
                ErrorKind::MissingTerminator("unterminated char literal".into()),
                self.span(start_col),
                self.filename.clone(),
            ));
            return;
        }
        let text = String::from_utf8_lossy(&self.source[body_start..self.pos]).into_owned();
        let kind = if self.pos - body_start == 1 {
            TokenKind::Chr
        } else {
            TokenKind::Str
        };
        self.advance(); // closing quote
        self.push(text, kind, start_col);
    }

    fn scan_number(&mut self, diags: &mut Diagnostics, start_col: u32) {
        let mut kind = TokenKind::IntDec;
        let is_digit: fn(u8) -> bool = |b| b.is_ascii_digit();
        let mut is_digit = is_digit;

        if self.cur() == b'0' {
            match self.peek_at(1) {
                b'x' => {
                    kind = TokenKind::IntHex;
                    is_digit = |b: u8| b.is_ascii_hexdigit();
                    self.advance_n(2);
                }
                b'd' => {
                    kind = TokenKind::IntDec;
                    self.advance_n(2);
                }
                b'o' => {
                    kind = TokenKind::IntOct;
                    is_digit = |b: u8| (b'0'..=b'7').contains(&b);
                    self.advance_n(2);
                }
                b'b' => {
                    kind = TokenKind::IntBin;
                    is_digit = |b: u8| b == b'0' || b == b'1';
                    self.advance_n(2);
                }
                other if other.is_ascii_alphanumeric() => {
                    diags.report(Diagnostic::new(
                        ErrorKind::Syntax(format!(
                            "illegal integer literal radix specifier: 0{}",
                            other as char
                        )),
                        self.span(start_col),
                        self.filename.clone(),
                    ));
                    self.advance_n(2);
                }
                _ => {}
            }
        }

        let digits_start = self.pos;
        while is_digit(self.cur()) {
            self.advance();
        }

        if self.cur() == b'.' && kind == TokenKind::IntDec {
            self.advance();
            while self.cur().is_ascii_digit() {
                self.advance();
            }
            let text = String::from_utf8_lossy(&self.source[digits_start..self.pos]).into_owned();
            self.push(text, TokenKind::Float, start_col);
            return;
        }
        if self.cur() == b'.' {
            diags.report(Diagnostic::new(
                ErrorKind::Syntax(
                    "floating-point literals with specified radixes are not supported".into(),
                ),
                self.span(start_col),
                self.filename.clone(),
            ));
        }

        let text = String::from_utf8_lossy(&self.source[digits_start..self.pos]).into_owned();
        self.push(text, kind, start_col);
    }

    fn scan_ident(&mut self, start_col: u32) {
        let text_start = self.pos;
        while {
            let c = self.cur();
            c.is_ascii_alphanumeric() || c == b'_'
        } {
            self.advance();
        }
        let text = String::from_utf8_lossy(&self.source[text_start..self.pos]).into_owned();
        let kind = TokenKind::keyword(&text).unwrap_or(TokenKind::Ident);
        self.push(text, kind, start_col);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(src: &str) -> (Vec<Token>, Diagnostics) {
        let mut diags = Diagnostics::new();
        let tokens = Lexer::new(src, "test.gln").tokenize(&mut diags);
        (tokens, diags)
    }

    #[test]
    fn lexes_basic_arithmetic() {
        let (tokens, diags) = lex("1+2*3;");
        assert!(!diags.has_errors());
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::IntDec,
                TokenKind::Add,
                TokenKind::IntDec,
                TokenKind::Mul,
                TokenKind::IntDec,
                TokenKind::Semicolon,
            ]
        );
    }

    #[test]
    fn longest_match_operators() {
        let (tokens, _) = lex("a **= b");
        assert_eq!(tokens[1].kind, TokenKind::PowAssign);
        assert_eq!(tokens[1].text, "**=");
    }

    #[test]
    fn skips_comments_and_newlines() {
        let (tokens, _) = lex("1; ~ comment\n2;");
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::IntDec,
                TokenKind::Semicolon,
                TokenKind::IntDec,
                TokenKind::Semicolon,
            ]
        );
    }

    #[test]
    fn unterminated_string_reports_missing_terminator() {
        let (_, diags) = lex("\"abc");
        assert!(diags.has_errors());
        assert_eq!(diags.errors[0].kind.class_name(), "MissingTerminatorError");
    }

    #[test]
    fn radix_prefixes() {
        let (tokens, _) = lex("0xFF + 0b10;");
        assert_eq!(tokens[0].kind, TokenKind::IntHex);
        assert_eq!(tokens[0].text, "FF");
        assert_eq!(tokens[2].kind, TokenKind::IntBin);
        assert_eq!(tokens[2].text, "10");
    }

    #[test]
    fn char_vs_string_literal() {
        let (tokens, _) = lex("'a' 'ab'");
        assert_eq!(tokens[0].kind, TokenKind::Chr);
        assert_eq!(tokens[1].kind, TokenKind::Str);
    }

    #[test]
    fn keywords_vs_identifiers() {
        let (tokens, _) = lex("while foo");
        assert_eq!(tokens[0].kind, TokenKind::While);
        assert_eq!(tokens[1].kind, TokenKind::Ident);
    }
}
