use std::fmt::{self, Display, Formatter};

use cursor::Line;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Token<'a> {
    pub data: TokenData<'a>,
    pub lexeme: &'a str,
    pub line: Line,
}

impl<'a> Token<'a> {
    pub fn new(data: TokenData<'a>, lexeme: &'a str, line: Line) -> Self {
        Self { data, lexeme, line }
    }

    pub fn eof(line: Line) -> Self {
        Self::new(TokenData::Eof, "", line)
    }

    pub fn ty(&self) -> TokenType {
        self.data.into()
    }

    pub fn lexeme(&self) -> &'a str {
        self.lexeme
    }

    pub fn line(&self) -> Line {
        self.line
    }

    /// The value carried by string and number tokens.
    pub fn literal(&self) -> Option<Literal<'a>> {
        match self.data {
            TokenData::Str(s) => Some(Literal::Str(s)),
            TokenData::Number(n) => Some(Literal::Number(n)),
            _ => None,
        }
    }
}

/// `{}` prints the lexeme, `{:#}` prints the diagnostic form `Type lexeme literal`.
impl Display for Token<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            match self.literal() {
                Some(literal) => write!(f, "{} {} {}", self.ty(), self.lexeme, literal),
                None => write!(f, "{} {} null", self.ty(), self.lexeme),
            }
        } else {
            write!(f, "{}", self.lexeme)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Literal<'a> {
    Str(&'a str),
    Number(f64),
}

impl Display for Literal<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Str(s) => write!(f, "{s}"),
            Literal::Number(n) => write!(f, "{}", format_number(*n)),
        }
    }
}

/// Integral numbers keep one fractional digit (`4.0`), everything else uses the shortest
/// representation that round-trips (`1.2`, `inf`, `NaN`).
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 {
        format!("{n:.1}")
    } else {
        n.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, strum::EnumDiscriminants)]
#[strum_discriminants(name(TokenType), derive(strum::Display, Hash))]
pub enum TokenData<'a> {
    // Single-character tokens.
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    Comma,
    Dot,
    Minus,
    Plus,
    Semicolon,
    Slash,
    Star,

    // One or two character tokens.
    Bang,
    BangEqual,
    Equal,
    EqualEqual,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,

    // Literals.
    Identifier,
    Str(&'a str),
    Number(f64),

    // Keywords.
    And,
    Class,
    Else,
    False,
    Fun,
    For,
    If,
    Nil,
    Or,
    Print,
    Return,
    Super,
    This,
    True,
    Var,
    While,
    Eof,
}
