use cursor::{Cursor, Line};
use errors::Diagnostic;
use itertools::{Either, Itertools};
use log::{debug, trace};

mod token;
pub use token::{format_number, Literal, Token, TokenData, TokenType};
use TokenData::*;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ScanErrorType {
    #[error("Unexpected character '{0}'.")]
    UnexpectedCharacter(char),
    #[error("Unterminated string.")]
    UnterminatedString,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("[line {line}] Error: {error}")]
pub struct ScanError {
    pub error: ScanErrorType,
    pub line: Line,
}

impl ScanError {
    fn new(error: ScanErrorType, line: Line) -> Self {
        Self { error, line }
    }
}

impl From<ScanError> for Diagnostic {
    fn from(e: ScanError) -> Self {
        Diagnostic::new(e.line, e.error)
    }
}

static KEYWORDS: [(&str, TokenData<'static>); 16] = [
    ("and", And),
    ("class", Class),
    ("else", Else),
    ("false", False),
    ("for", For),
    ("fun", Fun),
    ("if", If),
    ("nil", Nil),
    ("or", Or),
    ("print", Print),
    ("return", Return),
    ("super", Super),
    ("this", This),
    ("true", True),
    ("var", Var),
    ("while", While),
];

fn keyword(lexeme: &str) -> Option<TokenData<'static>> {
    KEYWORDS.iter().find(|(word, _)| *word == lexeme).map(|(_, data)| *data)
}

/// Lazily scans `source`. Yields every token (or lexical error) in order, then a single
/// `Eof` token, then `None`.
#[derive(Debug, Clone)]
pub struct TokenStream<'a> {
    cursor: Cursor<'a>,
    emitted_eof: bool,
}

impl<'a> TokenStream<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { cursor: Cursor::new(source), emitted_eof: false }
    }

    fn token(&self, data: TokenData<'a>, start: &Cursor<'a>) -> Token<'a> {
        Token::new(data, start.slice_until(&self.cursor), start.line())
    }

    fn either(&mut self, second: char, matched: TokenData<'a>, single: TokenData<'a>) -> TokenData<'a> {
        if self.cursor.advance_if(second) {
            matched
        } else {
            single
        }
    }

    /// Scans the lexeme whose first character was just consumed. `None` means the lexeme
    /// produces no token (whitespace, comments).
    fn scan_token(&mut self, c: char, start: &Cursor<'a>) -> Option<Result<Token<'a>, ScanError>> {
        let data = match c {
            '(' => LeftParen,
            ')' => RightParen,
            '{' => LeftBrace,
            '}' => RightBrace,
            ',' => Comma,
            '.' => Dot,
            '-' => Minus,
            '+' => Plus,
            ';' => Semicolon,
            '*' => Star,

            '!' => self.either('=', BangEqual, Bang),
            '=' => self.either('=', EqualEqual, Equal),
            '<' => self.either('=', LessEqual, Less),
            '>' => self.either('=', GreaterEqual, Greater),

            '/' => {
                if self.cursor.advance_if('/') {
                    self.cursor.advance_while(|c| c != '\n');
                    return None;
                }
                Slash
            }

            '"' => return Some(self.string(start)),

            d if d.is_ascii_digit() => self.number(start),

            c if c.is_alphabetic() || c == '_' => self.identifier(start),

            ' ' | '\r' | '\t' | '\n' => return None,

            c => {
                return Some(Err(ScanError::new(
                    ScanErrorType::UnexpectedCharacter(c),
                    start.line(),
                )))
            }
        };

        Some(Ok(self.token(data, start)))
    }

    fn string(&mut self, start: &Cursor<'a>) -> Result<Token<'a>, ScanError> {
        self.cursor.advance_while(|c| c != '"');

        if self.cursor.is_at_end() {
            return Err(ScanError::new(ScanErrorType::UnterminatedString, self.cursor.line()));
        }
        self.cursor.next();

        let lexeme = start.slice_until(&self.cursor);
        Ok(Token::new(Str(&lexeme[1..lexeme.len() - 1]), lexeme, start.line()))
    }

    fn number(&mut self, start: &Cursor<'a>) -> TokenData<'a> {
        self.cursor.advance_while(|c| c.is_ascii_digit());

        if self.cursor.peek() == Some('.')
            && self.cursor.peek_next().is_some_and(|c| c.is_ascii_digit())
        {
            self.cursor.next();
            self.cursor.advance_while(|c| c.is_ascii_digit());
        }

        Number(
            start
                .slice_until(&self.cursor)
                .parse()
                .expect("a run of ascii digits with an optional fraction is a valid f64"),
        )
    }

    fn identifier(&mut self, start: &Cursor<'a>) -> TokenData<'a> {
        self.cursor.advance_while(|c| c.is_alphanumeric() || c == '_');
        keyword(start.slice_until(&self.cursor)).unwrap_or(Identifier)
    }
}

impl<'a> Iterator for TokenStream<'a> {
    type Item = Result<Token<'a>, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let start = self.cursor.clone();

            let Some(c) = self.cursor.next() else {
                if self.emitted_eof {
                    return None;
                }
                self.emitted_eof = true;
                return Some(Ok(Token::eof(self.cursor.line())));
            };

            match self.scan_token(c, &start) {
                Some(Ok(token)) => {
                    trace!("{token:#} (line {})", token.line);
                    return Some(Ok(token));
                }
                Some(Err(e)) => {
                    debug!("{e}");
                    return Some(Err(e));
                }
                None => continue,
            }
        }
    }
}

/// Every token of a source plus the lexical errors encountered on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct Scanned<'a> {
    /// Always ends with exactly one `Eof` token.
    pub tokens: Vec<Token<'a>>,
    pub errors: Vec<ScanError>,
}

pub fn scan(source: &str) -> Scanned<'_> {
    let (tokens, errors) = TokenStream::new(source).partition_map(|result| match result {
        Ok(token) => Either::Left(token),
        Err(e) => Either::Right(e),
    });
    Scanned { tokens, errors }
}
