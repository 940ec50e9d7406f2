use cursor::Line;
use errors::Diagnostic;
use log::{debug, trace};
use scanner::{Token, TokenData};

mod expr;
pub use expr::{Expr, LiteralValue};

mod printer;
pub use printer::print;

use TokenData::*;

/// How deep expressions may nest before parsing gives up. Applies to the height of the
/// syntax tree as well as to unary operators and parentheses while they are being parsed.
pub const MAX_NESTING_DEPTH: usize = 256;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("[line {line}] Error at {at}: {error}")]
pub struct ParserError {
    pub error: ParserErrorType,
    pub line: Line,
    pub at: String,
}

impl From<ParserError> for Diagnostic {
    fn from(e: ParserError) -> Self {
        Diagnostic::new(e.line, e.error).at(e.at)
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ParserErrorType {
    #[error("Expect expression.")]
    ExpectedExpression,
    #[error("Expect ')' after expression.")]
    ExpectedRightParen,
    #[error("Expect ';' after expression.")]
    ExpectedSemicolon,
    #[error("Expect end of expression.")]
    ExpectedEndOfExpression,
    #[error("Expression nested too deeply.")]
    TooDeeplyNested,
}

impl ParserErrorType {
    fn at(self, token: &Token) -> ParserError {
        ParserError {
            error: self,
            line: token.line(),
            at: match token.data {
                Eof => "end".to_string(),
                _ => format!("'{}'", token.lexeme()),
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, ParserError>;

/// An expression and the height of its tree. Literals have height 0.
type Parsed<'a> = (Expr<'a>, usize);

/// Evaluating, printing and dropping a tree all recurse along its height, so it stays bounded
/// even for flat chains like `1 + 1 + ...`.
fn checked_height(height: usize, operator: &Token) -> Result<usize> {
    if height > MAX_NESTING_DEPTH {
        return Err(ParserErrorType::TooDeeplyNested.at(operator));
    }
    Ok(height)
}

fn binary<'a>(
    (left, l): Parsed<'a>,
    operator: Token<'a>,
    (right, r): Parsed<'a>,
) -> Result<Parsed<'a>> {
    let height = checked_height(l.max(r) + 1, &operator)?;
    Ok((Expr::binary(left, operator, right), height))
}

#[derive(Debug)]
pub struct Parser<'a> {
    tokens: Vec<Token<'a>>,
    current: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    /// `tokens` should come from the scanner and end with `Eof`, one is appended otherwise.
    pub fn new(mut tokens: Vec<Token<'a>>) -> Self {
        if !matches!(tokens.last(), Some(Token { data: Eof, .. })) {
            let line = tokens.last().map_or(Line(1), Token::line);
            tokens.push(Token::eof(line));
        }
        Self { tokens, current: 0, depth: 0 }
    }

    /// Parses exactly one expression spanning all tokens. Stops at the first error.
    pub fn parse(mut self) -> Result<Expr<'a>> {
        let (expr, _) = self.expression()?;

        if !self.is_at_end() {
            return Err(ParserErrorType::ExpectedEndOfExpression.at(&self.peek()));
        }

        trace!("Parsed {expr}");
        Ok(expr)
    }

    /// Parses a `;` separated sequence of expressions. After an error the parser
    /// synchronizes and keeps going, so that all errors get reported at once.
    pub fn parse_all(mut self) -> std::result::Result<Vec<Expr<'a>>, Vec<ParserError>> {
        let mut errors = Vec::new();
        let mut exprs = Vec::new();

        while !self.is_at_end() {
            match self.top_level_expression() {
                Ok(expr) => {
                    trace!("Parsed {expr}");
                    exprs.push(expr)
                }
                Err(e) => {
                    debug!("{e}");
                    errors.push(e);
                    self.synchronize();
                }
            }
        }

        if errors.is_empty() {
            Ok(exprs)
        } else {
            Err(errors)
        }
    }

    fn top_level_expression(&mut self) -> Result<Expr<'a>> {
        let (expr, _) = self.expression()?;

        if self.consume(Semicolon).is_none() && !self.is_at_end() {
            return Err(ParserErrorType::ExpectedSemicolon.at(&self.peek()));
        }

        Ok(expr)
    }

    fn expression(&mut self) -> Result<Parsed<'a>> {
        self.equality()
    }

    fn equality(&mut self) -> Result<Parsed<'a>> {
        let mut expr = self.comparison()?;

        while let BangEqual | EqualEqual = self.peek().data {
            let operator = self.advance();
            let right = self.comparison()?;
            expr = binary(expr, operator, right)?;
        }
        Ok(expr)
    }

    fn comparison(&mut self) -> Result<Parsed<'a>> {
        let mut expr = self.term()?;

        while let Greater | GreaterEqual | Less | LessEqual = self.peek().data {
            let operator = self.advance();
            let right = self.term()?;
            expr = binary(expr, operator, right)?;
        }
        Ok(expr)
    }

    fn term(&mut self) -> Result<Parsed<'a>> {
        let mut expr = self.factor()?;

        while let Minus | Plus = self.peek().data {
            let operator = self.advance();
            let right = self.factor()?;
            expr = binary(expr, operator, right)?;
        }
        Ok(expr)
    }

    fn factor(&mut self) -> Result<Parsed<'a>> {
        let mut expr = self.unary()?;

        while let Slash | Star = self.peek().data {
            let operator = self.advance();
            let right = self.unary()?;
            expr = binary(expr, operator, right)?;
        }
        Ok(expr)
    }

    fn unary(&mut self) -> Result<Parsed<'a>> {
        if let Bang | Minus = self.peek().data {
            let operator = self.advance();
            let (right, height) = self.nested(&operator, Self::unary)?;
            let height = checked_height(height + 1, &operator)?;
            return Ok((Expr::unary(operator, right), height));
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Parsed<'a>> {
        let token = self.peek();
        let value = match token.data {
            False => LiteralValue::Boolean(false),
            True => LiteralValue::Boolean(true),
            Nil => LiteralValue::Nil,
            LeftParen => {
                self.advance();
                let (expr, height) = self.nested(&token, Self::expression)?;
                self.consume_or_error(RightParen, ParserErrorType::ExpectedRightParen)?;
                let height = checked_height(height + 1, &token)?;
                return Ok((Expr::grouping(expr), height));
            }
            _ => match token.literal() {
                Some(literal) => literal.into(),
                None => return Err(ParserErrorType::ExpectedExpression.at(&token)),
            },
        };

        self.advance();
        Ok((Expr::Literal(value), 0))
    }

    /// Runs `parse` one nesting level deeper, failing at `token` once the limit is hit.
    fn nested<T>(
        &mut self,
        token: &Token<'a>,
        parse: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(ParserErrorType::TooDeeplyNested.at(token));
        }

        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    /// Skips the failing token, then everything up to the next likely start of a new
    /// top-level construct.
    fn synchronize(&mut self) {
        let mut previous = self.advance();
        debug!("Synchronizing after {previous:#}");

        while !self.is_at_end() {
            if previous.data == Semicolon {
                return;
            }

            if let Class | Fun | Var | For | If | While | Print | Return = self.peek().data {
                return;
            }

            previous = self.advance();
        }
    }
}

// Helpers
impl<'a> Parser<'a> {
    fn consume(&mut self, token: TokenData) -> Option<Token<'a>> {
        debug_assert!(!matches!(token, Number(_) | Str(_)));
        if self.peek().data == token {
            Some(self.advance())
        } else {
            None
        }
    }

    fn consume_or_error(&mut self, token: TokenData, error_type: ParserErrorType) -> Result<Token<'a>> {
        match self.consume(token) {
            Some(token) => Ok(token),
            None => Err(error_type.at(&self.peek())),
        }
    }

    fn peek(&self) -> Token<'a> {
        self.tokens[self.current]
    }

    /// Returns the current token and moves past it, except for `Eof` which is never consumed.
    fn advance(&mut self) -> Token<'a> {
        let token = self.peek();
        if !self.is_at_end() {
            self.current += 1;
        }
        token
    }

    fn is_at_end(&self) -> bool {
        self.peek().data == Eof
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use scanner::scan;

    use super::*;

    fn parse(source: &str) -> Result<Expr> {
        Parser::new(scan(source).tokens).parse()
    }

    fn parse_all(source: &str) -> std::result::Result<Vec<Expr>, Vec<ParserError>> {
        Parser::new(scan(source).tokens).parse_all()
    }

    fn printed(source: &str) -> String {
        print(&parse(source).unwrap())
    }

    #[test]
    fn precedence() {
        assert_eq!(printed("1 + 2 * 3"), "(+ 1.0 (* 2.0 3.0))");
        assert_eq!(printed("1 * 2 + 3"), "(+ (* 1.0 2.0) 3.0)");
        assert_eq!(printed("1 < 2 == 3 >= 4"), "(== (< 1.0 2.0) (>= 3.0 4.0))");
        assert_eq!(printed("-1 * !true"), "(* (- 1.0) (! true))");
    }

    #[test]
    fn binary_operators_are_left_associative() {
        assert_eq!(printed("3 - 2 - 1"), "(- (- 3.0 2.0) 1.0)");
        assert_eq!(printed("8 / 4 / 2"), "(/ (/ 8.0 4.0) 2.0)");
        assert_eq!(printed("1 != 2 != 3"), "(!= (!= 1.0 2.0) 3.0)");

        let Expr::Binary { left, operator, .. } = parse("3 - 2 - 1").unwrap() else {
            panic!("expected a binary expression");
        };
        assert_eq!(operator.lexeme(), "-");
        assert!(matches!(*left, Expr::Binary { .. }));
    }

    #[test]
    fn unary_is_right_recursive() {
        assert_eq!(printed("!!false"), "(! (! false))");
        assert_eq!(printed("--1"), "(- (- 1.0))");
    }

    #[test]
    fn grouping_overrides_precedence() {
        assert_eq!(printed("(1 + 2) * 3"), "(* ((+ 1.0 2.0)) 3.0)");
        assert_eq!(printed("3 * (4 + 2)"), "(* 3.0 ((+ 4.0 2.0)))");
    }

    #[test]
    fn literals() {
        assert_eq!(parse("nil"), Ok(Expr::Literal(LiteralValue::Nil)));
        assert_eq!(parse("\"hi\""), Ok(Expr::Literal(LiteralValue::Str("hi"))));
        assert_eq!(parse("12.5"), Ok(Expr::Literal(LiteralValue::Number(12.5))));
        assert_eq!(parse("true"), Ok(Expr::Literal(LiteralValue::Boolean(true))));
    }

    #[test]
    fn missing_operator() {
        let error = parse("3 * (4 5 + 2)").unwrap_err();
        assert_eq!(
            error,
            ParserError {
                error: ParserErrorType::ExpectedRightParen,
                line: Line(1),
                at: "'5'".to_string()
            }
        );
        assert_eq!(error.to_string(), "[line 1] Error at '5': Expect ')' after expression.");
    }

    #[test]
    fn missing_operand() {
        let error = parse("1 +").unwrap_err();
        assert_eq!(error.to_string(), "[line 1] Error at end: Expect expression.");

        let error = parse("\n)").unwrap_err();
        assert_eq!(error.to_string(), "[line 2] Error at ')': Expect expression.");
    }

    #[test]
    fn leftover_tokens() {
        let error = parse("1 2").unwrap_err();
        assert_eq!(error.error, ParserErrorType::ExpectedEndOfExpression);
        assert_eq!(error.at, "'2'");
    }

    #[test]
    fn identifiers_are_not_expressions() {
        let error = parse("a + 1").unwrap_err();
        assert_eq!(error.error, ParserErrorType::ExpectedExpression);
        assert_eq!(error.at, "'a'");
    }

    #[test]
    fn missing_eof_is_appended() {
        let tokens = scan("1 + 2").tokens;
        let without_eof = tokens[..tokens.len() - 1].to_vec();
        assert_eq!(Parser::new(without_eof).parse(), Parser::new(tokens).parse());
        assert!(Parser::new(Vec::new()).parse().is_err());
    }

    #[test]
    fn nesting_limit() {
        let ok = format!("{}1", "-".repeat(MAX_NESTING_DEPTH));
        assert!(parse(&ok).is_ok());

        let too_deep = format!("{}1", "-".repeat(MAX_NESTING_DEPTH + 1));
        assert_eq!(parse(&too_deep).unwrap_err().error, ParserErrorType::TooDeeplyNested);

        let parens = format!(
            "{}1{}",
            "(".repeat(MAX_NESTING_DEPTH + 1),
            ")".repeat(MAX_NESTING_DEPTH + 1)
        );
        assert_eq!(parse(&parens).unwrap_err().error, ParserErrorType::TooDeeplyNested);
    }

    #[test]
    fn nesting_limit_applies_to_flat_chains() {
        let longest = format!("1{}", " + 1".repeat(MAX_NESTING_DEPTH));
        assert!(parse(&longest).is_ok());

        let too_long = format!("1{}", " + 1".repeat(MAX_NESTING_DEPTH + 1));
        let error = parse(&too_long).unwrap_err();
        assert_eq!(error.error, ParserErrorType::TooDeeplyNested);
        assert_eq!(error.at, "'+'");

        // Nesting on either side of an operator adds up.
        let mixed = format!("{}1 * 2", "-".repeat(MAX_NESTING_DEPTH));
        assert_eq!(parse(&mixed).unwrap_err().error, ParserErrorType::TooDeeplyNested);

        let errors = parse_all(&format!("1{}; 2", " * 2".repeat(30_000))).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].error, ParserErrorType::TooDeeplyNested);
    }

    #[test]
    fn parse_all_splits_on_semicolons() {
        let exprs = parse_all("1 + 2; (3);\n4").unwrap();
        assert_eq!(
            exprs.iter().map(print).collect::<Vec<_>>(),
            vec!["(+ 1.0 2.0)", "(3.0)", "4.0"]
        );
        assert!(parse_all("").unwrap().is_empty());
    }

    #[test]
    fn synchronize_after_error() {
        let errors = parse_all("1 +; 2 * 3; (4\n; 5 6").unwrap_err();
        assert_eq!(
            errors.iter().map(ToString::to_string).collect::<Vec<_>>(),
            vec![
                "[line 1] Error at ';': Expect expression.",
                "[line 2] Error at ';': Expect ')' after expression.",
                "[line 2] Error at '6': Expect ';' after expression.",
            ]
        );
    }

    #[test]
    fn synchronize_stops_at_keywords() {
        let errors = parse_all("1 + + 2 print 3").unwrap_err();
        assert_eq!(
            errors.iter().map(|e| e.at.as_str()).collect::<Vec<_>>(),
            vec!["'+'", "'print'"]
        );
    }

    #[test]
    fn without_semicolons_recovery_skips_to_the_end() {
        let errors = parse_all("(1 + 2 3 4 5").unwrap_err();
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn parser_errors_convert_to_diagnostics() {
        let diagnostic: Diagnostic = parse("(1").unwrap_err().into();
        assert_eq!(diagnostic.to_string(), "[line 1] Error at end: Expect ')' after expression.");
    }
}
