//! Fully parenthesized rendering of an expression tree, mostly useful for tests and `--emit ast`.

use std::fmt::{self, Display, Formatter};

use crate::Expr;

pub fn print(expr: &Expr) -> String {
    expr.to_string()
}

impl Display for Expr<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Binary { left, operator, right } => {
                write!(f, "({} {} {})", operator, left, right)
            }
            Expr::Grouping(expression) => write!(f, "({})", expression),
            Expr::Unary { operator, right } => write!(f, "({} {})", operator, right),
            Expr::Literal(value) => write!(f, "{}", value),
        }
    }
}
