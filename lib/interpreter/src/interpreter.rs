use cursor::Line;
use log::trace;
use parser::Expr;
use scanner::{Token, TokenData};

mod value;
pub use value::Value;

mod pipeline;
pub use pipeline::{evaluate_source, parse_source, run_source, InterpretError};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RuntimeErrorType {
    #[error("Operand must be a number.")]
    OperandMustBeNumber(Value),
    #[error("Operands must be numbers.")]
    OperandsMustBeNumbers(Value, Value),
    #[error("Division by zero.")]
    DivisionByZero,
}

impl RuntimeErrorType {
    fn at(self, operator: &Token) -> RuntimeError {
        RuntimeError { error: self, line: operator.line() }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{error}\n[line {line}]")]
pub struct RuntimeError {
    pub error: RuntimeErrorType,
    pub line: Line,
}

pub type Result<T> = std::result::Result<T, RuntimeError>;

/// Tree-walking evaluator. Evaluation has no side effects, so one interpreter can evaluate
/// any number of independent expressions.
#[derive(Debug, Default)]
pub struct Interpreter;

impl Interpreter {
    pub fn new() -> Self {
        Self
    }

    pub fn evaluate(&self, expr: &Expr) -> Result<Value> {
        let value = match expr {
            Expr::Literal(literal) => literal.into(),

            Expr::Grouping(expr) => self.evaluate(expr)?,

            Expr::Unary { operator, right } => {
                let right = self.evaluate(right)?;
                match operator.data {
                    TokenData::Minus => (-right).map_err(|v| {
                        RuntimeErrorType::OperandMustBeNumber(v).at(operator)
                    })?,
                    TokenData::Bang => (!right.is_truthy()).into(),
                    _ => unreachable!("The parser only produces '-' and '!' unary operators"),
                }
            }

            Expr::Binary { left, operator, right } => {
                // Both sides are always evaluated, left first.
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;
                self.binary(left, operator, right)?
            }
        };

        trace!("{expr} => {value}");
        Ok(value)
    }

    fn binary(&self, left: Value, operator: &Token, right: Value) -> Result<Value> {
        use TokenData::*;

        let result = match operator.data {
            EqualEqual => Ok(left.equals(&right).into()),
            BangEqual => Ok((!left.equals(&right)).into()),

            Plus => left + right,
            Minus => left - right,
            Star => left * right,
            Slash => match (&left, &right) {
                (Value::Number(_), Value::Number(r)) if *r == 0.0 => {
                    return Err(RuntimeErrorType::DivisionByZero.at(operator))
                }
                _ => left / right,
            },

            Greater => left.greater_than(right),
            GreaterEqual => left.greater_equal(right),
            Less => left.less_than(right),
            LessEqual => left.less_equal(right),

            _ => unreachable!("The parser never produces '{}' as a binary operator", operator),
        };

        result.map_err(|(l, r)| RuntimeErrorType::OperandsMustBeNumbers(l, r).at(operator))
    }
}
