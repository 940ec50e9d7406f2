use std::{
    fmt::{self, Display, Formatter},
    ops::{Add, Div, Mul, Neg, Sub},
};

use parser::LiteralValue;
use scanner::format_number;

#[derive(Debug, Clone, PartialEq, derive_more::From)]
pub enum Value {
    Number(f64),
    Str(String),
    Bool(bool),
    Nil,
}

impl Value {
    /// `nil` and `false` are falsey, everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Nil | Value::Bool(false))
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Coerces both operands to numbers, handing them back if either one isn't.
    fn numbers(self, rhs: Value) -> Result<(f64, f64), (Value, Value)> {
        match (self.as_number(), rhs.as_number()) {
            (Some(a), Some(b)) => Ok((a, b)),
            _ => Err((self, rhs)),
        }
    }

    /// Values of different types are never equal, `nil` is only equal to itself.
    pub fn equals(&self, other: &Value) -> bool {
        self == other
    }

    pub fn less_than(self, other: Value) -> Result<Value, (Value, Value)> {
        self.numbers(other).map(|(a, b)| (a < b).into())
    }

    pub fn less_equal(self, other: Value) -> Result<Value, (Value, Value)> {
        self.numbers(other).map(|(a, b)| (a <= b).into())
    }

    pub fn greater_than(self, other: Value) -> Result<Value, (Value, Value)> {
        self.numbers(other).map(|(a, b)| (a > b).into())
    }

    pub fn greater_equal(self, other: Value) -> Result<Value, (Value, Value)> {
        self.numbers(other).map(|(a, b)| (a >= b).into())
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", format_number(*n)),
            Value::Str(s) => write!(f, "{}", s),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Nil => write!(f, "nil"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<&LiteralValue<'_>> for Value {
    fn from(literal: &LiteralValue<'_>) -> Self {
        match literal {
            LiteralValue::Number(n) => Value::Number(*n),
            LiteralValue::Str(s) => (*s).into(),
            LiteralValue::Boolean(b) => Value::Bool(*b),
            LiteralValue::Nil => Value::Nil,
        }
    }
}

impl Neg for Value {
    type Output = Result<Self, Self>;

    fn neg(self) -> Self::Output {
        match self {
            Value::Number(n) => Ok(Value::Number(-n)),
            _ => Err(self),
        }
    }
}

impl Add for Value {
    type Output = Result<Self, (Self, Self)>;

    fn add(self, rhs: Self) -> Self::Output {
        self.numbers(rhs).map(|(a, b)| Value::Number(a + b))
    }
}

impl Sub for Value {
    type Output = Result<Self, (Self, Self)>;

    fn sub(self, rhs: Self) -> Self::Output {
        self.numbers(rhs).map(|(a, b)| Value::Number(a - b))
    }
}

impl Mul for Value {
    type Output = Result<Self, (Self, Self)>;

    fn mul(self, rhs: Self) -> Self::Output {
        self.numbers(rhs).map(|(a, b)| Value::Number(a * b))
    }
}

impl Div for Value {
    type Output = Result<Self, (Self, Self)>;

    fn div(self, rhs: Self) -> Self::Output {
        self.numbers(rhs).map(|(a, b)| Value::Number(a / b))
    }
}
