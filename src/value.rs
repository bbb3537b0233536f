use serde::{Deserialize, Serialize};
use std::fmt;

/// A point in a resolved instruction sequence, standing for "every instruction from here on".
/// `Position(len)` of a program with `len` instructions is the empty remainder.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash)]
pub struct Position(pub usize);

impl Position {
    pub const START: Position = Position(0);

    /// The tail of this position
    pub fn next(self) -> Self {
        Position(self.0 + 1)
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Default)]
pub enum Value {
    #[default]
    VUnassigned,
    VNumber(f64),
    VBool(bool),
    VSymbol(String),
    VLabel(Position),
}

impl Value {
    /// `false`, zero, NaN, the empty symbol and an unassigned register count as false
    pub fn is_true(&self) -> bool {
        match self {
            Value::VUnassigned => false,
            Value::VBool(b) => *b,
            Value::VNumber(n) => *n != 0.0 && !n.is_nan(),
            Value::VSymbol(s) => !s.is_empty(),
            Value::VLabel(_) => true,
        }
    }

    /// The value a bare atom of source text stands for
    pub fn from_atom(atom: &str) -> Value {
        match atom {
            "true" => Value::VBool(true),
            "false" => Value::VBool(false),
            _ if looks_numeric(atom) => atom
                .parse::<f64>()
                .map(Value::VNumber)
                .unwrap_or_else(|_| Value::VSymbol(atom.to_string())),
            _ => Value::VSymbol(atom.to_string()),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::VNumber(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_position(&self) -> Option<Position> {
        match self {
            Value::VLabel(p) => Some(*p),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::VUnassigned => "unassigned",
            Value::VNumber(_) => "number",
            Value::VBool(_) => "boolean",
            Value::VSymbol(_) => "symbol",
            Value::VLabel(_) => "position",
        }
    }
}

// f64 parsing also accepts `inf` and `nan`, which are symbols here
fn looks_numeric(atom: &str) -> bool {
    atom.trim_start_matches(['-', '+'])
        .trim_start_matches('.')
        .starts_with(|c: char| c.is_ascii_digit())
}

/// Symbols that would not read back as the same bare atom
fn needs_quotes(s: &str) -> bool {
    s.is_empty()
        || s.chars().any(|c| c.is_whitespace() || "()\";".contains(c))
        || !matches!(Value::from_atom(s), Value::VSymbol(_))
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::VUnassigned => write!(f, "*unassigned*"),
            Value::VNumber(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            Value::VNumber(n) => write!(f, "{}", n),
            Value::VBool(b) => write!(f, "{}", b),
            Value::VSymbol(s) if needs_quotes(s) => write!(f, "{:?}", s),
            Value::VSymbol(s) => write!(f, "{}", s),
            Value::VLabel(p) => write!(f, "#<position {}>", p.0),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::VNumber(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::VNumber(n as f64)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::VNumber(n.into())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::VBool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::VSymbol(s.to_string())
    }
}

impl From<Position> for Value {
    fn from(p: Position) -> Self {
        Value::VLabel(p)
    }
}

use std::ops::*;

macro_rules! numeric {
    ($trait:ident, $method:ident, $op:tt) => {
        impl $trait for Value {
            type Output = Option<Self>;
            fn $method(self, rhs: Self) -> Self::Output {
                if let (Self::VNumber(n), Self::VNumber(r)) = (self, rhs) {
                    Some(Self::VNumber(n $op r))
                } else {
                    None
                }
            }
        }
    };
}

numeric!(Add, add, +);
numeric!(Sub, sub, -);
numeric!(Mul, mul, *);
numeric!(Div, div, /);
numeric!(Rem, rem, %);

impl Neg for Value {
    type Output = Option<Self>;
    fn neg(self) -> Self::Output {
        if let Self::VNumber(n) = self {
            Some(Value::VNumber(-n))
        } else {
            None
        }
    }
}

impl Not for Value {
    type Output = Option<Self>;
    fn not(self) -> Self::Output {
        if let Self::VBool(b) = self {
            Some(Value::VBool(!b))
        } else {
            None
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        match (self, other) {
            (Value::VNumber(a), Value::VNumber(b)) => a.partial_cmp(b),
            (Value::VSymbol(a), Value::VSymbol(b)) => a.partial_cmp(b),
            (Value::VLabel(a), Value::VLabel(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}
