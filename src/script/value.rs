//! Runtime values and the operators defined on them

use crate::script::parser::{BinOp, UnaryOp};
use std::cmp::Ordering;
use std::fmt;

/// A C-- value
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
}

/// Numeric view of a value; booleans count as 0/1
#[derive(Clone, Copy, Debug)]
enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    fn to_float(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::Bool(_) => "bool",
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::Bool(b) => *b,
        }
    }

    fn as_number(&self) -> Option<Number> {
        match self {
            Value::Int(i) => Some(Number::Int(*i)),
            Value::Float(f) => Some(Number::Float(*f)),
            Value::Bool(b) => Some(Number::Int(*b as i64)),
            Value::Str(_) => None,
        }
    }

    /// Ordering between two values.
    ///
    /// `Err` when the types cannot be ordered; `Ok(None)` when they can but
    /// the values are unordered (a NaN operand).
    pub(crate) fn compare(&self, other: &Value) -> Result<Option<Ordering>, ()> {
        match (self, other) {
            (Value::Str(a), Value::Str(b)) => Ok(Some(a.cmp(b))),
            _ => match (self.as_number().ok_or(())?, other.as_number().ok_or(())?) {
                (Number::Int(a), Number::Int(b)) => Ok(Some(a.cmp(&b))),
                (a, b) => Ok(a.to_float().partial_cmp(&b.to_float())),
            },
        }
    }

    fn loose_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Str(_), _) | (_, Value::Str(_)) => false,
            _ => self.compare(other) == Ok(Some(Ordering::Equal)),
        }
    }
}

/// Format a float the way scripts expect: integral values without a fraction
pub fn format_float(f: f64) -> String {
    if f.is_finite() && f == f.trunc() && f.abs() < 1e15 {
        format!("{}", f as i64)
    } else {
        format!("{}", f)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => f.write_str(&format_float(*x)),
            Value::Str(s) => f.write_str(s),
            Value::Bool(b) => f.write_str(if *b { "true" } else { "false" }),
        }
    }
}

fn symbol(op: BinOp) -> &'static str {
    match op {
        BinOp::Add => "+",
        BinOp::Sub => "-",
        BinOp::Mul => "*",
        BinOp::Div => "/",
        BinOp::Mod => "%",
        BinOp::Pow => "**",
        BinOp::Eq => "==",
        BinOp::Ne => "!=",
        BinOp::Lt => "<",
        BinOp::Le => "<=",
        BinOp::Gt => ">",
        BinOp::Ge => ">=",
        BinOp::And => "&&",
        BinOp::Or => "||",
    }
}

fn unsupported(op: BinOp, left: &Value, right: &Value) -> String {
    format!(
        "unsupported operand type(s) for {}: '{}' and '{}'",
        symbol(op),
        left.type_name(),
        right.type_name()
    )
}

/// Evaluate a binary operator. `&&` and `||` are handled here without
/// short-circuiting; the interpreter short-circuits before calling.
pub fn binary(op: BinOp, left: Value, right: Value) -> Result<Value, String> {
    match op {
        BinOp::And => return Ok(Value::Bool(left.is_truthy() && right.is_truthy())),
        BinOp::Or => return Ok(Value::Bool(left.is_truthy() || right.is_truthy())),
        BinOp::Eq => return Ok(Value::Bool(left.loose_eq(&right))),
        BinOp::Ne => return Ok(Value::Bool(!left.loose_eq(&right))),
        BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => {
            let ordering = left.compare(&right).map_err(|()| {
                format!(
                    "'{}' not supported between '{}' and '{}'",
                    symbol(op),
                    left.type_name(),
                    right.type_name()
                )
            })?;
            // Every ordering test is false against NaN
            let result = match (op, ordering) {
                (_, None) => false,
                (BinOp::Lt, Some(ordering)) => ordering == Ordering::Less,
                (BinOp::Le, Some(ordering)) => ordering != Ordering::Greater,
                (BinOp::Gt, Some(ordering)) => ordering == Ordering::Greater,
                (_, Some(ordering)) => ordering != Ordering::Less,
            };
            return Ok(Value::Bool(result));
        }
        _ => {}
    }

    if op == BinOp::Add {
        if let (Value::Str(_), _) | (_, Value::Str(_)) = (&left, &right) {
            return Ok(Value::Str(format!("{}{}", left, right)));
        }
    }

    let (Some(a), Some(b)) = (left.as_number(), right.as_number()) else {
        return Err(unsupported(op, &left, &right));
    };

    match (a, b) {
        (Number::Int(a), Number::Int(b)) => int_arithmetic(op, a, b),
        (a, b) => float_arithmetic(op, a.to_float(), b.to_float()),
    }
}

fn int_arithmetic(op: BinOp, a: i64, b: i64) -> Result<Value, String> {
    let checked = match op {
        BinOp::Add => a.checked_add(b),
        BinOp::Sub => a.checked_sub(b),
        BinOp::Mul => a.checked_mul(b),
        BinOp::Div => return float_arithmetic(op, a as f64, b as f64),
        BinOp::Mod => {
            if b == 0 {
                return Err("integer modulo by zero".to_string());
            }
            // Result takes the sign of the divisor
            a.checked_rem(b).map(|r| if r != 0 && (r < 0) != (b < 0) { r + b } else { r })
        }
        BinOp::Pow => {
            if b < 0 {
                return float_arithmetic(op, a as f64, b as f64);
            }
            u32::try_from(b).ok().and_then(|exp| a.checked_pow(exp))
        }
        _ => unreachable!("non-arithmetic operator {:?}", op),
    };

    match checked {
        Some(n) => Ok(Value::Int(n)),
        None => float_arithmetic(op, a as f64, b as f64),
    }
}

fn float_arithmetic(op: BinOp, a: f64, b: f64) -> Result<Value, String> {
    let result = match op {
        BinOp::Add => a + b,
        BinOp::Sub => a - b,
        BinOp::Mul => a * b,
        BinOp::Div => {
            if b == 0.0 {
                return Err("division by zero".to_string());
            }
            a / b
        }
        BinOp::Mod => {
            if b == 0.0 {
                return Err("float modulo".to_string());
            }
            a - b * (a / b).floor()
        }
        BinOp::Pow => {
            if a == 0.0 && b < 0.0 {
                return Err("0 cannot be raised to a negative power".to_string());
            }
            a.powf(b)
        }
        _ => unreachable!("non-arithmetic operator {:?}", op),
    };
    Ok(Value::Float(result))
}

/// Evaluate a unary operator
pub fn unary(op: UnaryOp, operand: Value) -> Result<Value, String> {
    match op {
        UnaryOp::Not => Ok(Value::Bool(!operand.is_truthy())),
        UnaryOp::Plus | UnaryOp::Neg => {
            let Some(n) = operand.as_number() else {
                let sign = if op == UnaryOp::Neg { "-" } else { "+" };
                return Err(format!("bad operand type for unary {}: '{}'", sign, operand.type_name()));
            };
            Ok(match (op, n) {
                (UnaryOp::Plus, Number::Int(i)) => Value::Int(i),
                (UnaryOp::Plus, Number::Float(f)) => Value::Float(f),
                (_, Number::Int(i)) => i.checked_neg().map_or(Value::Float(-(i as f64)), Value::Int),
                (_, Number::Float(f)) => Value::Float(-f),
            })
        }
    }
}
