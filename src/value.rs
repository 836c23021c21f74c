use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

use crate::error::{Error, Result};

/// Runtime value with dynamic typing and explicit coercion.
///
/// Booleans have no kind of their own: comparisons and matches produce the
/// strings `"1"` and `"0"`, and that encoding is observable from programs.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str(String),
    Num(f64),
    Array(HashMap<String, Value>),
}

impl Default for Value {
    fn default() -> Self {
        Value::Str(String::new())
    }
}

impl Value {
    /// Build a value from literal text, promoting fully-numeric strings.
    /// This is the path capture groups take into `$1..$n`.
    pub fn from_literal(s: &str) -> Self {
        match s.parse::<f64>() {
            Ok(n) => Value::Num(n),
            Err(_) => Value::Str(s.to_string()),
        }
    }

    pub fn bool(b: bool) -> Self {
        Value::Str(if b { "1" } else { "0" }.to_string())
    }

    pub fn empty_array() -> Self {
        Value::Array(HashMap::new())
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    /// Coerce to a number. Strings that do not parse as numbers coerce to
    /// `0.0`; arrays cannot appear in scalar context.
    pub fn scalar_num(&self) -> Result<f64> {
        match self {
            Value::Num(n) => Ok(*n),
            Value::Str(s) => Ok(s.parse::<f64>().unwrap_or(0.0)),
            Value::Array(_) => Err(Error::runtime("array in scalar context")),
        }
    }

    /// Coerce to the canonical string form.
    pub fn scalar_str(&self) -> Result<String> {
        match self {
            Value::Str(s) => Ok(s.clone()),
            Value::Num(n) => Ok(format_number(*n)),
            Value::Array(_) => Err(Error::runtime("array in scalar context")),
        }
    }

    /// A value is false iff its string form is "0" or it is the numeric 0.
    pub fn truthy(&self) -> Result<bool> {
        match self {
            Value::Str(s) => Ok(s != "0"),
            Value::Num(n) => Ok(*n != 0.0),
            Value::Array(_) => Err(Error::runtime("array in scalar context")),
        }
    }

    /// Logical inversion under the "0"/"1" encoding, preserving the kind
    /// of the operand.
    pub fn invert(&self) -> Result<Value> {
        match self {
            Value::Str(s) => Ok(Value::bool(s == "0")),
            Value::Num(n) => Ok(Value::Num(if *n == 0.0 { 1.0 } else { 0.0 })),
            Value::Array(_) => Err(Error::runtime("array in scalar context")),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => write!(f, "{}", s),
            Value::Num(n) => write!(f, "{}", format_number(*n)),
            Value::Array(map) => {
                let entries: Vec<String> =
                    map.iter().map(|(k, v)| format!("{} : {}", k, v)).collect();
                write!(f, "{{{}}}", entries.join(", "))
            }
        }
    }
}

/// Compare two scalars: numerically when both sides are numbers, as
/// strings otherwise.
pub fn compare_values(left: &Value, right: &Value) -> Result<Ordering> {
    if let (Value::Num(l), Value::Num(r)) = (left, right) {
        return Ok(l.partial_cmp(r).unwrap_or(Ordering::Equal));
    }
    Ok(left.scalar_str()?.cmp(&right.scalar_str()?))
}

/// Canonical number form: integers print without a decimal point,
/// everything else prints with five significant digits.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "nan".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if n == n.trunc() && n.abs() < 1e15 {
        return format!("{}", n as i64);
    }

    let exp = n.abs().log10().floor() as i32;
    if (-5..5).contains(&exp) {
        let prec = (4 - exp).max(0) as usize;
        let s = format!("{:.*}", prec, n);
        if s.contains('.') {
            let trimmed = s.trim_end_matches('0').trim_end_matches('.');
            return trimmed.to_string();
        }
        s
    } else {
        format!("{:.4e}", n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_coercion() {
        assert_eq!(Value::Str("42".to_string()).scalar_num().unwrap(), 42.0);
        assert_eq!(Value::Str("abc".to_string()).scalar_num().unwrap(), 0.0);
        assert_eq!(Value::Str("4x".to_string()).scalar_num().unwrap(), 0.0);
        assert_eq!(Value::Num(2.5).scalar_num().unwrap(), 2.5);
    }

    #[test]
    fn test_string_coercion() {
        assert_eq!(Value::Num(5.0).scalar_str().unwrap(), "5");
        assert_eq!(Value::Num(3.14159).scalar_str().unwrap(), "3.1416");
        assert_eq!(Value::Str("x".to_string()).scalar_str().unwrap(), "x");
    }

    #[test]
    fn test_truthiness() {
        assert!(!Value::Str("0".to_string()).truthy().unwrap());
        assert!(!Value::Num(0.0).truthy().unwrap());
        assert!(Value::Str(String::new()).truthy().unwrap());
        assert!(Value::Str("no".to_string()).truthy().unwrap());
        assert!(Value::Num(-1.0).truthy().unwrap());
        assert!(Value::empty_array().truthy().is_err());
    }

    #[test]
    fn test_bool_encoding() {
        assert_eq!(Value::bool(true), Value::Str("1".to_string()));
        assert_eq!(Value::bool(false), Value::Str("0".to_string()));
        assert_eq!(
            Value::Str("0".to_string()).invert().unwrap(),
            Value::Str("1".to_string())
        );
    }

    #[test]
    fn test_from_literal() {
        assert_eq!(Value::from_literal("12"), Value::Num(12.0));
        assert_eq!(Value::from_literal("1.5"), Value::Num(1.5));
        assert_eq!(Value::from_literal("foo"), Value::Str("foo".to_string()));
    }

    #[test]
    fn test_comparison() {
        let n1 = Value::Num(10.0);
        let n2 = Value::Num(2.0);
        assert_eq!(compare_values(&n1, &n2).unwrap(), Ordering::Greater);

        // One side a string: both compare as strings, so "10" < "2"
        let s1 = Value::Str("10".to_string());
        assert_eq!(compare_values(&s1, &n2).unwrap(), Ordering::Less);
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(42.0), "42");
        assert_eq!(format_number(-3.0), "-3");
        assert_eq!(format_number(0.0), "0");
        assert_eq!(format_number(3.14159), "3.1416");
        assert_eq!(format_number(0.5), "0.5");
        assert_eq!(format_number(0.0025), "0.0025");
    }
}
