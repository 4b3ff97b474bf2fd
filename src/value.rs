use std::collections::HashMap;

/// A runtime value produced by evaluating a query expression.
///
/// Records expose their fields as `Value`s, literals in a query become
/// `Value`s, and every query result is a `Value`. Integers and floats are
/// kept distinct; arithmetic only falls back to floats when a result is not
/// mathematically whole.
///
/// # Examples
///
/// ```
/// use siftql::Value;
/// use std::collections::HashMap;
///
/// let n = Value::Integer(42);
/// let s = Value::Str("hello".to_string());
///
/// let mut rec = HashMap::new();
/// rec.insert("name".to_string(), s);
/// rec.insert("age".to_string(), n);
/// let record = Value::Map(rec);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absent / unknown value
    Null,

    /// Boolean (true/false)
    Boolean(bool),

    /// Integer number (preserved separately from floats)
    Integer(i64),

    /// Floating-point number
    Float(f64),

    /// UTF-8 string
    Str(String),

    /// Ordered sequence of values
    List(Vec<Value>),

    /// String-keyed mapping, the shape of a dynamic record
    Map(HashMap<String, Value>),
}

impl Value {
    /// Human-readable type name used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "map",
        }
    }

    /// Numeric view of the value, if it has one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(n) => Some(*n as f64),
            Value::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// Value equality as the query language sees it: integers and floats
    /// compare numerically (`1 == 1.0`), lists element-wise, maps key-wise.
    ///
    /// Used for `=`/`!=`, `IN` membership, DISTINCT deduplication, and
    /// GROUP BY key identity.
    pub fn loose_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Integer(a), Value::Float(b)) => (*a as f64) == *b,
            (Value::Float(a), Value::Integer(b)) => *a == (*b as f64),
            (Value::List(a), Value::List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.loose_eq(y))
            }
            (Value::Map(a), Value::Map(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .all(|(k, v)| b.get(k).is_some_and(|w| v.loose_eq(w)))
            }
            (a, b) => a == b,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(n as i64)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}
