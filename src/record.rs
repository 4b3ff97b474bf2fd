use crate::value::Value;

/// Access capabilities a query needs from the records it runs over.
///
/// The evaluator is duck-typed: it never asks what a record *is*, only
/// whether it has a named attribute (`o.name`) or an indexable key
/// (`o[0]`, `o['key']`). Implement this for your own record types to make
/// collections of them queryable; `Value` maps and lists implement it out
/// of the box.
///
/// # Examples
///
/// ```
/// use siftql::{Record, Value};
///
/// struct Point { x: i64, y: i64 }
///
/// impl Record for Point {
///     fn attr(&self, name: &str) -> Option<Value> {
///         match name {
///             "x" => Some(Value::Integer(self.x)),
///             "y" => Some(Value::Integer(self.y)),
///             _ => None,
///         }
///     }
///
///     fn index(&self, key: &Value) -> Option<Value> {
///         match key {
///             Value::Integer(0) => Some(Value::Integer(self.x)),
///             Value::Integer(1) => Some(Value::Integer(self.y)),
///             _ => None,
///         }
///     }
///
///     fn to_value(&self) -> Value {
///         Value::List(vec![Value::Integer(self.x), Value::Integer(self.y)])
///     }
/// }
/// ```
pub trait Record {
    /// Look up a named attribute. `None` means the record has no such
    /// attribute, which surfaces as an evaluation error.
    fn attr(&self, name: &str) -> Option<Value>;

    /// Look up a keyed or positional entry. `None` means the key is absent.
    fn index(&self, key: &Value) -> Option<Value>;

    /// The whole record as a value, used when a query projects the record
    /// itself (`SELECT o`).
    fn to_value(&self) -> Value;
}

impl Record for Value {
    fn attr(&self, name: &str) -> Option<Value> {
        match self {
            Value::Map(map) => map.get(name).cloned(),
            _ => None,
        }
    }

    fn index(&self, key: &Value) -> Option<Value> {
        match (self, key) {
            (Value::Map(map), Value::Str(k)) => map.get(k).cloned(),
            (Value::List(items), Value::Integer(n)) => {
                let index = if *n < 0 {
                    // Negative index counts from the end (-1 = last).
                    let back = n.unsigned_abs() as usize;
                    if back > items.len() {
                        return None;
                    }
                    items.len() - back
                } else {
                    *n as usize
                };
                items.get(index).cloned()
            }
            _ => None,
        }
    }

    fn to_value(&self) -> Value {
        self.clone()
    }
}
