//! Built-in query functions and the caller-extensible registry.
//!
//! Function names in a query (`upper(o.name)`) are resolved here at
//! evaluation time; an unknown name is an evaluation error, never a silent
//! no-op. The default registry ships a small fixed set of scalar functions;
//! callers add their own with [`FunctionRegistry::register`].

use std::collections::HashMap;
use std::sync::Arc;

use crate::evaluator::{EvalError, EvalErrorKind};
use crate::value::Value;

/// The signature of a query function: evaluated argument values in, one
/// value out.
pub type QueryFn = dyn Fn(&[Value]) -> Result<Value, EvalError> + Send + Sync;

/// Named functions available to queries during evaluation.
///
/// `FunctionRegistry::default()` contains the built-ins: `abs`, `round`,
/// `len`, `upper`, `lower`, `replace`, `concat`, `str`.
///
/// ```
/// use siftql::{FunctionRegistry, Value};
///
/// let mut registry = FunctionRegistry::default();
/// registry.register("double", |args| match args {
///     [Value::Integer(n)] => Ok(Value::Integer(n * 2)),
///     _ => Err(siftql::EvalError::new(siftql::EvalErrorKind::Type(
///         "double() takes one integer".to_string(),
///     ))),
/// });
/// ```
pub struct FunctionRegistry {
    funcs: HashMap<String, Arc<QueryFn>>,
}

impl FunctionRegistry {
    /// A registry with no functions at all, not even the built-ins.
    pub fn empty() -> Self {
        FunctionRegistry {
            funcs: HashMap::new(),
        }
    }

    /// Adds or replaces a function.
    pub fn register<F>(&mut self, name: &str, f: F)
    where
        F: Fn(&[Value]) -> Result<Value, EvalError> + Send + Sync + 'static,
    {
        self.funcs.insert(name.to_string(), Arc::new(f));
    }

    pub fn get(&self, name: &str) -> Option<&Arc<QueryFn>> {
        self.funcs.get(name)
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        let mut registry = FunctionRegistry::empty();
        registry.register("abs", builtin_abs);
        registry.register("round", builtin_round);
        registry.register("len", builtin_len);
        registry.register("upper", builtin_upper);
        registry.register("lower", builtin_lower);
        registry.register("replace", builtin_replace);
        registry.register("concat", builtin_concat);
        registry.register("str", builtin_str);
        registry
    }
}

fn type_error(message: String) -> EvalError {
    EvalError::new(EvalErrorKind::Type(message))
}

fn arity(name: &str, args: &[Value], expected: usize) -> Result<(), EvalError> {
    if args.len() != expected {
        return Err(type_error(format!(
            "{}() takes {} argument{}, got {}",
            name,
            expected,
            if expected == 1 { "" } else { "s" },
            args.len()
        )));
    }
    Ok(())
}

fn builtin_abs(args: &[Value]) -> Result<Value, EvalError> {
    arity("abs", args, 1)?;
    match &args[0] {
        Value::Integer(n) => Ok(Value::Integer(n.abs())),
        Value::Float(n) => Ok(Value::Float(n.abs())),
        other => Err(type_error(format!(
            "abs() requires a number, got {}",
            other.type_name()
        ))),
    }
}

/// `round(x)` rounds to an integer; `round(x, digits)` keeps a float with
/// the requested precision.
fn builtin_round(args: &[Value]) -> Result<Value, EvalError> {
    if args.is_empty() || args.len() > 2 {
        return Err(type_error(format!(
            "round() takes 1 or 2 arguments, got {}",
            args.len()
        )));
    }
    let digits = match args.get(1) {
        None => None,
        Some(Value::Integer(d)) if *d >= 0 => Some(*d as u32),
        Some(other) => {
            return Err(type_error(format!(
                "round() digit count must be a non-negative integer, got {}",
                other.type_name()
            )));
        }
    };
    match (&args[0], digits) {
        (Value::Integer(n), _) => Ok(Value::Integer(*n)),
        (Value::Float(n), None) => Ok(Value::Integer(n.round() as i64)),
        (Value::Float(n), Some(d)) => {
            let scale = 10f64.powi(d as i32);
            Ok(Value::Float((n * scale).round() / scale))
        }
        (other, _) => Err(type_error(format!(
            "round() requires a number, got {}",
            other.type_name()
        ))),
    }
}

fn builtin_len(args: &[Value]) -> Result<Value, EvalError> {
    arity("len", args, 1)?;
    match &args[0] {
        Value::Str(s) => Ok(Value::Integer(s.chars().count() as i64)),
        Value::List(items) => Ok(Value::Integer(items.len() as i64)),
        Value::Map(map) => Ok(Value::Integer(map.len() as i64)),
        other => Err(type_error(format!(
            "len() requires a string, list, or map, got {}",
            other.type_name()
        ))),
    }
}

fn builtin_upper(args: &[Value]) -> Result<Value, EvalError> {
    arity("upper", args, 1)?;
    match &args[0] {
        Value::Str(s) => Ok(Value::Str(s.to_uppercase())),
        other => Err(type_error(format!(
            "upper() requires a string, got {}",
            other.type_name()
        ))),
    }
}

fn builtin_lower(args: &[Value]) -> Result<Value, EvalError> {
    arity("lower", args, 1)?;
    match &args[0] {
        Value::Str(s) => Ok(Value::Str(s.to_lowercase())),
        other => Err(type_error(format!(
            "lower() requires a string, got {}",
            other.type_name()
        ))),
    }
}

fn builtin_replace(args: &[Value]) -> Result<Value, EvalError> {
    arity("replace", args, 3)?;
    match (&args[0], &args[1], &args[2]) {
        (Value::Str(s), Value::Str(from), Value::Str(to)) => {
            Ok(Value::Str(s.replace(from.as_str(), to)))
        }
        _ => Err(type_error(
            "replace() requires three strings".to_string(),
        )),
    }
}

/// Concatenates strings, or lists, but never a mix.
fn builtin_concat(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() < 2 {
        return Err(type_error(format!(
            "concat() takes at least 2 arguments, got {}",
            args.len()
        )));
    }
    if args.iter().all(|a| matches!(a, Value::Str(_))) {
        let mut out = String::new();
        for arg in args {
            if let Value::Str(s) = arg {
                out.push_str(s);
            }
        }
        return Ok(Value::Str(out));
    }
    if args.iter().all(|a| matches!(a, Value::List(_))) {
        let mut out = Vec::new();
        for arg in args {
            if let Value::List(items) = arg {
                out.extend(items.iter().cloned());
            }
        }
        return Ok(Value::List(out));
    }
    Err(type_error(
        "concat() requires all strings or all lists".to_string(),
    ))
}

fn builtin_str(args: &[Value]) -> Result<Value, EvalError> {
    arity("str", args, 1)?;
    let rendered = match &args[0] {
        Value::Str(s) => s.clone(),
        Value::Integer(n) => n.to_string(),
        Value::Float(n) => n.to_string(),
        Value::Boolean(b) => b.to_string(),
        Value::Null => "null".to_string(),
        other => {
            return Err(type_error(format!(
                "str() cannot render a {}",
                other.type_name()
            )));
        }
    };
    Ok(Value::Str(rendered))
}
