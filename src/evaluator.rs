use std::cmp::Ordering;
use std::fmt;

use regex::Regex;
use rust_decimal::{Decimal, prelude::FromPrimitive, prelude::ToPrimitive};

use crate::ast::expressions::format_literal;
use crate::ast::{BinOp, CmpOp, Expr};
use crate::functions::FunctionRegistry;
use crate::record::Record;
use crate::value::Value;

/// The category of an evaluation failure.
#[derive(Debug, Clone, PartialEq)]
pub enum EvalErrorKind {
    /// Operand types do not fit the operation
    Type(String),

    /// The record (or derived map) has no attribute with this name
    MissingAttribute(String),

    /// The record (or derived list/map) has no entry under this key
    MissingKey(String),

    /// Function name not present in the registry
    UnknownFunction(String),

    /// Division or modulo by zero
    DivisionByZero,

    /// A `LIKE`/`MATCHES` pattern that does not compile
    InvalidPattern(String),

    /// A WHERE predicate produced something other than a boolean
    NonBooleanPredicate(&'static str),
}

/// An evaluation failure, carrying the sub-expression that produced it and,
/// once the executor has attached it, the index of the record being
/// evaluated.
#[derive(Debug, Clone)]
pub struct EvalError {
    pub kind: EvalErrorKind,
    /// Rendered text of the offending sub-expression.
    pub expr: Option<String>,
    /// Index of the record in the input collection.
    pub record: Option<usize>,
}

impl EvalError {
    pub fn new(kind: EvalErrorKind) -> Self {
        EvalError {
            kind,
            expr: None,
            record: None,
        }
    }

    /// Attaches the offending sub-expression, keeping the innermost one.
    pub(crate) fn with_expr(mut self, expr: &Expr) -> Self {
        if self.expr.is_none() {
            self.expr = Some(expr.to_string());
        }
        self
    }

    /// Attaches the index of the record being evaluated.
    pub(crate) fn with_record(mut self, index: usize) -> Self {
        if self.record.is_none() {
            self.record = Some(index);
        }
        self
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            EvalErrorKind::Type(msg) => write!(f, "type error: {}", msg)?,
            EvalErrorKind::MissingAttribute(name) => {
                write!(f, "record has no attribute '{}'", name)?;
            }
            EvalErrorKind::MissingKey(key) => {
                write!(f, "record has no entry under key {}", key)?;
            }
            EvalErrorKind::UnknownFunction(name) => {
                write!(f, "unknown function '{}'", name)?;
            }
            EvalErrorKind::DivisionByZero => f.write_str("division by zero")?,
            EvalErrorKind::InvalidPattern(msg) => {
                write!(f, "invalid pattern: {}", msg)?;
            }
            EvalErrorKind::NonBooleanPredicate(type_name) => {
                write!(f, "WHERE predicate produced a {}, expected a boolean", type_name)?;
            }
        }
        if let Some(expr) = &self.expr {
            write!(f, " in `{}`", expr)?;
        }
        if let Some(index) = self.record {
            write!(f, " (record {})", index)?;
        }
        Ok(())
    }
}

impl std::error::Error for EvalError {}

/// The expression evaluator: a pure recursive tree walk binding the
/// current-record placeholder to one record per call.
///
/// No state survives across records; the evaluator only borrows the
/// function registry it resolves call expressions against.
pub struct Evaluator<'a> {
    functions: &'a FunctionRegistry,
}

impl<'a> Evaluator<'a> {
    pub fn new(functions: &'a FunctionRegistry) -> Self {
        Evaluator { functions }
    }

    /// Evaluates an expression against one record.
    pub fn eval(&self, expr: &Expr, record: &dyn Record) -> Result<Value, EvalError> {
        match expr {
            Expr::Integer(n) => Ok(Value::Integer(*n)),
            Expr::Float(n) => Ok(Value::Float(*n)),
            Expr::Str(s) => Ok(Value::Str(s.clone())),
            Expr::Boolean(b) => Ok(Value::Boolean(*b)),
            Expr::Null => Ok(Value::Null),
            Expr::Current => Ok(record.to_value()),
            Expr::Attr { object, name } => {
                // Attribute lookup on the record itself goes through the
                // Record capability; lookups on derived values use the
                // value's own shape.
                if matches!(**object, Expr::Current) {
                    record.attr(name).ok_or_else(|| {
                        EvalError::new(EvalErrorKind::MissingAttribute(name.clone()))
                            .with_expr(expr)
                    })
                } else {
                    let object = self.eval(object, record)?;
                    value_attr(&object, name).map_err(|e| e.with_expr(expr))
                }
            }
            Expr::Index { object, key } => {
                if matches!(**object, Expr::Current) {
                    record.index(key).ok_or_else(|| {
                        EvalError::new(EvalErrorKind::MissingKey(format_literal(key)))
                            .with_expr(expr)
                    })
                } else {
                    let object = self.eval(object, record)?;
                    value_index(&object, key).map_err(|e| e.with_expr(expr))
                }
            }
            Expr::Call { name, args } => {
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(self.eval(arg, record)?);
                }
                match self.functions.get(name) {
                    Some(f) => f(&values).map_err(|e| e.with_expr(expr)),
                    None => Err(EvalError::new(EvalErrorKind::UnknownFunction(name.clone()))
                        .with_expr(expr)),
                }
            }
            Expr::List(items) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    values.push(self.eval(item, record)?);
                }
                Ok(Value::List(values))
            }
            Expr::Binary { op, left, right } => match op {
                BinOp::And => {
                    if !self.eval_bool(left, record, "AND")? {
                        // Short-circuit: the right side is never evaluated.
                        return Ok(Value::Boolean(false));
                    }
                    Ok(Value::Boolean(self.eval_bool(right, record, "AND")?))
                }
                BinOp::Or => {
                    if self.eval_bool(left, record, "OR")? {
                        return Ok(Value::Boolean(true));
                    }
                    Ok(Value::Boolean(self.eval_bool(right, record, "OR")?))
                }
                BinOp::In => {
                    let needle = self.eval(left, record)?;
                    let haystack = self.eval(right, record)?;
                    match haystack {
                        Value::List(items) => Ok(Value::Boolean(
                            items.iter().any(|item| needle.loose_eq(item)),
                        )),
                        other => Err(EvalError::new(EvalErrorKind::Type(format!(
                            "IN requires a list on the right, got {}",
                            other.type_name()
                        )))
                        .with_expr(expr)),
                    }
                }
                BinOp::Compare(op) => {
                    let left = self.eval(left, record)?;
                    let right = self.eval(right, record)?;
                    compare(*op, &left, &right).map_err(|e| e.with_expr(expr))
                }
                BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Mod | BinOp::Pow => {
                    let left = self.eval(left, record)?;
                    let right = self.eval(right, record)?;
                    arith(*op, &left, &right).map_err(|e| e.with_expr(expr))
                }
            },
            Expr::Not(operand) => Ok(Value::Boolean(!self.eval_bool(operand, record, "NOT")?)),
            Expr::Alias { expr, .. } => self.eval(expr, record),
        }
    }

    /// Evaluates an operand that must be a boolean (AND/OR/NOT).
    fn eval_bool(
        &self,
        expr: &Expr,
        record: &dyn Record,
        connective: &str,
    ) -> Result<bool, EvalError> {
        match self.eval(expr, record)? {
            Value::Boolean(b) => Ok(b),
            other => Err(EvalError::new(EvalErrorKind::Type(format!(
                "{} operand must be a boolean, got {}",
                connective,
                other.type_name()
            )))
            .with_expr(expr)),
        }
    }
}

fn value_attr(object: &Value, name: &str) -> Result<Value, EvalError> {
    match object {
        Value::Map(map) => map
            .get(name)
            .cloned()
            .ok_or_else(|| EvalError::new(EvalErrorKind::MissingAttribute(name.to_string()))),
        other => Err(EvalError::new(EvalErrorKind::Type(format!(
            "cannot read attribute '{}' of {}",
            name,
            other.type_name()
        )))),
    }
}

fn value_index(object: &Value, key: &Value) -> Result<Value, EvalError> {
    match (object, key) {
        (Value::Map(_), Value::Str(_)) | (Value::List(_), Value::Integer(_)) => object
            .index(key)
            .ok_or_else(|| EvalError::new(EvalErrorKind::MissingKey(format_literal(key)))),
        _ => Err(EvalError::new(EvalErrorKind::Type(format!(
            "cannot index {} with {} key",
            object.type_name(),
            key.type_name()
        )))),
    }
}

fn compare(op: CmpOp, left: &Value, right: &Value) -> Result<Value, EvalError> {
    let verdict = match op {
        CmpOp::Eq => left.loose_eq(right),
        CmpOp::Ne => !left.loose_eq(right),
        CmpOp::Lt => order(left, right)? == Ordering::Less,
        CmpOp::Le => order(left, right)? != Ordering::Greater,
        CmpOp::Gt => order(left, right)? == Ordering::Greater,
        CmpOp::Ge => order(left, right)? != Ordering::Less,
        CmpOp::Contains => match (left, right) {
            (Value::Str(s), Value::Str(needle)) => s.contains(needle.as_str()),
            (Value::List(items), needle) => items.iter().any(|item| needle.loose_eq(item)),
            (a, b) => {
                return Err(EvalError::new(EvalErrorKind::Type(format!(
                    "CONTAINS requires a string or list on the left, got {} and {}",
                    a.type_name(),
                    b.type_name()
                ))));
            }
        },
        CmpOp::Like => match (left, right) {
            (Value::Str(s), Value::Str(pattern)) => {
                let regex = Regex::new(&glob_to_regex(pattern))
                    .map_err(|e| EvalError::new(EvalErrorKind::InvalidPattern(e.to_string())))?;
                regex.is_match(s)
            }
            (a, b) => {
                return Err(EvalError::new(EvalErrorKind::Type(format!(
                    "LIKE requires two strings, got {} and {}",
                    a.type_name(),
                    b.type_name()
                ))));
            }
        },
        CmpOp::Matches => match (left, right) {
            (Value::Str(s), Value::Str(pattern)) => {
                // Anchored at the start only, like a prefix match.
                let regex = Regex::new(&format!("^(?:{})", pattern))
                    .map_err(|e| EvalError::new(EvalErrorKind::InvalidPattern(e.to_string())))?;
                regex.is_match(s)
            }
            (a, b) => {
                return Err(EvalError::new(EvalErrorKind::Type(format!(
                    "MATCHES requires two strings, got {} and {}",
                    a.type_name(),
                    b.type_name()
                ))));
            }
        },
    };
    Ok(Value::Boolean(verdict))
}

fn order(left: &Value, right: &Value) -> Result<Ordering, EvalError> {
    if let (Some(a), Some(b)) = (left.as_f64(), right.as_f64()) {
        return a.partial_cmp(&b).ok_or_else(|| {
            EvalError::new(EvalErrorKind::Type(
                "comparison with NaN is undefined".to_string(),
            ))
        });
    }
    match (left, right) {
        (Value::Str(a), Value::Str(b)) => Ok(a.cmp(b)),
        (a, b) => Err(EvalError::new(EvalErrorKind::Type(format!(
            "cannot order {} against {}",
            a.type_name(),
            b.type_name()
        )))),
    }
}

/// Translates a glob pattern (`*`, `?`) into an anchored regex.
fn glob_to_regex(pattern: &str) -> String {
    let mut out = String::from("^");
    for ch in pattern.chars() {
        match ch {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            ch => out.push_str(&regex::escape(&ch.to_string())),
        }
    }
    out.push('$');
    out
}

fn arith(op: BinOp, left: &Value, right: &Value) -> Result<Value, EvalError> {
    match (left, right) {
        (Value::Str(a), Value::Str(b)) if op == BinOp::Add => {
            Ok(Value::Str(format!("{}{}", a, b)))
        }
        (Value::Integer(a), Value::Integer(b)) => int_arith(op, *a, *b),
        (Value::Float(a), Value::Float(b)) => float_arith(op, *a, *b),
        (Value::Integer(a), Value::Float(b)) => mixed_arith(op, *a as f64, *b),
        (Value::Float(a), Value::Integer(b)) => mixed_arith(op, *a, *b as f64),
        (a, b) => Err(EvalError::new(EvalErrorKind::Type(format!(
            "cannot apply `{}` to {} and {}",
            op,
            a.type_name(),
            b.type_name()
        )))),
    }
}

fn int_arith(op: BinOp, a: i64, b: i64) -> Result<Value, EvalError> {
    let overflow = || EvalError::new(EvalErrorKind::Type(format!("integer overflow in `{}`", op)));
    match op {
        BinOp::Add => a.checked_add(b).map(Value::Integer).ok_or_else(overflow),
        BinOp::Sub => a.checked_sub(b).map(Value::Integer).ok_or_else(overflow),
        BinOp::Mul => a.checked_mul(b).map(Value::Integer).ok_or_else(overflow),
        BinOp::Div => {
            if b == 0 {
                return Err(EvalError::new(EvalErrorKind::DivisionByZero));
            }
            // Exact integer division stays an integer.
            if a % b == 0 {
                Ok(Value::Integer(a / b))
            } else {
                Ok(Value::Float(a as f64 / b as f64))
            }
        }
        BinOp::Mod => {
            if b == 0 {
                return Err(EvalError::new(EvalErrorKind::DivisionByZero));
            }
            Ok(Value::Integer(a % b))
        }
        BinOp::Pow => {
            if b >= 0
                && let Ok(exp) = u32::try_from(b)
                && let Some(n) = a.checked_pow(exp)
            {
                Ok(Value::Integer(n))
            } else {
                Ok(Value::Float((a as f64).powf(b as f64)))
            }
        }
        _ => unreachable!("non-arithmetic operator in arith"),
    }
}

fn float_arith(op: BinOp, a: f64, b: f64) -> Result<Value, EvalError> {
    match op {
        BinOp::Add => Ok(Value::Float(a + b)),
        BinOp::Sub => Ok(Value::Float(a - b)),
        BinOp::Mul => Ok(Value::Float(a * b)),
        BinOp::Div => {
            if b == 0.0 {
                return Err(EvalError::new(EvalErrorKind::DivisionByZero));
            }
            Ok(Value::Float(a / b))
        }
        BinOp::Mod => {
            if b == 0.0 {
                return Err(EvalError::new(EvalErrorKind::DivisionByZero));
            }
            Ok(Value::Float(a % b))
        }
        BinOp::Pow => Ok(Value::Float(a.powf(b))),
        _ => unreachable!("non-arithmetic operator in arith"),
    }
}

/// Mixed integer/float arithmetic through decimal so results that are
/// mathematically whole come back as integers (`100 * 1.1` is `110`, not
/// `110.00000000000001`).
fn mixed_arith(op: BinOp, a: f64, b: f64) -> Result<Value, EvalError> {
    if matches!(op, BinOp::Div | BinOp::Mod) && b == 0.0 {
        return Err(EvalError::new(EvalErrorKind::DivisionByZero));
    }
    if op == BinOp::Pow {
        return Ok(Value::Float(a.powf(b)));
    }
    if let Some(ad) = Decimal::from_f64(a)
        && let Some(bd) = Decimal::from_f64(b)
    {
        let rd = match op {
            BinOp::Add => ad + bd,
            BinOp::Sub => ad - bd,
            BinOp::Mul => ad * bd,
            BinOp::Div => ad / bd,
            BinOp::Mod => ad % bd,
            _ => unreachable!("non-arithmetic operator in arith"),
        };
        if rd.is_integer()
            && let Some(n) = rd.to_i64()
        {
            return Ok(Value::Integer(n));
        } else if let Some(n) = rd.to_f64() {
            return Ok(Value::Float(n));
        }
    }
    float_arith(op, a, b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{fields, lit, rec};

    fn point(x: i64, y: i64) -> Value {
        let mut map = std::collections::HashMap::new();
        map.insert("x".to_string(), Value::Integer(x));
        map.insert("y".to_string(), Value::Integer(y));
        Value::Map(map)
    }

    fn eval(expr: &Expr, record: &Value) -> Result<Value, EvalError> {
        let registry = FunctionRegistry::default();
        Evaluator::new(&registry).eval(expr, record)
    }

    #[test]
    fn attribute_access_reads_the_record() {
        let [x] = fields(["x"]);
        let result = eval(x.expr(), &point(3, 4)).unwrap();
        assert_eq!(result, Value::Integer(3));
    }

    #[test]
    fn missing_attribute_names_the_subexpression() {
        let missing = rec().attr("z");
        let err = eval(missing.expr(), &point(3, 4)).unwrap_err();
        assert_eq!(
            err.kind,
            EvalErrorKind::MissingAttribute("z".to_string())
        );
        assert_eq!(err.expr.as_deref(), Some("o.z"));
    }

    #[test]
    fn and_short_circuits_past_errors() {
        // The right side divides by zero; a false left side must skip it.
        let [x] = fields(["x"]);
        let guarded = lit(false).and(lit(1) / x);
        let result = eval(guarded.expr(), &point(0, 0)).unwrap();
        assert_eq!(result, Value::Boolean(false));
    }

    #[test]
    fn mixed_arithmetic_preserves_whole_integers() {
        let price = lit(100) * 1.1;
        assert_eq!(eval(price.expr(), &point(0, 0)).unwrap(), Value::Integer(110));

        let fractional = lit(100) * 1.115;
        assert_eq!(
            eval(fractional.expr(), &point(0, 0)).unwrap(),
            Value::Float(111.5)
        );
    }

    #[test]
    fn division_by_zero_is_an_error() {
        let bad = lit(1) / 0;
        let err = eval(bad.expr(), &point(0, 0)).unwrap_err();
        assert_eq!(err.kind, EvalErrorKind::DivisionByZero);
    }

    #[test]
    fn like_globs_and_matches_anchors() {
        let name = lit("widget-9");
        let like = name.clone().like("widget-?");
        assert_eq!(eval(like.expr(), &point(0, 0)).unwrap(), Value::Boolean(true));

        let matches = name.matches("widget");
        assert_eq!(
            eval(matches.expr(), &point(0, 0)).unwrap(),
            Value::Boolean(true)
        );

        let not_prefix = lit("a-widget").matches("widget");
        assert_eq!(
            eval(not_prefix.expr(), &point(0, 0)).unwrap(),
            Value::Boolean(false)
        );
    }
}
