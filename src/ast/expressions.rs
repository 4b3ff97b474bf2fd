use std::fmt;

use crate::ast::operators::BinOp;
use crate::value::Value;

/// An expression node, the shared target of both the parser and the builder.
///
/// Trees are acyclic and fully owned top-down; a node is never mutated after
/// construction. Combining expressions allocates new parents around the old
/// operands, so sharing a sub-expression across queries is always safe.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Integer literal
    Integer(i64),

    /// Float literal
    Float(f64),

    /// String literal
    Str(String),

    /// Boolean literal
    Boolean(bool),

    /// Null literal
    Null,

    /// The current-record placeholder (`o`)
    Current,

    /// Attribute access (`o.name`)
    Attr {
        object: Box<Expr>,
        name: String,
    },

    /// Index access by literal key (`o[0]`, `o['key']`)
    Index {
        object: Box<Expr>,
        key: Value,
    },

    /// Function call (`upper(o.name)`)
    ///
    /// The name is resolved against the function registry at evaluation
    /// time; an unknown name is an evaluation error.
    Call {
        name: String,
        args: Vec<Expr>,
    },

    /// Expression list, the right-hand side of `IN`
    List(Vec<Expr>),

    /// Binary operation (logical, membership, comparison, arithmetic)
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// Logical negation (`NOT expr`)
    Not(Box<Expr>),

    /// Alias suffix (`expr AS name`)
    ///
    /// Evaluates as the inner expression; the name only affects the output
    /// column name in record-shaped results.
    Alias {
        expr: Box<Expr>,
        name: String,
    },
}

impl Expr {
    /// The output column name this expression projects under in
    /// record-shaped results: the alias if one was given, the attribute or
    /// key name for plain accesses, the rendered text otherwise.
    pub fn output_name(&self) -> String {
        match self {
            Expr::Alias { name, .. } => name.clone(),
            Expr::Attr { name, .. } => name.clone(),
            Expr::Index { key, .. } => match key {
                Value::Str(s) => s.clone(),
                other => format_literal(other),
            },
            Expr::Current => "o".to_string(),
            other => other.to_string(),
        }
    }
}

/// Renders a literal value as query text (strings single-quoted and escaped).
pub(crate) fn format_literal(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Boolean(true) => "TRUE".to_string(),
        Value::Boolean(false) => "FALSE".to_string(),
        Value::Integer(n) => n.to_string(),
        Value::Float(n) => n.to_string(),
        Value::Str(s) => {
            let mut out = String::with_capacity(s.len() + 2);
            out.push('\'');
            for ch in s.chars() {
                match ch {
                    '\'' => out.push_str("\\'"),
                    '\\' => out.push_str("\\\\"),
                    c => out.push(c),
                }
            }
            out.push('\'');
            out
        }
        other => format!("{:?}", other),
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Integer(n) => write!(f, "{}", n),
            Expr::Float(n) => {
                if n.fract() == 0.0 && n.is_finite() {
                    write!(f, "{:.1}", n)
                } else {
                    write!(f, "{}", n)
                }
            }
            Expr::Str(s) => f.write_str(&format_literal(&Value::Str(s.clone()))),
            Expr::Boolean(true) => f.write_str("TRUE"),
            Expr::Boolean(false) => f.write_str("FALSE"),
            Expr::Null => f.write_str("NULL"),
            Expr::Current => f.write_str("o"),
            Expr::Attr { object, name } => write!(f, "{}.{}", object, name),
            Expr::Index { object, key } => {
                write!(f, "{}[{}]", object, format_literal(key))
            }
            Expr::Call { name, args } => {
                write!(f, "{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    arg.fmt(f)?;
                }
                f.write_str(")")
            }
            Expr::List(items) => {
                f.write_str("(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    item.fmt(f)?;
                }
                f.write_str(")")
            }
            Expr::Binary { op, left, right } => {
                write!(f, "({} {} {})", left, op, right)
            }
            Expr::Not(operand) => write!(f, "NOT {}", operand),
            Expr::Alias { expr, name } => write!(f, "{} AS {}", expr, name),
        }
    }
}
