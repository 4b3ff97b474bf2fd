//! Programmatic query construction from field placeholders.
//!
//! Every operator on a [`FieldExpr`] allocates an AST node instead of
//! computing a value, so composing placeholders builds exactly the tree the
//! parser would produce for the equivalent query text:
//!
//! ```
//! use siftql::{fields, select_record};
//!
//! let [x, y] = fields(["x", "y"]);
//! let q = select_record().filter(x.eq(y));
//!
//! assert_eq!(q, siftql::query("SELECT o WHERE o.x = o.y").unwrap());
//! ```
//!
//! Arithmetic uses the native operators; comparisons and logical
//! connectives are methods (`eq`, `lt`, `and`, ...) because Rust's
//! comparison and short-circuit operators cannot return an expression tree.

use crate::ast::{BinOp, CmpOp, CompiledQuery, Expr, ReturnMode};
use crate::value::Value;

/// A query expression under construction.
///
/// Obtained from [`rec`], [`fields`], [`lit`], or [`call`], and combined
/// with operators and methods into larger expressions. `FieldExpr` is
/// cheap to clone; clone a placeholder whenever it appears in more than
/// one spot of a query.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldExpr {
    expr: Expr,
}

/// The current-record placeholder, `o` in query text.
pub fn rec() -> FieldExpr {
    FieldExpr {
        expr: Expr::Current,
    }
}

/// A literal expression.
pub fn lit(value: impl Into<FieldExpr>) -> FieldExpr {
    value.into()
}

/// One placeholder per named field, each pre-wired as an attribute access
/// on the current record.
///
/// ```
/// use siftql::fields;
///
/// let [name, price] = fields(["name", "price"]);
/// let markup = price * 1.1;
/// # let _ = (name, markup);
/// ```
pub fn fields<const N: usize>(names: [&str; N]) -> [FieldExpr; N] {
    names.map(|name| rec().attr(name))
}

/// A function-call expression; the name is resolved at evaluation time.
pub fn call<I>(name: &str, args: I) -> FieldExpr
where
    I: IntoIterator,
    I::Item: Into<FieldExpr>,
{
    FieldExpr {
        expr: Expr::Call {
            name: name.to_string(),
            args: args.into_iter().map(|a| a.into().expr).collect(),
        },
    }
}

impl FieldExpr {
    /// The underlying expression node.
    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    /// Consumes the builder, yielding the expression node.
    pub fn into_expr(self) -> Expr {
        self.expr
    }

    fn binary(self, op: BinOp, rhs: impl Into<FieldExpr>) -> FieldExpr {
        FieldExpr {
            expr: Expr::Binary {
                op,
                left: Box::new(self.expr),
                right: Box::new(rhs.into().expr),
            },
        }
    }

    /// Attribute access: `o.name`.
    pub fn attr(self, name: &str) -> FieldExpr {
        FieldExpr {
            expr: Expr::Attr {
                object: Box::new(self.expr),
                name: name.to_string(),
            },
        }
    }

    /// Index access by literal key: `o[0]`, `o['key']`.
    pub fn index(self, key: impl Into<Value>) -> FieldExpr {
        FieldExpr {
            expr: Expr::Index {
                object: Box::new(self.expr),
                key: key.into(),
            },
        }
    }

    /// Alias suffix: `expr AS name`.
    pub fn alias(self, name: &str) -> FieldExpr {
        FieldExpr {
            expr: Expr::Alias {
                expr: Box::new(self.expr),
                name: name.to_string(),
            },
        }
    }

    /// Equality: `=`.
    pub fn eq(self, rhs: impl Into<FieldExpr>) -> FieldExpr {
        self.binary(BinOp::Compare(CmpOp::Eq), rhs)
    }

    /// Inequality: `!=`.
    pub fn ne(self, rhs: impl Into<FieldExpr>) -> FieldExpr {
        self.binary(BinOp::Compare(CmpOp::Ne), rhs)
    }

    /// Ordering: `<`.
    pub fn lt(self, rhs: impl Into<FieldExpr>) -> FieldExpr {
        self.binary(BinOp::Compare(CmpOp::Lt), rhs)
    }

    /// Ordering: `<=`.
    pub fn le(self, rhs: impl Into<FieldExpr>) -> FieldExpr {
        self.binary(BinOp::Compare(CmpOp::Le), rhs)
    }

    /// Ordering: `>`.
    pub fn gt(self, rhs: impl Into<FieldExpr>) -> FieldExpr {
        self.binary(BinOp::Compare(CmpOp::Gt), rhs)
    }

    /// Ordering: `>=`.
    pub fn ge(self, rhs: impl Into<FieldExpr>) -> FieldExpr {
        self.binary(BinOp::Compare(CmpOp::Ge), rhs)
    }

    /// Substring / membership test: `CONTAINS`.
    pub fn contains(self, rhs: impl Into<FieldExpr>) -> FieldExpr {
        self.binary(BinOp::Compare(CmpOp::Contains), rhs)
    }

    /// Glob pattern match: `LIKE`.
    pub fn like(self, pattern: impl Into<FieldExpr>) -> FieldExpr {
        self.binary(BinOp::Compare(CmpOp::Like), pattern)
    }

    /// Regular-expression match: `MATCHES`.
    pub fn matches(self, pattern: impl Into<FieldExpr>) -> FieldExpr {
        self.binary(BinOp::Compare(CmpOp::Matches), pattern)
    }

    /// Logical conjunction; a method because `&&` cannot be overloaded.
    pub fn and(self, rhs: impl Into<FieldExpr>) -> FieldExpr {
        self.binary(BinOp::And, rhs)
    }

    /// Logical disjunction; a method because `||` cannot be overloaded.
    pub fn or(self, rhs: impl Into<FieldExpr>) -> FieldExpr {
        self.binary(BinOp::Or, rhs)
    }

    /// Logical negation: `NOT expr`.
    pub fn not(self) -> FieldExpr {
        FieldExpr {
            expr: Expr::Not(Box::new(self.expr)),
        }
    }

    /// Membership test: `expr IN (a, b, c)`.
    pub fn in_list<I>(self, items: I) -> FieldExpr
    where
        I: IntoIterator,
        I::Item: Into<FieldExpr>,
    {
        let items = items.into_iter().map(|i| i.into().expr).collect();
        FieldExpr {
            expr: Expr::Binary {
                op: BinOp::In,
                left: Box::new(self.expr),
                right: Box::new(Expr::List(items)),
            },
        }
    }

    /// Exponentiation (`^`); a method because Rust has no power operator.
    pub fn pow(self, rhs: impl Into<FieldExpr>) -> FieldExpr {
        self.binary(BinOp::Pow, rhs)
    }
}

impl<R: Into<FieldExpr>> std::ops::Add<R> for FieldExpr {
    type Output = FieldExpr;

    fn add(self, rhs: R) -> FieldExpr {
        self.binary(BinOp::Add, rhs)
    }
}

impl<R: Into<FieldExpr>> std::ops::Sub<R> for FieldExpr {
    type Output = FieldExpr;

    fn sub(self, rhs: R) -> FieldExpr {
        self.binary(BinOp::Sub, rhs)
    }
}

impl<R: Into<FieldExpr>> std::ops::Mul<R> for FieldExpr {
    type Output = FieldExpr;

    fn mul(self, rhs: R) -> FieldExpr {
        self.binary(BinOp::Mul, rhs)
    }
}

impl<R: Into<FieldExpr>> std::ops::Div<R> for FieldExpr {
    type Output = FieldExpr;

    fn div(self, rhs: R) -> FieldExpr {
        self.binary(BinOp::Div, rhs)
    }
}

impl<R: Into<FieldExpr>> std::ops::Rem<R> for FieldExpr {
    type Output = FieldExpr;

    fn rem(self, rhs: R) -> FieldExpr {
        self.binary(BinOp::Mod, rhs)
    }
}

impl From<bool> for FieldExpr {
    fn from(b: bool) -> Self {
        FieldExpr {
            expr: Expr::Boolean(b),
        }
    }
}

impl From<i64> for FieldExpr {
    fn from(n: i64) -> Self {
        FieldExpr {
            expr: Expr::Integer(n),
        }
    }
}

impl From<i32> for FieldExpr {
    fn from(n: i32) -> Self {
        FieldExpr {
            expr: Expr::Integer(n as i64),
        }
    }
}

impl From<f64> for FieldExpr {
    fn from(n: f64) -> Self {
        FieldExpr {
            expr: Expr::Float(n),
        }
    }
}

impl From<&str> for FieldExpr {
    fn from(s: &str) -> Self {
        FieldExpr {
            expr: Expr::Str(s.to_string()),
        }
    }
}

impl From<String> for FieldExpr {
    fn from(s: String) -> Self {
        FieldExpr {
            expr: Expr::Str(s),
        }
    }
}

impl<T: Into<FieldExpr>> From<Vec<T>> for FieldExpr {
    fn from(items: Vec<T>) -> Self {
        FieldExpr {
            expr: Expr::List(items.into_iter().map(|i| i.into().expr).collect()),
        }
    }
}

/// Anything that can serve as a SELECT projection.
///
/// A lone [`FieldExpr`] selects bare values ([`ReturnMode::Single`]); an
/// array or `Vec` selects fixed-width rows even with one element, mirroring
/// the trailing-comma distinction in query text.
pub trait IntoProjection {
    fn into_projection(self) -> (Vec<Expr>, ReturnMode);
}

impl IntoProjection for FieldExpr {
    fn into_projection(self) -> (Vec<Expr>, ReturnMode) {
        (vec![self.expr], ReturnMode::Single)
    }
}

impl IntoProjection for Vec<FieldExpr> {
    fn into_projection(self) -> (Vec<Expr>, ReturnMode) {
        (
            self.into_iter().map(FieldExpr::into_expr).collect(),
            ReturnMode::Tuple,
        )
    }
}

impl<const N: usize> IntoProjection for [FieldExpr; N] {
    fn into_projection(self) -> (Vec<Expr>, ReturnMode) {
        (
            self.into_iter().map(FieldExpr::into_expr).collect(),
            ReturnMode::Tuple,
        )
    }
}

/// The builder's SELECT entry point.
pub fn select(projection: impl IntoProjection) -> CompiledQuery {
    let (projection, mode) = projection.into_projection();
    CompiledQuery {
        projection,
        mode,
        predicate: None,
        distinct: false,
        group_by: Vec::new(),
    }
}

/// `SELECT o`: project the whole record.
pub fn select_record() -> CompiledQuery {
    select(rec())
}

impl CompiledQuery {
    /// The WHERE clause. Chaining is non-mutating: each call returns a new
    /// compiled query, so a shared base query is never changed.
    pub fn filter(self, predicate: FieldExpr) -> Self {
        CompiledQuery {
            predicate: Some(predicate.expr),
            ..self
        }
    }

    /// The GROUP BY clause.
    pub fn group_by<I>(self, keys: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<FieldExpr>,
    {
        CompiledQuery {
            group_by: keys.into_iter().map(|k| k.into().expr).collect(),
            ..self
        }
    }

    /// The DISTINCT flag.
    pub fn distinct(self) -> Self {
        CompiledQuery {
            distinct: true,
            ..self
        }
    }

    /// `RETURNING record`: shape each result as a map keyed by column
    /// output names.
    pub fn returning_record(self) -> Self {
        CompiledQuery {
            mode: ReturnMode::Record,
            ..self
        }
    }
}
