use std::fmt;

use crate::ast::expressions::Expr;

/// The shape of each execution result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnMode {
    /// One projected expression without a trailing comma: each result is
    /// the bare column value (`SELECT o.x` yields values, not one-tuples).
    Single,

    /// Fixed-width row of column values in projection order.
    Tuple,

    /// Map keyed by each column's output name (`RETURNING record`).
    Record,
}

/// A compiled query: the immutable combination of projection, predicate,
/// distinct flag, group-by keys, and return mode produced by either front
/// end.
///
/// Building a query never touches a collection; a compiled query is `Clone`
/// and safe to execute any number of times, from any thread, against the
/// same or different collections.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    /// Projected expressions, aliases inline as [`Expr::Alias`] nodes.
    pub projection: Vec<Expr>,
    /// Output shape.
    pub mode: ReturnMode,
    /// WHERE predicate; `None` keeps every record.
    pub predicate: Option<Expr>,
    /// Deduplicate projected results by value equality.
    pub distinct: bool,
    /// GROUP BY key expressions; empty means no grouping.
    pub group_by: Vec<Expr>,
}

impl fmt::Display for CompiledQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if self.distinct {
            "SELECT DISTINCT "
        } else {
            "SELECT "
        })?;
        for (i, col) in self.projection.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            col.fmt(f)?;
        }
        // A lone column that still yields tuples keeps its trailing comma,
        // so rendered text reparses to the same query.
        if self.projection.len() == 1 && self.mode != ReturnMode::Single {
            f.write_str(",")?;
        }
        if let Some(pred) = &self.predicate {
            write!(f, " WHERE {}", pred)?;
        }
        if !self.group_by.is_empty() {
            f.write_str(" GROUP BY ")?;
            for (i, key) in self.group_by.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                key.fmt(f)?;
            }
        }
        if self.mode == ReturnMode::Record {
            f.write_str(" RETURNING record")?;
        }
        Ok(())
    }
}
