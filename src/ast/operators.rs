use std::fmt;

/// Comparison operators, one token class carrying the concrete operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    /// Equal (`=` or `==`)
    Eq,
    /// Not equal (`!=`)
    Ne,
    /// Less than (`<`)
    Lt,
    /// Less than or equal (`<=`)
    Le,
    /// Greater than (`>`)
    Gt,
    /// Greater than or equal (`>=`)
    Ge,
    /// Substring / list membership test (`CONTAINS`)
    Contains,
    /// Glob pattern match (`LIKE`, with `*` and `?` wildcards)
    Like,
    /// Regular-expression match anchored at the start (`MATCHES`)
    Matches,
}

impl fmt::Display for CmpOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CmpOp::Eq => "=",
            CmpOp::Ne => "!=",
            CmpOp::Lt => "<",
            CmpOp::Le => "<=",
            CmpOp::Gt => ">",
            CmpOp::Ge => ">=",
            CmpOp::Contains => "CONTAINS",
            CmpOp::Like => "LIKE",
            CmpOp::Matches => "MATCHES",
        };
        f.write_str(s)
    }
}

/// Binary operators, lowest precedence first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BinOp {
    /// Logical OR (short-circuiting)
    Or,
    /// Logical AND (short-circuiting)
    And,
    /// List membership (`IN`)
    In,
    /// Comparison carrying the concrete operator
    Compare(CmpOp),
    /// Addition or string concatenation (`+`)
    Add,
    /// Subtraction (`-`)
    Sub,
    /// Multiplication (`*`)
    Mul,
    /// Division (`/`)
    Div,
    /// Modulo (`%`)
    Mod,
    /// Exponentiation (`^` or `**`, right-associative)
    Pow,
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BinOp::Or => f.write_str("OR"),
            BinOp::And => f.write_str("AND"),
            BinOp::In => f.write_str("IN"),
            BinOp::Compare(op) => op.fmt(f),
            BinOp::Add => f.write_str("+"),
            BinOp::Sub => f.write_str("-"),
            BinOp::Mul => f.write_str("*"),
            BinOp::Div => f.write_str("/"),
            BinOp::Mod => f.write_str("%"),
            BinOp::Pow => f.write_str("^"),
        }
    }
}
