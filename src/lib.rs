pub mod ast;
pub mod builder;
#[cfg(feature = "cli")]
pub mod cli;
pub mod evaluator;
pub mod executor;
pub mod functions;
pub mod lexer;
pub mod output;
pub mod parser;
pub mod record;
pub mod value;

pub use ast::{BinOp, CmpOp, CompiledQuery, Expr, ReturnMode, Token, TokenKind};
pub use builder::{FieldExpr, call, fields, lit, rec, select, select_record};
pub use evaluator::{EvalError, EvalErrorKind, Evaluator};
pub use functions::FunctionRegistry;
pub use lexer::{LexError, Lexer, tokenize};
pub use output::{from_json, to_json};
pub use parser::{ParseError, Parser};
pub use record::Record;
pub use value::Value;

/// Compiles query text into a reusable [`CompiledQuery`].
///
/// ```
/// use siftql::query;
///
/// let q = query("SELECT o.x WHERE o.x IN (1, 2,)").unwrap();
/// assert_eq!(q.to_string(), "SELECT o.x WHERE (o.x IN (1, 2))");
/// ```
pub fn query(text: &str) -> Result<CompiledQuery, ParseError> {
    Parser::new(Lexer::new(text))?.parse()
}
