//! # siftql - Abstract Syntax Tree
//!
//! This module defines the shared internal representation of a query: the
//! tokens the lexer produces, the expression tree both front ends build, and
//! the compiled query that executes against a collection.
//!
//! ## Architecture Overview
//!
//! The AST module is organized into focused submodules:
//!
//! - **[tokens]** - Lexical tokens produced by the lexer
//! - **[operators]** - Binary and comparison operators
//! - **[expressions]** - Expression nodes (literals, access, operations)
//! - **[query]** - The compiled query: projection, predicate, grouping, shape
//!
//! ## Core Concepts
//!
//! ### One representation, two front ends
//!
//! A query can be written as text and parsed:
//!
//! ```text
//! SELECT o.name, o.price * o.qty AS total WHERE o.price > 10
//! ```
//!
//! or composed programmatically from field placeholders:
//!
//! ```
//! use siftql::{fields, select};
//!
//! let [name, price, qty] = fields(["name", "price", "qty"]);
//! let q = select(vec![name, (price.clone() * qty).alias("total")])
//!     .filter(price.gt(10));
//! ```
//!
//! Both produce structurally identical [`Expr`] trees inside the same
//! [`CompiledQuery`]; equivalent queries execute identically no matter which
//! front end built them.
//!
//! ### The current-record placeholder
//!
//! `o` (or `@`) stands for "the record being evaluated". Everything a query
//! reads from a record hangs off it: `o.price` is an attribute access,
//! `o[0]` an index access, `o` alone the record itself.
//!
//! ### Immutability
//!
//! Expression nodes are never mutated after construction. Combining
//! expressions allocates new nodes around the old ones, so a sub-expression
//! can be shared between queries freely, and a compiled query can be reused
//! across executions and collections.
pub mod expressions;
pub mod operators;
pub mod query;
pub mod tokens;

pub use expressions::Expr;
pub use operators::{BinOp, CmpOp};
pub use query::{CompiledQuery, ReturnMode};
pub use tokens::{Token, TokenKind};
