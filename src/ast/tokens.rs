use std::fmt;

use crate::ast::operators::CmpOp;

/// A lexical token with its source offset.
///
/// The offset is the character position where the token starts, carried
/// through to parse errors so a caller can point at the offending spot.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub offset: usize,
}

impl Token {
    pub fn new(kind: TokenKind, offset: usize) -> Self {
        Token { kind, offset }
    }
}

/// The kind of a lexical token, carrying any literal payload.
///
/// Keywords are case-insensitive and reserved: `select`, `Select`, and
/// `SELECT` all lex as [`TokenKind::Select`] and none of them can be used
/// as an identifier.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    /// Integer literal, including `0x`/`0o`/`0b` radix forms
    ///
    /// # Examples
    /// ```text
    /// 42
    /// 0xff
    /// 0b1010
    /// ```
    Integer(i64),

    /// Float literal: point floats and exponent floats
    ///
    /// # Examples
    /// ```text
    /// 3.14
    /// .5
    /// 12.
    /// 1e-3
    /// ```
    Float(f64),

    /// String literal in single or double quotes
    ///
    /// # Examples
    /// ```text
    /// 'hello'
    /// "it''s"
    /// ```
    Str(String),

    /// Boolean literal (`TRUE` / `FALSE`)
    Boolean(bool),

    /// Null literal (`NULL`, also accepted as `NONE`)
    Null,

    // Identifiers and references
    /// Non-keyword identifier: a field or function name
    ///
    /// # Examples
    /// ```text
    /// price
    /// item_count
    /// upper
    /// ```
    Ident(String),

    /// The current-record placeholder, written `o` or `@`
    ///
    /// Every record-relative expression starts here:
    ///
    /// ```text
    /// o
    /// o.price
    /// o['key']
    /// ```
    Current,

    // Clause keywords
    /// `SELECT`
    Select,
    /// `DISTINCT`
    Distinct,
    /// `WHERE`
    Where,
    /// `GROUP` (first half of `GROUP BY`)
    Group,
    /// `BY` (second half of `GROUP BY`)
    By,
    /// `AS` (alias suffix)
    As,
    /// `RETURNING` (output view selector)
    Returning,

    // Logical keywords
    /// `AND`
    And,
    /// `OR`
    Or,
    /// `NOT`
    Not,
    /// `IN` (membership)
    In,

    /// Comparison operator as a single token class
    ///
    /// Covers the symbolic forms (`=`, `==`, `!=`, `<`, `<=`, `>`, `>=`)
    /// and the word forms (`CONTAINS`, `LIKE`, `MATCHES`).
    Compare(CmpOp),

    // Arithmetic
    /// Addition or string concatenation
    Plus,
    /// Subtraction / unary minus
    Minus,
    /// Multiplication
    Star,
    /// Division
    Slash,
    /// Modulo
    Percent,
    /// Exponentiation, written `^` or `**`
    Caret,

    // Punctuation
    /// Left parenthesis
    LParen,
    /// Right parenthesis
    RParen,
    /// Left bracket (index access)
    LBracket,
    /// Right bracket
    RBracket,
    /// Dot (attribute access)
    Dot,
    /// Comma (list separator; trailing commas are allowed)
    Comma,

    /// End of input
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Integer(n) => write!(f, "integer `{}`", n),
            TokenKind::Float(n) => write!(f, "float `{}`", n),
            TokenKind::Str(s) => write!(f, "string '{}'", s),
            TokenKind::Boolean(b) => write!(f, "`{}`", if *b { "TRUE" } else { "FALSE" }),
            TokenKind::Null => f.write_str("`NULL`"),
            TokenKind::Ident(name) => write!(f, "identifier `{}`", name),
            TokenKind::Current => f.write_str("`o`"),
            TokenKind::Select => f.write_str("`SELECT`"),
            TokenKind::Distinct => f.write_str("`DISTINCT`"),
            TokenKind::Where => f.write_str("`WHERE`"),
            TokenKind::Group => f.write_str("`GROUP`"),
            TokenKind::By => f.write_str("`BY`"),
            TokenKind::As => f.write_str("`AS`"),
            TokenKind::Returning => f.write_str("`RETURNING`"),
            TokenKind::And => f.write_str("`AND`"),
            TokenKind::Or => f.write_str("`OR`"),
            TokenKind::Not => f.write_str("`NOT`"),
            TokenKind::In => f.write_str("`IN`"),
            TokenKind::Compare(op) => write!(f, "`{}`", op),
            TokenKind::Plus => f.write_str("`+`"),
            TokenKind::Minus => f.write_str("`-`"),
            TokenKind::Star => f.write_str("`*`"),
            TokenKind::Slash => f.write_str("`/`"),
            TokenKind::Percent => f.write_str("`%`"),
            TokenKind::Caret => f.write_str("`^`"),
            TokenKind::LParen => f.write_str("`(`"),
            TokenKind::RParen => f.write_str("`)`"),
            TokenKind::LBracket => f.write_str("`[`"),
            TokenKind::RBracket => f.write_str("`]`"),
            TokenKind::Dot => f.write_str("`.`"),
            TokenKind::Comma => f.write_str("`,`"),
            TokenKind::Eof => f.write_str("end of input"),
        }
    }
}
