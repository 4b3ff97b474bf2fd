use std::fmt;
use std::mem;

use crate::ast::{BinOp, CompiledQuery, Expr, ReturnMode, Token, TokenKind};
use crate::lexer::{LexError, Lexer};
use crate::value::Value;

/// Errors produced while parsing a token stream into a query.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    /// The lexer failed before the parser could see a token.
    Lex(LexError),
    /// The grammar expected one construct and found another.
    Unexpected {
        expected: String,
        found: String,
        offset: usize,
    },
    /// `RETURNING` named a view this build does not define.
    UnknownReturnView { name: String, offset: usize },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Lex(e) => e.fmt(f),
            ParseError::Unexpected {
                expected,
                found,
                offset,
            } => {
                write!(f, "expected {}, found {} at offset {}", expected, found, offset)
            }
            ParseError::UnknownReturnView { name, offset } => {
                write!(
                    f,
                    "unknown return view `{}` at offset {} (expected `record` or `map`)",
                    name, offset
                )
            }
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParseError::Lex(e) => Some(e),
            _ => None,
        }
    }
}

impl From<LexError> for ParseError {
    fn from(e: LexError) -> Self {
        ParseError::Lex(e)
    }
}

pub struct Parser {
    lexer: Lexer,
    current: Token,
}

impl Parser {
    pub fn new(mut lexer: Lexer) -> Result<Self, ParseError> {
        let current = lexer.next_token()?;
        Ok(Parser { lexer, current })
    }

    fn advance(&mut self) -> Result<(), ParseError> {
        self.current = self.lexer.next_token()?;
        Ok(())
    }

    fn check(&self, kind: &TokenKind) -> bool {
        mem::discriminant(&self.current.kind) == mem::discriminant(kind)
    }

    fn expect(&mut self, kind: &TokenKind, expected: &str) -> Result<(), ParseError> {
        if !self.check(kind) {
            return Err(self.unexpected(expected));
        }
        self.advance()
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        ParseError::Unexpected {
            expected: expected.to_string(),
            found: self.current.kind.to_string(),
            offset: self.current.offset,
        }
    }

    fn expect_ident(&mut self, expected: &str) -> Result<String, ParseError> {
        match &self.current.kind {
            TokenKind::Ident(name) => {
                let name = name.clone();
                self.advance()?;
                Ok(name)
            }
            _ => Err(self.unexpected(expected)),
        }
    }

    fn starts_expr(kind: &TokenKind) -> bool {
        matches!(
            kind,
            TokenKind::Integer(_)
                | TokenKind::Float(_)
                | TokenKind::Str(_)
                | TokenKind::Boolean(_)
                | TokenKind::Null
                | TokenKind::Current
                | TokenKind::Ident(_)
                | TokenKind::LParen
                | TokenKind::Minus
                | TokenKind::Not
        )
    }

    /// Parse a complete query:
    /// `SELECT [DISTINCT] projlist [WHERE expr] [GROUP BY exprlist] [RETURNING ident]`
    pub fn parse(&mut self) -> Result<CompiledQuery, ParseError> {
        self.expect(&TokenKind::Select, "`SELECT`")?;

        let distinct = if self.check(&TokenKind::Distinct) {
            self.advance()?;
            true
        } else {
            false
        };

        if !Self::starts_expr(&self.current.kind) {
            return Err(self.unexpected("projection expression"));
        }
        let (projection, trailing_comma) = self.parse_expr_list()?;

        // One bare column projects bare values; a trailing comma or a second
        // column switches to fixed-width rows.
        let mut mode = if projection.len() == 1 && !trailing_comma {
            ReturnMode::Single
        } else {
            ReturnMode::Tuple
        };

        let predicate = if self.check(&TokenKind::Where) {
            self.advance()?;
            Some(self.parse_expression()?)
        } else {
            None
        };

        let group_by = if self.check(&TokenKind::Group) {
            self.advance()?;
            self.expect(&TokenKind::By, "`BY` after `GROUP`")?;
            if !Self::starts_expr(&self.current.kind) {
                return Err(self.unexpected("grouping expression"));
            }
            self.parse_expr_list()?.0
        } else {
            Vec::new()
        };

        if self.check(&TokenKind::Returning) {
            self.advance()?;
            let offset = self.current.offset;
            let name = self.expect_ident("return view name after `RETURNING`")?;
            match name.to_ascii_lowercase().as_str() {
                "record" | "map" => mode = ReturnMode::Record,
                _ => return Err(ParseError::UnknownReturnView { name, offset }),
            }
        }

        self.expect(&TokenKind::Eof, "end of query")?;

        Ok(CompiledQuery {
            projection,
            mode,
            predicate,
            distinct,
            group_by,
        })
    }

    /// Parse a standalone expression, requiring the input to end with it.
    pub fn parse_standalone_expression(&mut self) -> Result<Expr, ParseError> {
        let expr = self.parse_expression()?;
        self.expect(&TokenKind::Eof, "end of expression")?;
        Ok(expr)
    }

    /// Comma-separated expressions; returns whether a trailing comma was
    /// consumed (accepted and ignored, never an error).
    fn parse_expr_list(&mut self) -> Result<(Vec<Expr>, bool), ParseError> {
        let mut items = vec![self.parse_expression()?];
        let mut trailing = false;
        while self.check(&TokenKind::Comma) {
            self.advance()?;
            if Self::starts_expr(&self.current.kind) {
                items.push(self.parse_expression()?);
            } else {
                trailing = true;
                break;
            }
        }
        Ok((items, trailing))
    }

    pub fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_and()?;
        while self.check(&TokenKind::Or) {
            self.advance()?;
            let right = self.parse_and()?;
            left = Expr::Binary {
                op: BinOp::Or,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_not()?;
        while self.check(&TokenKind::And) {
            self.advance()?;
            let right = self.parse_not()?;
            left = Expr::Binary {
                op: BinOp::And,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> Result<Expr, ParseError> {
        if self.check(&TokenKind::Not) {
            self.advance()?;
            let operand = self.parse_not()?;
            Ok(Expr::Not(Box::new(operand)))
        } else {
            self.parse_comparison()
        }
    }

    fn parse_comparison(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_additive()?;

        loop {
            if let TokenKind::Compare(op) = self.current.kind {
                self.advance()?;
                let right = self.parse_additive()?;
                left = Expr::Binary {
                    op: BinOp::Compare(op),
                    left: Box::new(left),
                    right: Box::new(right),
                };
            } else if self.check(&TokenKind::In) {
                self.advance()?;
                let items = self.parse_in_list()?;
                left = Expr::Binary {
                    op: BinOp::In,
                    left: Box::new(left),
                    right: Box::new(Expr::List(items)),
                };
            } else {
                break;
            }
        }
        Ok(left)
    }

    /// The right-hand side of `IN`: a parenthesized list, or a bare
    /// comma-separated list that binds as many expressions as it can.
    fn parse_in_list(&mut self) -> Result<Vec<Expr>, ParseError> {
        if self.check(&TokenKind::LParen) {
            self.advance()?;
            if self.check(&TokenKind::RParen) {
                return Err(self.unexpected("expression in `IN` list"));
            }
            let mut items = vec![self.parse_expression()?];
            while self.check(&TokenKind::Comma) {
                self.advance()?;
                if self.check(&TokenKind::RParen) {
                    break;
                }
                items.push(self.parse_expression()?);
            }
            self.expect(&TokenKind::RParen, "`)` to close the `IN` list")?;
            Ok(items)
        } else {
            if !Self::starts_expr(&self.current.kind) {
                return Err(self.unexpected("expression after `IN`"));
            }
            Ok(self.parse_expr_list()?.0)
        }
    }

    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_multiplicative()?;

        loop {
            let op = match &self.current.kind {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => break,
            };

            self.advance()?;
            let right = self.parse_multiplicative()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_power()?;

        loop {
            let op = match &self.current.kind {
                TokenKind::Star => BinOp::Mul,
                TokenKind::Slash => BinOp::Div,
                TokenKind::Percent => BinOp::Mod,
                _ => break,
            };

            self.advance()?;
            let right = self.parse_power()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_power(&mut self) -> Result<Expr, ParseError> {
        let base = self.parse_postfix()?;

        if self.check(&TokenKind::Caret) {
            self.advance()?;
            // Right-associative: `a ^ b ^ c` is `a ^ (b ^ c)`.
            let exponent = self.parse_power()?;
            Ok(Expr::Binary {
                op: BinOp::Pow,
                left: Box::new(base),
                right: Box::new(exponent),
            })
        } else {
            Ok(base)
        }
    }

    /// Postfix suffixes on an atom: `.name`, `[literal]`, `AS name`.
    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary()?;

        loop {
            if self.check(&TokenKind::Dot) {
                self.advance()?;
                let name = self.expect_ident("attribute name after `.`")?;
                expr = Expr::Attr {
                    object: Box::new(expr),
                    name,
                };
            } else if self.check(&TokenKind::LBracket) {
                self.advance()?;
                let key = self.parse_literal_key()?;
                self.expect(&TokenKind::RBracket, "`]` after index key")?;
                expr = Expr::Index {
                    object: Box::new(expr),
                    key,
                };
            } else if self.check(&TokenKind::As) {
                self.advance()?;
                let name = self.expect_ident("alias name after `AS`")?;
                expr = Expr::Alias {
                    expr: Box::new(expr),
                    name,
                };
            } else {
                break;
            }
        }
        Ok(expr)
    }

    fn parse_literal_key(&mut self) -> Result<Value, ParseError> {
        if self.check(&TokenKind::Minus) {
            self.advance()?;
            let key = match &self.current.kind {
                TokenKind::Integer(n) => Value::Integer(-n),
                TokenKind::Float(n) => Value::Float(-n),
                _ => return Err(self.unexpected("literal index key")),
            };
            self.advance()?;
            return Ok(key);
        }
        let key = match &self.current.kind {
            TokenKind::Integer(n) => Value::Integer(*n),
            TokenKind::Float(n) => Value::Float(*n),
            TokenKind::Str(s) => Value::Str(s.clone()),
            TokenKind::Boolean(b) => Value::Boolean(*b),
            TokenKind::Null => Value::Null,
            _ => return Err(self.unexpected("literal index key")),
        };
        self.advance()?;
        Ok(key)
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        match self.current.kind.clone() {
            TokenKind::Integer(n) => {
                self.advance()?;
                Ok(Expr::Integer(n))
            }
            TokenKind::Float(n) => {
                self.advance()?;
                Ok(Expr::Float(n))
            }
            TokenKind::Str(s) => {
                self.advance()?;
                Ok(Expr::Str(s))
            }
            TokenKind::Boolean(b) => {
                self.advance()?;
                Ok(Expr::Boolean(b))
            }
            TokenKind::Null => {
                self.advance()?;
                Ok(Expr::Null)
            }
            TokenKind::Current => {
                self.advance()?;
                Ok(Expr::Current)
            }
            // A bare identifier is only valid as a function call; field
            // access always goes through the current-record placeholder.
            TokenKind::Ident(name) => {
                self.advance()?;
                self.expect(&TokenKind::LParen, "`(` to open the argument list")?;
                let mut args = Vec::new();
                if !self.check(&TokenKind::RParen) {
                    args.push(self.parse_expression()?);
                    while self.check(&TokenKind::Comma) {
                        self.advance()?;
                        if self.check(&TokenKind::RParen) {
                            break;
                        }
                        args.push(self.parse_expression()?);
                    }
                }
                self.expect(&TokenKind::RParen, "`)` to close the argument list")?;
                Ok(Expr::Call { name, args })
            }
            TokenKind::LParen => {
                self.advance()?;
                let expr = self.parse_expression()?;
                self.expect(&TokenKind::RParen, "`)` to close the group")?;
                Ok(expr)
            }
            TokenKind::Minus => {
                self.advance()?;
                match self.current.kind {
                    TokenKind::Integer(n) => {
                        self.advance()?;
                        Ok(Expr::Integer(-n))
                    }
                    TokenKind::Float(n) => {
                        self.advance()?;
                        Ok(Expr::Float(-n))
                    }
                    // Negation of anything else becomes `0 - operand`.
                    _ => {
                        let operand = self.parse_postfix()?;
                        Ok(Expr::Binary {
                            op: BinOp::Sub,
                            left: Box::new(Expr::Integer(0)),
                            right: Box::new(operand),
                        })
                    }
                }
            }
            _ => Err(self.unexpected("expression")),
        }
    }
}
