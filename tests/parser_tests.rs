// tests/parser_tests.rs

use siftql::ast::{BinOp, CmpOp, Expr, ReturnMode};
use siftql::lexer::Lexer;
use siftql::parser::{ParseError, Parser};
use siftql::{Value, query};

fn parse_expr(input: &str) -> Expr {
    Parser::new(Lexer::new(input))
        .unwrap()
        .parse_standalone_expression()
        .unwrap()
}

fn attr(name: &str) -> Expr {
    Expr::Attr {
        object: Box::new(Expr::Current),
        name: name.to_string(),
    }
}

fn binary(op: BinOp, left: Expr, right: Expr) -> Expr {
    Expr::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}

// ============================================================================
// Precedence
// ============================================================================

#[test]
fn test_multiplication_binds_tighter_than_addition() {
    // o.a + o.b * o.c  =>  o.a + (o.b * o.c)
    let expr = parse_expr("o.a + o.b * o.c");
    assert_eq!(
        expr,
        binary(
            BinOp::Add,
            attr("a"),
            binary(BinOp::Mul, attr("b"), attr("c")),
        )
    );
}

#[test]
fn test_power_is_right_associative() {
    // o.a ^ o.b ^ o.c  =>  o.a ^ (o.b ^ o.c)
    let expr = parse_expr("o.a ^ o.b ^ o.c");
    assert_eq!(
        expr,
        binary(
            BinOp::Pow,
            attr("a"),
            binary(BinOp::Pow, attr("b"), attr("c")),
        )
    );
}

#[test]
fn test_double_star_is_the_power_operator() {
    assert_eq!(parse_expr("o.a ** o.b"), parse_expr("o.a ^ o.b"));
}

#[test]
fn test_power_binds_tighter_than_multiplication() {
    // o.x * o.y ^ o.z  =>  o.x * (o.y ^ o.z)
    let expr = parse_expr("o.x * o.y ^ o.z");
    assert_eq!(
        expr,
        binary(
            BinOp::Mul,
            attr("x"),
            binary(BinOp::Pow, attr("y"), attr("z")),
        )
    );
}

#[test]
fn test_parentheses_override_precedence() {
    let expr = parse_expr("(o.a + o.b) * o.c");
    assert_eq!(
        expr,
        binary(
            BinOp::Mul,
            binary(BinOp::Add, attr("a"), attr("b")),
            attr("c"),
        )
    );
}

#[test]
fn test_not_binds_tighter_than_and() {
    // NOT o.x = 0 AND o.y = 0  =>  (NOT (o.x = 0)) AND (o.y = 0)
    let expr = parse_expr("NOT o.x = 0 AND o.y = 0");
    assert_eq!(
        expr,
        binary(
            BinOp::And,
            Expr::Not(Box::new(binary(
                BinOp::Compare(CmpOp::Eq),
                attr("x"),
                Expr::Integer(0),
            ))),
            binary(BinOp::Compare(CmpOp::Eq), attr("y"), Expr::Integer(0)),
        )
    );
}

#[test]
fn test_and_binds_tighter_than_or() {
    let expr = parse_expr("o.a = 0 AND o.b = 0 OR o.c = 0");
    match expr {
        Expr::Binary { op: BinOp::Or, left, .. } => {
            assert!(matches!(*left, Expr::Binary { op: BinOp::And, .. }));
        }
        other => panic!("expected OR at the top, got {:?}", other),
    }
}

#[test]
fn test_not_nests() {
    let expr = parse_expr("NOT NOT o.flag");
    assert_eq!(
        expr,
        Expr::Not(Box::new(Expr::Not(Box::new(attr("flag")))))
    );
}

#[test]
fn test_comparison_binds_tighter_than_not() {
    // NOT binds over the whole comparison, not just its left operand.
    let expr = parse_expr("NOT o.x < 3");
    assert_eq!(
        expr,
        Expr::Not(Box::new(binary(
            BinOp::Compare(CmpOp::Lt),
            attr("x"),
            Expr::Integer(3),
        )))
    );
}

// ============================================================================
// Atoms and postfix suffixes
// ============================================================================

#[test]
fn test_attribute_chain() {
    let expr = parse_expr("o.user.name");
    assert_eq!(
        expr,
        Expr::Attr {
            object: Box::new(attr("user")),
            name: "name".to_string(),
        }
    );
}

#[test]
fn test_index_access_keys() {
    assert_eq!(
        parse_expr("o[0]"),
        Expr::Index {
            object: Box::new(Expr::Current),
            key: Value::Integer(0),
        }
    );
    assert_eq!(
        parse_expr("o['key']"),
        Expr::Index {
            object: Box::new(Expr::Current),
            key: Value::Str("key".to_string()),
        }
    );
    assert_eq!(
        parse_expr("o[-1]"),
        Expr::Index {
            object: Box::new(Expr::Current),
            key: Value::Integer(-1),
        }
    );
}

#[test]
fn test_computed_index_keys_are_rejected() {
    let result = Parser::new(Lexer::new("o[o.x]"))
        .unwrap()
        .parse_standalone_expression();
    assert!(matches!(
        result,
        Err(ParseError::Unexpected { ref expected, .. }) if expected == "literal index key"
    ));
}

#[test]
fn test_alias_suffix() {
    let expr = parse_expr("o.x AS foo");
    assert_eq!(
        expr,
        Expr::Alias {
            expr: Box::new(attr("x")),
            name: "foo".to_string(),
        }
    );
}

#[test]
fn test_alias_binds_to_the_atom() {
    // AS is a postfix suffix: it attaches to o.qty, not to the product.
    let expr = parse_expr("o.price * o.qty AS total");
    assert_eq!(
        expr,
        binary(
            BinOp::Mul,
            attr("price"),
            Expr::Alias {
                expr: Box::new(attr("qty")),
                name: "total".to_string(),
            },
        )
    );
}

#[test]
fn test_function_calls() {
    assert_eq!(
        parse_expr("add(o.x, mul(o.y, o.z))"),
        Expr::Call {
            name: "add".to_string(),
            args: vec![
                attr("x"),
                Expr::Call {
                    name: "mul".to_string(),
                    args: vec![attr("y"), attr("z")],
                },
            ],
        }
    );
    assert_eq!(
        parse_expr("now()"),
        Expr::Call {
            name: "now".to_string(),
            args: vec![],
        }
    );
    // Trailing comma in the argument list is accepted.
    assert_eq!(parse_expr("add(o.x, o.y,)"), parse_expr("add(o.x, o.y)"));
}

#[test]
fn test_bare_identifier_is_not_an_expression() {
    let result = Parser::new(Lexer::new("SELECT foo")).unwrap().parse();
    assert!(matches!(
        result,
        Err(ParseError::Unexpected { ref expected, .. })
            if expected == "`(` to open the argument list"
    ));
}

#[test]
fn test_negative_literals() {
    assert_eq!(parse_expr("-3"), Expr::Integer(-3));
    assert_eq!(parse_expr("-2.5"), Expr::Float(-2.5));
    // Negating a non-literal becomes subtraction from zero.
    assert_eq!(
        parse_expr("-o.x"),
        binary(BinOp::Sub, Expr::Integer(0), attr("x"))
    );
}

// ============================================================================
// IN lists
// ============================================================================

#[test]
fn test_in_with_parenthesized_list() {
    let expr = parse_expr("o.x IN (1, 2)");
    assert_eq!(
        expr,
        binary(
            BinOp::In,
            attr("x"),
            Expr::List(vec![Expr::Integer(1), Expr::Integer(2)]),
        )
    );
}

#[test]
fn test_in_accepts_trailing_comma() {
    assert_eq!(parse_expr("o.x IN (1, 2,)"), parse_expr("o.x IN (1, 2)"));
}

#[test]
fn test_in_with_bare_list() {
    let expr = parse_expr("o.x IN o.y, o.z");
    assert_eq!(
        expr,
        binary(BinOp::In, attr("x"), Expr::List(vec![attr("y"), attr("z")]))
    );
}

#[test]
fn test_empty_in_list_is_rejected() {
    let result = Parser::new(Lexer::new("o.x IN ()"))
        .unwrap()
        .parse_standalone_expression();
    assert!(matches!(
        result,
        Err(ParseError::Unexpected { ref expected, .. })
            if expected == "expression in `IN` list"
    ));
}

// ============================================================================
// Query clauses
// ============================================================================

#[test]
fn test_minimal_query() {
    let q = query("SELECT o").unwrap();
    assert_eq!(q.projection, vec![Expr::Current]);
    assert_eq!(q.mode, ReturnMode::Single);
    assert!(q.predicate.is_none());
    assert!(!q.distinct);
    assert!(q.group_by.is_empty());
}

#[test]
fn test_single_column_without_trailing_comma_yields_bare_values() {
    assert_eq!(query("SELECT o.x").unwrap().mode, ReturnMode::Single);
}

#[test]
fn test_trailing_comma_yields_rows() {
    let q = query("SELECT o.x,").unwrap();
    assert_eq!(q.mode, ReturnMode::Tuple);
    assert_eq!(q.projection, vec![attr("x")]);
}

#[test]
fn test_multiple_columns_yield_rows() {
    let q = query("SELECT o.x, o.y").unwrap();
    assert_eq!(q.mode, ReturnMode::Tuple);
    assert_eq!(q.projection.len(), 2);
}

#[test]
fn test_distinct_flag() {
    assert!(query("SELECT DISTINCT o.x").unwrap().distinct);
    assert!(!query("SELECT o.x").unwrap().distinct);
}

#[test]
fn test_where_clause() {
    let q = query("SELECT o.x WHERE o.x > 3").unwrap();
    assert_eq!(
        q.predicate,
        Some(binary(
            BinOp::Compare(CmpOp::Gt),
            attr("x"),
            Expr::Integer(3),
        ))
    );
}

#[test]
fn test_group_by_clause() {
    let q = query("SELECT o.x GROUP BY o.x, o.y").unwrap();
    assert_eq!(q.group_by, vec![attr("x"), attr("y")]);
}

#[test]
fn test_group_by_accepts_trailing_comma() {
    let q = query("SELECT o.x GROUP BY o.x,").unwrap();
    assert_eq!(q.group_by, vec![attr("x")]);
}

#[test]
fn test_returning_selects_the_record_view() {
    for text in [
        "SELECT o.x RETURNING record",
        "SELECT o.x RETURNING map",
        "SELECT o.x RETURNING Record",
    ] {
        assert_eq!(query(text).unwrap().mode, ReturnMode::Record, "{}", text);
    }
}

#[test]
fn test_unknown_return_view_is_rejected() {
    let result = query("SELECT o.x RETURNING tuple3");
    assert!(matches!(
        result,
        Err(ParseError::UnknownReturnView { ref name, .. }) if name == "tuple3"
    ));
}

#[test]
fn test_clause_order_is_fixed() {
    // GROUP BY cannot precede WHERE.
    assert!(query("SELECT o.x GROUP BY o.x WHERE o.x > 1").is_err());
    // RETURNING must come last.
    assert!(query("SELECT o.x RETURNING record WHERE o.x > 1").is_err());
}

#[test]
fn test_empty_projection_is_rejected() {
    let result = query("SELECT WHERE o.x");
    match result {
        Err(ParseError::Unexpected {
            expected,
            found,
            offset,
        }) => {
            assert_eq!(expected, "projection expression");
            assert_eq!(found, "`WHERE`");
            assert_eq!(offset, 7);
        }
        other => panic!("expected a projection error, got {:?}", other),
    }
}

#[test]
fn test_keywords_parse_case_insensitively() {
    assert_eq!(
        query("select o.x where o.x > 3").unwrap(),
        query("SELECT o.x WHERE o.x > 3").unwrap()
    );
}

#[test]
fn test_lex_errors_surface_through_parsing() {
    let result = query("SELECT o.x WHERE o.x # 3");
    assert!(matches!(result, Err(ParseError::Lex(_))));
}

#[test]
fn test_trailing_garbage_is_rejected() {
    let result = query("SELECT o.x WHERE o.x > 3 o.y");
    assert!(matches!(
        result,
        Err(ParseError::Unexpected { ref expected, .. }) if expected == "end of query"
    ));
}

// ============================================================================
// Rendering
// ============================================================================

#[test]
fn test_rendered_queries_reparse_to_the_same_ast() {
    let cases = [
        "SELECT o",
        "SELECT o.x",
        "SELECT o.x,",
        "SELECT DISTINCT o.x, o.y WHERE o.x IN (1, 2) GROUP BY o.name",
        "SELECT o['key'] AS k, o[-1] RETURNING record",
        "SELECT upper(o.name) WHERE NOT o.x = 0 AND o.y <= 2 ^ 3",
        "SELECT o.s WHERE o.s LIKE 'a*' OR o.s MATCHES 'b.'",
    ];
    for text in cases {
        let first = query(text).unwrap();
        let reparsed = query(&first.to_string()).unwrap();
        assert_eq!(first, reparsed, "render of {:?} did not reparse", text);
    }
}
