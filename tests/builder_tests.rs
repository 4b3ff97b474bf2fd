// tests/builder_tests.rs
//
// The central invariant of the two front ends: every placeholder
// composition builds the same tree the parser produces for the equivalent
// query text, and both execute identically.

use siftql::lexer::Lexer;
use siftql::parser::Parser;
use siftql::{Expr, FieldExpr, Value, call, fields, lit, query, rec, select, select_record};
use std::collections::HashMap;

fn parse_expr(input: &str) -> Expr {
    Parser::new(Lexer::new(input))
        .unwrap()
        .parse_standalone_expression()
        .unwrap()
}

fn assert_equivalent(built: &FieldExpr, text: &str) {
    assert_eq!(
        built.expr(),
        &parse_expr(text),
        "builder tree differs from parse of {:?}",
        text
    );
}

// ============================================================================
// Expression equivalence
// ============================================================================

#[test]
fn test_comparisons_match_parsed_text() {
    let [x, y] = fields(["x", "y"]);
    assert_equivalent(&x.clone().eq(y.clone()), "o.x = o.y");
    assert_equivalent(&x.clone().ne(y.clone()), "o.x != o.y");
    assert_equivalent(&x.clone().lt(3), "o.x < 3");
    assert_equivalent(&x.clone().le(3), "o.x <= 3");
    assert_equivalent(&x.clone().gt(3.5), "o.x > 3.5");
    assert_equivalent(&x.ge(y), "o.x >= o.y");
}

#[test]
fn test_arithmetic_matches_parsed_text() {
    let [a, b, c] = fields(["a", "b", "c"]);
    assert_equivalent(&(a.clone() + b.clone() * c.clone()), "o.a + o.b * o.c");
    assert_equivalent(&(a.clone() - b.clone()), "o.a - o.b");
    assert_equivalent(&(a.clone() / b.clone() % c.clone()), "o.a / o.b % o.c");
    assert_equivalent(&(a.clone() + 1), "o.a + 1");
    assert_equivalent(&(a.pow(b.pow(c))), "o.a ^ o.b ^ o.c");
}

#[test]
fn test_logical_combinators_match_parsed_text() {
    let [x, y] = fields(["x", "y"]);
    assert_equivalent(
        &x.clone().eq(0).not().and(y.clone().eq(0)),
        "NOT o.x = 0 AND o.y = 0",
    );
    assert_equivalent(
        &x.clone().eq(0).or(y.clone().eq(0)),
        "o.x = 0 OR o.y = 0",
    );
    assert_equivalent(&x.eq(y).not().not(), "NOT NOT o.x = o.y");
}

#[test]
fn test_membership_matches_parsed_text() {
    let [x] = fields(["x"]);
    assert_equivalent(&x.clone().in_list([1, 2]), "o.x IN (1, 2)");
    assert_equivalent(&x.clone().in_list([1, 2]), "o.x IN (1, 2,)");
    assert_equivalent(
        &x.in_list([lit("a"), lit("b")]),
        "o.x IN ('a', 'b')",
    );
}

#[test]
fn test_string_comparisons_match_parsed_text() {
    let [s] = fields(["s"]);
    assert_equivalent(&s.clone().contains("ab"), "o.s CONTAINS 'ab'");
    assert_equivalent(&s.clone().like("a*"), "o.s LIKE 'a*'");
    assert_equivalent(&s.matches("^a+$"), "o.s MATCHES '^a+$'");
}

#[test]
fn test_access_and_alias_match_parsed_text() {
    assert_equivalent(&rec().attr("user").attr("name"), "o.user.name");
    assert_equivalent(&rec().index(0), "o[0]");
    assert_equivalent(&rec().index(-1), "o[-1]");
    assert_equivalent(&rec().index("key"), "o['key']");
    assert_equivalent(&rec().attr("x").alias("foo"), "o.x AS foo");
    let [price, qty] = fields(["price", "qty"]);
    assert_equivalent(
        &(price * qty).alias("total"),
        "(o.price * o.qty) AS total",
    );
}

#[test]
fn test_calls_match_parsed_text() {
    let [name, x, y] = fields(["name", "x", "y"]);
    assert_equivalent(&call("upper", [name]), "upper(o.name)");
    assert_equivalent(&call("add", [x, y]), "add(o.x, o.y)");
    assert_equivalent(&call("now", [] as [FieldExpr; 0]), "now()");
}

#[test]
fn test_literals_match_parsed_text() {
    assert_equivalent(&lit(42), "42");
    assert_equivalent(&lit(-7), "-7");
    assert_equivalent(&lit(2.5), "2.5");
    assert_equivalent(&lit("hi"), "'hi'");
    assert_equivalent(&lit(true), "TRUE");
}

// ============================================================================
// Query equivalence
// ============================================================================

#[test]
fn test_select_single_matches_parsed_text() {
    let [x] = fields(["x"]);
    assert_eq!(select(x), query("SELECT o.x").unwrap());
    assert_eq!(select_record(), query("SELECT o").unwrap());
}

#[test]
fn test_select_list_matches_trailing_comma_text() {
    let [x] = fields(["x"]);
    // A one-element list projects rows, like a trailing comma in text.
    assert_eq!(select(vec![x]), query("SELECT o.x,").unwrap());
}

#[test]
fn test_full_query_matches_parsed_text() {
    let [name, price, qty] = fields(["name", "price", "qty"]);
    let built = select(vec![name.clone(), (price.clone() * qty).alias("total")])
        .filter(price.gt(10).and(name.clone().ne("scrap")))
        .group_by([name])
        .distinct();

    let parsed = query(
        "SELECT o.name, o.price * o.qty AS total \
         WHERE o.price > 10 AND o.name != 'scrap' \
         GROUP BY o.name",
    )
    .unwrap()
    .distinct();

    // The text aliases the qty atom, so alias the builder's atom too.
    let [name, price, qty] = fields(["name", "price", "qty"]);
    let built_text_shape = select(vec![
        name.clone(),
        price.clone() * qty.alias("total"),
    ])
    .filter(price.gt(10).and(name.clone().ne("scrap")))
    .group_by([name])
    .distinct();

    assert_eq!(built_text_shape, parsed);
    // And the parenthesized text matches the builder's natural shape.
    let parenthesized = query(
        "SELECT o.name, (o.price * o.qty) AS total \
         WHERE o.price > 10 AND o.name != 'scrap' \
         GROUP BY o.name",
    )
    .unwrap()
    .distinct();
    assert_eq!(built, parenthesized);
}

#[test]
fn test_returning_record_matches_parsed_text() {
    let [x] = fields(["x"]);
    assert_eq!(
        select(vec![x.alias("first")]).returning_record(),
        query("SELECT o.x AS first, RETURNING record").unwrap()
    );
}

// ============================================================================
// Execution equivalence
// ============================================================================

fn point(x: i64, y: i64) -> Value {
    let mut map = HashMap::new();
    map.insert("x".to_string(), Value::Integer(x));
    map.insert("y".to_string(), Value::Integer(y));
    Value::Map(map)
}

#[test]
fn test_both_front_ends_execute_identically() {
    let records = vec![point(0, 0), point(1, 2), point(2, 2), point(3, 3)];

    let [x, y] = fields(["x", "y"]);
    let built = select_record().filter(x.eq(y));
    let parsed = query("SELECT o WHERE o.x = o.y").unwrap();

    assert_eq!(built, parsed);
    assert_eq!(
        built.execute(&records).unwrap(),
        parsed.execute(&records).unwrap()
    );
}

#[test]
fn test_shared_subexpressions_stay_safe() {
    // One placeholder expression reused by two different queries: building
    // the second must not disturb the first.
    let [x] = fields(["x"]);
    let threshold = x.clone().gt(1);

    let q1 = select(x.clone()).filter(threshold.clone());
    let q2 = select(x).filter(threshold.not());

    let records = vec![point(0, 0), point(2, 0)];
    assert_eq!(q1.execute(&records).unwrap(), vec![Value::Integer(2)]);
    assert_eq!(q2.execute(&records).unwrap(), vec![Value::Integer(0)]);
}
