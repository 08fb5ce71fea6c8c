// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! PostgreSQL translation tests: basic operators, string functions and
//! the inline-literal output path

use cel2sql_ast::{BinaryOp, Dialect, Expr, UnaryOp};
use cel2sql_schema::{FieldSchema, Schema, SchemaRegistry};
use cel2sql_translator::{translate, TranslateError, TranslateOptions};

fn pg(expr: &Expr) -> String {
    translate(
        expr,
        Dialect::PostgreSQL,
        &SchemaRegistry::new(),
        &TranslateOptions::default(),
    )
    .unwrap()
    .sql
}

fn pg_with(expr: &Expr, registry: &SchemaRegistry) -> String {
    translate(expr, Dialect::PostgreSQL, registry, &TranslateOptions::default())
        .unwrap()
        .sql
}

fn eq(left: Expr, right: Expr) -> Expr {
    Expr::binary(BinaryOp::Eq, left, right)
}

#[test]
fn test_string_equality_and_range() {
    let expr = Expr::binary(
        BinaryOp::And,
        eq(Expr::ident("name"), Expr::string("alice")),
        Expr::binary(BinaryOp::Gt, Expr::ident("age"), Expr::int(30)),
    );
    assert_eq!(pg(&expr), "name = 'alice' AND age > 30");
}

#[test]
fn test_array_size_with_schema() {
    let registry = SchemaRegistry::new()
        .with_table("usr", Schema::new(vec![FieldSchema::array("tags", "text")]));
    let expr = Expr::binary(
        BinaryOp::Or,
        eq(Expr::ident("status"), Expr::string("active")),
        Expr::binary(
            BinaryOp::Gt,
            Expr::method(Expr::ident("tags"), "size", vec![]),
            Expr::int(0),
        ),
    );
    assert_eq!(
        pg_with(&expr, &registry),
        "status = 'active' OR ARRAY_LENGTH(tags, 1) > 0"
    );
}

#[test]
fn test_escaped_quote_in_string() {
    let expr = eq(Expr::ident("name"), Expr::string("O'Brien"));
    assert_eq!(pg(&expr), "name = 'O''Brien'");
}

#[test]
fn test_null_comparisons() {
    assert_eq!(pg(&eq(Expr::ident("x"), Expr::null())), "x IS NULL");
    assert_eq!(
        pg(&Expr::binary(BinaryOp::NotEq, Expr::ident("x"), Expr::null())),
        "x IS NOT NULL"
    );
    // Symmetric order.
    assert_eq!(pg(&eq(Expr::null(), Expr::ident("x"))), "x IS NULL");
}

#[test]
fn test_bool_comparisons() {
    assert_eq!(pg(&eq(Expr::ident("active"), Expr::bool(true))), "active IS TRUE");
    assert_eq!(
        pg(&eq(Expr::ident("active"), Expr::bool(false))),
        "active IS FALSE"
    );
    assert_eq!(
        pg(&Expr::binary(
            BinaryOp::NotEq,
            Expr::ident("active"),
            Expr::bool(false)
        )),
        "active IS NOT FALSE"
    );
}

#[test]
fn test_double_rendering() {
    let expr = eq(Expr::ident("salary"), Expr::double(50000.5));
    assert_eq!(pg(&expr), "salary = 50000.5");
    let expr = eq(Expr::ident("salary"), Expr::double(30.0));
    assert_eq!(pg(&expr), "salary = 30.0");
}

#[test]
fn test_arithmetic_operators() {
    let expr = Expr::binary(
        BinaryOp::Gt,
        Expr::binary(
            BinaryOp::Mul,
            Expr::binary(BinaryOp::Add, Expr::ident("a"), Expr::ident("b")),
            Expr::ident("c"),
        ),
        Expr::int(100),
    );
    assert_eq!(pg(&expr), "(a + b) * c > 100");
}

#[test]
fn test_subtraction_is_left_associative() {
    let expr = Expr::binary(
        BinaryOp::Sub,
        Expr::ident("a"),
        Expr::binary(BinaryOp::Sub, Expr::ident("b"), Expr::ident("c")),
    );
    assert_eq!(pg(&expr), "a - (b - c)");
}

#[test]
fn test_modulo_renders_as_function() {
    let expr = eq(
        Expr::binary(BinaryOp::Mod, Expr::ident("a"), Expr::int(2)),
        Expr::int(0),
    );
    assert_eq!(pg(&expr), "MOD(a, 2) = 0");
}

#[test]
fn test_logical_grouping() {
    let expr = Expr::binary(
        BinaryOp::And,
        Expr::binary(
            BinaryOp::Or,
            eq(Expr::ident("a"), Expr::int(1)),
            eq(Expr::ident("b"), Expr::int(2)),
        ),
        eq(Expr::ident("c"), Expr::int(3)),
    );
    assert_eq!(pg(&expr), "(a = 1 OR b = 2) AND c = 3");
}

#[test]
fn test_not_wraps_operand() {
    let expr = Expr::unary(UnaryOp::Not, eq(Expr::ident("a"), Expr::int(1)));
    assert_eq!(pg(&expr), "NOT (a = 1)");
}

#[test]
fn test_negation() {
    let expr = Expr::binary(
        BinaryOp::Lt,
        Expr::unary(UnaryOp::Neg, Expr::ident("balance")),
        Expr::int(0),
    );
    assert_eq!(pg(&expr), "-balance < 0");
}

#[test]
fn test_ternary_renders_as_case() {
    let expr = Expr::ternary(
        Expr::binary(BinaryOp::Gt, Expr::ident("age"), Expr::int(30)),
        Expr::string("senior"),
        Expr::string("junior"),
    );
    assert_eq!(
        pg(&expr),
        "CASE WHEN age > 30 THEN 'senior' ELSE 'junior' END"
    );
}

#[test]
fn test_regex_match() {
    let expr = Expr::call(
        "matches",
        vec![Expr::ident("email"), Expr::string("^.+@.+$")],
    );
    assert_eq!(pg(&expr), "email ~ '^.+@.+$'");
}

#[test]
fn test_regex_case_insensitive() {
    let expr = Expr::method(
        Expr::ident("email"),
        "matches",
        vec![Expr::string("(?i)admin")],
    );
    assert_eq!(pg(&expr), "email ~* 'admin'");
}

#[test]
fn test_regex_posix_classes() {
    let expr = Expr::call("matches", vec![Expr::ident("zip"), Expr::string(r"^\d+$")]);
    assert_eq!(pg(&expr), "zip ~ '^[[:digit:]]+$'");
}

#[test]
fn test_contains() {
    let expr = Expr::method(Expr::ident("name"), "contains", vec![Expr::string("li")]);
    assert_eq!(pg(&expr), "POSITION('li' IN name) > 0");
}

#[test]
fn test_starts_with_escapes_like_metacharacters() {
    let expr = Expr::method(
        Expr::ident("name"),
        "startsWith",
        vec![Expr::string("50%_")],
    );
    assert_eq!(pg(&expr), "name LIKE '50\\%\\_%' ESCAPE E'\\\\'");
}

#[test]
fn test_ends_with() {
    let expr = Expr::method(Expr::ident("email"), "endsWith", vec![Expr::string(".com")]);
    assert_eq!(pg(&expr), "email LIKE '%.com' ESCAPE E'\\\\'");
}

#[test]
fn test_starts_with_requires_literal() {
    let expr = Expr::method(
        Expr::ident("name"),
        "startsWith",
        vec![Expr::ident("prefix")],
    );
    let err = translate(
        &expr,
        Dialect::PostgreSQL,
        &SchemaRegistry::new(),
        &TranslateOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, TranslateError::TypeMismatch { .. }));
}

#[test]
fn test_case_transformations() {
    assert_eq!(
        pg(&Expr::method(Expr::ident("name"), "lowerAscii", vec![])),
        "LOWER(name)"
    );
    assert_eq!(
        pg(&Expr::method(Expr::ident("name"), "upperAscii", vec![])),
        "UPPER(name)"
    );
    assert_eq!(
        pg(&Expr::method(Expr::ident("name"), "trim", vec![])),
        "TRIM(name)"
    );
    assert_eq!(
        pg(&Expr::method(Expr::ident("name"), "reverse", vec![])),
        "REVERSE(name)"
    );
}

#[test]
fn test_char_at() {
    let expr = Expr::method(Expr::ident("name"), "charAt", vec![Expr::int(2)]);
    assert_eq!(pg(&expr), "SUBSTRING(name, 3, 1)");
}

#[test]
fn test_substring() {
    let expr = Expr::method(
        Expr::ident("name"),
        "substring",
        vec![Expr::int(1), Expr::int(3)],
    );
    assert_eq!(pg(&expr), "SUBSTRING(name, 2, 2)");

    let expr = Expr::method(Expr::ident("name"), "substring", vec![Expr::int(4)]);
    assert_eq!(pg(&expr), "SUBSTRING(name, 5)");
}

#[test]
fn test_index_of() {
    let expr = Expr::method(Expr::ident("name"), "indexOf", vec![Expr::string("a")]);
    assert_eq!(
        pg(&expr),
        "CASE WHEN POSITION('a' IN name) > 0 THEN POSITION('a' IN name) - 1 ELSE -1 END"
    );
}

#[test]
fn test_replace() {
    let expr = Expr::method(
        Expr::ident("name"),
        "replace",
        vec![Expr::string("a"), Expr::string("b")],
    );
    assert_eq!(pg(&expr), "REPLACE(name, 'a', 'b')");
}

#[test]
fn test_replace_with_limit_rejected() {
    let expr = Expr::method(
        Expr::ident("name"),
        "replace",
        vec![Expr::string("a"), Expr::string("b"), Expr::int(2)],
    );
    let err = translate(
        &expr,
        Dialect::PostgreSQL,
        &SchemaRegistry::new(),
        &TranslateOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, TranslateError::UnsupportedFeature { .. }));
}

#[test]
fn test_split_and_join() {
    let split = Expr::method(Expr::ident("email"), "split", vec![Expr::string("@")]);
    assert_eq!(pg(&split), "STRING_TO_ARRAY(email, '@')");

    let limited = Expr::method(
        Expr::ident("email"),
        "split",
        vec![Expr::string("@"), Expr::int(2)],
    );
    assert_eq!(pg(&limited), "(STRING_TO_ARRAY(email, '@'))[1:2]");

    let empty = Expr::method(
        Expr::ident("email"),
        "split",
        vec![Expr::string("@"), Expr::int(0)],
    );
    assert_eq!(pg(&empty), "ARRAY[]::text[]");

    let single = Expr::method(
        Expr::ident("email"),
        "split",
        vec![Expr::string("@"), Expr::int(1)],
    );
    assert_eq!(pg(&single), "ARRAY[email]");

    let join = Expr::method(Expr::ident("tags"), "join", vec![Expr::string(",")]);
    assert_eq!(pg(&join), "ARRAY_TO_STRING(tags, ',', '')");

    let join_default = Expr::method(Expr::ident("tags"), "join", vec![]);
    assert_eq!(pg(&join_default), "ARRAY_TO_STRING(tags, '', '')");
}

#[test]
fn test_string_concat() {
    let expr = eq(
        Expr::binary(BinaryOp::Add, Expr::ident("name"), Expr::string("!")),
        Expr::string("alice!"),
    );
    assert_eq!(pg(&expr), "name || '!' = 'alice!'");
}

#[test]
fn test_size_of_string_literal() {
    let expr = Expr::binary(
        BinaryOp::Gt,
        Expr::call("size", vec![Expr::string("hello")]),
        Expr::int(3),
    );
    assert_eq!(pg(&expr), "LENGTH('hello') > 3");
}

#[test]
fn test_size_of_unresolved_receiver_is_ambiguous() {
    let expr = Expr::method(Expr::ident("mystery"), "size", vec![]);
    let err = translate(
        &expr,
        Dialect::PostgreSQL,
        &SchemaRegistry::new(),
        &TranslateOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, TranslateError::AmbiguousSize { .. }));
}

#[test]
fn test_in_list() {
    let expr = Expr::binary(
        BinaryOp::In,
        Expr::ident("status"),
        Expr::list(vec![
            Expr::string("active"),
            Expr::string("pending"),
        ]),
    );
    assert_eq!(pg(&expr), "status = ANY(ARRAY['active', 'pending'])");
}

#[test]
fn test_list_index() {
    assert_eq!(
        pg(&eq(
            Expr::index(Expr::ident("arr"), Expr::int(0)),
            Expr::int(7)
        )),
        "arr[1] = 7"
    );
    assert_eq!(
        pg(&eq(
            Expr::index(Expr::ident("arr"), Expr::ident("i")),
            Expr::int(7)
        )),
        "arr[i + 1] = 7"
    );
}

#[test]
fn test_casts() {
    assert_eq!(
        pg(&Expr::call("int", vec![Expr::ident("score")])),
        "CAST(score AS BIGINT)"
    );
    assert_eq!(
        pg(&Expr::call("string", vec![Expr::ident("score")])),
        "CAST(score AS TEXT)"
    );
    assert_eq!(
        pg(&Expr::call("double", vec![Expr::ident("score")])),
        "CAST(score AS DOUBLE PRECISION)"
    );
    assert_eq!(
        pg(&Expr::call("bool", vec![Expr::ident("flag")])),
        "CAST(flag AS BOOLEAN)"
    );
}

#[test]
fn test_unknown_function_rejected() {
    let expr = Expr::call("mystery_fn", vec![Expr::ident("x")]);
    let err = translate(
        &expr,
        Dialect::PostgreSQL,
        &SchemaRegistry::new(),
        &TranslateOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, TranslateError::UnsupportedFeature { .. }));
}

#[test]
fn test_format() {
    let expr = Expr::method(
        Expr::string("%s scored %d"),
        "format",
        vec![Expr::list(vec![Expr::ident("name"), Expr::ident("score")])],
    );
    assert_eq!(pg(&expr), "FORMAT('%s scored %s', name, score)");
}

#[test]
fn test_format_rejects_unknown_specifier() {
    let expr = Expr::method(
        Expr::string("%x"),
        "format",
        vec![Expr::list(vec![Expr::ident("v")])],
    );
    let err = translate(
        &expr,
        Dialect::PostgreSQL,
        &SchemaRegistry::new(),
        &TranslateOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, TranslateError::UnsupportedFeature { .. }));
}

#[test]
fn test_map_literal_renders_values() {
    let expr = Expr::map(vec![
        cel2sql_ast::MapEntry {
            key: Expr::string("a"),
            value: Expr::int(1),
        },
        cel2sql_ast::MapEntry {
            key: Expr::string("b"),
            value: Expr::int(2),
        },
    ]);
    assert_eq!(pg(&expr), "ROW(1, 2)");
}
