// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Parameterized output: placeholder styles, ordinal ordering and the
//! never-bound literal forms

use cel2sql_ast::{BinaryOp, Dialect, Expr};
use cel2sql_schema::SchemaRegistry;
use cel2sql_translator::{translate, SqlValue, TranslateOptions, Translation};

fn run(expr: &Expr, dialect: Dialect) -> Translation {
    translate(
        expr,
        dialect,
        &SchemaRegistry::new(),
        &TranslateOptions::parameterized(),
    )
    .unwrap()
}

fn eq(left: Expr, right: Expr) -> Expr {
    Expr::binary(BinaryOp::Eq, left, right)
}

fn name_and_age() -> Expr {
    Expr::binary(
        BinaryOp::And,
        eq(Expr::ident("name"), Expr::string("alice")),
        Expr::binary(BinaryOp::Gt, Expr::ident("age"), Expr::int(30)),
    )
}

#[test]
fn test_postgres_placeholders() {
    let out = run(&name_and_age(), Dialect::PostgreSQL);
    assert_eq!(out.sql, "name = $1 AND age > $2");
    assert_eq!(
        out.parameters,
        vec![SqlValue::String("alice".to_string()), SqlValue::Int(30)]
    );
}

#[test]
fn test_mysql_placeholders() {
    let out = run(&name_and_age(), Dialect::MySQL);
    assert_eq!(out.sql, "name = ? AND age > ?");
    assert_eq!(
        out.parameters,
        vec![SqlValue::String("alice".to_string()), SqlValue::Int(30)]
    );
}

#[test]
fn test_sqlite_placeholders() {
    let out = run(&name_and_age(), Dialect::SQLite);
    assert_eq!(out.sql, "name = ? AND age > ?");
}

#[test]
fn test_bigquery_placeholders() {
    let out = run(&name_and_age(), Dialect::BigQuery);
    assert_eq!(out.sql, "name = @p1 AND age > @p2");
}

#[test]
fn test_duckdb_placeholders() {
    let out = run(&name_and_age(), Dialect::DuckDB);
    assert_eq!(out.sql, "name = $1 AND age > $2");
}

#[test]
fn test_parameter_order_follows_first_occurrence() {
    let expr = Expr::binary(
        BinaryOp::And,
        Expr::binary(
            BinaryOp::And,
            eq(Expr::ident("a"), Expr::string("first")),
            eq(Expr::ident("b"), Expr::int(2)),
        ),
        eq(Expr::ident("c"), Expr::double(3.5)),
    );
    let out = run(&expr, Dialect::PostgreSQL);
    assert_eq!(out.sql, "a = $1 AND b = $2 AND c = $3");
    assert_eq!(
        out.parameters,
        vec![
            SqlValue::String("first".to_string()),
            SqlValue::Int(2),
            SqlValue::Double(3.5)
        ]
    );
}

#[test]
fn test_no_deduplication() {
    let expr = Expr::binary(
        BinaryOp::Or,
        eq(Expr::ident("a"), Expr::int(1)),
        eq(Expr::ident("b"), Expr::int(1)),
    );
    let out = run(&expr, Dialect::PostgreSQL);
    assert_eq!(out.sql, "a = $1 OR b = $2");
    assert_eq!(out.parameters, vec![SqlValue::Int(1), SqlValue::Int(1)]);
}

#[test]
fn test_booleans_and_null_never_bind() {
    let expr = Expr::binary(
        BinaryOp::And,
        eq(Expr::ident("active"), Expr::bool(true)),
        eq(Expr::ident("deleted_at"), Expr::null()),
    );
    let out = run(&expr, Dialect::PostgreSQL);
    assert_eq!(out.sql, "active IS TRUE AND deleted_at IS NULL");
    assert!(out.parameters.is_empty());
}

#[test]
fn test_mixed_bound_and_unbound() {
    let expr = Expr::binary(
        BinaryOp::And,
        eq(Expr::ident("active"), Expr::bool(true)),
        eq(Expr::ident("age"), Expr::int(18)),
    );
    let out = run(&expr, Dialect::PostgreSQL);
    assert_eq!(out.sql, "active IS TRUE AND age = $1");
    assert_eq!(out.parameters, vec![SqlValue::Int(18)]);
}

#[test]
fn test_bytes_parameter() {
    let expr = eq(Expr::ident("payload"), Expr::bytes(b"hello".to_vec()));
    let out = run(&expr, Dialect::PostgreSQL);
    assert_eq!(out.sql, "payload = $1");
    assert_eq!(out.parameters, vec![SqlValue::Bytes(b"hello".to_vec())]);
}

#[test]
fn test_no_literal_leakage() {
    let secret = "correct-horse-battery-staple";
    let expr = eq(Expr::ident("token"), Expr::string(secret));
    let out = run(&expr, Dialect::PostgreSQL);
    assert!(!out.sql.contains(secret));
    assert_eq!(out.parameters, vec![SqlValue::String(secret.to_string())]);
}

#[test]
fn test_inline_mode_produces_empty_parameters() {
    let out = translate(
        &name_and_age(),
        Dialect::PostgreSQL,
        &SchemaRegistry::new(),
        &TranslateOptions::default(),
    )
    .unwrap();
    assert_eq!(out.sql, "name = 'alice' AND age > 30");
    assert!(out.parameters.is_empty());
}

#[test]
fn test_determinism() {
    let expr = name_and_age();
    let a = run(&expr, Dialect::PostgreSQL);
    let b = run(&expr, Dialect::PostgreSQL);
    assert_eq!(a, b);
}

#[test]
fn test_parameter_inline_equivalence() {
    // Substituting each bound value (with inline escaping) into the
    // parameterized SQL reproduces the inline SQL.
    let expr = eq(Expr::ident("name"), Expr::string("O'Brien"));
    let inline = translate(
        &expr,
        Dialect::PostgreSQL,
        &SchemaRegistry::new(),
        &TranslateOptions::default(),
    )
    .unwrap();
    let bound = run(&expr, Dialect::PostgreSQL);
    let SqlValue::String(value) = &bound.parameters[0] else {
        panic!("expected a string parameter");
    };
    let substituted = bound
        .sql
        .replace("$1", &format!("'{}'", value.replace('\'', "''")));
    assert_eq!(substituted, inline.sql);
}
