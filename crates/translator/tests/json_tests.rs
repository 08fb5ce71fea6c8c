// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! JSON path lowering, has() semantics and schema-driven rewrites

use cel2sql_ast::{BinaryOp, Dialect, Expr};
use cel2sql_schema::{FieldSchema, Schema, SchemaRegistry};
use cel2sql_translator::{translate, TranslateError, TranslateOptions};

fn jsonb_registry() -> SchemaRegistry {
    SchemaRegistry::new().with_table(
        "usr",
        Schema::new(vec![
            FieldSchema::scalar("id", "bigint"),
            FieldSchema::jsonb("metadata"),
        ]),
    )
}

fn json_registry() -> SchemaRegistry {
    SchemaRegistry::new().with_table(
        "usr",
        Schema::new(vec![FieldSchema::json("metadata")]),
    )
}

fn run(expr: &Expr, dialect: Dialect, registry: &SchemaRegistry) -> String {
    translate(expr, dialect, registry, &TranslateOptions::default())
        .unwrap()
        .sql
}

fn eq(left: Expr, right: Expr) -> Expr {
    Expr::binary(BinaryOp::Eq, left, right)
}

#[test]
fn test_simple_json_access() {
    let expr = eq(Expr::path(["usr", "metadata", "role"]), Expr::string("admin"));
    assert_eq!(
        run(&expr, Dialect::PostgreSQL, &jsonb_registry()),
        "usr.metadata->>'role' = 'admin'"
    );
}

#[test]
fn test_nested_json_access() {
    let expr = eq(
        Expr::path(["usr", "metadata", "settings", "theme"]),
        Expr::string("dark"),
    );
    assert_eq!(
        run(&expr, Dialect::PostgreSQL, &jsonb_registry()),
        "usr.metadata->'settings'->>'theme' = 'dark'"
    );
}

#[test]
fn test_deeply_nested_json() {
    let expr = eq(Expr::path(["usr", "metadata", "a", "b", "c"]), Expr::string("v"));
    assert_eq!(
        run(&expr, Dialect::PostgreSQL, &jsonb_registry()),
        "usr.metadata->'a'->'b'->>'c' = 'v'"
    );
}

#[test]
fn test_json_access_per_dialect() {
    let expr = eq(Expr::path(["usr", "metadata", "role"]), Expr::string("admin"));
    assert_eq!(
        run(&expr, Dialect::MySQL, &jsonb_registry()),
        "usr.metadata->>'$.role' = 'admin'"
    );
    assert_eq!(
        run(&expr, Dialect::BigQuery, &jsonb_registry()),
        "JSON_VALUE(usr.metadata, '$.role') = 'admin'"
    );
    assert_eq!(
        run(&expr, Dialect::SQLite, &jsonb_registry()),
        "json_extract(usr.metadata, '$.role') = 'admin'"
    );
    assert_eq!(
        run(&expr, Dialect::DuckDB, &jsonb_registry()),
        "usr.metadata->>'role' = 'admin'"
    );
}

#[test]
fn test_nested_json_bigquery_wraps_query_then_value() {
    let expr = eq(Expr::path(["usr", "metadata", "a", "b"]), Expr::string("v"));
    assert_eq!(
        run(&expr, Dialect::BigQuery, &jsonb_registry()),
        "JSON_VALUE(JSON_QUERY(usr.metadata, '$.a'), '$.b') = 'v'"
    );
}

#[test]
fn test_nested_json_sqlite_nests_extract() {
    let expr = eq(Expr::path(["usr", "metadata", "a", "b"]), Expr::string("v"));
    assert_eq!(
        run(&expr, Dialect::SQLite, &jsonb_registry()),
        "json_extract(json_extract(usr.metadata, '$.a'), '$.b') = 'v'"
    );
}

#[test]
fn test_numeric_comparison_coerces() {
    let expr = Expr::binary(
        BinaryOp::Gt,
        Expr::path(["usr", "metadata", "age"]),
        Expr::int(25),
    );
    assert_eq!(
        run(&expr, Dialect::PostgreSQL, &jsonb_registry()),
        "(usr.metadata->>'age')::numeric > 25"
    );
    assert_eq!(
        run(&expr, Dialect::BigQuery, &jsonb_registry()),
        "CAST((JSON_VALUE(usr.metadata, '$.age')) AS FLOAT64) > 25"
    );
    assert_eq!(
        run(&expr, Dialect::MySQL, &jsonb_registry()),
        "(usr.metadata->>'$.age') + 0 > 25"
    );
}

#[test]
fn test_numeric_coercion_symmetric() {
    let expr = Expr::binary(
        BinaryOp::Lt,
        Expr::int(25),
        Expr::path(["usr", "metadata", "age"]),
    );
    assert_eq!(
        run(&expr, Dialect::PostgreSQL, &jsonb_registry()),
        "25 < (usr.metadata->>'age')::numeric"
    );
}

#[test]
fn test_string_comparison_not_coerced() {
    let expr = eq(Expr::path(["usr", "metadata", "age"]), Expr::string("25"));
    assert_eq!(
        run(&expr, Dialect::PostgreSQL, &jsonb_registry()),
        "usr.metadata->>'age' = '25'"
    );
}

#[test]
fn test_has_on_json_column_itself() {
    let expr = Expr::call("has", vec![Expr::path(["usr", "metadata"])]);
    assert_eq!(
        run(&expr, Dialect::PostgreSQL, &jsonb_registry()),
        "usr.metadata IS NOT NULL"
    );
}

#[test]
fn test_has_json_key_jsonb() {
    let expr = Expr::call("has", vec![Expr::path(["usr", "metadata", "role"])]);
    assert_eq!(
        run(&expr, Dialect::PostgreSQL, &jsonb_registry()),
        "usr.metadata ? 'role'"
    );
}

#[test]
fn test_has_json_key_text_json() {
    let expr = Expr::call("has", vec![Expr::path(["usr", "metadata", "role"])]);
    assert_eq!(
        run(&expr, Dialect::PostgreSQL, &json_registry()),
        "usr.metadata->'role' IS NOT NULL"
    );
}

#[test]
fn test_has_json_key_per_dialect() {
    let expr = Expr::call("has", vec![Expr::path(["usr", "metadata", "role"])]);
    assert_eq!(
        run(&expr, Dialect::MySQL, &jsonb_registry()),
        "JSON_CONTAINS_PATH(usr.metadata, 'one', '$.role')"
    );
    assert_eq!(
        run(&expr, Dialect::BigQuery, &jsonb_registry()),
        "JSON_VALUE(usr.metadata, '$.role') IS NOT NULL"
    );
    assert_eq!(
        run(&expr, Dialect::SQLite, &jsonb_registry()),
        "json_type(usr.metadata, '$.role') IS NOT NULL"
    );
    assert_eq!(
        run(&expr, Dialect::DuckDB, &jsonb_registry()),
        "json_exists(usr.metadata, '$.role')"
    );
}

#[test]
fn test_has_nested_json_path() {
    let expr = Expr::call(
        "has",
        vec![Expr::path(["usr", "metadata", "settings", "theme"])],
    );
    assert_eq!(
        run(&expr, Dialect::PostgreSQL, &jsonb_registry()),
        "usr.metadata->'settings'->>'theme' IS NOT NULL"
    );
}

#[test]
fn test_has_scalar_column_is_not_null_everywhere() {
    let expr = Expr::call("has", vec![Expr::path(["usr", "id"])]);
    for dialect in Dialect::ALL {
        assert_eq!(
            run(&expr, dialect, &jsonb_registry()),
            "usr.id IS NOT NULL",
            "{dialect}"
        );
    }
}

#[test]
fn test_json_index_access() {
    let expr = eq(
        Expr::index(Expr::path(["usr", "metadata", "items"]), Expr::int(0)),
        Expr::string("first"),
    );
    assert_eq!(
        run(&expr, Dialect::PostgreSQL, &jsonb_registry()),
        "usr.metadata->'items'->>0 = 'first'"
    );
}

#[test]
fn test_json_string_index_is_path_step() {
    let expr = eq(
        Expr::index(Expr::path(["usr", "metadata"]), Expr::string("role")),
        Expr::string("admin"),
    );
    assert_eq!(
        run(&expr, Dialect::PostgreSQL, &jsonb_registry()),
        "usr.metadata->>'role' = 'admin'"
    );
}

#[test]
fn test_json_array_size() {
    let expr = Expr::binary(
        BinaryOp::Gt,
        Expr::method(Expr::path(["usr", "metadata", "items"]), "size", vec![]),
        Expr::int(0),
    );
    assert_eq!(
        run(&expr, Dialect::PostgreSQL, &jsonb_registry()),
        "COALESCE(jsonb_array_length(usr.metadata->'items'), 0) > 0"
    );
}

#[test]
fn test_schema_less_degradation() {
    // Without a registry entry no JSON rewrite fires; the chain is a
    // plain dotted column reference.
    let expr = eq(Expr::path(["usr", "metadata", "role"]), Expr::string("admin"));
    assert_eq!(
        run(&expr, Dialect::PostgreSQL, &SchemaRegistry::new()),
        "usr.metadata.role = 'admin'"
    );
}

#[test]
fn test_select_past_scalar_column_rejected() {
    let expr = eq(Expr::path(["usr", "id", "oops"]), Expr::int(1));
    let err = translate(
        &expr,
        Dialect::PostgreSQL,
        &jsonb_registry(),
        &TranslateOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, TranslateError::NonJsonPath { .. }));
}

#[test]
fn test_membership_against_json_column_rejected() {
    let expr = Expr::binary(
        BinaryOp::In,
        Expr::string("admin"),
        Expr::path(["usr", "metadata"]),
    );
    let err = translate(
        &expr,
        Dialect::PostgreSQL,
        &jsonb_registry(),
        &TranslateOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, TranslateError::UnsupportedFeature { .. }));
}
