// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Benchmarks for the hot translation path

use cel2sql_ast::{macros, BinaryOp, Dialect, Expr};
use cel2sql_schema::{FieldSchema, Schema, SchemaRegistry};
use cel2sql_translator::{translate, TranslateOptions};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn registry() -> SchemaRegistry {
    SchemaRegistry::new().with_table(
        "usr",
        Schema::new(vec![
            FieldSchema::scalar("name", "text"),
            FieldSchema::jsonb("metadata"),
            FieldSchema::array("tags", "text"),
        ]),
    )
}

fn simple_expr() -> Expr {
    Expr::binary(
        BinaryOp::And,
        Expr::binary(BinaryOp::Eq, Expr::ident("name"), Expr::string("alice")),
        Expr::binary(BinaryOp::Gt, Expr::ident("age"), Expr::int(30)),
    )
}

fn json_expr() -> Expr {
    Expr::binary(
        BinaryOp::Eq,
        Expr::path(["usr", "metadata", "settings", "theme"]),
        Expr::string("dark"),
    )
}

fn comprehension_expr() -> Expr {
    macros::lower(Expr::method(
        Expr::ident("tags"),
        "exists",
        vec![
            Expr::ident("x"),
            Expr::binary(BinaryOp::Eq, Expr::ident("x"), Expr::string("rust")),
        ],
    ))
}

fn bench_translate(c: &mut Criterion) {
    let registry = registry();
    let options = TranslateOptions::default();
    let parameterized = TranslateOptions::parameterized();

    c.bench_function("translate_simple_postgres", |b| {
        let expr = simple_expr();
        b.iter(|| {
            translate(
                black_box(&expr),
                Dialect::PostgreSQL,
                &registry,
                &options,
            )
            .unwrap()
        })
    });

    c.bench_function("translate_simple_parameterized", |b| {
        let expr = simple_expr();
        b.iter(|| {
            translate(
                black_box(&expr),
                Dialect::PostgreSQL,
                &registry,
                &parameterized,
            )
            .unwrap()
        })
    });

    c.bench_function("translate_json_path", |b| {
        let expr = json_expr();
        b.iter(|| {
            translate(
                black_box(&expr),
                Dialect::PostgreSQL,
                &registry,
                &options,
            )
            .unwrap()
        })
    });

    c.bench_function("translate_comprehension", |b| {
        let expr = comprehension_expr();
        b.iter(|| {
            translate(
                black_box(&expr),
                Dialect::PostgreSQL,
                &registry,
                &options,
            )
            .unwrap()
        })
    });
}

criterion_group!(benches, bench_translate);
criterion_main!(benches);
