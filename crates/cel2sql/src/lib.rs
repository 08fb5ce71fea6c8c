// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # cel2sql
//!
//! Convert CEL predicate expressions into SQL WHERE-clause fragments for
//! PostgreSQL, DuckDB, BigQuery, MySQL and SQLite.
//!
//! This crate is the public facade over the workspace layers:
//!
//! - [`cel2sql_ast`]: the expression tree and macro lowering
//! - [`cel2sql_schema`]: per-table field metadata (JSON, array, temporal)
//! - [`cel2sql_translator`]: the schema-aware, dialect-parameterized
//!   translation kernel
//! - [`cel2sql_analysis`]: static index recommendations
//!
//! ## Entry points
//!
//! - [`convert`]: inline-literal SQL text
//! - [`convert_parameterized`]: placeholder SQL plus bound values
//! - [`analyze`]: SQL plus index recommendations
//!
//! All three lower comprehension macros before translation, so callers
//! may pass trees straight from a parser.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cel2sql::{convert, Dialect, Expr, BinaryOp, SchemaRegistry, TranslateOptions};
//!
//! // name == "alice" && age > 30
//! let expr = Expr::binary(
//!     BinaryOp::And,
//!     Expr::binary(BinaryOp::Eq, Expr::ident("name"), Expr::string("alice")),
//!     Expr::binary(BinaryOp::Gt, Expr::ident("age"), Expr::int(30)),
//! );
//! let sql = convert(
//!     &expr,
//!     Dialect::PostgreSQL,
//!     &SchemaRegistry::new(),
//!     &TranslateOptions::default(),
//! )?;
//! assert_eq!(sql, "name = 'alice' AND age > 30");
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

pub use cel2sql_analysis::{IndexRecommendation, IndexType, PatternKind};
pub use cel2sql_ast::{
    macros, BinaryOp, Comprehension, Dialect, Expr, ExprKind, Literal, MapEntry, SourcePos,
    StructField, UnaryOp, UnknownDialect,
};
pub use cel2sql_schema::{FieldKind, FieldSchema, Schema, SchemaRegistry};
pub use cel2sql_translator::{
    BindMode, SqlValue, TranslateError, TranslateOptions, TranslateResult, Translation, Translator,
};

/// Result of a parameterized conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversion {
    pub sql: String,
    pub parameters: Vec<SqlValue>,
}

/// Result of an analysis: the translated SQL plus index recommendations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub sql: String,
    pub recommendations: Vec<IndexRecommendation>,
}

/// Convert a CEL expression to an inline SQL WHERE-clause fragment.
///
/// The `mode` field of `options` is ignored; literals are always
/// inlined. Use [`convert_parameterized`] for placeholder output.
pub fn convert(
    expr: &Expr,
    dialect: Dialect,
    schemas: &SchemaRegistry,
    options: &TranslateOptions,
) -> TranslateResult<String> {
    let options = options.clone().with_mode(BindMode::Inline);
    let lowered = macros::lower(expr.clone());
    cel2sql_translator::translate(&lowered, dialect, schemas, &options).map(|t| t.sql)
}

/// Convert a CEL expression to a parameterized SQL WHERE-clause fragment
/// with its bound values in placeholder order.
pub fn convert_parameterized(
    expr: &Expr,
    dialect: Dialect,
    schemas: &SchemaRegistry,
    options: &TranslateOptions,
) -> TranslateResult<Conversion> {
    let options = options.clone().with_mode(BindMode::Parameterized);
    let lowered = macros::lower(expr.clone());
    cel2sql_translator::translate(&lowered, dialect, schemas, &options).map(|t| Conversion {
        sql: t.sql,
        parameters: t.parameters,
    })
}

/// Convert a CEL expression and additionally walk it for index
/// recommendations.
pub fn analyze(
    expr: &Expr,
    dialect: Dialect,
    schemas: &SchemaRegistry,
    options: &TranslateOptions,
) -> TranslateResult<Analysis> {
    let lowered = macros::lower(expr.clone());
    let translation = cel2sql_translator::translate(&lowered, dialect, schemas, options)?;
    let recommendations = cel2sql_analysis::analyze(&lowered, dialect, schemas);
    debug!(
        recommendations = recommendations.len(),
        "analysis complete"
    );
    Ok(Analysis {
        sql: translation.sql,
        recommendations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simple_expr() -> Expr {
        Expr::binary(
            BinaryOp::And,
            Expr::binary(BinaryOp::Eq, Expr::ident("name"), Expr::string("alice")),
            Expr::binary(BinaryOp::Gt, Expr::ident("age"), Expr::int(30)),
        )
    }

    #[test]
    fn test_convert_inline() {
        let sql = convert(
            &simple_expr(),
            Dialect::PostgreSQL,
            &SchemaRegistry::new(),
            &TranslateOptions::default(),
        )
        .unwrap();
        assert_eq!(sql, "name = 'alice' AND age > 30");
    }

    #[test]
    fn test_convert_forces_inline_mode() {
        let sql = convert(
            &simple_expr(),
            Dialect::PostgreSQL,
            &SchemaRegistry::new(),
            &TranslateOptions::parameterized(),
        )
        .unwrap();
        assert!(!sql.contains('$'));
    }

    #[test]
    fn test_convert_parameterized() {
        let out = convert_parameterized(
            &simple_expr(),
            Dialect::PostgreSQL,
            &SchemaRegistry::new(),
            &TranslateOptions::default(),
        )
        .unwrap();
        assert_eq!(out.sql, "name = $1 AND age > $2");
        assert_eq!(
            out.parameters,
            vec![SqlValue::String("alice".to_string()), SqlValue::Int(30)]
        );
    }

    #[test]
    fn test_analyze_produces_recommendations() {
        let out = analyze(
            &simple_expr(),
            Dialect::PostgreSQL,
            &SchemaRegistry::new(),
            &TranslateOptions::default(),
        )
        .unwrap();
        assert_eq!(out.sql, "name = 'alice' AND age > 30");
        assert!(!out.recommendations.is_empty());
    }

    #[test]
    fn test_macro_calls_are_lowered() {
        let expr = Expr::method(
            Expr::ident("items"),
            "exists",
            vec![
                Expr::ident("x"),
                Expr::binary(BinaryOp::Gt, Expr::ident("x"), Expr::int(10)),
            ],
        );
        let sql = convert(
            &expr,
            Dialect::PostgreSQL,
            &SchemaRegistry::new(),
            &TranslateOptions::default(),
        )
        .unwrap();
        assert_eq!(
            sql,
            "EXISTS (SELECT 1 FROM UNNEST(items) AS x WHERE x > 10)"
        );
    }
}
