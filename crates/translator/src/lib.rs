// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # cel2sql - Translation Kernel
//!
//! This crate converts CEL expression trees into SQL WHERE-clause
//! fragments for PostgreSQL, DuckDB, BigQuery, MySQL and SQLite.
//!
//! ## Overview
//!
//! The kernel is a schema-aware, dialect-parameterized tree walker:
//!
//! ```text
//! AST + SchemaRegistry + TranslateOptions → Translator → (SQL, parameters)
//! ```
//!
//! - The **walker** drives a recursive descent over the AST, resolving
//!   CEL's overloaded operators from local context (temporal vs string vs
//!   numeric `+`, `size()` by receiver type, `has()` by column kind).
//! - The **dialect trait** receives deferred sub-expression emissions, so
//!   one walker serves five syntactically divergent targets.
//! - The **parameter binder** produces either escaped inline literals or
//!   ordinal placeholders plus a typed value list.
//! - **Limits** (recursion depth, output length, comprehension nesting,
//!   pattern and bytes sizes) are enforced before each descent; an
//!   over-limit input yields an error and no partial SQL.
//!
//! The kernel is a pure function of `(ast, schemas, options)` with no
//! global state; translations may run concurrently against a shared
//! registry.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cel2sql_ast::{BinaryOp, Dialect, Expr};
//! use cel2sql_schema::SchemaRegistry;
//! use cel2sql_translator::{translate, TranslateOptions};
//!
//! let expr = Expr::binary(
//!     BinaryOp::Eq,
//!     Expr::ident("name"),
//!     Expr::string("alice"),
//! );
//! let out = translate(
//!     &expr,
//!     Dialect::PostgreSQL,
//!     &SchemaRegistry::new(),
//!     &TranslateOptions::default(),
//! )?;
//! assert_eq!(out.sql, "name = 'alice'");
//! ```

pub mod comprehension;
pub mod config;
pub mod dialect;
pub mod duration;
pub mod error;
pub mod params;
pub mod pattern;
pub mod validate;
pub mod walker;
pub mod writer;

use serde::{Deserialize, Serialize};
use tracing::debug;

use cel2sql_ast::{Dialect, Expr};
use cel2sql_schema::SchemaRegistry;

pub use config::{BindMode, TranslateOptions};
pub use dialect::{dialect_impl, SqlDialect};
pub use error::{TranslateError, TranslateResult};
pub use params::SqlValue;

/// The output artifact of one translation: a WHERE-clause fragment
/// (without the leading `WHERE`) and the bound parameter values, empty in
/// inline mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Translation {
    pub sql: String,
    pub parameters: Vec<SqlValue>,
}

/// Reusable translation entry point binding a dialect, a schema registry
/// and options. Cheap to construct; holds no per-call state.
pub struct Translator<'a> {
    dialect: Dialect,
    registry: &'a SchemaRegistry,
    options: TranslateOptions,
}

impl<'a> Translator<'a> {
    pub fn new(dialect: Dialect, registry: &'a SchemaRegistry, options: TranslateOptions) -> Self {
        Self {
            dialect,
            registry,
            options,
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn options(&self) -> &TranslateOptions {
        &self.options
    }

    /// Translate one expression. The expression must already be in
    /// macro-lowered form (see `cel2sql_ast::macros::lower`); method-call
    /// macros are lowered on the fly as a convenience.
    pub fn translate(&self, expr: &Expr) -> TranslateResult<Translation> {
        translate(expr, self.dialect, self.registry, &self.options)
    }
}

/// Translate one expression against `registry` for `dialect`.
///
/// On error no partial output is observable: the artifact is only
/// produced on success.
pub fn translate(
    expr: &Expr,
    dialect: Dialect,
    registry: &SchemaRegistry,
    options: &TranslateOptions,
) -> TranslateResult<Translation> {
    debug!(
        dialect = dialect.as_str(),
        mode = ?options.mode,
        tables = registry.len(),
        "translating expression"
    );
    let walker = walker::Walker::new(dialect_impl(dialect), registry, options);
    let result = walker.run(expr);
    if let Err(err) = &result {
        debug!(error = %err.diagnostic(), "translation failed");
    }
    result
}
