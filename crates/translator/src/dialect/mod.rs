// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Dialect interface
//!
//! All SQL-syntax-specific code lives behind the [`SqlDialect`] trait; the
//! walker consults it for every syntactic choice. Capabilities that wrap
//! sub-expressions receive an [`Emitter`] (the walker) plus the operand
//! nodes and interleave their own syntax with operand emission into the
//! shared buffer. This keeps a single allocation and lets suffix-cast
//! syntax (`(expr)::numeric`) and function-cast syntax
//! (`CAST(expr AS FLOAT64)`) share one walker.
//!
//! ## Implementations
//!
//! | Dialect | Placeholders | JSON paths | Unnest |
//! |---------|--------------|------------|--------|
//! | PostgreSQL | `$N` | `->` / `->>` | `UNNEST` |
//! | DuckDB | `$N` | `->` / `->>` | `UNNEST` |
//! | BigQuery | `@pN` | `JSON_QUERY` / `JSON_VALUE` | `UNNEST` |
//! | MySQL | `?` | `->'$.k'` / `->>'$.k'` | `JSON_TABLE` |
//! | SQLite | `?` | `json_extract` | `json_each` |

pub mod bigquery;
pub mod duckdb;
pub mod mysql;
pub mod postgres;
pub mod shared;
pub mod sqlite;

use crate::error::TranslateResult;
use crate::writer::SqlWriter;
use cel2sql_ast::{Dialect, Expr};

pub use crate::duration::DurationUnit;

pub use bigquery::BigQueryDialect;
pub use duckdb::DuckDBDialect;
pub use mysql::MySQLDialect;
pub use postgres::PostgresDialect;
pub use sqlite::SQLiteDialect;

/// Deferred sub-expression emission: the walker hands itself to dialect
/// capabilities as an `Emitter`, and the dialect invokes `emit` for each
/// operand at the point its syntax requires it.
pub trait Emitter {
    fn emit(&mut self, w: &mut SqlWriter, node: &Expr) -> TranslateResult<()>;
}

/// One step of a JSON path: an object key or an array index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum JsonSeg<'a> {
    Key(&'a str),
    Index(i64),
}

/// Timestamp component selected by the `get*` accessor methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatePart {
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
    Milliseconds,
    DayOfYear,
    DayOfWeek,
}

impl DatePart {
    /// The standard `EXTRACT` field name.
    pub fn as_sql(self) -> &'static str {
        match self {
            DatePart::Year => "YEAR",
            DatePart::Month => "MONTH",
            DatePart::Day => "DAY",
            DatePart::Hour => "HOUR",
            DatePart::Minute => "MINUTE",
            DatePart::Second => "SECOND",
            DatePart::Milliseconds => "MILLISECONDS",
            DatePart::DayOfYear => "DOY",
            DatePart::DayOfWeek => "DOW",
        }
    }
}

/// Direction of timestamp arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemporalOp {
    Add,
    Sub,
}

impl TemporalOp {
    pub fn as_sql(self) -> &'static str {
        match self {
            TemporalOp::Add => "+",
            TemporalOp::Sub => "-",
        }
    }
}

/// The capability bundle the walker consumes. One implementation per
/// target; implementations are stateless and shared.
pub trait SqlDialect: Send + Sync {
    fn name(&self) -> Dialect;

    // --- Literals & placeholders ---

    fn write_string_literal(&self, w: &mut SqlWriter, value: &str);

    fn write_bytes_literal(&self, w: &mut SqlWriter, value: &[u8]);

    fn write_param_placeholder(&self, w: &mut SqlWriter, index: usize);

    // --- Strings ---

    fn write_string_concat(
        &self,
        w: &mut SqlWriter,
        t: &mut dyn Emitter,
        lhs: &Expr,
        rhs: &Expr,
    ) -> TranslateResult<()>;

    fn write_contains(
        &self,
        w: &mut SqlWriter,
        t: &mut dyn Emitter,
        haystack: &Expr,
        needle: &Expr,
    ) -> TranslateResult<()>;

    /// The `ESCAPE` clause appended after LIKE patterns that embed
    /// escaped metacharacters.
    fn write_like_escape(&self, w: &mut SqlWriter);

    /// Translate a vetted RE2 pattern into this dialect's regex flavor.
    fn convert_regex(&self, pattern: &str) -> TranslateResult<String>;

    fn write_regex_match(
        &self,
        w: &mut SqlWriter,
        t: &mut dyn Emitter,
        subject: &Expr,
        pattern: &str,
        case_insensitive: bool,
    ) -> TranslateResult<()>;

    fn write_split(
        &self,
        w: &mut SqlWriter,
        t: &mut dyn Emitter,
        subject: &Expr,
        delimiter: &Expr,
    ) -> TranslateResult<()>;

    fn write_split_with_limit(
        &self,
        w: &mut SqlWriter,
        t: &mut dyn Emitter,
        subject: &Expr,
        delimiter: &Expr,
        limit: i64,
    ) -> TranslateResult<()>;

    /// `delimiter` is `None` for `join()` without arguments (empty-string
    /// delimiter).
    fn write_join(
        &self,
        w: &mut SqlWriter,
        t: &mut dyn Emitter,
        array: &Expr,
        delimiter: Option<&Expr>,
    ) -> TranslateResult<()>;

    // --- Arrays ---

    fn write_array_literal_open(&self, w: &mut SqlWriter);

    fn write_array_literal_close(&self, w: &mut SqlWriter);

    fn write_array_length(
        &self,
        w: &mut SqlWriter,
        t: &mut dyn Emitter,
        expr: &Expr,
    ) -> TranslateResult<()>;

    fn write_array_membership(
        &self,
        w: &mut SqlWriter,
        t: &mut dyn Emitter,
        elem: &Expr,
        array: &Expr,
    ) -> TranslateResult<()>;

    fn write_list_index(
        &self,
        w: &mut SqlWriter,
        t: &mut dyn Emitter,
        array: &Expr,
        index: &Expr,
    ) -> TranslateResult<()>;

    /// Constant index, 0-based on the CEL side.
    fn write_list_index_const(
        &self,
        w: &mut SqlWriter,
        t: &mut dyn Emitter,
        array: &Expr,
        index: i64,
    ) -> TranslateResult<()>;

    fn write_empty_typed_array(&self, w: &mut SqlWriter, element_type: &str);

    // --- JSON ---

    /// Emit a JSON path over `root.column`. The final step uses the
    /// scalar-extract operator when `as_text` is set, the subtree-extract
    /// operator otherwise.
    fn write_json_path(
        &self,
        w: &mut SqlWriter,
        t: &mut dyn Emitter,
        root: &Expr,
        column: &str,
        path: &[JsonSeg<'_>],
        as_text: bool,
    ) -> TranslateResult<()>;

    /// Key-existence test against `root.column`.
    fn write_json_key_exists(
        &self,
        w: &mut SqlWriter,
        t: &mut dyn Emitter,
        root: &Expr,
        column: &str,
        key: &str,
        binary: bool,
    ) -> TranslateResult<()>;

    /// Length of a JSON array reached via `root.column` + `path`.
    fn write_json_array_length(
        &self,
        w: &mut SqlWriter,
        t: &mut dyn Emitter,
        root: &Expr,
        column: &str,
        path: &[JsonSeg<'_>],
    ) -> TranslateResult<()>;

    // --- Casts ---

    /// Map a CEL cast name (`int`, `string`, ...) to the SQL type name.
    fn write_type_name(&self, w: &mut SqlWriter, cel_type: &str);

    /// Coerce a JSON text extraction for numeric comparison.
    fn write_numeric_coercion(
        &self,
        w: &mut SqlWriter,
        t: &mut dyn Emitter,
        expr: &Expr,
    ) -> TranslateResult<()>;

    fn write_epoch_extract(
        &self,
        w: &mut SqlWriter,
        t: &mut dyn Emitter,
        expr: &Expr,
    ) -> TranslateResult<()>;

    fn write_timestamp_cast(
        &self,
        w: &mut SqlWriter,
        t: &mut dyn Emitter,
        expr: &Expr,
    ) -> TranslateResult<()>;

    // --- Temporal ---

    fn write_duration(&self, w: &mut SqlWriter, value: i64, unit: DurationUnit);

    fn write_interval(
        &self,
        w: &mut SqlWriter,
        t: &mut dyn Emitter,
        value: &Expr,
        unit: &str,
    ) -> TranslateResult<()>;

    fn write_extract(
        &self,
        w: &mut SqlWriter,
        t: &mut dyn Emitter,
        part: DatePart,
        expr: &Expr,
        timezone: Option<&Expr>,
    ) -> TranslateResult<()>;

    fn write_timestamp_arithmetic(
        &self,
        w: &mut SqlWriter,
        t: &mut dyn Emitter,
        op: TemporalOp,
        timestamp: &Expr,
        duration: &Expr,
    ) -> TranslateResult<()>;

    // --- Comprehensions ---

    fn write_unnest(
        &self,
        w: &mut SqlWriter,
        t: &mut dyn Emitter,
        source: &Expr,
    ) -> TranslateResult<()>;

    fn write_array_subquery_open(&self, w: &mut SqlWriter);

    /// Closes the aggregate opened by [`Self::write_array_subquery_open`]
    /// around the selected expression; a no-op where the subquery form is
    /// `ARRAY(SELECT ...)`.
    fn write_array_subquery_expr_close(&self, w: &mut SqlWriter);

    // --- Struct / map literals ---

    fn write_struct_open(&self, w: &mut SqlWriter);

    fn write_struct_close(&self, w: &mut SqlWriter);

    // --- Identifier policy & capabilities ---

    /// Whether `name` (already lowercased) is reserved in this dialect.
    fn is_reserved(&self, name: &str) -> bool;

    fn supports_native_arrays(&self) -> bool;

    fn supports_binary_json(&self) -> bool;
}

static POSTGRES: PostgresDialect = PostgresDialect;
static DUCKDB: DuckDBDialect = DuckDBDialect;
static BIGQUERY: BigQueryDialect = BigQueryDialect;
static MYSQL: MySQLDialect = MySQLDialect;
static SQLITE: SQLiteDialect = SQLiteDialect;

/// The shared implementation instance for a dialect name.
pub fn dialect_impl(dialect: Dialect) -> &'static dyn SqlDialect {
    match dialect {
        Dialect::PostgreSQL => &POSTGRES,
        Dialect::DuckDB => &DUCKDB,
        Dialect::BigQuery => &BIGQUERY,
        Dialect::MySQL => &MYSQL,
        Dialect::SQLite => &SQLITE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialect_impl_round_trip() {
        for dialect in Dialect::ALL {
            assert_eq!(dialect_impl(dialect).name(), dialect);
        }
    }

    #[test]
    fn test_date_part_names() {
        assert_eq!(DatePart::Year.as_sql(), "YEAR");
        assert_eq!(DatePart::DayOfWeek.as_sql(), "DOW");
        assert_eq!(DatePart::DayOfYear.as_sql(), "DOY");
    }

    #[test]
    fn test_capabilities() {
        assert!(dialect_impl(Dialect::PostgreSQL).supports_binary_json());
        assert!(!dialect_impl(Dialect::MySQL).supports_binary_json());
        assert!(dialect_impl(Dialect::BigQuery).supports_native_arrays());
        assert!(!dialect_impl(Dialect::SQLite).supports_native_arrays());
    }
}
