// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! BigQuery dialect
//!
//! GoogleSQL diverges the most from the PostgreSQL family: backslash
//! string escapes, octal bytes literals, named parameters (`@pN`),
//! function-style JSON access (`JSON_VALUE` / `JSON_QUERY`),
//! `TIMESTAMP_ADD`/`TIMESTAMP_SUB` for interval arithmetic, and an
//! RE2-native regex engine behind `REGEXP_CONTAINS`.

use crate::dialect::{DatePart, DurationUnit, Emitter, JsonSeg, SqlDialect, TemporalOp};
use crate::dialect::shared::{dollar_path_segment, write_interval_literal};
use crate::error::TranslateResult;
use crate::writer::SqlWriter;
use cel2sql_ast::{Dialect, Expr};

const RESERVED: &[&str] = &[
    "all", "alter", "and", "any", "array", "as", "asc", "assert_rows_modified", "at", "between",
    "by", "case", "cast", "collate", "contains", "create", "cross", "cube", "current", "default",
    "define", "desc", "distinct", "else", "end", "enum", "escape", "except", "exclude", "exists",
    "extract", "false", "fetch", "following", "for", "from", "full", "group", "grouping",
    "groups", "hash", "having", "if", "ignore", "in", "inner", "insert", "intersect", "interval",
    "into", "is", "join", "lateral", "left", "like", "limit", "lookup", "merge", "natural",
    "new", "no", "not", "null", "nulls", "of", "on", "or", "order", "outer", "over", "partition",
    "preceding", "proto", "range", "recursive", "respect", "right", "rollup", "rows", "select",
    "set", "some", "struct", "tablesample", "then", "to", "treat", "true", "unbounded", "union",
    "unnest", "using", "when", "where", "window", "with", "within",
];

fn sql_type(cel_type: &str) -> Option<&'static str> {
    Some(match cel_type {
        "bool" => "BOOL",
        "bytes" => "BYTES",
        "double" => "FLOAT64",
        "int" | "uint" => "INT64",
        "string" => "STRING",
        "timestamp" => "TIMESTAMP",
        _ => return None,
    })
}

fn bq_array_type(element_type: &str) -> String {
    let normalized = match element_type.to_ascii_lowercase().as_str() {
        "text" | "string" | "varchar" => "STRING",
        "int" | "integer" | "bigint" | "int64" => "INT64",
        "double" | "float" | "real" | "float64" => "FLOAT64",
        "boolean" | "bool" => "BOOL",
        "bytes" | "bytea" | "blob" => "BYTES",
        _ => return element_type.to_ascii_uppercase(),
    };
    normalized.to_string()
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

/// BigQuery dialect for CEL-to-SQL translation.
pub struct BigQueryDialect;

impl SqlDialect for BigQueryDialect {
    fn name(&self) -> Dialect {
        Dialect::BigQuery
    }

    fn write_string_literal(&self, w: &mut SqlWriter, value: &str) {
        w.push("'");
        w.push(&escape(value));
        w.push("'");
    }

    fn write_bytes_literal(&self, w: &mut SqlWriter, value: &[u8]) {
        w.push("b\"");
        for byte in value {
            w.push(&format!("\\{byte:03o}"));
        }
        w.push("\"");
    }

    fn write_param_placeholder(&self, w: &mut SqlWriter, index: usize) {
        w.push("@p");
        w.push(&index.to_string());
    }

    fn write_string_concat(
        &self,
        w: &mut SqlWriter,
        t: &mut dyn Emitter,
        lhs: &Expr,
        rhs: &Expr,
    ) -> TranslateResult<()> {
        t.emit(w, lhs)?;
        w.push(" || ");
        t.emit(w, rhs)
    }

    fn write_contains(
        &self,
        w: &mut SqlWriter,
        t: &mut dyn Emitter,
        haystack: &Expr,
        needle: &Expr,
    ) -> TranslateResult<()> {
        w.push("STRPOS(");
        t.emit(w, haystack)?;
        w.push(", ");
        t.emit(w, needle)?;
        w.push(") > 0");
        Ok(())
    }

    fn write_like_escape(&self, _w: &mut SqlWriter) {
        // Backslash is the default LIKE escape in GoogleSQL.
    }

    fn convert_regex(&self, pattern: &str) -> TranslateResult<String> {
        // REGEXP_CONTAINS speaks RE2 natively.
        Ok(pattern.to_string())
    }

    fn write_regex_match(
        &self,
        w: &mut SqlWriter,
        t: &mut dyn Emitter,
        subject: &Expr,
        pattern: &str,
        case_insensitive: bool,
    ) -> TranslateResult<()> {
        w.push("REGEXP_CONTAINS(");
        t.emit(w, subject)?;
        w.push(", '");
        if case_insensitive {
            w.push("(?i)");
        }
        w.push(&escape(pattern));
        w.push("')");
        Ok(())
    }

    fn write_split(
        &self,
        w: &mut SqlWriter,
        t: &mut dyn Emitter,
        subject: &Expr,
        delimiter: &Expr,
    ) -> TranslateResult<()> {
        w.push("SPLIT(");
        t.emit(w, subject)?;
        w.push(", ");
        t.emit(w, delimiter)?;
        w.push(")");
        Ok(())
    }

    fn write_split_with_limit(
        &self,
        w: &mut SqlWriter,
        t: &mut dyn Emitter,
        subject: &Expr,
        delimiter: &Expr,
        limit: i64,
    ) -> TranslateResult<()> {
        w.push("ARRAY(SELECT x FROM UNNEST(SPLIT(");
        t.emit(w, subject)?;
        w.push(", ");
        t.emit(w, delimiter)?;
        w.push(")) AS x WITH OFFSET WHERE OFFSET < ");
        w.push(&limit.to_string());
        w.push(")");
        Ok(())
    }

    fn write_join(
        &self,
        w: &mut SqlWriter,
        t: &mut dyn Emitter,
        array: &Expr,
        delimiter: Option<&Expr>,
    ) -> TranslateResult<()> {
        w.push("ARRAY_TO_STRING(");
        t.emit(w, array)?;
        w.push(", ");
        match delimiter {
            Some(delim) => t.emit(w, delim)?,
            None => w.push("''"),
        }
        w.push(")");
        Ok(())
    }

    fn write_array_literal_open(&self, w: &mut SqlWriter) {
        w.push("[");
    }

    fn write_array_literal_close(&self, w: &mut SqlWriter) {
        w.push("]");
    }

    fn write_array_length(
        &self,
        w: &mut SqlWriter,
        t: &mut dyn Emitter,
        expr: &Expr,
    ) -> TranslateResult<()> {
        w.push("ARRAY_LENGTH(");
        t.emit(w, expr)?;
        w.push(")");
        Ok(())
    }

    fn write_array_membership(
        &self,
        w: &mut SqlWriter,
        t: &mut dyn Emitter,
        elem: &Expr,
        array: &Expr,
    ) -> TranslateResult<()> {
        t.emit(w, elem)?;
        w.push(" IN UNNEST(");
        t.emit(w, array)?;
        w.push(")");
        Ok(())
    }

    fn write_list_index(
        &self,
        w: &mut SqlWriter,
        t: &mut dyn Emitter,
        array: &Expr,
        index: &Expr,
    ) -> TranslateResult<()> {
        t.emit(w, array)?;
        w.push("[OFFSET(");
        t.emit(w, index)?;
        w.push(")]");
        Ok(())
    }

    fn write_list_index_const(
        &self,
        w: &mut SqlWriter,
        t: &mut dyn Emitter,
        array: &Expr,
        index: i64,
    ) -> TranslateResult<()> {
        t.emit(w, array)?;
        w.push("[OFFSET(");
        w.push(&index.to_string());
        w.push(")]");
        Ok(())
    }

    fn write_empty_typed_array(&self, w: &mut SqlWriter, element_type: &str) {
        w.push("ARRAY<");
        w.push(&bq_array_type(element_type));
        w.push(">[]");
    }

    fn write_json_path(
        &self,
        w: &mut SqlWriter,
        t: &mut dyn Emitter,
        root: &Expr,
        column: &str,
        path: &[JsonSeg<'_>],
        as_text: bool,
    ) -> TranslateResult<()> {
        // The outermost function belongs to the last path step.
        for (i, _) in path.iter().enumerate().rev() {
            let last = i + 1 == path.len();
            w.push(if last && as_text {
                "JSON_VALUE("
            } else {
                "JSON_QUERY("
            });
        }
        t.emit(w, root)?;
        w.push(".");
        w.push(column);
        for seg in path {
            w.push(", '");
            w.push(&escape(&dollar_path_segment(seg)));
            w.push("')");
        }
        Ok(())
    }

    fn write_json_key_exists(
        &self,
        w: &mut SqlWriter,
        t: &mut dyn Emitter,
        root: &Expr,
        column: &str,
        key: &str,
        _binary: bool,
    ) -> TranslateResult<()> {
        w.push("JSON_VALUE(");
        t.emit(w, root)?;
        w.push(".");
        w.push(column);
        w.push(", '$.");
        w.push(&escape(key));
        w.push("') IS NOT NULL");
        Ok(())
    }

    fn write_json_array_length(
        &self,
        w: &mut SqlWriter,
        t: &mut dyn Emitter,
        root: &Expr,
        column: &str,
        path: &[JsonSeg<'_>],
    ) -> TranslateResult<()> {
        w.push("ARRAY_LENGTH(JSON_QUERY_ARRAY(");
        self.write_json_path(w, t, root, column, path, false)?;
        w.push("))");
        Ok(())
    }

    fn write_type_name(&self, w: &mut SqlWriter, cel_type: &str) {
        match sql_type(cel_type) {
            Some(name) => w.push(name),
            None => w.push(&cel_type.to_ascii_uppercase()),
        }
    }

    fn write_numeric_coercion(
        &self,
        w: &mut SqlWriter,
        t: &mut dyn Emitter,
        expr: &Expr,
    ) -> TranslateResult<()> {
        w.push("CAST((");
        t.emit(w, expr)?;
        w.push(") AS FLOAT64)");
        Ok(())
    }

    fn write_epoch_extract(
        &self,
        w: &mut SqlWriter,
        t: &mut dyn Emitter,
        expr: &Expr,
    ) -> TranslateResult<()> {
        w.push("UNIX_SECONDS(");
        t.emit(w, expr)?;
        w.push(")");
        Ok(())
    }

    fn write_timestamp_cast(
        &self,
        w: &mut SqlWriter,
        t: &mut dyn Emitter,
        expr: &Expr,
    ) -> TranslateResult<()> {
        w.push("CAST(");
        t.emit(w, expr)?;
        w.push(" AS TIMESTAMP)");
        Ok(())
    }

    fn write_duration(&self, w: &mut SqlWriter, value: i64, unit: DurationUnit) {
        write_interval_literal(w, value, unit);
    }

    fn write_interval(
        &self,
        w: &mut SqlWriter,
        t: &mut dyn Emitter,
        value: &Expr,
        unit: &str,
    ) -> TranslateResult<()> {
        w.push("INTERVAL ");
        t.emit(w, value)?;
        w.push(" ");
        w.push(unit);
        Ok(())
    }

    fn write_extract(
        &self,
        w: &mut SqlWriter,
        t: &mut dyn Emitter,
        part: DatePart,
        expr: &Expr,
        timezone: Option<&Expr>,
    ) -> TranslateResult<()> {
        w.push("EXTRACT(");
        w.push(match part {
            DatePart::DayOfWeek => "DAYOFWEEK",
            DatePart::DayOfYear => "DAYOFYEAR",
            other => other.as_sql(),
        });
        w.push(" FROM ");
        t.emit(w, expr)?;
        if let Some(tz) = timezone {
            w.push(" AT TIME ZONE ");
            t.emit(w, tz)?;
        }
        w.push(")");
        Ok(())
    }

    fn write_timestamp_arithmetic(
        &self,
        w: &mut SqlWriter,
        t: &mut dyn Emitter,
        op: TemporalOp,
        timestamp: &Expr,
        duration: &Expr,
    ) -> TranslateResult<()> {
        w.push(match op {
            TemporalOp::Add => "TIMESTAMP_ADD(",
            TemporalOp::Sub => "TIMESTAMP_SUB(",
        });
        t.emit(w, timestamp)?;
        w.push(", ");
        t.emit(w, duration)?;
        w.push(")");
        Ok(())
    }

    fn write_unnest(
        &self,
        w: &mut SqlWriter,
        t: &mut dyn Emitter,
        source: &Expr,
    ) -> TranslateResult<()> {
        w.push("UNNEST(");
        t.emit(w, source)?;
        w.push(")");
        Ok(())
    }

    fn write_array_subquery_open(&self, w: &mut SqlWriter) {
        w.push("ARRAY(SELECT ");
    }

    fn write_array_subquery_expr_close(&self, _w: &mut SqlWriter) {}

    fn write_struct_open(&self, w: &mut SqlWriter) {
        w.push("STRUCT(");
    }

    fn write_struct_close(&self, w: &mut SqlWriter) {
        w.push(")");
    }

    fn is_reserved(&self, name: &str) -> bool {
        RESERVED.contains(&name)
    }

    fn supports_native_arrays(&self) -> bool {
        true
    }

    fn supports_binary_json(&self) -> bool {
        false
    }
}
