// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! PostgreSQL dialect

use crate::dialect::shared::{hex_upper, write_arrow_json_path, write_interval_literal, write_quoted};
use crate::dialect::{DatePart, DurationUnit, Emitter, JsonSeg, SqlDialect, TemporalOp};
use crate::error::TranslateResult;
use crate::pattern::to_posix;
use crate::validate::escape_single_quotes;
use crate::writer::SqlWriter;
use cel2sql_ast::{Dialect, Expr};

const RESERVED: &[&str] = &[
    "all", "alter", "and", "any", "array", "as", "asc", "between", "by", "case", "cast", "check",
    "column", "constraint", "create", "cross", "current", "current_date", "current_time",
    "current_timestamp", "current_user", "default", "delete", "desc", "distinct", "drop", "else",
    "end", "except", "exists", "false", "for", "foreign", "from", "full", "grant", "group",
    "having", "in", "index", "inner", "insert", "intersect", "into", "is", "join", "left", "like",
    "limit", "not", "null", "offset", "on", "or", "order", "outer", "primary", "references",
    "right", "select", "session_user", "set", "some", "table", "then", "to", "true", "union",
    "unique", "update", "user", "using", "values", "when", "where", "with",
];

fn sql_type(cel_type: &str) -> Option<&'static str> {
    Some(match cel_type {
        "bool" => "BOOLEAN",
        "bytes" => "BYTEA",
        "double" => "DOUBLE PRECISION",
        "int" | "uint" => "BIGINT",
        "string" => "TEXT",
        "timestamp" => "TIMESTAMP WITH TIME ZONE",
        _ => return None,
    })
}

/// PostgreSQL dialect for CEL-to-SQL translation.
pub struct PostgresDialect;

impl SqlDialect for PostgresDialect {
    fn name(&self) -> Dialect {
        Dialect::PostgreSQL
    }

    // --- Literals & placeholders ---

    fn write_string_literal(&self, w: &mut SqlWriter, value: &str) {
        write_quoted(w, value);
    }

    fn write_bytes_literal(&self, w: &mut SqlWriter, value: &[u8]) {
        w.push("'\\x");
        w.push(&hex_upper(value));
        w.push("'");
    }

    fn write_param_placeholder(&self, w: &mut SqlWriter, index: usize) {
        w.push("$");
        w.push(&index.to_string());
    }

    // --- Strings ---

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
        w.push("POSITION(");
        t.emit(w, needle)?;
        w.push(" IN ");
        t.emit(w, haystack)?;
        w.push(") > 0");
        Ok(())
    }

    fn write_like_escape(&self, w: &mut SqlWriter) {
        w.push(" ESCAPE E'\\\\'");
    }

    fn convert_regex(&self, pattern: &str) -> TranslateResult<String> {
        Ok(to_posix(pattern))
    }

    fn write_regex_match(
        &self,
        w: &mut SqlWriter,
        t: &mut dyn Emitter,
        subject: &Expr,
        pattern: &str,
        case_insensitive: bool,
    ) -> TranslateResult<()> {
        t.emit(w, subject)?;
        w.push(if case_insensitive { " ~* " } else { " ~ " });
        write_quoted(w, pattern);
        Ok(())
    }

    fn write_split(
        &self,
        w: &mut SqlWriter,
        t: &mut dyn Emitter,
        subject: &Expr,
        delimiter: &Expr,
    ) -> TranslateResult<()> {
        w.push("STRING_TO_ARRAY(");
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
        w.push("(STRING_TO_ARRAY(");
        t.emit(w, subject)?;
        w.push(", ");
        t.emit(w, delimiter)?;
        w.push("))[1:");
        w.push(&limit.to_string());
        w.push("]");
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
        w.push(", '')");
        Ok(())
    }

    // --- Arrays ---

    fn write_array_literal_open(&self, w: &mut SqlWriter) {
        w.push("ARRAY[");
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
        w.push(", 1)");
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
        w.push(" = ANY(");
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
        w.push("[");
        t.emit(w, index)?;
        w.push(" + 1]");
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
        // 0-based CEL index to 1-based array subscript
        w.push("[");
        w.push(&(index + 1).to_string());
        w.push("]");
        Ok(())
    }

    fn write_empty_typed_array(&self, w: &mut SqlWriter, element_type: &str) {
        w.push("ARRAY[]::");
        w.push(element_type);
        w.push("[]");
    }

    // --- JSON ---

    fn write_json_path(
        &self,
        w: &mut SqlWriter,
        t: &mut dyn Emitter,
        root: &Expr,
        column: &str,
        path: &[JsonSeg<'_>],
        as_text: bool,
    ) -> TranslateResult<()> {
        write_arrow_json_path(w, t, root, column, path, as_text)
    }

    fn write_json_key_exists(
        &self,
        w: &mut SqlWriter,
        t: &mut dyn Emitter,
        root: &Expr,
        column: &str,
        key: &str,
        binary: bool,
    ) -> TranslateResult<()> {
        t.emit(w, root)?;
        w.push(".");
        w.push(column);
        if binary {
            w.push(" ? '");
            w.push(&escape_single_quotes(key));
            w.push("'");
        } else {
            w.push("->'");
            w.push(&escape_single_quotes(key));
            w.push("' IS NOT NULL");
        }
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
        w.push("COALESCE(jsonb_array_length(");
        write_arrow_json_path(w, t, root, column, path, false)?;
        w.push("), 0)");
        Ok(())
    }

    // --- Casts ---

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
        w.push("(");
        t.emit(w, expr)?;
        w.push(")::numeric");
        Ok(())
    }

    fn write_epoch_extract(
        &self,
        w: &mut SqlWriter,
        t: &mut dyn Emitter,
        expr: &Expr,
    ) -> TranslateResult<()> {
        w.push("EXTRACT(EPOCH FROM ");
        t.emit(w, expr)?;
        w.push(")::bigint");
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
        w.push(" AS TIMESTAMP WITH TIME ZONE)");
        Ok(())
    }

    // --- Temporal ---

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
        w.push(part.as_sql());
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
        t.emit(w, timestamp)?;
        w.push(" ");
        w.push(op.as_sql());
        w.push(" ");
        t.emit(w, duration)
    }

    // --- Comprehensions ---

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

    // --- Struct / map literals ---

    fn write_struct_open(&self, w: &mut SqlWriter) {
        w.push("ROW(");
    }

    fn write_struct_close(&self, w: &mut SqlWriter) {
        w.push(")");
    }

    // --- Identifier policy & capabilities ---

    fn is_reserved(&self, name: &str) -> bool {
        RESERVED.contains(&name)
    }

    fn supports_native_arrays(&self) -> bool {
        true
    }

    fn supports_binary_json(&self) -> bool {
        true
    }
}
