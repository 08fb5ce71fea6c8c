// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! SQLite dialect
//!
//! SQLite has neither native arrays nor a bundled regex engine. Arrays
//! live in JSON text (`json_array`, `json_each`), timestamps are ISO-8601
//! text driven through `datetime()` and `strftime()`, and durations are
//! datetime modifier strings (`'+90 minutes'`). `matches()`, `split()`
//! and `join()` have no expressible translation and fail.

use crate::dialect::shared::{dollar_path_segment, hex_upper, write_quoted};
use crate::dialect::{DatePart, DurationUnit, Emitter, JsonSeg, SqlDialect, TemporalOp};
use crate::error::{TranslateError, TranslateResult};
use crate::validate::escape_single_quotes;
use crate::writer::SqlWriter;
use cel2sql_ast::{Dialect, Expr};

const RESERVED: &[&str] = &[
    "abort", "action", "add", "after", "all", "alter", "always", "analyze", "and", "as", "asc",
    "attach", "autoincrement", "before", "begin", "between", "by", "cascade", "case", "cast",
    "check", "collate", "column", "commit", "conflict", "constraint", "create", "cross",
    "current", "current_date", "current_time", "current_timestamp", "database", "default",
    "deferrable", "deferred", "delete", "desc", "detach", "distinct", "do", "drop", "each",
    "else", "end", "escape", "except", "exclude", "exclusive", "exists", "explain", "fail",
    "filter", "first", "following", "for", "foreign", "from", "full", "generated", "glob",
    "group", "groups", "having", "if", "ignore", "immediate", "in", "index", "indexed",
    "initially", "inner", "insert", "instead", "intersect", "into", "is", "isnull", "join",
    "key", "last", "left", "like", "limit", "match", "materialized", "natural", "no", "not",
    "nothing", "notnull", "null", "nulls", "of", "offset", "on", "or", "order", "others",
    "outer", "over", "partition", "plan", "pragma", "preceding", "primary", "query", "raise",
    "range", "recursive", "references", "regexp", "reindex", "release", "rename", "replace",
    "restrict", "returning", "right", "rollback", "row", "rows", "savepoint", "select", "set",
    "table", "temp", "temporary", "then", "ties", "to", "transaction", "trigger", "true",
    "unbounded", "union", "unique", "update", "using", "vacuum", "values", "view", "virtual",
    "when", "where", "window", "with", "without",
];

fn sql_type(cel_type: &str) -> Option<&'static str> {
    Some(match cel_type {
        "bool" | "int" | "uint" => "INTEGER",
        "bytes" => "BLOB",
        "double" => "REAL",
        "string" | "timestamp" => "TEXT",
        _ => return None,
    })
}

fn strftime_format(part: DatePart) -> &'static str {
    match part {
        DatePart::Year => "%Y",
        DatePart::Month => "%m",
        DatePart::Day => "%d",
        DatePart::Hour => "%H",
        DatePart::Minute => "%M",
        DatePart::Second => "%S",
        DatePart::Milliseconds => "%f",
        DatePart::DayOfYear => "%j",
        DatePart::DayOfWeek => "%w",
    }
}

/// Datetime modifier string for a duration, e.g. `'+90 minutes'`.
/// Sub-second units collapse into fractional seconds.
fn modifier_string(value: i64, unit: DurationUnit) -> String {
    match unit {
        DurationUnit::Hour => format!("'+{value} hours'"),
        DurationUnit::Minute => format!("'+{value} minutes'"),
        DurationUnit::Second => format!("'+{value} seconds'"),
        DurationUnit::Millisecond => format!("'+{} seconds'", value as f64 / 1_000.0),
        DurationUnit::Microsecond => format!("'+{} seconds'", value as f64 / 1_000_000.0),
        DurationUnit::Nanosecond => format!("'+{} seconds'", value as f64 / 1_000_000_000.0),
    }
}

/// SQLite dialect for CEL-to-SQL translation.
pub struct SQLiteDialect;

impl SqlDialect for SQLiteDialect {
    fn name(&self) -> Dialect {
        Dialect::SQLite
    }

    fn write_string_literal(&self, w: &mut SqlWriter, value: &str) {
        write_quoted(w, value);
    }

    fn write_bytes_literal(&self, w: &mut SqlWriter, value: &[u8]) {
        w.push("X'");
        w.push(&hex_upper(value));
        w.push("'");
    }

    fn write_param_placeholder(&self, w: &mut SqlWriter, _index: usize) {
        w.push("?");
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
        w.push("INSTR(");
        t.emit(w, haystack)?;
        w.push(", ");
        t.emit(w, needle)?;
        w.push(") > 0");
        Ok(())
    }

    fn write_like_escape(&self, w: &mut SqlWriter) {
        w.push(" ESCAPE '\\'");
    }

    fn convert_regex(&self, _pattern: &str) -> TranslateResult<String> {
        Err(TranslateError::RegexUnsupported {
            detail: "SQLite has no built-in regex support".to_string(),
        })
    }

    fn write_regex_match(
        &self,
        _w: &mut SqlWriter,
        _t: &mut dyn Emitter,
        _subject: &Expr,
        _pattern: &str,
        _case_insensitive: bool,
    ) -> TranslateResult<()> {
        Err(TranslateError::RegexUnsupported {
            detail: "SQLite has no built-in regex support".to_string(),
        })
    }

    fn write_split(
        &self,
        _w: &mut SqlWriter,
        _t: &mut dyn Emitter,
        _subject: &Expr,
        _delimiter: &Expr,
    ) -> TranslateResult<()> {
        Err(TranslateError::UnsupportedFeature {
            feature: "split() on the SQLite dialect".to_string(),
        })
    }

    fn write_split_with_limit(
        &self,
        _w: &mut SqlWriter,
        _t: &mut dyn Emitter,
        _subject: &Expr,
        _delimiter: &Expr,
        _limit: i64,
    ) -> TranslateResult<()> {
        Err(TranslateError::UnsupportedFeature {
            feature: "split() on the SQLite dialect".to_string(),
        })
    }

    fn write_join(
        &self,
        _w: &mut SqlWriter,
        _t: &mut dyn Emitter,
        _array: &Expr,
        _delimiter: Option<&Expr>,
    ) -> TranslateResult<()> {
        Err(TranslateError::UnsupportedFeature {
            feature: "join() on the SQLite dialect".to_string(),
        })
    }

    fn write_array_literal_open(&self, w: &mut SqlWriter) {
        w.push("json_array(");
    }

    fn write_array_literal_close(&self, w: &mut SqlWriter) {
        w.push(")");
    }

    fn write_array_length(
        &self,
        w: &mut SqlWriter,
        t: &mut dyn Emitter,
        expr: &Expr,
    ) -> TranslateResult<()> {
        w.push("COALESCE(json_array_length(");
        t.emit(w, expr)?;
        w.push("), 0)");
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
        w.push(" IN (SELECT value FROM json_each(");
        t.emit(w, array)?;
        w.push("))");
        Ok(())
    }

    fn write_list_index(
        &self,
        w: &mut SqlWriter,
        t: &mut dyn Emitter,
        array: &Expr,
        index: &Expr,
    ) -> TranslateResult<()> {
        w.push("json_extract(");
        t.emit(w, array)?;
        w.push(", '$[' || ");
        t.emit(w, index)?;
        w.push(" || ']')");
        Ok(())
    }

    fn write_list_index_const(
        &self,
        w: &mut SqlWriter,
        t: &mut dyn Emitter,
        array: &Expr,
        index: i64,
    ) -> TranslateResult<()> {
        w.push("json_extract(");
        t.emit(w, array)?;
        w.push(", '$[");
        w.push(&index.to_string());
        w.push("]')");
        Ok(())
    }

    fn write_empty_typed_array(&self, w: &mut SqlWriter, _element_type: &str) {
        w.push("json_array()");
    }

    fn write_json_path(
        &self,
        w: &mut SqlWriter,
        t: &mut dyn Emitter,
        root: &Expr,
        column: &str,
        path: &[JsonSeg<'_>],
        _as_text: bool,
    ) -> TranslateResult<()> {
        // json_extract already unquotes scalar results.
        for _ in path {
            w.push("json_extract(");
        }
        t.emit(w, root)?;
        w.push(".");
        w.push(column);
        for seg in path {
            w.push(", '");
            w.push(&escape_single_quotes(&dollar_path_segment(seg)));
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
        w.push("json_type(");
        t.emit(w, root)?;
        w.push(".");
        w.push(column);
        w.push(", '$.");
        w.push(&escape_single_quotes(key));
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
        w.push("COALESCE(json_array_length(");
        self.write_json_path(w, t, root, column, path, false)?;
        w.push("), 0)");
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
        w.push("(");
        t.emit(w, expr)?;
        w.push(") + 0");
        Ok(())
    }

    fn write_epoch_extract(
        &self,
        w: &mut SqlWriter,
        t: &mut dyn Emitter,
        expr: &Expr,
    ) -> TranslateResult<()> {
        w.push("CAST(strftime('%s', ");
        t.emit(w, expr)?;
        w.push(") AS INTEGER)");
        Ok(())
    }

    fn write_timestamp_cast(
        &self,
        w: &mut SqlWriter,
        t: &mut dyn Emitter,
        expr: &Expr,
    ) -> TranslateResult<()> {
        w.push("datetime(");
        t.emit(w, expr)?;
        w.push(")");
        Ok(())
    }

    fn write_duration(&self, w: &mut SqlWriter, value: i64, unit: DurationUnit) {
        w.push(&modifier_string(value, unit));
    }

    fn write_interval(
        &self,
        w: &mut SqlWriter,
        t: &mut dyn Emitter,
        value: &Expr,
        unit: &str,
    ) -> TranslateResult<()> {
        let mut unit_lower = unit.to_ascii_lowercase();
        if unit_lower.ends_with('s') {
            unit_lower.pop();
        }
        w.push("'+' || ");
        t.emit(w, value)?;
        w.push(" || ' ");
        w.push(&unit_lower);
        w.push("s'");
        Ok(())
    }

    fn write_extract(
        &self,
        w: &mut SqlWriter,
        t: &mut dyn Emitter,
        part: DatePart,
        expr: &Expr,
        _timezone: Option<&Expr>,
    ) -> TranslateResult<()> {
        w.push("CAST(strftime('");
        w.push(strftime_format(part));
        w.push("', ");
        t.emit(w, expr)?;
        w.push(") AS INTEGER)");
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
        w.push("datetime(");
        t.emit(w, timestamp)?;
        w.push(", ");
        if op == TemporalOp::Sub {
            // Negate the modifier string by flipping its sign prefix.
            w.push("REPLACE(");
            t.emit(w, duration)?;
            w.push(", '+', '-')");
        } else {
            t.emit(w, duration)?;
        }
        w.push(")");
        Ok(())
    }

    fn write_unnest(
        &self,
        w: &mut SqlWriter,
        t: &mut dyn Emitter,
        source: &Expr,
    ) -> TranslateResult<()> {
        w.push("json_each(");
        t.emit(w, source)?;
        w.push(")");
        Ok(())
    }

    fn write_array_subquery_open(&self, w: &mut SqlWriter) {
        w.push("(SELECT json_group_array(");
    }

    fn write_array_subquery_expr_close(&self, w: &mut SqlWriter) {
        w.push(")");
    }

    fn write_struct_open(&self, w: &mut SqlWriter) {
        w.push("json_object(");
    }

    fn write_struct_close(&self, w: &mut SqlWriter) {
        w.push(")");
    }

    fn is_reserved(&self, name: &str) -> bool {
        RESERVED.contains(&name)
    }

    fn supports_native_arrays(&self) -> bool {
        false
    }

    fn supports_binary_json(&self) -> bool {
        false
    }
}
