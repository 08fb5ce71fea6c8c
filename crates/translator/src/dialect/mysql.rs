// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! MySQL dialect
//!
//! MySQL has no native arrays; array-shaped values live in JSON columns,
//! so array literals become `JSON_ARRAY(...)`, membership becomes
//! `JSON_CONTAINS`, and the unnest primitive is `JSON_TABLE`. The regex
//! engine is ICU (MySQL 8), which accepts the vetted RE2 subset directly.

use crate::dialect::shared::{dollar_path_segment, hex_upper, write_interval_literal, write_quoted};
use crate::dialect::{DatePart, DurationUnit, Emitter, JsonSeg, SqlDialect, TemporalOp};
use crate::error::TranslateResult;
use crate::validate::escape_single_quotes;
use crate::writer::SqlWriter;
use cel2sql_ast::{Dialect, Expr};

const RESERVED: &[&str] = &[
    "accessible", "add", "all", "alter", "analyze", "and", "as", "asc", "asensitive", "before",
    "between", "bigint", "binary", "blob", "both", "by", "call", "cascade", "case", "change",
    "char", "character", "check", "collate", "column", "condition", "constraint", "continue",
    "convert", "create", "cross", "cube", "cume_dist", "current_date", "current_time",
    "current_timestamp", "current_user", "cursor", "database", "databases", "day_hour",
    "day_microsecond", "day_minute", "day_second", "dec", "decimal", "declare", "default",
    "delayed", "delete", "dense_rank", "desc", "describe", "deterministic", "distinct",
    "distinctrow", "div", "double", "drop", "dual", "each", "else", "elseif", "empty",
    "enclosed", "escaped", "except", "exists", "exit", "explain", "false", "fetch", "float",
    "float4", "float8", "for", "force", "foreign", "from", "fulltext", "function", "generated",
    "get", "grant", "group", "grouping", "groups", "having", "high_priority",
    "hour_microsecond", "hour_minute", "hour_second", "if", "ignore", "in", "index", "infile",
    "inner", "inout", "insensitive", "insert", "int", "int1", "int2", "int3", "int4", "int8",
    "integer", "interval", "into", "io_after_gtids", "io_before_gtids", "is", "iterate", "join",
    "json_table", "key", "keys", "kill", "lag", "last_value", "lateral", "lead", "leading",
    "leave", "left", "like", "limit", "linear", "lines", "load", "localtime", "localtimestamp",
    "lock", "long", "longblob", "longtext", "loop", "low_priority", "master_bind",
    "master_ssl_verify_server_cert", "match", "maxvalue", "mediumblob", "mediumint",
    "mediumtext", "member", "merge", "middleint", "minute_microsecond", "minute_second", "mod",
    "modifies", "natural", "not", "no_write_to_binlog", "null", "numeric", "of", "on",
    "optimize", "optimizer_costs", "option", "optionally", "or", "order", "out", "outer",
    "outfile", "over", "partition", "percent_rank", "primary", "procedure", "purge", "range",
    "rank", "read", "reads", "read_write", "real", "recursive", "references", "regexp",
    "release", "rename", "repeat", "replace", "require", "resignal", "restrict", "return",
    "revoke", "right", "rlike", "row", "rows", "row_number", "schema", "schemas",
    "second_microsecond", "select", "sensitive", "separator", "set", "show", "signal",
    "smallint", "spatial", "specific", "sql", "sqlexception", "sqlstate", "sqlwarning",
    "sql_big_result", "sql_calc_found_rows", "sql_small_result", "ssl", "starting", "stored",
    "straight_join", "system", "table", "terminated", "then", "tinyblob", "tinyint", "tinytext",
    "to", "trailing", "trigger", "true", "undo", "union", "unique", "unlock", "unsigned",
    "update", "usage", "use", "using", "utc_date", "utc_time", "utc_timestamp", "values",
    "varbinary", "varchar", "varcharacter", "varying", "virtual", "when", "where", "while",
    "window", "with", "write", "xor", "year_month", "zerofill",
];

fn sql_type(cel_type: &str) -> Option<&'static str> {
    Some(match cel_type {
        "bool" => "UNSIGNED",
        "bytes" => "BINARY",
        "double" => "DECIMAL",
        "int" => "SIGNED",
        "uint" => "UNSIGNED",
        "string" => "CHAR",
        "timestamp" => "DATETIME",
        _ => return None,
    })
}

/// MySQL dialect for CEL-to-SQL translation.
pub struct MySQLDialect;

impl SqlDialect for MySQLDialect {
    fn name(&self) -> Dialect {
        Dialect::MySQL
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
        w.push("CONCAT(");
        t.emit(w, lhs)?;
        w.push(", ");
        t.emit(w, rhs)?;
        w.push(")");
        Ok(())
    }

    fn write_contains(
        &self,
        w: &mut SqlWriter,
        t: &mut dyn Emitter,
        haystack: &Expr,
        needle: &Expr,
    ) -> TranslateResult<()> {
        w.push("LOCATE(");
        t.emit(w, needle)?;
        w.push(", ");
        t.emit(w, haystack)?;
        w.push(") > 0");
        Ok(())
    }

    fn write_like_escape(&self, w: &mut SqlWriter) {
        w.push(" ESCAPE '\\\\'");
    }

    fn convert_regex(&self, pattern: &str) -> TranslateResult<String> {
        // The ICU engine shares the vetted RE2 subset.
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
        t.emit(w, subject)?;
        w.push(" REGEXP '");
        if case_insensitive {
            w.push("(?i)");
        }
        w.push(&escape_single_quotes(pattern));
        w.push("'");
        Ok(())
    }

    fn write_split(
        &self,
        w: &mut SqlWriter,
        t: &mut dyn Emitter,
        subject: &Expr,
        _delimiter: &Expr,
    ) -> TranslateResult<()> {
        // MySQL has no native split; degrade to a singleton JSON array.
        w.push("JSON_ARRAY(");
        t.emit(w, subject)?;
        w.push(")");
        Ok(())
    }

    fn write_split_with_limit(
        &self,
        w: &mut SqlWriter,
        t: &mut dyn Emitter,
        subject: &Expr,
        delimiter: &Expr,
        _limit: i64,
    ) -> TranslateResult<()> {
        self.write_split(w, t, subject, delimiter)
    }

    fn write_join(
        &self,
        w: &mut SqlWriter,
        t: &mut dyn Emitter,
        array: &Expr,
        _delimiter: Option<&Expr>,
    ) -> TranslateResult<()> {
        w.push("JSON_UNQUOTE(");
        t.emit(w, array)?;
        w.push(")");
        Ok(())
    }

    fn write_array_literal_open(&self, w: &mut SqlWriter) {
        w.push("JSON_ARRAY(");
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
        w.push("COALESCE(JSON_LENGTH(");
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
        w.push("JSON_CONTAINS(");
        t.emit(w, array)?;
        w.push(", JSON_EXTRACT(JSON_ARRAY(");
        t.emit(w, elem)?;
        w.push("), '$[0]'))");
        Ok(())
    }

    fn write_list_index(
        &self,
        w: &mut SqlWriter,
        t: &mut dyn Emitter,
        array: &Expr,
        index: &Expr,
    ) -> TranslateResult<()> {
        w.push("JSON_EXTRACT(");
        t.emit(w, array)?;
        w.push(", CONCAT('$[', ");
        t.emit(w, index)?;
        w.push(", ']'))");
        Ok(())
    }

    fn write_list_index_const(
        &self,
        w: &mut SqlWriter,
        t: &mut dyn Emitter,
        array: &Expr,
        index: i64,
    ) -> TranslateResult<()> {
        w.push("JSON_EXTRACT(");
        t.emit(w, array)?;
        w.push(", '$[");
        w.push(&index.to_string());
        w.push("]')");
        Ok(())
    }

    fn write_empty_typed_array(&self, w: &mut SqlWriter, _element_type: &str) {
        w.push("JSON_ARRAY()");
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
        t.emit(w, root)?;
        w.push(".");
        w.push(column);
        for (i, seg) in path.iter().enumerate() {
            let last = i + 1 == path.len();
            w.push(if last && as_text { "->>" } else { "->" });
            w.push("'");
            w.push(&escape_single_quotes(&dollar_path_segment(seg)));
            w.push("'");
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
        w.push("JSON_CONTAINS_PATH(");
        t.emit(w, root)?;
        w.push(".");
        w.push(column);
        w.push(", 'one', '$.");
        w.push(&escape_single_quotes(key));
        w.push("')");
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
        w.push("COALESCE(JSON_LENGTH(");
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
        w.push("UNIX_TIMESTAMP(");
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
        w.push(" AS DATETIME)");
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
        _timezone: Option<&Expr>,
    ) -> TranslateResult<()> {
        if part == DatePart::DayOfWeek {
            // DAYOFWEEK is 1=Sunday; remap to 0=Monday.
            w.push("(DAYOFWEEK(");
            t.emit(w, expr)?;
            w.push(") + 5) % 7");
            return Ok(());
        }
        w.push("EXTRACT(");
        w.push(part.as_sql());
        w.push(" FROM ");
        t.emit(w, expr)?;
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

    fn write_unnest(
        &self,
        w: &mut SqlWriter,
        t: &mut dyn Emitter,
        source: &Expr,
    ) -> TranslateResult<()> {
        w.push("JSON_TABLE(");
        t.emit(w, source)?;
        w.push(", '$[*]' COLUMNS(value TEXT PATH '$'))");
        Ok(())
    }

    fn write_array_subquery_open(&self, w: &mut SqlWriter) {
        w.push("(SELECT JSON_ARRAYAGG(");
    }

    fn write_array_subquery_expr_close(&self, w: &mut SqlWriter) {
        w.push(")");
    }

    fn write_struct_open(&self, w: &mut SqlWriter) {
        w.push("ROW(");
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
