// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Helpers shared across dialect implementations

use crate::dialect::{DurationUnit, Emitter, JsonSeg};
use crate::error::TranslateResult;
use crate::validate::escape_single_quotes;
use crate::writer::SqlWriter;
use cel2sql_ast::Expr;

/// Single-quoted string literal with `'` doubled (every dialect except
/// BigQuery).
pub fn write_quoted(w: &mut SqlWriter, value: &str) {
    w.push("'");
    w.push(&escape_single_quotes(value));
    w.push("'");
}

/// Uppercase hex rendering of a bytes value.
pub fn hex_upper(value: &[u8]) -> String {
    let mut out = String::with_capacity(value.len() * 2);
    for byte in value {
        out.push_str(&format!("{byte:02X}"));
    }
    out
}

/// Standard `INTERVAL <n> <UNIT>` rendering.
pub fn write_interval_literal(w: &mut SqlWriter, value: i64, unit: DurationUnit) {
    w.push("INTERVAL ");
    w.push(&value.to_string());
    w.push(" ");
    w.push(unit.as_sql());
}

/// Infix `base.column -> 'k' ->> 'last'` JSON path (PostgreSQL, DuckDB).
pub fn write_arrow_json_path(
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
        match seg {
            JsonSeg::Key(key) => {
                w.push("'");
                w.push(&escape_single_quotes(key));
                w.push("'");
            }
            JsonSeg::Index(idx) => w.push(&idx.to_string()),
        }
    }
    Ok(())
}

/// `$.key` / `$[0]`-style path text for function-based JSON access, one
/// segment at a time. Callers apply their own string-literal escaping.
pub fn dollar_path_segment(seg: &JsonSeg<'_>) -> String {
    match seg {
        JsonSeg::Key(key) => format!("$.{key}"),
        JsonSeg::Index(idx) => format!("$[{idx}]"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_upper() {
        assert_eq!(hex_upper(&[0xde, 0xad, 0xbe, 0xef]), "DEADBEEF");
        assert_eq!(hex_upper(&[0x00, 0x0f]), "000F");
    }

    #[test]
    fn test_write_quoted_doubles_quotes() {
        let mut w = SqlWriter::new();
        write_quoted(&mut w, "O'Brien");
        assert_eq!(w.as_str(), "'O''Brien'");
    }

    #[test]
    fn test_dollar_path_segment() {
        assert_eq!(dollar_path_segment(&JsonSeg::Key("role")), "$.role");
        assert_eq!(dollar_path_segment(&JsonSeg::Index(3)), "$[3]");
    }
}
