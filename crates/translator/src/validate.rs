// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Identifier and literal safety checks
//!
//! Identifiers are never quoted into the output; they are validated
//! against a strict character policy, the configured length cap and the
//! dialect's reserved words, and rejected with `InvalidIdentifier` when
//! they fail. A rejected identifier is never written, so no unescaped
//! occurrence can reach the SQL text.

use crate::dialect::SqlDialect;
use crate::error::{TranslateError, TranslateResult};
use regex::Regex;
use std::sync::LazyLock;

static IDENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]*$").expect("static pattern"));

/// Validate a SQL identifier (column, field, or iteration variable name).
pub fn validate_identifier(
    name: &str,
    max_length: usize,
    dialect: &dyn SqlDialect,
) -> TranslateResult<()> {
    if name.is_empty() {
        return Err(TranslateError::InvalidIdentifier {
            detail: "empty identifier".to_string(),
        });
    }
    if max_length > 0 && name.len() > max_length {
        return Err(TranslateError::InvalidIdentifier {
            detail: format!("identifier '{name}' exceeds {max_length} characters"),
        });
    }
    if !IDENT_RE.is_match(name) {
        return Err(TranslateError::InvalidIdentifier {
            detail: format!("identifier '{name}' contains invalid characters"),
        });
    }
    if dialect.is_reserved(&name.to_ascii_lowercase()) {
        return Err(TranslateError::InvalidIdentifier {
            detail: format!(
                "identifier '{name}' is a reserved {} keyword",
                dialect.name()
            ),
        });
    }
    Ok(())
}

/// Reject strings containing null bytes before they reach any literal or
/// pattern position.
pub fn ensure_no_null_bytes(value: &str, context: &str) -> TranslateResult<()> {
    if value.contains('\0') {
        return Err(TranslateError::ParseRejected {
            detail: format!("null byte in {context}"),
        });
    }
    Ok(())
}

/// Escape LIKE metacharacters (`%`, `_`, `\`) and single quotes so a
/// literal prefix or suffix can be embedded in a LIKE pattern.
pub fn escape_like_pattern(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    for c in pattern.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '%' => out.push_str("\\%"),
            '_' => out.push_str("\\_"),
            '\'' => out.push_str("''"),
            other => out.push(other),
        }
    }
    out
}

/// Double single quotes for embedding in a quoted SQL string.
pub fn escape_single_quotes(value: &str) -> String {
    value.replace('\'', "''")
}
