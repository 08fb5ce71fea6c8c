// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! RE2 pattern vetting and flavor translation
//!
//! `matches()` patterns are CEL/RE2. Before a dialect sees one it is
//! vetted here: length and null-byte checks, rejection of features no
//! target engine shares (look-around, named captures, inline flags other
//! than a leading `(?i)`), and rejection of nested-quantifier shapes that
//! invite catastrophic backtracking in backtracking engines. Dialects then
//! apply their flavor translation: PostgreSQL rewrites shorthand classes
//! to POSIX bracket expressions, the RE2-native engines (DuckDB, BigQuery)
//! and MySQL's ICU engine take the vetted pattern as-is.

use crate::error::{TranslateError, TranslateResult};
use crate::validate::ensure_no_null_bytes;
use regex::Regex;
use std::sync::LazyLock;

/// Maximum number of capture groups in a pattern.
pub const MAX_REGEX_GROUPS: usize = 20;

/// Maximum group nesting depth in a pattern.
pub const MAX_REGEX_NESTING: usize = 10;

static LOOKAROUND_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(\?[!=<]").expect("static pattern"));
static NAMED_GROUP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(\?P<").expect("static pattern"));
static INLINE_FLAGS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(\?[imsx]").expect("static pattern"));
static NESTED_QUANTIFIER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\([^)]*[+*?]\)[+*?]").expect("static pattern"));

/// Vet a raw RE2 pattern. Returns the pattern with any leading `(?i)`
/// stripped, plus the case-insensitivity flag it carried.
pub fn vet_pattern(raw: &str, max_length: usize) -> TranslateResult<(String, bool)> {
    if raw.len() > max_length {
        return Err(TranslateError::PatternTooLong {
            length: raw.len(),
            limit: max_length,
        });
    }
    ensure_no_null_bytes(raw, "regex patterns")?;

    let (pattern, case_insensitive) = match raw.strip_prefix("(?i)") {
        Some(rest) => (rest, true),
        None => (raw, false),
    };

    if LOOKAROUND_RE.is_match(pattern) {
        return Err(TranslateError::RegexUnsupported {
            detail: "pattern contains lookahead/lookbehind".to_string(),
        });
    }
    if NAMED_GROUP_RE.is_match(pattern) {
        return Err(TranslateError::RegexUnsupported {
            detail: "pattern contains named captures".to_string(),
        });
    }
    if INLINE_FLAGS_RE.is_match(pattern) {
        return Err(TranslateError::RegexUnsupported {
            detail: "pattern contains inline flags".to_string(),
        });
    }
    if NESTED_QUANTIFIER_RE.is_match(pattern) {
        return Err(TranslateError::RegexUnsupported {
            detail: "pattern has nested quantifiers".to_string(),
        });
    }

    let mut depth = 0usize;
    let mut max_depth = 0usize;
    for c in pattern.chars() {
        match c {
            '(' => {
                depth += 1;
                max_depth = max_depth.max(depth);
            }
            ')' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    if max_depth > MAX_REGEX_NESTING {
        return Err(TranslateError::RegexUnsupported {
            detail: format!("group nesting depth {max_depth} exceeds {MAX_REGEX_NESTING}"),
        });
    }

    let groups = pattern.matches('(').count() - pattern.matches("(?:").count();
    if groups > MAX_REGEX_GROUPS {
        return Err(TranslateError::RegexUnsupported {
            detail: format!("pattern has {groups} groups, limit is {MAX_REGEX_GROUPS}"),
        });
    }

    Ok((pattern.to_string(), case_insensitive))
}

/// Rewrite RE2 shorthand classes to POSIX bracket expressions
/// (PostgreSQL's regex engine).
pub fn to_posix(pattern: &str) -> String {
    pattern
        .replace("\\d", "[[:digit:]]")
        .replace("\\D", "[^[:digit:]]")
        .replace("\\w", "[[:alnum:]_]")
        .replace("\\W", "[^[:alnum:]_]")
        .replace("\\s", "[[:space:]]")
        .replace("\\S", "[^[:space:]]")
        .replace("\\b", "\\y")
        .replace("\\B", "\\Y")
        .replace("(?:", "(")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_pattern_passes() {
        let (p, ci) = vet_pattern("^.+@.+$", 500).unwrap();
        assert_eq!(p, "^.+@.+$");
        assert!(!ci);
    }

    #[test]
    fn test_leading_case_flag_extracted() {
        let (p, ci) = vet_pattern("(?i)admin", 500).unwrap();
        assert_eq!(p, "admin");
        assert!(ci);
    }

    #[test]
    fn test_too_long() {
        let raw = "a".repeat(501);
        let err = vet_pattern(&raw, 500).unwrap_err();
        assert!(matches!(err, TranslateError::PatternTooLong { limit: 500, .. }));
    }

    #[test]
    fn test_lookaround_rejected() {
        assert!(vet_pattern("(?=abc)", 500).is_err());
        assert!(vet_pattern("(?!abc)", 500).is_err());
        assert!(vet_pattern("(?<abc)", 500).is_err());
    }

    #[test]
    fn test_named_captures_rejected() {
        assert!(vet_pattern("(?P<name>a+)", 500).is_err());
    }

    #[test]
    fn test_inline_flags_rejected() {
        assert!(vet_pattern("a(?i)b", 500).is_err());
        assert!(vet_pattern("(?m)^x", 500).is_err());
    }

    #[test]
    fn test_nested_quantifier_rejected() {
        let err = vet_pattern("(a+)+", 500).unwrap_err();
        assert!(matches!(err, TranslateError::RegexUnsupported { .. }));
        assert!(vet_pattern("(a*)*", 500).is_err());
    }

    #[test]
    fn test_posix_rewrites() {
        assert_eq!(to_posix(r"\d+"), "[[:digit:]]+");
        assert_eq!(to_posix(r"\w\s"), "[[:alnum:]_][[:space:]]");
        assert_eq!(to_posix(r"\bword\b"), r"\yword\y");
        assert_eq!(to_posix("(?:ab)c"), "(ab)c");
    }
}
