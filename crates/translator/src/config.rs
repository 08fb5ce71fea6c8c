// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Translation configuration: output mode and resource limits

use serde::{Deserialize, Serialize};

/// Maximum AST visit recursion depth (CWE-674 prevention).
pub const DEFAULT_MAX_DEPTH: usize = 100;

/// Maximum generated SQL length in bytes.
pub const DEFAULT_MAX_OUTPUT_LENGTH: usize = 50_000;

/// Maximum nesting depth for comprehension subqueries (CWE-400 prevention).
pub const DEFAULT_MAX_COMPREHENSION_NESTING: usize = 3;

/// Maximum regex pattern length.
pub const DEFAULT_MAX_PATTERN_LENGTH: usize = 500;

/// Maximum identifier length.
pub const DEFAULT_MAX_IDENTIFIER_LENGTH: usize = 63;

/// Maximum bytes literal length in inline mode.
pub const DEFAULT_MAX_BYTES_LITERAL: usize = 10_000;

/// How literal values reach the generated SQL.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BindMode {
    /// Escaped literals written directly into the SQL text.
    #[default]
    Inline,
    /// Ordinal placeholders in the SQL, values collected separately.
    Parameterized,
}

/// Options governing a single translation.
///
/// The defaults match the documented limits; `with_*` methods override
/// individual fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslateOptions {
    pub mode: BindMode,
    pub max_depth: usize,
    pub max_output_length: usize,
    pub max_comprehension_nesting: usize,
    pub max_pattern_length: usize,
    pub max_identifier_length: usize,
    pub max_bytes_literal: usize,
}

impl Default for TranslateOptions {
    fn default() -> Self {
        Self {
            mode: BindMode::Inline,
            max_depth: DEFAULT_MAX_DEPTH,
            max_output_length: DEFAULT_MAX_OUTPUT_LENGTH,
            max_comprehension_nesting: DEFAULT_MAX_COMPREHENSION_NESTING,
            max_pattern_length: DEFAULT_MAX_PATTERN_LENGTH,
            max_identifier_length: DEFAULT_MAX_IDENTIFIER_LENGTH,
            max_bytes_literal: DEFAULT_MAX_BYTES_LITERAL,
        }
    }
}

impl TranslateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience constructor for parameterized output.
    pub fn parameterized() -> Self {
        Self::default().with_mode(BindMode::Parameterized)
    }

    pub fn with_mode(mut self, mode: BindMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_max_output_length(mut self, max_output_length: usize) -> Self {
        self.max_output_length = max_output_length;
        self
    }

    pub fn with_max_comprehension_nesting(mut self, nesting: usize) -> Self {
        self.max_comprehension_nesting = nesting;
        self
    }

    pub fn with_max_pattern_length(mut self, max_pattern_length: usize) -> Self {
        self.max_pattern_length = max_pattern_length;
        self
    }

    pub fn with_max_identifier_length(mut self, max_identifier_length: usize) -> Self {
        self.max_identifier_length = max_identifier_length;
        self
    }

    pub fn with_max_bytes_literal(mut self, max_bytes_literal: usize) -> Self {
        self.max_bytes_literal = max_bytes_literal;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = TranslateOptions::default();
        assert_eq!(opts.mode, BindMode::Inline);
        assert_eq!(opts.max_depth, 100);
        assert_eq!(opts.max_output_length, 50_000);
        assert_eq!(opts.max_comprehension_nesting, 3);
        assert_eq!(opts.max_pattern_length, 500);
        assert_eq!(opts.max_identifier_length, 63);
        assert_eq!(opts.max_bytes_literal, 10_000);
    }

    #[test]
    fn test_builder_overrides() {
        let opts = TranslateOptions::parameterized()
            .with_max_depth(10)
            .with_max_output_length(128);
        assert_eq!(opts.mode, BindMode::Parameterized);
        assert_eq!(opts.max_depth, 10);
        assert_eq!(opts.max_output_length, 128);
    }
}
