// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Error types and the dual-channel messaging strategy
//!
//! Every error carries two messages. `Display` renders the *public*
//! message: fixed wording with no fragments of user input, safe to show to
//! end users. [`TranslateError::diagnostic`] renders the *internal*
//! message with positions, names and limits, intended for operator logs.
//! Keeping user-controlled text out of the public channel mitigates
//! information disclosure (CWE-209).
//!
//! The translator surfaces the first error and aborts; partial SQL is
//! discarded and resource-limit errors are never retried.

use serde::Serialize;

/// Result type alias for translation operations.
pub type TranslateResult<T> = Result<T, TranslateError>;

/// Errors produced during CEL → SQL translation.
///
/// Fields holding user-supplied text are excluded from serialization so
/// that a serialized error only ever exposes the public channel.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Serialize)]
pub enum TranslateError {
    /// The AST is not well-formed (bad arity, malformed node shape).
    #[error("expression structure is not well-formed")]
    ParseRejected {
        #[serde(skip_serializing)]
        detail: String,
    },

    /// A CEL construct outside the supported surface.
    #[error("unsupported expression feature")]
    UnsupportedFeature {
        #[serde(skip_serializing)]
        feature: String,
    },

    /// An identifier that resolves to nothing usable.
    #[error("unresolved identifier")]
    UnresolvedIdentifier {
        #[serde(skip_serializing)]
        name: String,
    },

    /// An operator or receiver rejected the inferred operand type.
    #[error("operand type mismatch")]
    TypeMismatch {
        #[serde(skip_serializing)]
        detail: String,
    },

    /// `size()` applied to a receiver whose type cannot be inferred.
    #[error("cannot determine the receiver type of size()")]
    AmbiguousSize {
        #[serde(skip_serializing)]
        detail: String,
    },

    /// Field selection continued past a scalar column.
    #[error("field access on a non-JSON column")]
    NonJsonPath {
        #[serde(skip_serializing)]
        detail: String,
    },

    /// The dialect cannot express the regex pattern.
    #[error("regex pattern not supported by this dialect")]
    RegexUnsupported {
        #[serde(skip_serializing)]
        detail: String,
    },

    /// A field name failed the length or character policy.
    #[error("invalid identifier")]
    InvalidIdentifier {
        #[serde(skip_serializing)]
        detail: String,
    },

    /// Recursion depth limit exceeded.
    #[error("maximum recursion depth exceeded")]
    DepthExceeded { depth: usize, limit: usize },

    /// Generated SQL length limit exceeded.
    #[error("maximum SQL output length exceeded")]
    OutputTooLarge { length: usize, limit: usize },

    /// Comprehension nesting limit exceeded.
    #[error("comprehension nesting depth exceeded")]
    ComprehensionTooDeep { depth: usize, limit: usize },

    /// Regex pattern length limit exceeded.
    #[error("regex pattern too long")]
    PatternTooLong { length: usize, limit: usize },

    /// Bytes literal length limit exceeded (inline mode).
    #[error("bytes literal too large")]
    BytesTooLarge { length: usize, limit: usize },

    /// A translation invariant was violated; should not occur.
    #[error("internal translation error")]
    Internal {
        #[serde(skip_serializing)]
        detail: String,
    },
}

impl TranslateError {
    /// The public message, identical to `Display`.
    pub fn public_message(&self) -> String {
        self.to_string()
    }

    /// The internal diagnostic message, including node context and
    /// limits. Not safe to surface to end users.
    pub fn diagnostic(&self) -> String {
        match self {
            TranslateError::ParseRejected { detail } => {
                format!("malformed expression: {detail}")
            }
            TranslateError::UnsupportedFeature { feature } => {
                format!("unsupported feature: {feature}")
            }
            TranslateError::UnresolvedIdentifier { name } => {
                format!("identifier '{name}' does not resolve")
            }
            TranslateError::TypeMismatch { detail } => {
                format!("type mismatch: {detail}")
            }
            TranslateError::AmbiguousSize { detail } => {
                format!("ambiguous size() receiver: {detail}")
            }
            TranslateError::NonJsonPath { detail } => {
                format!("non-JSON path: {detail}")
            }
            TranslateError::RegexUnsupported { detail } => {
                format!("regex unsupported: {detail}")
            }
            TranslateError::InvalidIdentifier { detail } => {
                format!("invalid identifier: {detail}")
            }
            TranslateError::DepthExceeded { depth, limit } => {
                format!("recursion depth {depth} exceeds limit {limit}")
            }
            TranslateError::OutputTooLarge { length, limit } => {
                format!("output length {length} exceeds limit {limit}")
            }
            TranslateError::ComprehensionTooDeep { depth, limit } => {
                format!("comprehension nesting {depth} exceeds limit {limit}")
            }
            TranslateError::PatternTooLong { length, limit } => {
                format!("pattern length {length} exceeds limit {limit}")
            }
            TranslateError::BytesTooLarge { length, limit } => {
                format!("bytes literal length {length} exceeds limit {limit}")
            }
            TranslateError::Internal { detail } => {
                format!("internal invariant violated: {detail}")
            }
        }
    }

    /// Whether this error is a resource-limit rejection. Limit errors are
    /// terminal: retrying the same input cannot succeed.
    pub fn is_resource_limit(&self) -> bool {
        matches!(
            self,
            TranslateError::DepthExceeded { .. }
                | TranslateError::OutputTooLarge { .. }
                | TranslateError::ComprehensionTooDeep { .. }
                | TranslateError::PatternTooLong { .. }
                | TranslateError::BytesTooLarge { .. }
        )
    }
}
