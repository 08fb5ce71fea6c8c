// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Parameter binding
//!
//! In parameterized mode every bindable literal reserves the next ordinal
//! and the dialect emits its placeholder syntax; the typed values collect
//! in first-occurrence order with no de-duplication. Booleans and `null`
//! never bind; they render as `IS TRUE` / `IS NULL` forms instead.

use crate::config::BindMode;
use serde::{Deserialize, Serialize};

/// A typed SQL parameter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SqlValue {
    String(String),
    Int(i64),
    UInt(u64),
    Double(f64),
    Bytes(Vec<u8>),
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::String(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::String(value)
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Int(value)
    }
}

impl From<f64> for SqlValue {
    fn from(value: f64) -> Self {
        SqlValue::Double(value)
    }
}

impl From<Vec<u8>> for SqlValue {
    fn from(value: Vec<u8>) -> Self {
        SqlValue::Bytes(value)
    }
}

/// Collects bound parameter values during one translation.
#[derive(Debug)]
pub struct ParamBinder {
    mode: BindMode,
    values: Vec<SqlValue>,
}

impl ParamBinder {
    pub fn new(mode: BindMode) -> Self {
        Self {
            mode,
            values: Vec::new(),
        }
    }

    pub fn mode(&self) -> BindMode {
        self.mode
    }

    pub fn is_parameterized(&self) -> bool {
        self.mode == BindMode::Parameterized
    }

    /// Record a value and return its 1-based ordinal.
    pub fn push(&mut self, value: SqlValue) -> usize {
        self.values.push(value);
        self.values.len()
    }

    pub fn values(&self) -> &[SqlValue] {
        &self.values
    }

    pub fn into_values(self) -> Vec<SqlValue> {
        self.values
    }
}
