// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Field and table metadata
//!
//! A [`Schema`] is an ordered collection of [`FieldSchema`] values. Each
//! field carries a [`FieldKind`] that decides how the translator lowers
//! references to it:
//!
//! - **Scalar** fields stay plain columns; their `type_name` additionally
//!   marks temporal columns (`timestamp*`, `datetime*`) for timestamp
//!   arithmetic and epoch extraction.
//! - **Json** fields switch field-select chains into JSON-path mode; the
//!   `binary` flag selects binary-JSON operators where the dialect
//!   distinguishes them (PostgreSQL `jsonb`).
//! - **Array** fields use the dialect's array length and membership
//!   operators and are iterable by comprehension macros.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The semantic kind of a column, as far as translation is concerned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Plain column; `type_name` is the storage type (informational,
    /// except for temporal detection).
    Scalar { type_name: String },
    /// JSON document column. `binary` marks binary JSON storage
    /// (PostgreSQL `jsonb`).
    Json { binary: bool },
    /// Array column with the given element type.
    Array { element_type: String },
}

/// Schema for a single field/column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSchema {
    pub name: String,
    pub kind: FieldKind,
}

impl FieldSchema {
    /// A scalar column of the given storage type.
    pub fn scalar(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Scalar {
                type_name: type_name.into(),
            },
        }
    }

    /// A text-JSON column.
    pub fn json(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Json { binary: false },
        }
    }

    /// A binary-JSON column (PostgreSQL `jsonb`).
    pub fn jsonb(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Json { binary: true },
        }
    }

    /// An array column with the given element type.
    pub fn array(name: impl Into<String>, element_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Array {
                element_type: element_type.into(),
            },
        }
    }

    pub fn is_json(&self) -> bool {
        matches!(self.kind, FieldKind::Json { .. })
    }

    pub fn is_binary_json(&self) -> bool {
        matches!(self.kind, FieldKind::Json { binary: true })
    }

    pub fn is_array(&self) -> bool {
        matches!(self.kind, FieldKind::Array { .. })
    }

    /// Whether a scalar column holds a timestamp, judged by its storage
    /// type name (`timestamp`, `timestamptz`, `datetime`, ...).
    pub fn is_temporal(&self) -> bool {
        match &self.kind {
            FieldKind::Scalar { type_name } => {
                let lower = type_name.to_ascii_lowercase();
                lower.starts_with("timestamp") || lower.starts_with("datetime")
            }
            _ => false,
        }
    }
}

/// Table schema with declaration order preserved and O(1) field lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<FieldSchema>", into = "Vec<FieldSchema>")]
pub struct Schema {
    fields: Vec<FieldSchema>,
    index: HashMap<String, usize>,
}

impl Schema {
    pub fn new(fields: Vec<FieldSchema>) -> Self {
        let index = fields
            .iter()
            .enumerate()
            .map(|(i, f)| (f.name.clone(), i))
            .collect();
        Self { fields, index }
    }

    /// Exact, case-sensitive field lookup.
    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.index.get(name).map(|&i| &self.fields[i])
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[FieldSchema] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl From<Vec<FieldSchema>> for Schema {
    fn from(fields: Vec<FieldSchema>) -> Self {
        Self::new(fields)
    }
}

impl From<Schema> for Vec<FieldSchema> {
    fn from(schema: Schema) -> Self {
        schema.fields
    }
}

impl FromIterator<FieldSchema> for Schema {
    fn from_iter<I: IntoIterator<Item = FieldSchema>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
