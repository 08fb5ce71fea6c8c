// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Schema registry
//!
//! Maps table names to [`Schema`] values. The registry is borrowed
//! read-only for the duration of a translation. Missing tables or fields
//! are not errors at this level; the translator simply emits plain column
//! references when a lookup fails.

use crate::metadata::{FieldSchema, Schema};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Immutable mapping from table name to [`Schema`].
///
/// Lookup is exact and case-sensitive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaRegistry {
    tables: HashMap<String, Schema>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style table registration.
    pub fn with_table(mut self, name: impl Into<String>, schema: Schema) -> Self {
        self.tables.insert(name.into(), schema);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, schema: Schema) {
        self.tables.insert(name.into(), schema);
    }

    pub fn table(&self, name: &str) -> Option<&Schema> {
        self.tables.get(name)
    }

    /// Combined table + field lookup.
    pub fn field(&self, table: &str, field: &str) -> Option<&FieldSchema> {
        self.tables.get(table)?.field(field)
    }

    /// Search every registered table for a field with the given name.
    /// Used to resolve bare column identifiers that carry no table
    /// qualifier. Returns the first match in table-name order so the
    /// result is deterministic.
    pub fn any_field(&self, field: &str) -> Option<&FieldSchema> {
        let mut names: Vec<&String> = self.tables.keys().collect();
        names.sort();
        names.into_iter().find_map(|t| self.tables[t].field(field))
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl FromIterator<(String, Schema)> for SchemaRegistry {
    fn from_iter<I: IntoIterator<Item = (String, Schema)>>(iter: I) -> Self {
        Self {
            tables: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::FieldSchema;

    fn registry() -> SchemaRegistry {
        SchemaRegistry::new()
            .with_table(
                "usr",
                Schema::new(vec![
                    FieldSchema::scalar("id", "bigint"),
                    FieldSchema::jsonb("metadata"),
                ]),
            )
            .with_table(
                "orders",
                Schema::new(vec![FieldSchema::array("tags", "text")]),
            )
    }

    #[test]
    fn test_table_and_field_lookup() {
        let reg = registry();
        assert!(reg.table("usr").is_some());
        assert!(reg.table("Usr").is_none());
        assert!(reg.field("usr", "metadata").unwrap().is_binary_json());
        assert!(reg.field("usr", "missing").is_none());
        assert!(reg.field("missing", "metadata").is_none());
    }

    #[test]
    fn test_any_field_scans_all_tables() {
        let reg = registry();
        assert!(reg.any_field("tags").unwrap().is_array());
        assert!(reg.any_field("nope").is_none());
    }

    #[test]
    fn test_serde_round_trip() {
        let reg = registry();
        let json = serde_json::to_string(&reg).unwrap();
        let back: SchemaRegistry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, reg);
    }
}
