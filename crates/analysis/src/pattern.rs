// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Domain types for index analysis

use serde::{Deserialize, Serialize};

/// The predicate shape a column was observed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    /// `col == x` / `col != x`
    Equality,
    /// `col < x`, `col >= x`, ...
    Range,
    /// `matches(col, ...)`
    RegexMatch,
    /// `x in col`
    ArrayMembership,
    /// JSON path access into the column
    JsonAccess,
    /// Comprehension macro iterating an array column
    ArrayComprehension,
    /// Comprehension macro iterating a JSON array column
    JsonArrayComprehension,
}

impl PatternKind {
    /// More specialized patterns replace plainer ones for the same column.
    pub fn specificity(self) -> u8 {
        match self {
            PatternKind::Equality | PatternKind::Range => 1,
            PatternKind::ArrayMembership => 2,
            PatternKind::RegexMatch
            | PatternKind::JsonAccess
            | PatternKind::ArrayComprehension
            | PatternKind::JsonArrayComprehension => 3,
        }
    }
}

/// Database index types across the supported dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexType {
    BTree,
    Gin,
    Gist,
    Fulltext,
    Art,
    Clustering,
    SearchIndex,
}

impl IndexType {
    pub fn as_str(&self) -> &'static str {
        match self {
            IndexType::BTree => "btree",
            IndexType::Gin => "gin",
            IndexType::Gist => "gist",
            IndexType::Fulltext => "fulltext",
            IndexType::Art => "art",
            IndexType::Clustering => "clustering",
            IndexType::SearchIndex => "search_index",
        }
    }

    /// Specialized index types win over plain B-tree recommendations.
    pub fn specificity(self) -> u8 {
        match self {
            IndexType::BTree | IndexType::Art | IndexType::Clustering => 1,
            IndexType::Fulltext => 2,
            IndexType::Gin | IndexType::Gist | IndexType::SearchIndex => 3,
        }
    }
}

/// A detected predicate pattern that may benefit from an index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexPattern {
    /// Root identifier of the reference, when qualified (`usr.age` → `usr`).
    pub table: Option<String>,
    pub column: String,
    pub kind: PatternKind,
}

/// A concrete index recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexRecommendation {
    pub table: Option<String>,
    /// Columns in recommended order (equality columns before range
    /// columns for composites).
    pub columns: Vec<String>,
    /// The dominating predicate shape that motivated the recommendation.
    pub operator: PatternKind,
    pub index_type: IndexType,
    /// Higher priority recommendations should be applied first.
    pub priority: u8,
    /// DDL-shaped expression text.
    pub expression: String,
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_specificity_ordering() {
        assert!(PatternKind::JsonAccess.specificity() > PatternKind::Equality.specificity());
        assert!(PatternKind::ArrayMembership.specificity() > PatternKind::Range.specificity());
        assert!(IndexType::Gin.specificity() > IndexType::BTree.specificity());
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&PatternKind::JsonArrayComprehension).unwrap();
        assert_eq!(json, "\"json_array_comprehension\"");
        let json = serde_json::to_string(&IndexType::SearchIndex).unwrap();
        assert_eq!(json, "\"search_index\"");
    }
}
