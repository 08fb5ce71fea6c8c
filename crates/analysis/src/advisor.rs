// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Per-dialect index advice
//!
//! Maps collected patterns to the index machinery each target actually
//! has: B-tree everywhere it exists, GIN/GiST for PostgreSQL's JSON and
//! trigram cases, FULLTEXT for MySQL regex-ish scans, ART for DuckDB,
//! clustering and search indexes for BigQuery. Pure static advice; the
//! database is never consulted.

use crate::pattern::{IndexPattern, IndexRecommendation, IndexType, PatternKind};
use cel2sql_ast::Dialect;

/// Recommend an index for one pattern, or `None` when the dialect has no
/// index shape that would help.
pub fn recommend(dialect: Dialect, pattern: &IndexPattern) -> Option<IndexRecommendation> {
    let (index_type, expression, reason) = match dialect {
        Dialect::PostgreSQL => postgres_advice(pattern)?,
        Dialect::DuckDB => duckdb_advice(pattern)?,
        Dialect::BigQuery => bigquery_advice(pattern)?,
        Dialect::MySQL => mysql_advice(pattern)?,
        Dialect::SQLite => sqlite_advice(pattern)?,
    };
    Some(IndexRecommendation {
        table: pattern.table.clone(),
        columns: vec![pattern.column.clone()],
        operator: pattern.kind,
        index_type,
        priority: pattern.kind.specificity(),
        expression,
        reason,
    })
}

fn postgres_advice(pattern: &IndexPattern) -> Option<(IndexType, String, String)> {
    let col = &pattern.column;
    Some(match pattern.kind {
        PatternKind::Equality | PatternKind::Range => (
            IndexType::BTree,
            format!("({col})"),
            "b-tree supports equality and range scans".to_string(),
        ),
        PatternKind::ArrayMembership | PatternKind::ArrayComprehension => (
            IndexType::Gin,
            format!("USING GIN ({col})"),
            "GIN accelerates array membership tests".to_string(),
        ),
        PatternKind::RegexMatch => (
            IndexType::Gist,
            format!("USING GIST ({col} gist_trgm_ops)"),
            "trigram GiST accelerates regex matching".to_string(),
        ),
        PatternKind::JsonAccess | PatternKind::JsonArrayComprehension => (
            IndexType::Gin,
            format!("USING GIN ({col} jsonb_path_ops)"),
            "GIN with jsonb_path_ops accelerates JSON path lookups".to_string(),
        ),
    })
}

fn duckdb_advice(pattern: &IndexPattern) -> Option<(IndexType, String, String)> {
    let col = &pattern.column;
    match pattern.kind {
        PatternKind::Equality | PatternKind::Range | PatternKind::ArrayMembership => Some((
            IndexType::Art,
            format!("({col})"),
            "ART index supports point and range lookups".to_string(),
        )),
        _ => None,
    }
}

fn bigquery_advice(pattern: &IndexPattern) -> Option<(IndexType, String, String)> {
    let col = &pattern.column;
    Some(match pattern.kind {
        PatternKind::Equality
        | PatternKind::Range
        | PatternKind::ArrayMembership
        | PatternKind::ArrayComprehension => (
            IndexType::Clustering,
            format!("CLUSTER BY {col}"),
            "clustering prunes scanned blocks for selective predicates".to_string(),
        ),
        PatternKind::RegexMatch | PatternKind::JsonAccess | PatternKind::JsonArrayComprehension => {
            (
                IndexType::SearchIndex,
                format!("SEARCH INDEX ({col})"),
                "a search index accelerates text and JSON lookups".to_string(),
            )
        }
    })
}

fn mysql_advice(pattern: &IndexPattern) -> Option<(IndexType, String, String)> {
    let col = &pattern.column;
    Some(match pattern.kind {
        PatternKind::Equality
        | PatternKind::Range
        | PatternKind::ArrayMembership
        | PatternKind::ArrayComprehension => (
            IndexType::BTree,
            format!("({col})"),
            "b-tree supports equality and range scans".to_string(),
        ),
        PatternKind::RegexMatch => (
            IndexType::Fulltext,
            format!("FULLTEXT ({col})"),
            "FULLTEXT narrows candidates before regex evaluation".to_string(),
        ),
        PatternKind::JsonAccess | PatternKind::JsonArrayComprehension => (
            IndexType::BTree,
            format!("({col})"),
            "consider a functional index over the JSON path".to_string(),
        ),
    })
}

fn sqlite_advice(pattern: &IndexPattern) -> Option<(IndexType, String, String)> {
    let col = &pattern.column;
    match pattern.kind {
        PatternKind::RegexMatch => None,
        PatternKind::JsonAccess | PatternKind::JsonArrayComprehension => Some((
            IndexType::BTree,
            format!("(json_extract({col}, '$...'))"),
            "expression index over json_extract".to_string(),
        )),
        _ => Some((
            IndexType::BTree,
            format!("({col})"),
            "b-tree supports equality and range scans".to_string(),
        )),
    }
}

/// The index type a composite (multi-column) recommendation uses for a
/// dialect.
pub fn composite_index_type(dialect: Dialect) -> IndexType {
    match dialect {
        Dialect::PostgreSQL | Dialect::MySQL | Dialect::SQLite => IndexType::BTree,
        Dialect::DuckDB => IndexType::Art,
        Dialect::BigQuery => IndexType::Clustering,
    }
}
