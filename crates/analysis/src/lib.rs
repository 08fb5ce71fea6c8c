// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # cel2sql - Index Analysis
//!
//! A second pass over the same AST the translator consumes, producing
//! static index recommendations: which columns appear in comparisons,
//! range predicates, membership tests, regex matches, JSON accesses and
//! comprehension ranges, and which index shape each target dialect offers
//! for them.
//!
//! Single-column recommendations keep the most specialized pattern per
//! column; tables with several plainly-indexed columns additionally get a
//! composite recommendation ordered equality-before-range.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cel2sql_analysis::analyze;
//! use cel2sql_ast::Dialect;
//!
//! let recommendations = analyze(&expr, Dialect::PostgreSQL, &registry);
//! for rec in &recommendations {
//!     println!("{:?} {} {}", rec.index_type, rec.expression, rec.reason);
//! }
//! ```

pub mod advisor;
pub mod analyzer;
pub mod pattern;

use analyzer::PatternCollector;
use cel2sql_ast::{Dialect, Expr};
use cel2sql_schema::SchemaRegistry;
use std::collections::HashMap;
use tracing::debug;

pub use pattern::{IndexPattern, IndexRecommendation, IndexType, PatternKind};

/// Analyze an expression for index-worthy patterns.
///
/// Returns deduplicated single-column recommendations in first-sighting
/// order, followed by per-table composite recommendations.
pub fn analyze(
    expr: &Expr,
    dialect: Dialect,
    registry: &SchemaRegistry,
) -> Vec<IndexRecommendation> {
    let patterns = PatternCollector::new(registry).collect(expr);
    debug!(
        dialect = dialect.as_str(),
        patterns = patterns.len(),
        "analyzing expression for index recommendations"
    );

    let mut recommendations: Vec<IndexRecommendation> = Vec::new();
    for pattern in &patterns {
        if let Some(rec) = advisor::recommend(dialect, pattern) {
            recommendations.push(rec);
        }
    }

    recommendations.extend(composites(dialect, &patterns));
    recommendations
}

/// Build one composite recommendation per table that has at least two
/// plainly-indexable columns, equality columns first.
fn composites(dialect: Dialect, patterns: &[IndexPattern]) -> Vec<IndexRecommendation> {
    let mut grouped: HashMap<&str, (Vec<&str>, Vec<&str>)> = HashMap::new();
    for pattern in patterns {
        let Some(table) = pattern.table.as_deref() else {
            continue;
        };
        let entry = grouped.entry(table).or_default();
        match pattern.kind {
            PatternKind::Equality => entry.0.push(pattern.column.as_str()),
            PatternKind::Range => entry.1.push(pattern.column.as_str()),
            _ => {}
        }
    }

    let mut tables: Vec<&str> = grouped.keys().copied().collect();
    tables.sort_unstable();

    let mut out = Vec::new();
    for table in tables {
        let (equality, range) = &grouped[table];
        if equality.len() + range.len() < 2 {
            continue;
        }
        let columns: Vec<String> = equality
            .iter()
            .chain(range.iter())
            .map(|c| c.to_string())
            .collect();
        let operator = if range.is_empty() {
            PatternKind::Equality
        } else {
            PatternKind::Range
        };
        out.push(IndexRecommendation {
            table: Some(table.to_string()),
            columns: columns.clone(),
            operator,
            index_type: advisor::composite_index_type(dialect),
            priority: 2,
            expression: format!("({})", columns.join(", ")),
            reason: "composite index covering the predicate, equality columns first".to_string(),
        });
    }
    out
}
