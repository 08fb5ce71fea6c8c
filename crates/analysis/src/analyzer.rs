// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Pattern collection
//!
//! A lightweight second walk over the same AST the translator consumed.
//! It generates no SQL; it only records which columns appear in
//! index-worthy positions (comparisons, membership tests, regex matches,
//! JSON path accesses, comprehension ranges). Duplicate sightings of a
//! column keep the most specialized pattern.

use crate::pattern::{IndexPattern, PatternKind};
use cel2sql_ast::{macros, BinaryOp, Expr, ExprKind};
use cel2sql_schema::SchemaRegistry;
use std::collections::HashMap;

pub(crate) struct PatternCollector<'a> {
    registry: &'a SchemaRegistry,
    patterns: Vec<IndexPattern>,
    by_column: HashMap<(Option<String>, String), usize>,
}

impl<'a> PatternCollector<'a> {
    pub(crate) fn new(registry: &'a SchemaRegistry) -> Self {
        Self {
            registry,
            patterns: Vec::new(),
            by_column: HashMap::new(),
        }
    }

    pub(crate) fn collect(mut self, expr: &Expr) -> Vec<IndexPattern> {
        self.visit(expr);
        self.patterns
    }

    fn add(&mut self, table: Option<String>, column: String, kind: PatternKind) {
        let key = (table.clone(), column.clone());
        match self.by_column.get(&key) {
            Some(&idx) => {
                if kind.specificity() > self.patterns[idx].kind.specificity() {
                    self.patterns[idx].kind = kind;
                }
            }
            None => {
                self.by_column.insert(key, self.patterns.len());
                self.patterns.push(IndexPattern {
                    table,
                    column,
                    kind,
                });
            }
        }
    }

    fn visit(&mut self, expr: &Expr) {
        match &expr.kind {
            ExprKind::Binary { op, left, right } => {
                if op.is_comparison() {
                    let kind = if op.is_equality() {
                        PatternKind::Equality
                    } else {
                        PatternKind::Range
                    };
                    for side in [left.as_ref(), right.as_ref()] {
                        if let Some((table, column)) = column_of(side) {
                            self.add(table, column, kind);
                        }
                    }
                } else if *op == BinaryOp::In {
                    if let Some((table, column)) = column_of(left) {
                        self.add(table, column, PatternKind::ArrayMembership);
                    }
                }
                self.visit(left);
                self.visit(right);
            }
            ExprKind::Call {
                target,
                function,
                args,
            } => {
                if function == "matches" {
                    let subject = match target {
                        Some(recv) => Some(recv.as_ref()),
                        None => args.first(),
                    };
                    if let Some((table, column)) = subject.and_then(column_of) {
                        self.add(table, column, PatternKind::RegexMatch);
                    }
                }
                if let Some(range) = target {
                    if macros::is_macro(function, args.len()) {
                        self.add_comprehension_range(range);
                    }
                }
                if let Some(recv) = target {
                    self.visit(recv);
                }
                for arg in args {
                    self.visit(arg);
                }
            }
            ExprKind::Comprehension(comp) => {
                self.add_comprehension_range(&comp.iter_range);
                self.visit(&comp.iter_range);
                self.visit(&comp.accu_init);
                self.visit(&comp.loop_condition);
                self.visit(&comp.loop_step);
                self.visit(&comp.result);
            }
            ExprKind::Select { operand, .. } => {
                if let Some((table, column)) = self.json_column_of(expr) {
                    self.add(Some(table), column, PatternKind::JsonAccess);
                }
                self.visit(operand);
            }
            ExprKind::Index { operand, index } => {
                self.visit(operand);
                self.visit(index);
            }
            ExprKind::Unary { expr, .. } => self.visit(expr),
            ExprKind::Ternary {
                cond,
                then_expr,
                else_expr,
            } => {
                self.visit(cond);
                self.visit(then_expr);
                self.visit(else_expr);
            }
            ExprKind::List(items) => {
                for item in items {
                    self.visit(item);
                }
            }
            ExprKind::Map(entries) => {
                for entry in entries {
                    self.visit(&entry.key);
                    self.visit(&entry.value);
                }
            }
            ExprKind::Struct { fields, .. } => {
                for field in fields {
                    self.visit(&field.value);
                }
            }
            ExprKind::Literal(_) | ExprKind::Ident(_) => {}
        }
    }

    fn add_comprehension_range(&mut self, range: &Expr) {
        if let Some((table, column)) = self.json_column_of(range) {
            self.add(Some(table), column, PatternKind::JsonArrayComprehension);
        } else if let Some((table, column)) = column_of(range) {
            self.add(table, column, PatternKind::ArrayComprehension);
        }
    }

    /// The JSON column a select chain passes through, when rooted at a
    /// registered table whose first hop is a JSON field.
    fn json_column_of(&self, expr: &Expr) -> Option<(String, String)> {
        let mut fields: Vec<&str> = Vec::new();
        let mut cur = expr;
        while let ExprKind::Select { operand, field } = &cur.kind {
            fields.push(field);
            cur = operand;
        }
        let ExprKind::Ident(table) = &cur.kind else {
            return None;
        };
        let first = *fields.last()?;
        let field = self.registry.field(table, first)?;
        if field.is_json() {
            Some((table.clone(), first.to_string()))
        } else {
            None
        }
    }
}

/// The (table, column) a reference names: a bare identifier is an
/// unqualified column, a select chain is its last field qualified by the
/// root identifier.
fn column_of(expr: &Expr) -> Option<(Option<String>, String)> {
    match &expr.kind {
        ExprKind::Ident(name) => Some((None, name.clone())),
        ExprKind::Select { operand, field } => {
            let root = operand.root_ident()?;
            Some((Some(root.to_string()), field.clone()))
        }
        ExprKind::Index { operand, .. } => column_of(operand),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cel2sql_schema::{FieldSchema, Schema};

    #[test]
    fn test_comparison_patterns() {
        let registry = SchemaRegistry::new();
        let expr = Expr::binary(
            BinaryOp::And,
            Expr::binary(BinaryOp::Eq, Expr::ident("name"), Expr::string("a")),
            Expr::binary(BinaryOp::Gt, Expr::ident("age"), Expr::int(30)),
        );
        let patterns = PatternCollector::new(&registry).collect(&expr);
        assert_eq!(patterns.len(), 2);
        assert_eq!(patterns[0].column, "name");
        assert_eq!(patterns[0].kind, PatternKind::Equality);
        assert_eq!(patterns[1].column, "age");
        assert_eq!(patterns[1].kind, PatternKind::Range);
    }

    #[test]
    fn test_specialized_pattern_wins() {
        let registry = SchemaRegistry::new();
        // email == "x" && matches(email, "..."): the regex sighting wins.
        let expr = Expr::binary(
            BinaryOp::And,
            Expr::binary(BinaryOp::Eq, Expr::ident("email"), Expr::string("x")),
            Expr::call(
                "matches",
                vec![Expr::ident("email"), Expr::string("^.+@.+$")],
            ),
        );
        let patterns = PatternCollector::new(&registry).collect(&expr);
        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].kind, PatternKind::RegexMatch);
    }

    #[test]
    fn test_json_access_pattern() {
        let registry = SchemaRegistry::new()
            .with_table("usr", Schema::new(vec![FieldSchema::jsonb("metadata")]));
        let expr = Expr::binary(
            BinaryOp::Eq,
            Expr::path(["usr", "metadata", "role"]),
            Expr::string("admin"),
        );
        let patterns = PatternCollector::new(&registry).collect(&expr);
        let json = patterns
            .iter()
            .find(|p| p.kind == PatternKind::JsonAccess)
            .expect("json access pattern");
        assert_eq!(json.column, "metadata");
        assert_eq!(json.table.as_deref(), Some("usr"));
    }

    #[test]
    fn test_comprehension_range_pattern() {
        let registry = SchemaRegistry::new();
        let call = Expr::method(
            Expr::ident("tags"),
            "exists",
            vec![
                Expr::ident("x"),
                Expr::binary(BinaryOp::Eq, Expr::ident("x"), Expr::string("a")),
            ],
        );
        let lowered = macros::lower(call);
        let patterns = PatternCollector::new(&registry).collect(&lowered);
        let range = patterns
            .iter()
            .find(|p| p.column == "tags")
            .expect("range pattern");
        assert_eq!(range.kind, PatternKind::ArrayComprehension);
    }
}
