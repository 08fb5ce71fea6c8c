// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Expressions
//!
//! This module represents CEL expressions as a canonical tree the
//! translation kernel walks.
//!
//! ## Design
//!
//! The tree is a closed tagged union ([`ExprKind`]) wrapped in [`Expr`],
//! which additionally carries an optional source position for diagnostics.
//! Variants cover the accepted CEL surface:
//!
//! - **Literals**: null, bool, int, uint, double, string, bytes, duration,
//!   timestamp
//! - **Identifiers**: unqualified names resolved against the schema registry
//! - **Field selection**: `a.b` chains, which the translator lowers either to
//!   qualified columns or to JSON paths
//! - **Indexing**: `a[0]` / `a["key"]`
//! - **Calls**: free functions (`has(...)`, casts) and methods
//!   (`s.contains(...)`)
//! - **Operators**: unary `! -`, the binary set including `in`
//! - **Conditional**: `c ? t : e`
//! - **Aggregate literals**: lists, maps, typed structs
//! - **Comprehensions**: the macro-expanded form of `exists`/`all`/
//!   `exists_one`/`map`/`filter` with explicit iteration variable,
//!   accumulator, loop condition, loop step and result
//!
//! ## Expression Hierarchy
//!
//! Expressions form a tree where complex expressions contain
//! sub-expressions. For example `age > 30 && name == "alice"` is:
//!
//! ```text
//! Binary {
//!   op: And,
//!   left: Binary { op: Gt, left: Ident("age"), right: Literal(Int(30)) },
//!   right: Binary { op: Eq, left: Ident("name"), right: Literal(String("alice")) },
//! }
//! ```
//!
//! Macro calls such as `items.exists(x, x > 10)` are expected to arrive
//! already lowered to [`Comprehension`] form; see [`crate::macros::lower`].

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Source position of a node in the original CEL text.
///
/// Line and column are 1-based; the byte offset is 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcePos {
    pub byte_offset: usize,
    pub line: usize,
    pub column: usize,
}

/// A CEL expression node: a variant plus optional source position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expr {
    pub kind: ExprKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pos: Option<SourcePos>,
}

/// The closed set of CEL expression variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExprKind {
    /// Literal value
    Literal(Literal),

    /// Unqualified identifier (table, column, or bound iteration variable)
    Ident(String),

    /// Field selection: `operand.field`
    Select { operand: Box<Expr>, field: String },

    /// Index access: `operand[index]`
    Index { operand: Box<Expr>, index: Box<Expr> },

    /// Function or method call. `target` is `None` for free functions
    /// (`has(x)`) and `Some` for methods (`s.contains(x)`).
    Call {
        target: Option<Box<Expr>>,
        function: String,
        args: Vec<Expr>,
    },

    /// Unary operation (`!x`, `-x`)
    Unary { op: UnaryOp, expr: Box<Expr> },

    /// Binary operation (`a + b`, `x == 5`, `x in xs`)
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// Conditional: `cond ? then_expr : else_expr`
    Ternary {
        cond: Box<Expr>,
        then_expr: Box<Expr>,
        else_expr: Box<Expr>,
    },

    /// List literal: `[1, 2, 3]`
    List(Vec<Expr>),

    /// Map literal: `{"k": v}`
    Map(Vec<MapEntry>),

    /// Struct literal: `Type{field: v}`
    Struct {
        type_name: String,
        fields: Vec<StructField>,
    },

    /// Macro-expanded comprehension; see [`Comprehension`]
    Comprehension(Box<Comprehension>),
}

/// One `key: value` entry of a map literal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapEntry {
    pub key: Expr,
    pub value: Expr,
}

/// One `field: value` entry of a struct literal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructField {
    pub name: String,
    pub value: Expr,
}

/// The canonical macro-expanded form of CEL comprehension macros.
///
/// `r.exists(x, p)` lowers to a comprehension with `iter_range = r`,
/// `iter_var = x`, a boolean accumulator initialized to `false`, the loop
/// step `accu || p` and the accumulator as result. See [`crate::macros`]
/// for the full set of shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comprehension {
    /// The collection being iterated
    pub iter_range: Expr,
    /// The bound iteration variable name
    pub iter_var: String,
    /// The accumulator variable name
    pub accu_var: String,
    /// Initial accumulator value
    pub accu_init: Expr,
    /// Loop continuation condition
    pub loop_condition: Expr,
    /// Per-element accumulator update
    pub loop_step: Expr,
    /// Final result expression
    pub result: Expr,
}

/// Literal values.
///
/// Durations are stored as integer nanoseconds (CEL precision); timestamps
/// carry their parsed offset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Double(f64),
    String(String),
    Bytes(Vec<u8>),
    /// Duration in nanoseconds
    Duration(i64),
    Timestamp(DateTime<FixedOffset>),
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,

    // Comparison
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,

    // Logical
    And,
    Or,

    // Membership
    In,
}

impl BinaryOp {
    /// Whether this operator is a comparison (`== != < <= > >=`).
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Eq
                | BinaryOp::NotEq
                | BinaryOp::Lt
                | BinaryOp::LtEq
                | BinaryOp::Gt
                | BinaryOp::GtEq
        )
    }

    /// Whether this operator is an equality test (`==` / `!=`).
    pub fn is_equality(self) -> bool {
        matches!(self, BinaryOp::Eq | BinaryOp::NotEq)
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    Not,
    Neg,
}

impl Expr {
    /// Wrap a variant with no source position.
    pub fn new(kind: ExprKind) -> Self {
        Self { kind, pos: None }
    }

    /// Attach a source position.
    pub fn with_pos(mut self, pos: SourcePos) -> Self {
        self.pos = Some(pos);
        self
    }

    pub fn literal(lit: Literal) -> Self {
        Self::new(ExprKind::Literal(lit))
    }

    pub fn null() -> Self {
        Self::literal(Literal::Null)
    }

    pub fn bool(value: bool) -> Self {
        Self::literal(Literal::Bool(value))
    }

    pub fn int(value: i64) -> Self {
        Self::literal(Literal::Int(value))
    }

    pub fn uint(value: u64) -> Self {
        Self::literal(Literal::UInt(value))
    }

    pub fn double(value: f64) -> Self {
        Self::literal(Literal::Double(value))
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::literal(Literal::String(value.into()))
    }

    pub fn bytes(value: impl Into<Vec<u8>>) -> Self {
        Self::literal(Literal::Bytes(value.into()))
    }

    pub fn ident(name: impl Into<String>) -> Self {
        Self::new(ExprKind::Ident(name.into()))
    }

    pub fn select(operand: Expr, field: impl Into<String>) -> Self {
        Self::new(ExprKind::Select {
            operand: Box::new(operand),
            field: field.into(),
        })
    }

    pub fn index(operand: Expr, index: Expr) -> Self {
        Self::new(ExprKind::Index {
            operand: Box::new(operand),
            index: Box::new(index),
        })
    }

    /// Free function call: `function(args...)`.
    pub fn call(function: impl Into<String>, args: Vec<Expr>) -> Self {
        Self::new(ExprKind::Call {
            target: None,
            function: function.into(),
            args,
        })
    }

    /// Method call: `target.function(args...)`.
    pub fn method(target: Expr, function: impl Into<String>, args: Vec<Expr>) -> Self {
        Self::new(ExprKind::Call {
            target: Some(Box::new(target)),
            function: function.into(),
            args,
        })
    }

    pub fn unary(op: UnaryOp, expr: Expr) -> Self {
        Self::new(ExprKind::Unary {
            op,
            expr: Box::new(expr),
        })
    }

    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Self {
        Self::new(ExprKind::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    pub fn ternary(cond: Expr, then_expr: Expr, else_expr: Expr) -> Self {
        Self::new(ExprKind::Ternary {
            cond: Box::new(cond),
            then_expr: Box::new(then_expr),
            else_expr: Box::new(else_expr),
        })
    }

    pub fn list(items: Vec<Expr>) -> Self {
        Self::new(ExprKind::List(items))
    }

    pub fn map(entries: Vec<MapEntry>) -> Self {
        Self::new(ExprKind::Map(entries))
    }

    /// Nested field selection from a root identifier:
    /// `Expr::path(["usr", "metadata", "role"])` builds `usr.metadata.role`.
    ///
    /// # Panics
    ///
    /// Panics if `parts` is empty.
    pub fn path<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut iter = parts.into_iter();
        let root = iter.next().expect("path requires at least one segment");
        let mut expr = Self::ident(root);
        for part in iter {
            expr = Self::select(expr, part);
        }
        expr
    }

    /// The identifier at the root of a `Select`/`Index` chain, if any.
    pub fn root_ident(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::Ident(name) => Some(name),
            ExprKind::Select { operand, .. } | ExprKind::Index { operand, .. } => {
                operand.root_ident()
            }
            _ => None,
        }
    }

    /// The literal payload, if this node is a literal.
    pub fn as_literal(&self) -> Option<&Literal> {
        match &self.kind {
            ExprKind::Literal(lit) => Some(lit),
            _ => None,
        }
    }
}

impl From<Literal> for Expr {
    fn from(lit: Literal) -> Self {
        Expr::literal(lit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_builds_select_chain() {
        let expr = Expr::path(["usr", "metadata", "role"]);
        match &expr.kind {
            ExprKind::Select { operand, field } => {
                assert_eq!(field, "role");
                assert!(matches!(&operand.kind, ExprKind::Select { .. }));
            }
            other => panic!("expected Select, got {other:?}"),
        }
        assert_eq!(expr.root_ident(), Some("usr"));
    }

    #[test]
    fn test_root_ident_through_index() {
        let expr = Expr::index(Expr::path(["t", "items"]), Expr::int(0));
        assert_eq!(expr.root_ident(), Some("t"));
    }

    #[test]
    fn test_root_ident_absent_for_literal() {
        assert_eq!(Expr::int(1).root_ident(), None);
    }

    #[test]
    fn test_operator_classification() {
        assert!(BinaryOp::Eq.is_comparison());
        assert!(BinaryOp::GtEq.is_comparison());
        assert!(!BinaryOp::Add.is_comparison());
        assert!(BinaryOp::NotEq.is_equality());
        assert!(!BinaryOp::Lt.is_equality());
    }

    #[test]
    fn test_with_pos() {
        let pos = SourcePos {
            byte_offset: 4,
            line: 1,
            column: 5,
        };
        let expr = Expr::ident("age").with_pos(pos);
        assert_eq!(expr.pos, Some(pos));
    }
}
