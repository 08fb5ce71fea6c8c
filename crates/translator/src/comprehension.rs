// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Comprehension classification
//!
//! The walker receives comprehensions in canonical macro-expanded form and
//! must recover which macro produced them, because each macro has its own
//! SQL shape (`EXISTS (...)`, `NOT EXISTS (...)`, `(SELECT COUNT(*) ...) = 1`,
//! `ARRAY(SELECT ...)`). Classification matches on the accumulator
//! initializer, the loop step and the result expression; the loop
//! condition is not consulted, so both the strict (`@not_strictly_false`)
//! and plain condition spellings are accepted.

use crate::error::{TranslateError, TranslateResult};
use cel2sql_ast::{BinaryOp, Comprehension, Expr, ExprKind, Literal};

/// The macro a comprehension node was lowered from, with borrowed
/// predicate/transform sub-expressions.
#[derive(Debug)]
pub enum MacroKind<'a> {
    /// `r.exists(x, pred)`
    Exists { pred: &'a Expr },
    /// `r.all(x, pred)`
    All { pred: &'a Expr },
    /// `r.exists_one(x, pred)`
    ExistsOne { pred: &'a Expr },
    /// `r.map(x, transform)` / `r.map(x, pred, transform)`
    Map {
        transform: &'a Expr,
        pred: Option<&'a Expr>,
    },
    /// `r.filter(x, pred)`
    Filter { pred: &'a Expr },
}

/// Recover the macro shape of a canonical comprehension.
pub fn classify(comp: &Comprehension) -> TranslateResult<MacroKind<'_>> {
    let unsupported = || TranslateError::UnsupportedFeature {
        feature: "non-macro comprehension shape".to_string(),
    };

    match comp.accu_init.as_literal() {
        Some(Literal::Bool(false)) => {
            // exists: step is `accu || pred`
            let (op, pred) = accu_step(comp)?;
            if op == BinaryOp::Or {
                return Ok(MacroKind::Exists { pred });
            }
            Err(unsupported())
        }
        Some(Literal::Bool(true)) => {
            // all: step is `accu && pred`
            let (op, pred) = accu_step(comp)?;
            if op == BinaryOp::And {
                return Ok(MacroKind::All { pred });
            }
            Err(unsupported())
        }
        Some(Literal::Int(0)) => {
            // exists_one: step `pred ? accu + 1 : accu`, result `accu == 1`
            let ExprKind::Ternary {
                cond,
                then_expr,
                else_expr,
            } = &comp.loop_step.kind
            else {
                return Err(unsupported());
            };
            if !is_accu(else_expr, &comp.accu_var) || !is_accu_increment(then_expr, &comp.accu_var)
            {
                return Err(unsupported());
            }
            if !is_accu_eq_one(&comp.result, &comp.accu_var) {
                return Err(unsupported());
            }
            Ok(MacroKind::ExistsOne { pred: cond })
        }
        _ => {
            // map / filter: accumulator is the empty list
            if !matches!(&comp.accu_init.kind, ExprKind::List(items) if items.is_empty()) {
                return Err(unsupported());
            }
            match &comp.loop_step.kind {
                // unconditional append: map
                ExprKind::Binary {
                    op: BinaryOp::Add, ..
                } => {
                    let transform =
                        append_element(&comp.loop_step, &comp.accu_var).ok_or_else(unsupported)?;
                    Ok(MacroKind::Map {
                        transform,
                        pred: None,
                    })
                }
                // conditional append: filter, or map with filter
                ExprKind::Ternary {
                    cond,
                    then_expr,
                    else_expr,
                } => {
                    if !is_accu(else_expr, &comp.accu_var) {
                        return Err(unsupported());
                    }
                    let element = append_element(then_expr, &comp.accu_var).ok_or_else(unsupported)?;
                    if matches!(&element.kind, ExprKind::Ident(name) if *name == comp.iter_var) {
                        Ok(MacroKind::Filter { pred: cond })
                    } else {
                        Ok(MacroKind::Map {
                            transform: element,
                            pred: Some(cond),
                        })
                    }
                }
                _ => Err(unsupported()),
            }
        }
    }
}

fn is_accu(expr: &Expr, accu_var: &str) -> bool {
    matches!(&expr.kind, ExprKind::Ident(name) if name == accu_var)
}

/// Match `accu <op> pred`, returning the operator and predicate.
fn accu_step<'a>(comp: &'a Comprehension) -> TranslateResult<(BinaryOp, &'a Expr)> {
    if let ExprKind::Binary { op, left, right } = &comp.loop_step.kind {
        if is_accu(left, &comp.accu_var) {
            return Ok((*op, right));
        }
    }
    Err(TranslateError::UnsupportedFeature {
        feature: "non-macro comprehension shape".to_string(),
    })
}

/// Match `accu + 1`.
fn is_accu_increment(expr: &Expr, accu_var: &str) -> bool {
    if let ExprKind::Binary {
        op: BinaryOp::Add,
        left,
        right,
    } = &expr.kind
    {
        return is_accu(left, accu_var)
            && matches!(right.as_literal(), Some(Literal::Int(1)));
    }
    false
}

/// Match `accu == 1`.
fn is_accu_eq_one(expr: &Expr, accu_var: &str) -> bool {
    if let ExprKind::Binary {
        op: BinaryOp::Eq,
        left,
        right,
    } = &expr.kind
    {
        return is_accu(left, accu_var)
            && matches!(right.as_literal(), Some(Literal::Int(1)));
    }
    false
}

/// Match `accu + [element]`, returning the element.
fn append_element<'a>(expr: &'a Expr, accu_var: &str) -> Option<&'a Expr> {
    if let ExprKind::Binary {
        op: BinaryOp::Add,
        left,
        right,
    } = &expr.kind
    {
        if is_accu(left, accu_var) {
            if let ExprKind::List(items) = &right.kind {
                if items.len() == 1 {
                    return Some(&items[0]);
                }
            }
        }
    }
    None
}
