// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Macro lowering
//!
//! CEL's comprehension macros (`exists`, `all`, `exists_one`, `map`,
//! `filter`) arrive from parsers either as method calls or already in the
//! canonical [`Comprehension`] form. The translation kernel consumes only
//! the lowered form, so the comprehension-depth limit is enforceable at a
//! single site; [`lower`] performs the rewrite.
//!
//! ## Canonical shapes
//!
//! With accumulator variable `__result__`:
//!
//! | Macro | init | step | result |
//! |-------|------|------|--------|
//! | `r.exists(x, p)` | `false` | `__result__ \|\| p` | `__result__` |
//! | `r.all(x, p)` | `true` | `__result__ && p` | `__result__` |
//! | `r.exists_one(x, p)` | `0` | `p ? __result__ + 1 : __result__` | `__result__ == 1` |
//! | `r.map(x, t)` | `[]` | `__result__ + [t]` | `__result__` |
//! | `r.map(x, p, t)` | `[]` | `p ? __result__ + [t] : __result__` | `__result__` |
//! | `r.filter(x, p)` | `[]` | `p ? __result__ + [x] : __result__` | `__result__` |
//!
//! The loop condition is `!__result__` for `exists`, `__result__` for
//! `all`, and `true` otherwise.
//!
//! [`lower`] is idempotent: comprehension nodes pass through untouched
//! (their sub-expressions are lowered recursively), so re-lowering an
//! already-lowered tree is a no-op.

use crate::expr::{BinaryOp, Comprehension, Expr, ExprKind, Literal, MapEntry, StructField, UnaryOp};

/// Accumulator variable name used by canonical macro expansion.
pub const ACCU_VAR: &str = "__result__";

/// The five comprehension macro names.
pub const MACRO_NAMES: [&str; 5] = ["all", "exists", "exists_one", "filter", "map"];

/// Whether `function` with `arg_count` arguments is a comprehension macro
/// call (`map` accepts both the 2- and 3-argument forms).
pub fn is_macro(function: &str, arg_count: usize) -> bool {
    match function {
        "all" | "exists" | "exists_one" | "filter" => arg_count == 2,
        "map" => arg_count == 2 || arg_count == 3,
        _ => false,
    }
}

/// Recursively lower macro method calls to canonical [`Comprehension`]
/// nodes. Nodes that are not macro calls are rebuilt with lowered
/// children; already-lowered comprehensions pass through, making the
/// function idempotent.
pub fn lower(expr: Expr) -> Expr {
    let Expr { kind, pos } = expr;
    let kind = match kind {
        ExprKind::Call {
            target: Some(target),
            function,
            args,
        } if is_macro(&function, args.len()) && ident_name(&args[0]).is_some() => {
            let iter_var = ident_name(&args[0]).expect("checked above").to_string();
            let range = lower(*target);
            let mut rest: Vec<Expr> = args.into_iter().skip(1).map(lower).collect();
            match (function.as_str(), rest.len()) {
                ("exists", 1) => exists_shape(range, iter_var, rest.remove(0)),
                ("all", 1) => all_shape(range, iter_var, rest.remove(0)),
                ("exists_one", 1) => exists_one_shape(range, iter_var, rest.remove(0)),
                ("filter", 1) => {
                    let pred = rest.remove(0);
                    let elem = Expr::ident(iter_var.clone());
                    map_shape(range, iter_var, Some(pred), elem)
                }
                ("map", 1) => map_shape(range, iter_var, None, rest.remove(0)),
                ("map", 2) => {
                    let transform = rest.remove(1);
                    let pred = rest.remove(0);
                    map_shape(range, iter_var, Some(pred), transform)
                }
                _ => unreachable!("is_macro admits only the arities above"),
            }
        }
        ExprKind::Call {
            target,
            function,
            args,
        } => ExprKind::Call {
            target: target.map(|t| Box::new(lower(*t))),
            function,
            args: args.into_iter().map(lower).collect(),
        },
        ExprKind::Select { operand, field } => ExprKind::Select {
            operand: Box::new(lower(*operand)),
            field,
        },
        ExprKind::Index { operand, index } => ExprKind::Index {
            operand: Box::new(lower(*operand)),
            index: Box::new(lower(*index)),
        },
        ExprKind::Unary { op, expr } => ExprKind::Unary {
            op,
            expr: Box::new(lower(*expr)),
        },
        ExprKind::Binary { op, left, right } => ExprKind::Binary {
            op,
            left: Box::new(lower(*left)),
            right: Box::new(lower(*right)),
        },
        ExprKind::Ternary {
            cond,
            then_expr,
            else_expr,
        } => ExprKind::Ternary {
            cond: Box::new(lower(*cond)),
            then_expr: Box::new(lower(*then_expr)),
            else_expr: Box::new(lower(*else_expr)),
        },
        ExprKind::List(items) => ExprKind::List(items.into_iter().map(lower).collect()),
        ExprKind::Map(entries) => ExprKind::Map(
            entries
                .into_iter()
                .map(|e| MapEntry {
                    key: lower(e.key),
                    value: lower(e.value),
                })
                .collect(),
        ),
        ExprKind::Struct { type_name, fields } => ExprKind::Struct {
            type_name,
            fields: fields
                .into_iter()
                .map(|f| StructField {
                    name: f.name,
                    value: lower(f.value),
                })
                .collect(),
        },
        ExprKind::Comprehension(comp) => {
            let Comprehension {
                iter_range,
                iter_var,
                accu_var,
                accu_init,
                loop_condition,
                loop_step,
                result,
            } = *comp;
            ExprKind::Comprehension(Box::new(Comprehension {
                iter_range: lower(iter_range),
                iter_var,
                accu_var,
                accu_init: lower(accu_init),
                loop_condition: lower(loop_condition),
                loop_step: lower(loop_step),
                result: lower(result),
            }))
        }
        leaf @ (ExprKind::Literal(_) | ExprKind::Ident(_)) => leaf,
    };
    Expr { kind, pos }
}

fn ident_name(expr: &Expr) -> Option<&str> {
    match &expr.kind {
        ExprKind::Ident(name) => Some(name),
        _ => None,
    }
}

fn accu() -> Expr {
    Expr::ident(ACCU_VAR)
}

fn exists_shape(range: Expr, iter_var: String, pred: Expr) -> ExprKind {
    ExprKind::Comprehension(Box::new(Comprehension {
        iter_range: range,
        iter_var,
        accu_var: ACCU_VAR.to_string(),
        accu_init: Expr::literal(Literal::Bool(false)),
        loop_condition: Expr::unary(UnaryOp::Not, accu()),
        loop_step: Expr::binary(BinaryOp::Or, accu(), pred),
        result: accu(),
    }))
}

fn all_shape(range: Expr, iter_var: String, pred: Expr) -> ExprKind {
    ExprKind::Comprehension(Box::new(Comprehension {
        iter_range: range,
        iter_var,
        accu_var: ACCU_VAR.to_string(),
        accu_init: Expr::literal(Literal::Bool(true)),
        loop_condition: accu(),
        loop_step: Expr::binary(BinaryOp::And, accu(), pred),
        result: accu(),
    }))
}

fn exists_one_shape(range: Expr, iter_var: String, pred: Expr) -> ExprKind {
    ExprKind::Comprehension(Box::new(Comprehension {
        iter_range: range,
        iter_var,
        accu_var: ACCU_VAR.to_string(),
        accu_init: Expr::int(0),
        loop_condition: Expr::bool(true),
        loop_step: Expr::ternary(
            pred,
            Expr::binary(BinaryOp::Add, accu(), Expr::int(1)),
            accu(),
        ),
        result: Expr::binary(BinaryOp::Eq, accu(), Expr::int(1)),
    }))
}

fn map_shape(range: Expr, iter_var: String, pred: Option<Expr>, transform: Expr) -> ExprKind {
    let append = Expr::binary(BinaryOp::Add, accu(), Expr::list(vec![transform]));
    let step = match pred {
        Some(pred) => Expr::ternary(pred, append, accu()),
        None => append,
    };
    ExprKind::Comprehension(Box::new(Comprehension {
        iter_range: range,
        iter_var,
        accu_var: ACCU_VAR.to_string(),
        accu_init: Expr::list(vec![]),
        loop_condition: Expr::bool(true),
        loop_step: step,
        result: accu(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exists_call() -> Expr {
        Expr::method(
            Expr::ident("items"),
            "exists",
            vec![
                Expr::ident("x"),
                Expr::binary(BinaryOp::Gt, Expr::ident("x"), Expr::int(10)),
            ],
        )
    }

    #[test]
    fn test_exists_lowers_to_comprehension() {
        let lowered = lower(exists_call());
        let ExprKind::Comprehension(comp) = &lowered.kind else {
            panic!("expected comprehension, got {lowered:?}");
        };
        assert_eq!(comp.iter_var, "x");
        assert_eq!(comp.accu_var, ACCU_VAR);
        assert_eq!(comp.accu_init, Expr::bool(false));
        assert!(matches!(
            &comp.loop_step.kind,
            ExprKind::Binary {
                op: BinaryOp::Or,
                ..
            }
        ));
    }

    #[test]
    fn test_lowering_is_idempotent() {
        let once = lower(exists_call());
        let twice = lower(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_non_macro_calls_untouched() {
        let call = Expr::method(Expr::ident("name"), "contains", vec![Expr::string("a")]);
        let lowered = lower(call.clone());
        assert_eq!(lowered, call);
    }

    #[test]
    fn test_filter_step_appends_iter_var() {
        let call = Expr::method(
            Expr::ident("items"),
            "filter",
            vec![
                Expr::ident("x"),
                Expr::binary(BinaryOp::Lt, Expr::ident("x"), Expr::int(3)),
            ],
        );
        let ExprKind::Comprehension(comp) = lower(call).kind else {
            panic!("expected comprehension");
        };
        let ExprKind::Ternary { then_expr, .. } = &comp.loop_step.kind else {
            panic!("expected ternary step");
        };
        let ExprKind::Binary { right, .. } = &then_expr.kind else {
            panic!("expected append step");
        };
        assert_eq!(**right, Expr::list(vec![Expr::ident("x")]));
    }

    #[test]
    fn test_nested_macros_lower_inside_out() {
        let inner = Expr::method(
            Expr::ident("ys"),
            "exists",
            vec![
                Expr::ident("y"),
                Expr::binary(BinaryOp::Eq, Expr::ident("y"), Expr::ident("x")),
            ],
        );
        let outer = Expr::method(Expr::ident("xs"), "exists", vec![Expr::ident("x"), inner]);
        let ExprKind::Comprehension(comp) = lower(outer).kind else {
            panic!("expected comprehension");
        };
        // The inner macro, sitting inside the loop step, is also lowered.
        let ExprKind::Binary { right, .. } = &comp.loop_step.kind else {
            panic!("expected or-step");
        };
        assert!(matches!(&right.kind, ExprKind::Comprehension(_)));
    }

    #[test]
    fn test_map_with_filter_form() {
        let call = Expr::method(
            Expr::ident("items"),
            "map",
            vec![
                Expr::ident("x"),
                Expr::binary(BinaryOp::Gt, Expr::ident("x"), Expr::int(0)),
                Expr::binary(BinaryOp::Mul, Expr::ident("x"), Expr::int(2)),
            ],
        );
        let ExprKind::Comprehension(comp) = lower(call).kind else {
            panic!("expected comprehension");
        };
        assert!(matches!(&comp.loop_step.kind, ExprKind::Ternary { .. }));
        assert_eq!(comp.accu_init, Expr::list(vec![]));
    }
}
