// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Unit tests for the CEL expression representation

use cel2sql_ast::{BinaryOp, Expr, ExprKind, Literal, MapEntry, UnaryOp};

#[test]
fn test_literal_constructors() {
    assert_eq!(Expr::null().kind, ExprKind::Literal(Literal::Null));
    assert_eq!(Expr::int(42).kind, ExprKind::Literal(Literal::Int(42)));
    assert_eq!(
        Expr::uint(7).kind,
        ExprKind::Literal(Literal::UInt(7))
    );
    assert_eq!(
        Expr::string("hi").kind,
        ExprKind::Literal(Literal::String("hi".to_string()))
    );
    assert_eq!(
        Expr::bytes(b"ab".to_vec()).kind,
        ExprKind::Literal(Literal::Bytes(vec![b'a', b'b']))
    );
}

#[test]
fn test_binary_structure() {
    let expr = Expr::binary(BinaryOp::Eq, Expr::ident("name"), Expr::string("alice"));
    let ExprKind::Binary { op, left, right } = &expr.kind else {
        panic!("expected binary");
    };
    assert_eq!(*op, BinaryOp::Eq);
    assert_eq!(left.kind, ExprKind::Ident("name".to_string()));
    assert!(matches!(&right.kind, ExprKind::Literal(Literal::String(_))));
}

#[test]
fn test_method_call_carries_target() {
    let expr = Expr::method(Expr::ident("name"), "contains", vec![Expr::string("li")]);
    let ExprKind::Call {
        target,
        function,
        args,
    } = &expr.kind
    else {
        panic!("expected call");
    };
    assert!(target.is_some());
    assert_eq!(function, "contains");
    assert_eq!(args.len(), 1);
}

#[test]
fn test_free_call_has_no_target() {
    let expr = Expr::call("has", vec![Expr::path(["usr", "metadata"])]);
    let ExprKind::Call { target, .. } = &expr.kind else {
        panic!("expected call");
    };
    assert!(target.is_none());
}

#[test]
fn test_unary_negation() {
    let expr = Expr::unary(UnaryOp::Neg, Expr::int(5));
    assert!(matches!(
        &expr.kind,
        ExprKind::Unary {
            op: UnaryOp::Neg,
            ..
        }
    ));
}

#[test]
fn test_serde_round_trip() {
    let expr = Expr::binary(
        BinaryOp::And,
        Expr::binary(BinaryOp::Eq, Expr::ident("name"), Expr::string("alice")),
        Expr::binary(BinaryOp::Gt, Expr::ident("age"), Expr::int(30)),
    );
    let json = serde_json::to_string(&expr).unwrap();
    let back: Expr = serde_json::from_str(&json).unwrap();
    assert_eq!(back, expr);
}

#[test]
fn test_serde_round_trip_map_literal() {
    let expr = Expr::map(vec![MapEntry {
        key: Expr::string("k"),
        value: Expr::int(1),
    }]);
    let json = serde_json::to_string(&expr).unwrap();
    let back: Expr = serde_json::from_str(&json).unwrap();
    assert_eq!(back, expr);
}
