// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # cel2sql - AST Layer
//!
//! This crate defines the canonical CEL expression tree consumed by the
//! cel2sql translation kernel, the [`Dialect`] name enum shared across the
//! workspace, and the macro lowering that rewrites CEL comprehension
//! macros into their canonical [`Comprehension`] form.
//!
//! ## Overview
//!
//! The AST is parser-agnostic: any CEL front end that can produce
//! [`Expr`] values can drive the translator. Nodes carry optional source
//! positions for diagnostics and serialize with `serde` for caching or
//! transport.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cel2sql_ast::{macros, BinaryOp, Expr};
//!
//! // name == "alice" && age > 30
//! let expr = Expr::binary(
//!     BinaryOp::And,
//!     Expr::binary(BinaryOp::Eq, Expr::ident("name"), Expr::string("alice")),
//!     Expr::binary(BinaryOp::Gt, Expr::ident("age"), Expr::int(30)),
//! );
//! let lowered = macros::lower(expr);
//! ```

pub mod dialect;
pub mod expr;
pub mod macros;

pub use dialect::{Dialect, UnknownDialect};
pub use expr::{
    BinaryOp, Comprehension, Expr, ExprKind, Literal, MapEntry, SourcePos, StructField, UnaryOp,
};
