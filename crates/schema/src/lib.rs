// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # cel2sql - Schema Layer
//!
//! Per-table field metadata consumed by the translation kernel. A
//! [`SchemaRegistry`] tells the translator which columns hold JSON
//! documents (and whether the storage is binary JSON), which columns are
//! arrays, and which scalar columns are temporal.
//!
//! The registry is optional: with no schema information every field
//! reference is treated as a plain column and no JSON-path rewrites fire.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cel2sql_schema::{FieldSchema, Schema, SchemaRegistry};
//!
//! let registry = SchemaRegistry::new().with_table(
//!     "usr",
//!     Schema::new(vec![
//!         FieldSchema::scalar("id", "bigint"),
//!         FieldSchema::jsonb("metadata"),
//!         FieldSchema::array("tags", "text"),
//!     ]),
//! );
//! assert!(registry.field("usr", "metadata").unwrap().is_json());
//! ```

pub mod metadata;
pub mod registry;

pub use metadata::{FieldKind, FieldSchema, Schema};
pub use registry::SchemaRegistry;
