// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # The tree walker
//!
//! A context-sensitive recursive descent over the CEL AST. Each node type
//! has an emission path; descent consults the schema registry for every
//! field reference and the dialect for every syntactic choice. The walker
//! is the [`Emitter`] dialect capabilities call back into, so wrapping
//! syntax and operand emission interleave in one buffer.
//!
//! Overload resolution order for `+`/`-` is significant: temporal
//! operands are checked before string operands, because
//! `timestamp("...") + duration("...")` contains string literals on both
//! sides.

use crate::comprehension::{classify, MacroKind};
use crate::config::TranslateOptions;
use crate::dialect::{DatePart, Emitter, JsonSeg, SqlDialect, TemporalOp};
use crate::duration::{coarsest_unit, parse_duration};
use crate::error::{TranslateError, TranslateResult};
use crate::params::{ParamBinder, SqlValue};
use crate::pattern::vet_pattern;
use crate::validate::{ensure_no_null_bytes, escape_like_pattern, validate_identifier};
use crate::writer::{Limits, SqlWriter};
use crate::Translation;
use cel2sql_ast::{macros, BinaryOp, Comprehension, Expr, ExprKind, Literal, UnaryOp};
use cel2sql_schema::{FieldKind, SchemaRegistry};
use regex::Regex;
use std::sync::LazyLock;

const MAX_ARRAY_INDEX: i64 = 1 << 31;

static FORMAT_SPEC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("%([a-zA-Z])").expect("static pattern"));
static FORMAT_NUMERIC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("%[dfoeEgG]").expect("static pattern"));

/// An active comprehension scope: the CEL iteration variable and the SQL
/// alias it is emitted as.
struct Scope {
    var: String,
    alias: String,
}

/// A field-select chain rooted at a registered table whose first hop is a
/// JSON column. `segs` holds the path steps past the column; it is empty
/// when the chain selects the column itself.
struct JsonChain<'e> {
    root: &'e Expr,
    column: &'e str,
    binary: bool,
    segs: Vec<JsonSeg<'e>>,
}

pub(crate) struct Walker<'a> {
    dialect: &'a dyn SqlDialect,
    registry: &'a SchemaRegistry,
    options: &'a TranslateOptions,
    limits: Limits,
    binder: ParamBinder,
    scopes: Vec<Scope>,
    alias_seq: usize,
}

impl Emitter for Walker<'_> {
    fn emit(&mut self, w: &mut SqlWriter, node: &Expr) -> TranslateResult<()> {
        self.walk(w, node)
    }
}

impl<'a> Walker<'a> {
    pub(crate) fn new(
        dialect: &'a dyn SqlDialect,
        registry: &'a SchemaRegistry,
        options: &'a TranslateOptions,
    ) -> Self {
        Self {
            dialect,
            registry,
            options,
            limits: Limits::from_options(options),
            binder: ParamBinder::new(options.mode),
            scopes: Vec::new(),
            alias_seq: 0,
        }
    }

    /// Translate one expression; on error the partial buffer is dropped.
    pub(crate) fn run(mut self, expr: &Expr) -> TranslateResult<Translation> {
        let mut w = SqlWriter::new();
        self.walk(&mut w, expr)?;
        Ok(Translation {
            sql: w.into_string(),
            parameters: self.binder.into_values(),
        })
    }

    fn walk(&mut self, w: &mut SqlWriter, expr: &Expr) -> TranslateResult<()> {
        self.limits.enter(w.len())?;
        let result = self.walk_inner(w, expr);
        self.limits.exit();
        result
    }

    fn walk_inner(&mut self, w: &mut SqlWriter, expr: &Expr) -> TranslateResult<()> {
        match &expr.kind {
            ExprKind::Literal(lit) => self.write_literal(w, lit),
            ExprKind::Ident(name) => self.write_ident(w, name),
            ExprKind::Select { .. } => self.write_select(w, expr),
            ExprKind::Index { .. } => self.write_index(w, expr),
            ExprKind::Call {
                target,
                function,
                args,
            } => match target {
                Some(recv) => self.write_method(w, expr, recv, function, args),
                None => self.write_function(w, function, args),
            },
            ExprKind::Unary { op, expr: operand } => self.write_unary(w, *op, operand),
            ExprKind::Binary { op, left, right } => self.write_binary(w, *op, left, right),
            ExprKind::Ternary {
                cond,
                then_expr,
                else_expr,
            } => {
                w.push("CASE WHEN ");
                self.walk(w, cond)?;
                w.push(" THEN ");
                self.walk(w, then_expr)?;
                w.push(" ELSE ");
                self.walk(w, else_expr)?;
                w.push(" END");
                Ok(())
            }
            ExprKind::List(items) => {
                self.dialect.write_array_literal_open(w);
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        w.push(", ");
                    }
                    self.walk(w, item)?;
                }
                self.dialect.write_array_literal_close(w);
                Ok(())
            }
            ExprKind::Map(entries) => {
                // Keys name the positions; only values reach the SQL.
                self.dialect.write_struct_open(w);
                for (i, entry) in entries.iter().enumerate() {
                    if i > 0 {
                        w.push(", ");
                    }
                    self.walk(w, &entry.value)?;
                }
                self.dialect.write_struct_close(w);
                Ok(())
            }
            ExprKind::Struct { fields, .. } => {
                self.dialect.write_struct_open(w);
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        w.push(", ");
                    }
                    self.walk(w, &field.value)?;
                }
                self.dialect.write_struct_close(w);
                Ok(())
            }
            ExprKind::Comprehension(comp) => self.write_comprehension(w, comp),
        }
    }

    // ---- Literals ----

    fn write_literal(&mut self, w: &mut SqlWriter, lit: &Literal) -> TranslateResult<()> {
        match lit {
            Literal::Null => w.push("NULL"),
            Literal::Bool(b) => w.push(if *b { "TRUE" } else { "FALSE" }),
            Literal::Int(v) => {
                if self.binder.is_parameterized() {
                    let idx = self.binder.push(SqlValue::Int(*v));
                    self.dialect.write_param_placeholder(w, idx);
                } else {
                    w.push(&v.to_string());
                }
            }
            Literal::UInt(v) => {
                if self.binder.is_parameterized() {
                    let idx = self.binder.push(SqlValue::UInt(*v));
                    self.dialect.write_param_placeholder(w, idx);
                } else {
                    w.push(&v.to_string());
                }
            }
            Literal::Double(v) => {
                if self.binder.is_parameterized() {
                    let idx = self.binder.push(SqlValue::Double(*v));
                    self.dialect.write_param_placeholder(w, idx);
                } else {
                    w.push(&format_double(*v));
                }
            }
            Literal::String(s) => {
                ensure_no_null_bytes(s, "string literals")?;
                if self.binder.is_parameterized() {
                    let idx = self.binder.push(SqlValue::String(s.clone()));
                    self.dialect.write_param_placeholder(w, idx);
                } else {
                    self.dialect.write_string_literal(w, s);
                }
            }
            Literal::Bytes(b) => {
                if self.binder.is_parameterized() {
                    let idx = self.binder.push(SqlValue::Bytes(b.clone()));
                    self.dialect.write_param_placeholder(w, idx);
                } else {
                    if b.len() > self.options.max_bytes_literal {
                        return Err(TranslateError::BytesTooLarge {
                            length: b.len(),
                            limit: self.options.max_bytes_literal,
                        });
                    }
                    self.dialect.write_bytes_literal(w, b);
                }
            }
            Literal::Duration(nanos) => {
                let (value, unit) = coarsest_unit(*nanos);
                self.dialect.write_duration(w, value, unit);
            }
            Literal::Timestamp(ts) => {
                let rendered = Expr::string(ts.to_rfc3339());
                let d = self.dialect;
                d.write_timestamp_cast(w, self, &rendered)?;
            }
        }
        Ok(())
    }

    // ---- Identifiers & field selection ----

    fn write_ident(&mut self, w: &mut SqlWriter, name: &str) -> TranslateResult<()> {
        if let Some(alias) = self.scope_alias(name) {
            w.push(&alias);
            return Ok(());
        }
        validate_identifier(name, self.options.max_identifier_length, self.dialect)?;
        w.push(name);
        Ok(())
    }

    fn write_select(&mut self, w: &mut SqlWriter, expr: &Expr) -> TranslateResult<()> {
        let ExprKind::Select { operand, field } = &expr.kind else {
            return Err(TranslateError::Internal {
                detail: "write_select on a non-select node".to_string(),
            });
        };

        if let Some(chain) = self.json_chain(expr) {
            if !chain.segs.is_empty() {
                return self.write_json_chain(w, &chain, true);
            }
            // Selecting the JSON column itself stays a plain column.
        } else {
            self.reject_scalar_chain(expr)?;
        }

        self.walk(w, operand)?;
        validate_identifier(field, self.options.max_identifier_length, self.dialect)?;
        w.push(".");
        w.push(field);
        Ok(())
    }

    /// A select chain rooted at a registered table must not continue past
    /// a scalar or array column (the JSON boundary is drawn exactly once,
    /// at a JSON column).
    fn reject_scalar_chain(&self, expr: &Expr) -> TranslateResult<()> {
        let mut fields: Vec<&str> = Vec::new();
        let mut cur = expr;
        while let ExprKind::Select { operand, field } = &cur.kind {
            fields.push(field);
            cur = operand;
        }
        let ExprKind::Ident(table) = &cur.kind else {
            return Ok(());
        };
        if fields.len() < 2 || self.scope_alias(table).is_some() {
            return Ok(());
        }
        let first = *fields.last().expect("non-empty");
        if let Some(field) = self.registry.field(table, first) {
            if !field.is_json() {
                return Err(TranslateError::NonJsonPath {
                    detail: format!("column '{table}.{first}' is not JSON"),
                });
            }
        }
        Ok(())
    }

    fn write_json_chain(
        &mut self,
        w: &mut SqlWriter,
        chain: &JsonChain<'_>,
        as_text: bool,
    ) -> TranslateResult<()> {
        self.validate_json_chain(chain)?;
        let d = self.dialect;
        d.write_json_path(w, self, chain.root, chain.column, &chain.segs, as_text)
    }

    fn validate_json_chain(&self, chain: &JsonChain<'_>) -> TranslateResult<()> {
        validate_identifier(
            chain.column,
            self.options.max_identifier_length,
            self.dialect,
        )?;
        for seg in &chain.segs {
            if let JsonSeg::Key(key) = seg {
                ensure_no_null_bytes(key, "JSON path keys")?;
            }
        }
        Ok(())
    }

    /// Decompose a `Select`/`Index` spine rooted at a registered table
    /// whose first hop is a JSON column.
    fn json_chain<'e>(&self, expr: &'e Expr) -> Option<JsonChain<'e>> {
        let mut rev: Vec<JsonSeg<'e>> = Vec::new();
        let mut cur = expr;
        loop {
            match &cur.kind {
                ExprKind::Select { operand, field } => {
                    rev.push(JsonSeg::Key(field));
                    cur = operand;
                }
                ExprKind::Index { operand, index } => {
                    match index.as_literal()? {
                        Literal::String(key) => rev.push(JsonSeg::Key(key)),
                        Literal::Int(idx) => rev.push(JsonSeg::Index(*idx)),
                        Literal::UInt(idx) => rev.push(JsonSeg::Index(*idx as i64)),
                        _ => return None,
                    }
                    cur = operand;
                }
                ExprKind::Ident(_) => break,
                _ => return None,
            }
        }
        let ExprKind::Ident(table) = &cur.kind else {
            return None;
        };
        if self.scope_alias(table).is_some() {
            return None;
        }
        rev.reverse();
        let JsonSeg::Key(column) = *rev.first()? else {
            return None;
        };
        let field = self.registry.field(table, column)?;
        let FieldKind::Json { binary } = &field.kind else {
            return None;
        };
        Some(JsonChain {
            root: cur,
            column,
            binary: *binary,
            segs: rev[1..].to_vec(),
        })
    }

    /// Whether the expression is a JSON scalar extraction (a chain with at
    /// least one path step), which comparisons may need to coerce.
    fn is_json_extraction(&self, expr: &Expr) -> bool {
        self.json_chain(expr)
            .map(|chain| !chain.segs.is_empty())
            .unwrap_or(false)
    }

    // ---- Index access ----

    fn write_index(&mut self, w: &mut SqlWriter, expr: &Expr) -> TranslateResult<()> {
        let ExprKind::Index { operand, index } = &expr.kind else {
            return Err(TranslateError::Internal {
                detail: "write_index on a non-index node".to_string(),
            });
        };

        if let Some(chain) = self.json_chain(expr) {
            if !chain.segs.is_empty() {
                return self.write_json_chain(w, &chain, true);
            }
        }

        match index.as_literal() {
            Some(Literal::String(key)) => {
                // Map key access: emitted as a field step.
                validate_identifier(key, self.options.max_identifier_length, self.dialect)?;
                self.walk(w, operand)?;
                w.push(".");
                w.push(key);
                Ok(())
            }
            Some(Literal::Int(idx)) => {
                self.check_array_index(*idx)?;
                let d = self.dialect;
                d.write_list_index_const(w, self, operand, *idx)
            }
            Some(Literal::UInt(idx)) => {
                let idx = *idx as i64;
                self.check_array_index(idx)?;
                let d = self.dialect;
                d.write_list_index_const(w, self, operand, idx)
            }
            _ => {
                let d = self.dialect;
                d.write_list_index(w, self, operand, index)
            }
        }
    }

    fn check_array_index(&self, idx: i64) -> TranslateResult<()> {
        if idx < 0 {
            return Err(TranslateError::ParseRejected {
                detail: format!("negative array index {idx}"),
            });
        }
        if idx > MAX_ARRAY_INDEX {
            return Err(TranslateError::ParseRejected {
                detail: format!("array index {idx} is too large"),
            });
        }
        Ok(())
    }

    // ---- Unary / binary operators ----

    fn write_unary(
        &mut self,
        w: &mut SqlWriter,
        op: UnaryOp,
        operand: &Expr,
    ) -> TranslateResult<()> {
        match op {
            UnaryOp::Not => w.push("NOT "),
            UnaryOp::Neg => w.push("-"),
        }
        self.walk_operand(w, operand, precedence_unary(), true, false)
    }

    fn write_binary(
        &mut self,
        w: &mut SqlWriter,
        op: BinaryOp,
        left: &Expr,
        right: &Expr,
    ) -> TranslateResult<()> {
        match op {
            BinaryOp::And | BinaryOp::Or => {
                let prec = binary_precedence(op);
                self.walk_operand(w, left, prec, false, true)?;
                w.push(if op == BinaryOp::And { " AND " } else { " OR " });
                self.walk_operand(w, right, prec, true, true)
            }
            BinaryOp::Eq | BinaryOp::NotEq => {
                if self.write_null_or_bool_comparison(w, op, left, right)? {
                    return Ok(());
                }
                self.write_comparison(w, op, left, right)
            }
            BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq => {
                self.write_comparison(w, op, left, right)
            }
            BinaryOp::In => self.write_membership(w, left, right),
            BinaryOp::Add => self.write_addition(w, left, right),
            BinaryOp::Sub => self.write_subtraction(w, left, right),
            BinaryOp::Mul | BinaryOp::Div => {
                let prec = binary_precedence(op);
                self.walk_operand(w, left, prec, false, op == BinaryOp::Mul)?;
                w.push(if op == BinaryOp::Mul { " * " } else { " / " });
                self.walk_operand(w, right, prec, true, op == BinaryOp::Mul)
            }
            BinaryOp::Mod => {
                w.push("MOD(");
                self.walk(w, left)?;
                w.push(", ");
                self.walk(w, right)?;
                w.push(")");
                Ok(())
            }
        }
    }

    /// `x == null` / `x == true` style comparisons use the null-aware SQL
    /// forms. Returns `true` when a form was written.
    fn write_null_or_bool_comparison(
        &mut self,
        w: &mut SqlWriter,
        op: BinaryOp,
        left: &Expr,
        right: &Expr,
    ) -> TranslateResult<bool> {
        let eq = op == BinaryOp::Eq;
        let (operand, lit) = if let Some(lit @ (Literal::Null | Literal::Bool(_))) =
            right.as_literal()
        {
            (left, lit)
        } else if let Some(lit @ (Literal::Null | Literal::Bool(_))) = left.as_literal() {
            (right, lit)
        } else {
            return Ok(false);
        };
        self.walk(w, operand)?;
        w.push(match (lit, eq) {
            (Literal::Null, true) => " IS NULL",
            (Literal::Null, false) => " IS NOT NULL",
            (Literal::Bool(true), true) => " IS TRUE",
            (Literal::Bool(true), false) => " IS NOT TRUE",
            (Literal::Bool(false), true) => " IS FALSE",
            (Literal::Bool(false), false) => " IS NOT FALSE",
            _ => unreachable!("matched above"),
        });
        Ok(true)
    }

    fn write_comparison(
        &mut self,
        w: &mut SqlWriter,
        op: BinaryOp,
        left: &Expr,
        right: &Expr,
    ) -> TranslateResult<()> {
        let sql_op = comparison_sql(op);

        // A JSON text extraction compared against a number needs the
        // dialect's numeric coercion; against anything else it stays text.
        if self.is_json_extraction(left) && is_numeric_literal(right) {
            let d = self.dialect;
            d.write_numeric_coercion(w, self, left)?;
            w.push(" ");
            w.push(sql_op);
            w.push(" ");
            return self.walk(w, right);
        }
        if self.is_json_extraction(right) && is_numeric_literal(left) {
            self.walk(w, left)?;
            w.push(" ");
            w.push(sql_op);
            w.push(" ");
            let d = self.dialect;
            return d.write_numeric_coercion(w, self, right);
        }

        let prec = binary_precedence(op);
        self.walk_operand(w, left, prec, false, false)?;
        w.push(" ");
        w.push(sql_op);
        w.push(" ");
        self.walk_operand(w, right, prec, true, false)
    }

    fn write_membership(
        &mut self,
        w: &mut SqlWriter,
        elem: &Expr,
        collection: &Expr,
    ) -> TranslateResult<()> {
        // JSON-array element membership is under-specified across the
        // target dialects; fail rather than guess.
        if self.json_chain(collection).is_some() {
            return Err(TranslateError::UnsupportedFeature {
                feature: "membership test against a JSON column".to_string(),
            });
        }
        let d = self.dialect;
        d.write_array_membership(w, self, elem, collection)
    }

    fn write_addition(&mut self, w: &mut SqlWriter, left: &Expr, right: &Expr) -> TranslateResult<()> {
        // Temporal before string: temporal calls carry string arguments.
        if self.has_temporal(left) || self.has_temporal(right) {
            let d = self.dialect;
            // Normalize to timestamp-first for TIMESTAMP_ADD-style forms.
            if is_duration_expr(left) && !is_duration_expr(right) {
                return d.write_timestamp_arithmetic(w, self, TemporalOp::Add, right, left);
            }
            return d.write_timestamp_arithmetic(w, self, TemporalOp::Add, left, right);
        }
        if contains_string_literal(left)
            || contains_string_literal(right)
            || is_list_literal(left)
            || is_list_literal(right)
        {
            let d = self.dialect;
            return d.write_string_concat(w, self, left, right);
        }
        let prec = binary_precedence(BinaryOp::Add);
        self.walk_operand(w, left, prec, false, true)?;
        w.push(" + ");
        self.walk_operand(w, right, prec, true, true)
    }

    fn write_subtraction(
        &mut self,
        w: &mut SqlWriter,
        left: &Expr,
        right: &Expr,
    ) -> TranslateResult<()> {
        if self.has_temporal(left) || self.has_temporal(right) {
            let d = self.dialect;
            return d.write_timestamp_arithmetic(w, self, TemporalOp::Sub, left, right);
        }
        let prec = binary_precedence(BinaryOp::Sub);
        self.walk_operand(w, left, prec, false, false)?;
        w.push(" - ");
        self.walk_operand(w, right, prec, true, false)
    }

    /// Emit an operand, parenthesizing when its binding is looser than the
    /// parent operator's (or equal, on the right of a non-associative
    /// operator).
    fn walk_operand(
        &mut self,
        w: &mut SqlWriter,
        node: &Expr,
        parent_prec: u8,
        is_right: bool,
        associative: bool,
    ) -> TranslateResult<()> {
        let child_prec = node_precedence(node);
        let parens =
            child_prec < parent_prec || (is_right && !associative && child_prec == parent_prec);
        if parens {
            w.push("(");
            self.walk(w, node)?;
            w.push(")");
            Ok(())
        } else {
            self.walk(w, node)
        }
    }

    // ---- Calls: free functions ----

    fn write_function(
        &mut self,
        w: &mut SqlWriter,
        function: &str,
        args: &[Expr],
    ) -> TranslateResult<()> {
        match function {
            "has" => {
                let arg = expect_args(function, args, 1)?;
                self.write_has(w, &arg[0])
            }
            "size" => {
                let arg = expect_args(function, args, 1)?;
                self.write_size(w, &arg[0])
            }
            "matches" => {
                let arg = expect_args(function, args, 2)?;
                self.write_matches(w, &arg[0], &arg[1])
            }
            "bool" | "bytes" | "double" | "int" | "uint" | "string" => {
                let arg = expect_args(function, args, 1)?;
                self.write_cast(w, function, &arg[0])
            }
            "timestamp" => self.write_timestamp_fn(w, args),
            "duration" => {
                let arg = expect_args(function, args, 1)?;
                self.write_duration_fn(w, &arg[0])
            }
            "interval" => {
                let arg = expect_args(function, args, 2)?;
                self.write_interval_fn(w, &arg[0], &arg[1])
            }
            "date" | "time" | "datetime" | "current_date" | "current_datetime" => {
                w.push(&function.to_ascii_uppercase());
                w.push("(");
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        w.push(", ");
                    }
                    self.walk(w, arg)?;
                }
                w.push(")");
                Ok(())
            }
            other => Err(TranslateError::UnsupportedFeature {
                feature: format!("function '{other}'"),
            }),
        }
    }

    // ---- Calls: methods ----

    fn write_method(
        &mut self,
        w: &mut SqlWriter,
        expr: &Expr,
        recv: &Expr,
        function: &str,
        args: &[Expr],
    ) -> TranslateResult<()> {
        if macros::is_macro(function, args.len()) {
            // A parser handed us an unlowered macro; lower it in place.
            let lowered = macros::lower(expr.clone());
            return match &lowered.kind {
                ExprKind::Comprehension(comp) => self.write_comprehension(w, comp),
                _ => Err(TranslateError::ParseRejected {
                    detail: format!("{function}() iteration variable must be an identifier"),
                }),
            };
        }

        match function {
            "contains" => {
                let arg = expect_args(function, args, 1)?;
                if let Some(Literal::String(needle)) = arg[0].as_literal() {
                    ensure_no_null_bytes(needle, "string literals")?;
                }
                let d = self.dialect;
                d.write_contains(w, self, recv, &arg[0])
            }
            "startsWith" => {
                let arg = expect_args(function, args, 1)?;
                self.write_like(w, recv, &arg[0], true)
            }
            "endsWith" => {
                let arg = expect_args(function, args, 1)?;
                self.write_like(w, recv, &arg[0], false)
            }
            "matches" => {
                let arg = expect_args(function, args, 1)?;
                self.write_matches(w, recv, &arg[0])
            }
            "size" => {
                expect_args(function, args, 0)?;
                self.write_size(w, recv)
            }
            "lowerAscii" => self.write_wrapped(w, "LOWER(", recv),
            "upperAscii" => self.write_wrapped(w, "UPPER(", recv),
            "trim" => self.write_wrapped(w, "TRIM(", recv),
            "reverse" => self.write_wrapped(w, "REVERSE(", recv),
            "charAt" => {
                let arg = expect_args(function, args, 1)?;
                self.write_char_at(w, recv, &arg[0])
            }
            "indexOf" => self.write_index_of(w, recv, args),
            "lastIndexOf" => self.write_last_index_of(w, recv, args),
            "substring" => self.write_substring(w, recv, args),
            "replace" => self.write_replace(w, recv, args),
            "split" => self.write_split(w, recv, args),
            "join" => self.write_join(w, recv, args),
            "format" => {
                let arg = expect_args(function, args, 1)?;
                self.write_format(w, recv, &arg[0])
            }
            "getFullYear" | "getMonth" | "getDate" | "getDayOfMonth" | "getHours"
            | "getMinutes" | "getSeconds" | "getMilliseconds" | "getDayOfYear"
            | "getDayOfWeek" => self.write_timestamp_accessor(w, recv, function, args),
            other => Err(TranslateError::UnsupportedFeature {
                feature: format!("method '{other}'"),
            }),
        }
    }

    fn write_wrapped(
        &mut self,
        w: &mut SqlWriter,
        prefix: &str,
        operand: &Expr,
    ) -> TranslateResult<()> {
        w.push(prefix);
        self.walk(w, operand)?;
        w.push(")");
        Ok(())
    }

    // ---- has() ----

    fn write_has(&mut self, w: &mut SqlWriter, arg: &Expr) -> TranslateResult<()> {
        if let Some(chain) = self.json_chain(arg) {
            match chain.segs.as_slice() {
                [] => {}
                [JsonSeg::Key(key)] => {
                    self.validate_json_chain(&chain)?;
                    let d = self.dialect;
                    return d.write_json_key_exists(
                        w,
                        self,
                        chain.root,
                        chain.column,
                        key,
                        chain.binary,
                    );
                }
                _ => {
                    self.write_json_chain(w, &chain, true)?;
                    w.push(" IS NOT NULL");
                    return Ok(());
                }
            }
        }
        self.walk(w, arg)?;
        w.push(" IS NOT NULL");
        Ok(())
    }

    // ---- size() ----

    fn write_size(&mut self, w: &mut SqlWriter, recv: &Expr) -> TranslateResult<()> {
        if let Some(chain) = self.json_chain(recv) {
            self.validate_json_chain(&chain)?;
            let d = self.dialect;
            return d.write_json_array_length(w, self, chain.root, chain.column, &chain.segs);
        }
        if self.is_array_expression(recv) {
            let d = self.dialect;
            return d.write_array_length(w, self, recv);
        }
        if self.is_string_expression(recv) {
            w.push("LENGTH(");
            self.walk(w, recv)?;
            w.push(")");
            return Ok(());
        }
        Err(TranslateError::AmbiguousSize {
            detail: "receiver resolves to neither a string, an array, nor a JSON value"
                .to_string(),
        })
    }

    fn is_array_expression(&self, expr: &Expr) -> bool {
        match &expr.kind {
            ExprKind::List(_) => true,
            ExprKind::Call {
                target: Some(_),
                function,
                ..
            } => matches!(function.as_str(), "split" | "filter" | "map"),
            ExprKind::Comprehension(comp) => matches!(
                classify(comp),
                Ok(MacroKind::Map { .. } | MacroKind::Filter { .. })
            ),
            ExprKind::Select { operand, field } => {
                if let ExprKind::Ident(table) = &operand.kind {
                    if self.scope_alias(table).is_none() {
                        if let Some(fs) = self.registry.field(table, field) {
                            return fs.is_array();
                        }
                    }
                }
                false
            }
            ExprKind::Ident(name) => {
                self.scope_alias(name).is_none()
                    && self
                        .registry
                        .any_field(name)
                        .map(|f| f.is_array())
                        .unwrap_or(false)
            }
            _ => false,
        }
    }

    fn is_string_expression(&self, expr: &Expr) -> bool {
        match &expr.kind {
            ExprKind::Literal(Literal::String(_)) => true,
            ExprKind::Binary {
                op: BinaryOp::Add,
                left,
                right,
            } => contains_string_literal(left) || contains_string_literal(right),
            ExprKind::Call {
                target: Some(_),
                function,
                ..
            } => matches!(
                function.as_str(),
                "lowerAscii"
                    | "upperAscii"
                    | "trim"
                    | "reverse"
                    | "charAt"
                    | "substring"
                    | "replace"
                    | "join"
            ),
            ExprKind::Call {
                target: None,
                function,
                ..
            } => function == "string",
            ExprKind::Select { operand, field } => {
                if let ExprKind::Ident(table) = &operand.kind {
                    if self.scope_alias(table).is_none() {
                        if let Some(fs) = self.registry.field(table, field) {
                            return matches!(fs.kind, FieldKind::Scalar { .. });
                        }
                    }
                }
                false
            }
            ExprKind::Ident(name) => {
                // Iteration variables default to string elements.
                if self.scope_alias(name).is_some() {
                    return true;
                }
                self.registry
                    .any_field(name)
                    .map(|f| matches!(f.kind, FieldKind::Scalar { .. }))
                    .unwrap_or(false)
            }
            _ => false,
        }
    }

    // ---- matches() / LIKE ----

    fn write_matches(
        &mut self,
        w: &mut SqlWriter,
        subject: &Expr,
        pattern: &Expr,
    ) -> TranslateResult<()> {
        let Some(Literal::String(raw)) = pattern.as_literal() else {
            return Err(TranslateError::TypeMismatch {
                detail: "matches() requires a string literal pattern".to_string(),
            });
        };
        let (vetted, case_insensitive) = vet_pattern(raw, self.options.max_pattern_length)?;
        let flavored = self.dialect.convert_regex(&vetted)?;
        let d = self.dialect;
        d.write_regex_match(w, self, subject, &flavored, case_insensitive)
    }

    fn write_like(
        &mut self,
        w: &mut SqlWriter,
        recv: &Expr,
        arg: &Expr,
        prefix: bool,
    ) -> TranslateResult<()> {
        let Some(Literal::String(raw)) = arg.as_literal() else {
            return Err(TranslateError::TypeMismatch {
                detail: "startsWith()/endsWith() require a string literal argument".to_string(),
            });
        };
        ensure_no_null_bytes(raw, "LIKE patterns")?;
        let escaped = escape_like_pattern(raw);
        self.walk(w, recv)?;
        if prefix {
            w.push(" LIKE '");
            w.push(&escaped);
            w.push("%'");
        } else {
            w.push(" LIKE '%");
            w.push(&escaped);
            w.push("'");
        }
        self.dialect.write_like_escape(w);
        Ok(())
    }

    // ---- Casts ----

    fn write_cast(&mut self, w: &mut SqlWriter, type_name: &str, arg: &Expr) -> TranslateResult<()> {
        if type_name == "int" && self.is_temporal_value(arg) {
            let d = self.dialect;
            return d.write_epoch_extract(w, self, arg);
        }
        w.push("CAST(");
        self.walk(w, arg)?;
        w.push(" AS ");
        self.dialect.write_type_name(w, type_name);
        w.push(")");
        Ok(())
    }

    // ---- Temporal functions ----

    fn write_timestamp_fn(&mut self, w: &mut SqlWriter, args: &[Expr]) -> TranslateResult<()> {
        match args {
            [value] => {
                let d = self.dialect;
                d.write_timestamp_cast(w, self, value)
            }
            [value, timezone] => {
                self.walk(w, value)?;
                w.push(" AT TIME ZONE ");
                self.walk(w, timezone)
            }
            _ => Err(TranslateError::ParseRejected {
                detail: "timestamp() requires 1 or 2 arguments".to_string(),
            }),
        }
    }

    fn write_duration_fn(&mut self, w: &mut SqlWriter, arg: &Expr) -> TranslateResult<()> {
        let nanos = match arg.as_literal() {
            Some(Literal::String(raw)) => parse_duration(raw)?,
            Some(Literal::Duration(nanos)) => *nanos,
            _ => {
                return Err(TranslateError::TypeMismatch {
                    detail: "duration() requires a string literal argument".to_string(),
                })
            }
        };
        let (value, unit) = coarsest_unit(nanos);
        self.dialect.write_duration(w, value, unit);
        Ok(())
    }

    fn write_interval_fn(
        &mut self,
        w: &mut SqlWriter,
        value: &Expr,
        unit: &Expr,
    ) -> TranslateResult<()> {
        let unit_name = match &unit.kind {
            ExprKind::Ident(name) => name.as_str(),
            ExprKind::Literal(Literal::String(name)) => name.as_str(),
            _ => {
                return Err(TranslateError::TypeMismatch {
                    detail: "interval() requires a unit identifier".to_string(),
                })
            }
        };
        if unit_name.is_empty() || !unit_name.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(TranslateError::TypeMismatch {
                detail: format!("invalid interval unit '{unit_name}'"),
            });
        }
        let d = self.dialect;
        d.write_interval(w, self, value, &unit_name.to_ascii_uppercase())
    }

    fn write_timestamp_accessor(
        &mut self,
        w: &mut SqlWriter,
        recv: &Expr,
        method: &str,
        args: &[Expr],
    ) -> TranslateResult<()> {
        let part = match method {
            "getFullYear" => DatePart::Year,
            "getMonth" => DatePart::Month,
            "getDate" | "getDayOfMonth" => DatePart::Day,
            "getHours" => DatePart::Hour,
            "getMinutes" => DatePart::Minute,
            "getSeconds" => DatePart::Second,
            "getMilliseconds" => DatePart::Milliseconds,
            "getDayOfYear" => DatePart::DayOfYear,
            "getDayOfWeek" => DatePart::DayOfWeek,
            _ => {
                return Err(TranslateError::Internal {
                    detail: format!("unmapped timestamp accessor '{method}'"),
                })
            }
        };
        if args.len() > 1 {
            return Err(TranslateError::ParseRejected {
                detail: format!("{method}() accepts at most one timezone argument"),
            });
        }
        let d = self.dialect;
        d.write_extract(w, self, part, recv, args.first())?;
        // CEL exposes these components 0-based.
        if matches!(method, "getMonth" | "getDayOfMonth" | "getDayOfYear") {
            w.push(" - 1");
        }
        Ok(())
    }

    // ---- String positional functions ----

    fn write_char_at(&mut self, w: &mut SqlWriter, recv: &Expr, arg: &Expr) -> TranslateResult<()> {
        w.push("SUBSTRING(");
        self.walk(w, recv)?;
        w.push(", ");
        if let Some(Literal::Int(idx)) = arg.as_literal() {
            w.push(&(idx + 1).to_string());
        } else {
            self.walk(w, arg)?;
            w.push(" + 1");
        }
        w.push(", 1)");
        Ok(())
    }

    fn write_index_of(
        &mut self,
        w: &mut SqlWriter,
        recv: &Expr,
        args: &[Expr],
    ) -> TranslateResult<()> {
        if args.is_empty() || args.len() > 2 {
            return Err(TranslateError::ParseRejected {
                detail: "indexOf() requires 1 or 2 arguments".to_string(),
            });
        }
        let needle = &args[0];
        if args.len() == 1 {
            w.push("CASE WHEN POSITION(");
            self.walk(w, needle)?;
            w.push(" IN ");
            self.walk(w, recv)?;
            w.push(") > 0 THEN POSITION(");
            self.walk(w, needle)?;
            w.push(" IN ");
            self.walk(w, recv)?;
            w.push(") - 1 ELSE -1 END");
            return Ok(());
        }
        let offset = &args[1];
        if let Some(Literal::Int(off)) = offset.as_literal() {
            let from = (off + 1).to_string();
            w.push("CASE WHEN POSITION(");
            self.walk(w, needle)?;
            w.push(" IN SUBSTRING(");
            self.walk(w, recv)?;
            w.push(", ");
            w.push(&from);
            w.push(")) > 0 THEN POSITION(");
            self.walk(w, needle)?;
            w.push(" IN SUBSTRING(");
            self.walk(w, recv)?;
            w.push(", ");
            w.push(&from);
            w.push(")) + ");
            w.push(&off.to_string());
            w.push(" - 1 ELSE -1 END");
        } else {
            w.push("CASE WHEN POSITION(");
            self.walk(w, needle)?;
            w.push(" IN SUBSTRING(");
            self.walk(w, recv)?;
            w.push(", ");
            self.walk(w, offset)?;
            w.push(" + 1)) > 0 THEN POSITION(");
            self.walk(w, needle)?;
            w.push(" IN SUBSTRING(");
            self.walk(w, recv)?;
            w.push(", ");
            self.walk(w, offset)?;
            w.push(" + 1)) + ");
            self.walk(w, offset)?;
            w.push(" - 1 ELSE -1 END");
        }
        Ok(())
    }

    fn write_last_index_of(
        &mut self,
        w: &mut SqlWriter,
        recv: &Expr,
        args: &[Expr],
    ) -> TranslateResult<()> {
        if args.is_empty() {
            return Err(TranslateError::ParseRejected {
                detail: "lastIndexOf() requires at least 1 argument".to_string(),
            });
        }
        let needle = &args[0];
        w.push("CASE WHEN POSITION(REVERSE(");
        self.walk(w, needle)?;
        w.push(") IN REVERSE(");
        self.walk(w, recv)?;
        w.push(")) > 0 THEN LENGTH(");
        self.walk(w, recv)?;
        w.push(") - POSITION(REVERSE(");
        self.walk(w, needle)?;
        w.push(") IN REVERSE(");
        self.walk(w, recv)?;
        w.push(")) - LENGTH(");
        self.walk(w, needle)?;
        w.push(") + 1 ELSE -1 END");
        Ok(())
    }

    fn write_substring(
        &mut self,
        w: &mut SqlWriter,
        recv: &Expr,
        args: &[Expr],
    ) -> TranslateResult<()> {
        if args.is_empty() || args.len() > 2 {
            return Err(TranslateError::ParseRejected {
                detail: "substring() requires 1 or 2 arguments".to_string(),
            });
        }
        w.push("SUBSTRING(");
        self.walk(w, recv)?;
        w.push(", ");

        let start_lit = match args[0].as_literal() {
            Some(Literal::Int(v)) => Some(*v),
            _ => None,
        };
        if args.len() == 1 {
            match start_lit {
                Some(start) => w.push(&(start + 1).to_string()),
                None => {
                    self.walk(w, &args[0])?;
                    w.push(" + 1");
                }
            }
            w.push(")");
            return Ok(());
        }

        let end_lit = match args[1].as_literal() {
            Some(Literal::Int(v)) => Some(*v),
            _ => None,
        };
        match (start_lit, end_lit) {
            (Some(start), Some(end)) => {
                w.push(&(start + 1).to_string());
                w.push(", ");
                w.push(&(end - start).to_string());
            }
            (Some(start), None) => {
                w.push(&(start + 1).to_string());
                w.push(", ");
                self.walk(w, &args[1])?;
                w.push(&format!(" - ({start})"));
            }
            (None, _) => {
                self.walk(w, &args[0])?;
                w.push(" + 1, ");
                self.walk(w, &args[1])?;
                w.push(" - (");
                self.walk(w, &args[0])?;
                w.push(")");
            }
        }
        w.push(")");
        Ok(())
    }

    fn write_replace(
        &mut self,
        w: &mut SqlWriter,
        recv: &Expr,
        args: &[Expr],
    ) -> TranslateResult<()> {
        if args.len() < 2 || args.len() > 3 {
            return Err(TranslateError::ParseRejected {
                detail: "replace() requires 2 or 3 arguments".to_string(),
            });
        }
        if let Some(limit_arg) = args.get(2) {
            if let Some(Literal::Int(limit)) = limit_arg.as_literal() {
                if *limit != -1 {
                    return Err(TranslateError::UnsupportedFeature {
                        feature: format!("replace() with limit {limit}"),
                    });
                }
            }
        }
        w.push("REPLACE(");
        self.walk(w, recv)?;
        w.push(", ");
        self.walk(w, &args[0])?;
        w.push(", ");
        self.walk(w, &args[1])?;
        w.push(")");
        Ok(())
    }

    fn write_split(&mut self, w: &mut SqlWriter, recv: &Expr, args: &[Expr]) -> TranslateResult<()> {
        if args.is_empty() || args.len() > 2 {
            return Err(TranslateError::ParseRejected {
                detail: "split() requires 1 or 2 arguments".to_string(),
            });
        }
        let d = self.dialect;
        if args.len() == 1 {
            return d.write_split(w, self, recv, &args[0]);
        }
        let Some(Literal::Int(limit)) = args[1].as_literal() else {
            return Err(TranslateError::TypeMismatch {
                detail: "split() limit must be an integer literal".to_string(),
            });
        };
        match *limit {
            -1 => d.write_split(w, self, recv, &args[0]),
            0 => {
                d.write_empty_typed_array(w, "text");
                Ok(())
            }
            1 => {
                d.write_array_literal_open(w);
                self.walk(w, recv)?;
                d.write_array_literal_close(w);
                Ok(())
            }
            limit if limit < -1 => Err(TranslateError::UnsupportedFeature {
                feature: format!("split() with limit {limit}"),
            }),
            limit => d.write_split_with_limit(w, self, recv, &args[0], limit),
        }
    }

    fn write_join(&mut self, w: &mut SqlWriter, recv: &Expr, args: &[Expr]) -> TranslateResult<()> {
        if args.len() > 1 {
            return Err(TranslateError::ParseRejected {
                detail: "join() requires 0 or 1 arguments".to_string(),
            });
        }
        let d = self.dialect;
        d.write_join(w, self, recv, args.first())
    }

    fn write_format(&mut self, w: &mut SqlWriter, recv: &Expr, arg: &Expr) -> TranslateResult<()> {
        let Some(Literal::String(raw_fmt)) = recv.as_literal() else {
            return Err(TranslateError::TypeMismatch {
                detail: "format() requires a string literal receiver".to_string(),
            });
        };
        for caps in FORMAT_SPEC_RE.captures_iter(raw_fmt) {
            let spec = &caps[1];
            if !matches!(spec, "s" | "d" | "f" | "o" | "e" | "E" | "g" | "G") {
                return Err(TranslateError::UnsupportedFeature {
                    feature: format!("format() specifier %{spec}"),
                });
            }
        }
        let sql_fmt = FORMAT_NUMERIC_RE.replace_all(raw_fmt, "%s");
        w.push("FORMAT(");
        self.dialect.write_string_literal(w, &sql_fmt);
        if let ExprKind::List(items) = &arg.kind {
            for item in items {
                w.push(", ");
                self.walk(w, item)?;
            }
        } else {
            w.push(", ");
            self.walk(w, arg)?;
        }
        w.push(")");
        Ok(())
    }

    // ---- Comprehensions ----

    fn write_comprehension(
        &mut self,
        w: &mut SqlWriter,
        comp: &Comprehension,
    ) -> TranslateResult<()> {
        self.limits.enter_comprehension()?;
        let result = self.write_comprehension_inner(w, comp);
        self.limits.exit_comprehension();
        result
    }

    fn write_comprehension_inner(
        &mut self,
        w: &mut SqlWriter,
        comp: &Comprehension,
    ) -> TranslateResult<()> {
        validate_identifier(
            &comp.iter_var,
            self.options.max_identifier_length,
            self.dialect,
        )?;

        // Rebinding an in-scope variable gets a synthesized unique alias.
        let shadowed = self
            .scopes
            .iter()
            .any(|s| s.var == comp.iter_var || s.alias == comp.iter_var);
        let alias = if shadowed {
            self.alias_seq += 1;
            format!("{}_{}", comp.iter_var, self.alias_seq)
        } else {
            comp.iter_var.clone()
        };

        self.scopes.push(Scope {
            var: comp.iter_var.clone(),
            alias: alias.clone(),
        });
        let result = self.write_macro(w, comp, &alias);
        self.scopes.pop();
        result
    }

    fn write_macro(
        &mut self,
        w: &mut SqlWriter,
        comp: &Comprehension,
        alias: &str,
    ) -> TranslateResult<()> {
        match classify(comp)? {
            MacroKind::Exists { pred } => {
                w.push("EXISTS (SELECT 1 FROM ");
                self.write_unnest_source(w, &comp.iter_range, alias)?;
                w.push(" WHERE ");
                self.walk(w, pred)?;
                w.push(")");
                Ok(())
            }
            MacroKind::All { pred } => {
                w.push("NOT EXISTS (SELECT 1 FROM ");
                self.write_unnest_source(w, &comp.iter_range, alias)?;
                w.push(" WHERE NOT (");
                self.walk(w, pred)?;
                w.push("))");
                Ok(())
            }
            MacroKind::ExistsOne { pred } => {
                w.push("(SELECT COUNT(*) FROM ");
                self.write_unnest_source(w, &comp.iter_range, alias)?;
                w.push(" WHERE ");
                self.walk(w, pred)?;
                w.push(") = 1");
                Ok(())
            }
            MacroKind::Map { transform, pred } => {
                self.dialect.write_array_subquery_open(w);
                self.walk(w, transform)?;
                self.dialect.write_array_subquery_expr_close(w);
                w.push(" FROM ");
                self.write_unnest_source(w, &comp.iter_range, alias)?;
                if let Some(pred) = pred {
                    w.push(" WHERE ");
                    self.walk(w, pred)?;
                }
                w.push(")");
                Ok(())
            }
            MacroKind::Filter { pred } => {
                self.dialect.write_array_subquery_open(w);
                w.push(alias);
                self.dialect.write_array_subquery_expr_close(w);
                w.push(" FROM ");
                self.write_unnest_source(w, &comp.iter_range, alias)?;
                w.push(" WHERE ");
                self.walk(w, pred)?;
                w.push(")");
                Ok(())
            }
        }
    }

    fn write_unnest_source(
        &mut self,
        w: &mut SqlWriter,
        source: &Expr,
        alias: &str,
    ) -> TranslateResult<()> {
        let d = self.dialect;
        d.write_unnest(w, self, source)?;
        w.push(" AS ");
        w.push(alias);
        Ok(())
    }

    // ---- Type-context inference ----

    fn scope_alias(&self, name: &str) -> Option<String> {
        self.scopes
            .iter()
            .rev()
            .find(|s| s.var == name)
            .map(|s| s.alias.clone())
    }

    /// Whether the expression involves a temporal value: a timestamp or
    /// duration literal, a temporal constructor call, or a schema column
    /// with a timestamp storage type.
    fn has_temporal(&self, expr: &Expr) -> bool {
        match &expr.kind {
            ExprKind::Literal(Literal::Timestamp(_) | Literal::Duration(_)) => true,
            ExprKind::Call {
                target,
                function,
                args,
            } => {
                matches!(
                    function.as_str(),
                    "duration"
                        | "interval"
                        | "timestamp"
                        | "date"
                        | "time"
                        | "datetime"
                        | "current_date"
                        | "current_datetime"
                ) || target.as_deref().is_some_and(|t| self.has_temporal(t))
                    || args.iter().any(|a| self.has_temporal(a))
            }
            ExprKind::Ident(name) => {
                self.scope_alias(name).is_none()
                    && self
                        .registry
                        .any_field(name)
                        .is_some_and(|f| f.is_temporal())
            }
            ExprKind::Select { operand, field } => {
                if let ExprKind::Ident(table) = &operand.kind {
                    if let Some(fs) = self.registry.field(table, field) {
                        if fs.is_temporal() {
                            return true;
                        }
                    }
                }
                self.has_temporal(operand)
            }
            ExprKind::Index { operand, index } => {
                self.has_temporal(operand) || self.has_temporal(index)
            }
            ExprKind::Unary { expr, .. } => self.has_temporal(expr),
            ExprKind::Binary { left, right, .. } => {
                self.has_temporal(left) || self.has_temporal(right)
            }
            ExprKind::Ternary {
                cond,
                then_expr,
                else_expr,
            } => {
                self.has_temporal(cond)
                    || self.has_temporal(then_expr)
                    || self.has_temporal(else_expr)
            }
            ExprKind::List(items) => items.iter().any(|i| self.has_temporal(i)),
            _ => false,
        }
    }

    /// Narrower than [`Self::has_temporal`]: the expression itself yields
    /// a timestamp (drives the `int(ts)` epoch rewrite).
    fn is_temporal_value(&self, expr: &Expr) -> bool {
        match &expr.kind {
            ExprKind::Literal(Literal::Timestamp(_)) => true,
            ExprKind::Call { target: None, function, .. } => matches!(
                function.as_str(),
                "timestamp" | "datetime" | "current_datetime"
            ),
            ExprKind::Ident(name) => {
                self.scope_alias(name).is_none()
                    && self
                        .registry
                        .any_field(name)
                        .is_some_and(|f| f.is_temporal())
            }
            ExprKind::Select { operand, field } => {
                if let ExprKind::Ident(table) = &operand.kind {
                    if let Some(fs) = self.registry.field(table, field) {
                        return fs.is_temporal();
                    }
                }
                false
            }
            _ => false,
        }
    }
}

// ---- Free inference helpers ----

fn comparison_sql(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Eq => "=",
        BinaryOp::NotEq => "!=",
        BinaryOp::Lt => "<",
        BinaryOp::LtEq => "<=",
        BinaryOp::Gt => ">",
        BinaryOp::GtEq => ">=",
        _ => unreachable!("comparison_sql on non-comparison operator"),
    }
}

fn is_numeric_literal(expr: &Expr) -> bool {
    matches!(
        expr.as_literal(),
        Some(Literal::Int(_) | Literal::UInt(_) | Literal::Double(_))
    )
}

fn is_list_literal(expr: &Expr) -> bool {
    matches!(&expr.kind, ExprKind::List(_))
}

/// Whether any leaf of the expression is a string literal (drives the
/// string-concatenation overload of `+`).
fn contains_string_literal(expr: &Expr) -> bool {
    match &expr.kind {
        ExprKind::Literal(Literal::String(_)) => true,
        ExprKind::Literal(_) | ExprKind::Ident(_) => false,
        ExprKind::Select { operand, .. } => contains_string_literal(operand),
        ExprKind::Index { operand, index } => {
            contains_string_literal(operand) || contains_string_literal(index)
        }
        ExprKind::Call { target, args, .. } => {
            target.as_deref().is_some_and(contains_string_literal)
                || args.iter().any(contains_string_literal)
        }
        ExprKind::Unary { expr, .. } => contains_string_literal(expr),
        ExprKind::Binary { left, right, .. } => {
            contains_string_literal(left) || contains_string_literal(right)
        }
        ExprKind::Ternary {
            cond,
            then_expr,
            else_expr,
        } => {
            contains_string_literal(cond)
                || contains_string_literal(then_expr)
                || contains_string_literal(else_expr)
        }
        ExprKind::List(items) => items.iter().any(contains_string_literal),
        ExprKind::Map(entries) => entries.iter().any(|e| contains_string_literal(&e.value)),
        ExprKind::Struct { fields, .. } => {
            fields.iter().any(|f| contains_string_literal(&f.value))
        }
        ExprKind::Comprehension(_) => false,
    }
}

/// Whether the expression is specifically a duration/interval value
/// (used to normalize `duration + timestamp` operand order).
fn is_duration_expr(expr: &Expr) -> bool {
    match &expr.kind {
        ExprKind::Literal(Literal::Duration(_)) => true,
        ExprKind::Call {
            target: None,
            function,
            ..
        } => matches!(function.as_str(), "duration" | "interval"),
        ExprKind::Unary { expr, .. } => is_duration_expr(expr),
        ExprKind::Binary { left, right, .. } => is_duration_expr(left) || is_duration_expr(right),
        ExprKind::Ternary {
            then_expr,
            else_expr,
            ..
        } => is_duration_expr(then_expr) || is_duration_expr(else_expr),
        _ => false,
    }
}

/// Binding strength for parenthesization decisions. Higher binds tighter;
/// forms rendered as function calls or postfix tests are atomic.
fn node_precedence(expr: &Expr) -> u8 {
    match &expr.kind {
        ExprKind::Ternary { .. } => 1,
        ExprKind::Binary { op, .. } => binary_precedence(*op),
        ExprKind::Unary { .. } => precedence_unary(),
        _ => u8::MAX,
    }
}

fn binary_precedence(op: BinaryOp) -> u8 {
    match op {
        BinaryOp::Or => 2,
        BinaryOp::And => 3,
        BinaryOp::Eq
        | BinaryOp::NotEq
        | BinaryOp::Lt
        | BinaryOp::LtEq
        | BinaryOp::Gt
        | BinaryOp::GtEq
        | BinaryOp::In => 4,
        BinaryOp::Add | BinaryOp::Sub => 5,
        BinaryOp::Mul | BinaryOp::Div => 6,
        // Rendered MOD(a, b); atomic as an operand.
        BinaryOp::Mod => u8::MAX,
    }
}

fn precedence_unary() -> u8 {
    7
}

/// Render a double so integral values keep a decimal point
/// (`30.0`, not `30`).
fn format_double(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

fn expect_args<'e>(
    function: &str,
    args: &'e [Expr],
    count: usize,
) -> TranslateResult<&'e [Expr]> {
    if args.len() == count {
        Ok(args)
    } else {
        Err(TranslateError::ParseRejected {
            detail: format!(
                "{function}() requires exactly {count} argument(s), got {}",
                args.len()
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_double() {
        assert_eq!(format_double(30.0), "30.0");
        assert_eq!(format_double(50000.5), "50000.5");
        assert_eq!(format_double(-2.0), "-2.0");
        assert_eq!(format_double(0.25), "0.25");
    }

    #[test]
    fn test_contains_string_literal() {
        assert!(contains_string_literal(&Expr::string("a")));
        assert!(!contains_string_literal(&Expr::int(1)));
        let nested = Expr::binary(BinaryOp::Add, Expr::ident("name"), Expr::string("!"));
        assert!(contains_string_literal(&nested));
    }

    #[test]
    fn test_is_duration_expr() {
        assert!(is_duration_expr(&Expr::call(
            "duration",
            vec![Expr::string("1h")]
        )));
        assert!(is_duration_expr(&Expr::literal(Literal::Duration(1))));
        assert!(!is_duration_expr(&Expr::call(
            "timestamp",
            vec![Expr::string("2021-01-01T00:00:00Z")]
        )));
    }

    #[test]
    fn test_precedence_ordering() {
        assert!(binary_precedence(BinaryOp::Or) < binary_precedence(BinaryOp::And));
        assert!(binary_precedence(BinaryOp::And) < binary_precedence(BinaryOp::Eq));
        assert!(binary_precedence(BinaryOp::Add) < binary_precedence(BinaryOp::Mul));
    }
}
