// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Dialect names
//!
//! The closed set of SQL targets the translator can emit. The syntax of
//! each target lives behind the translator's dialect trait; this enum is
//! only the name, shared by configuration, the translator and the index
//! advisor.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported SQL dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[serde(rename = "postgresql")]
    PostgreSQL,
    #[serde(rename = "duckdb")]
    DuckDB,
    #[serde(rename = "bigquery")]
    BigQuery,
    #[serde(rename = "mysql")]
    MySQL,
    #[serde(rename = "sqlite")]
    SQLite,
}

impl Dialect {
    /// All supported dialects, in documentation order.
    pub const ALL: [Dialect; 5] = [
        Dialect::PostgreSQL,
        Dialect::DuckDB,
        Dialect::BigQuery,
        Dialect::MySQL,
        Dialect::SQLite,
    ];

    /// Canonical lowercase name, as accepted by configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::PostgreSQL => "postgresql",
            Dialect::DuckDB => "duckdb",
            Dialect::BigQuery => "bigquery",
            Dialect::MySQL => "mysql",
            Dialect::SQLite => "sqlite",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a dialect name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownDialect(pub String);

impl fmt::Display for UnknownDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown dialect '{}', expected one of: postgresql, duckdb, bigquery, mysql, sqlite",
            self.0
        )
    }
}

impl std::error::Error for UnknownDialect {}

impl FromStr for Dialect {
    type Err = UnknownDialect;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "postgresql" => Ok(Dialect::PostgreSQL),
            "duckdb" => Ok(Dialect::DuckDB),
            "bigquery" => Ok(Dialect::BigQuery),
            "mysql" => Ok(Dialect::MySQL),
            "sqlite" => Ok(Dialect::SQLite),
            other => Err(UnknownDialect(other.to_string())),
        }
    }
}
