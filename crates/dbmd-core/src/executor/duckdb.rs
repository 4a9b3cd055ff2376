/*
 * executor/duckdb.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * DuckDB executor backed by the duckdb CLI.
 */

//! DuckDB executor.
//!
//! DuckDB is driven through its command-line client: every query is a
//! separate `duckdb <db> -json -c <sql>` process. There is no persistent
//! handle, so connecting only records the database path and any problem
//! with the file surfaces as a query error.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::Backend;
use super::cli;
use super::row::Row;
use super::traits::{QueryExecutor, QueryHandle};
use crate::error::{ConnectionError, QueryError};

#[derive(Debug, Clone)]
pub struct DuckDbExecutor {
    program: PathBuf,
}

impl DuckDbExecutor {
    /// Create an executor that runs the given `duckdb` binary.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

#[async_trait]
impl QueryExecutor for DuckDbExecutor {
    fn backend(&self) -> Backend {
        Backend::DuckDb
    }

    async fn connect(&self, database: &Path) -> Result<Box<dyn QueryHandle>, ConnectionError> {
        Ok(Box::new(DuckDbHandle {
            program: self.program.clone(),
            database: database.to_path_buf(),
        }))
    }
}

struct DuckDbHandle {
    program: PathBuf,
    database: PathBuf,
}

#[async_trait]
impl QueryHandle for DuckDbHandle {
    async fn query(&mut self, sql: &str) -> Result<Vec<Row>, QueryError> {
        cli::run(Backend::DuckDb, &self.program, &self.database, sql).await
    }

    async fn close(self: Box<Self>) {}
}
