/*
 * executor/sqlite.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * SQLite executor backed by sqlx.
 */

//! SQLite executor.
//!
//! Opens the database read-only through sqlx. Values are mapped by their
//! runtime storage class:
//!
//! | Storage class | Value |
//! |---------------|-------|
//! | NULL | `null` |
//! | INTEGER | number |
//! | REAL | number (non-finite becomes `null`) |
//! | TEXT | string |
//! | BLOB | lowercase hex string |

use std::path::Path;

use async_trait::async_trait;
use serde_json::{Number, Value};
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqliteRow};
use sqlx::{Column, ConnectOptions, Connection, Row as _, TypeInfo, ValueRef};
use tracing::{debug, warn};

use super::Backend;
use super::row::Row;
use super::traits::{QueryExecutor, QueryHandle};
use crate::error::{ConnectionError, QueryError};

/// Probe run at connect time so an invalid file fails as a connection error.
const VALIDATION_QUERY: &str = "SELECT count(*) FROM sqlite_master";

#[derive(Debug, Clone, Default)]
pub struct SqliteExecutor;

impl SqliteExecutor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl QueryExecutor for SqliteExecutor {
    fn backend(&self) -> Backend {
        Backend::Sqlite
    }

    async fn connect(&self, database: &Path) -> Result<Box<dyn QueryHandle>, ConnectionError> {
        debug!(path = %database.display(), "Opening SQLite database read-only");

        let mut conn = SqliteConnectOptions::new()
            .filename(database)
            .read_only(true)
            .create_if_missing(false)
            .connect()
            .await
            .map_err(|e| ConnectionError::new(driver_message(&e)))?;

        // Opening succeeds lazily on garbage files; the first read does not
        if let Err(e) = sqlx::query(VALIDATION_QUERY).fetch_one(&mut conn).await {
            let message = driver_message(&e);
            if let Err(close_err) = conn.close().await {
                warn!(error = %close_err, "Failed to close rejected SQLite connection");
            }
            return Err(ConnectionError::new(message));
        }

        Ok(Box::new(SqliteHandle { conn: Some(conn) }))
    }
}

struct SqliteHandle {
    conn: Option<SqliteConnection>,
}

#[async_trait]
impl QueryHandle for SqliteHandle {
    async fn query(&mut self, sql: &str) -> Result<Vec<Row>, QueryError> {
        let conn = self
            .conn
            .as_mut()
            .ok_or_else(|| QueryError::new("Database connection is closed"))?;

        let rows = sqlx::query(sql)
            .fetch_all(&mut *conn)
            .await
            .map_err(|e| QueryError::new(driver_message(&e)))?;

        debug!(rows = rows.len(), "SQLite query executed");
        rows.iter().map(convert_row).collect()
    }

    async fn close(mut self: Box<Self>) {
        if let Some(conn) = self.conn.take() {
            match conn.close().await {
                Ok(()) => debug!("SQLite connection closed"),
                Err(e) => warn!(error = %e, "Failed to close SQLite connection"),
            }
        }
    }
}

/// The driver's own message, without sqlx's wrapping.
fn driver_message(err: &sqlx::Error) -> String {
    match err {
        sqlx::Error::Database(db) => db.message().to_string(),
        other => other.to_string(),
    }
}

fn convert_row(row: &SqliteRow) -> Result<Row, QueryError> {
    let mut out = Row::new();
    for (index, column) in row.columns().iter().enumerate() {
        out.push(column.name(), convert_value(row, index)?);
    }
    Ok(out)
}

fn convert_value(row: &SqliteRow, index: usize) -> Result<Value, QueryError> {
    let decode_err = |e: sqlx::Error| QueryError::new(driver_message(&e));

    let storage_class = {
        let raw = row.try_get_raw(index).map_err(decode_err)?;
        if raw.is_null() {
            return Ok(Value::Null);
        }
        raw.type_info().name().to_string()
    };

    let value = match storage_class.as_str() {
        "INTEGER" | "BOOLEAN" => Value::from(row.try_get_unchecked::<i64, _>(index).map_err(decode_err)?),
        "REAL" => {
            let f = row.try_get_unchecked::<f64, _>(index).map_err(decode_err)?;
            Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null)
        }
        "BLOB" => Value::String(hex::encode(
            row.try_get_unchecked::<Vec<u8>, _>(index).map_err(decode_err)?,
        )),
        _ => Value::String(row.try_get_unchecked::<String, _>(index).map_err(decode_err)?),
    };
    Ok(value)
}
