/*
 * executor/traits.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * QueryExecutor and QueryHandle trait definitions.
 */

//! Executor traits.

use std::path::Path;

use async_trait::async_trait;
use tracing::debug;

use super::Backend;
use super::row::Row;
use crate::error::{ConnectionError, QueryError};

/// Opens handles to a database for one backend.
///
/// # Implementation Notes
///
/// - `connect` may defer validation to query time when the backend has no
///   persistent handle (the DuckDB CLI).
/// - Handles must stay valid across await points until closed.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Backend this executor serves.
    fn backend(&self) -> Backend;

    /// Open a handle to the database at `database`.
    ///
    /// # Errors
    ///
    /// Returns `ConnectionError` with the backend's message if the file
    /// cannot be opened as a database.
    async fn connect(&self, database: &Path) -> Result<Box<dyn QueryHandle>, ConnectionError>;
}

/// An open database handle, scoped to one transformation cycle.
#[async_trait]
pub trait QueryHandle: Send {
    /// Execute `sql` and return every result row.
    ///
    /// A valid query with no result rows returns an empty vector, never an
    /// error.
    ///
    /// # Errors
    ///
    /// Returns `QueryError` carrying the backend's error text verbatim.
    async fn query(&mut self, sql: &str) -> Result<Vec<Row>, QueryError>;

    /// Release the handle. Failures are logged, not returned.
    async fn close(self: Box<Self>);
}

/// Close a handle if there is one.
pub async fn close_handle(handle: Option<Box<dyn QueryHandle>>) {
    match handle {
        Some(handle) => handle.close().await,
        None => debug!("No database handle to close"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingHandle {
        closed: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl QueryHandle for CountingHandle {
        async fn query(&mut self, _sql: &str) -> Result<Vec<Row>, QueryError> {
            Ok(Vec::new())
        }

        async fn close(self: Box<Self>) {
            self.closed.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn test_close_handle_some() {
        let closed = Arc::new(AtomicUsize::new(0));
        let handle: Box<dyn QueryHandle> = Box::new(CountingHandle {
            closed: closed.clone(),
        });
        close_handle(Some(handle)).await;
        assert_eq!(closed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_close_handle_none_is_noop() {
        close_handle(None).await;
    }
}
