/*
 * executor/registry.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Registry of query executors, keyed by backend.
 */

//! Registry of query executors.
//!
//! The registry maps each [`Backend`] variant to the executor that serves
//! it. It is created once per transformer and shared; tests replace
//! entries with instrumented executors.

use std::collections::HashMap;
use std::sync::Arc;

use super::Backend;
use super::cli::find_binary;
use super::duckdb::DuckDbExecutor;
use super::sqlite::SqliteExecutor;
use super::traits::QueryExecutor;
use crate::config::Settings;

#[derive(Debug)]
pub struct ExecutorRegistry {
    executors: HashMap<Backend, Arc<dyn QueryExecutor>>,
}

impl ExecutorRegistry {
    /// Create a registry with an executor for every backend.
    pub fn new(settings: &Settings) -> Self {
        let mut registry = Self::empty();
        registry.register(Arc::new(SqliteExecutor::new()));
        registry.register(Arc::new(DuckDbExecutor::new(find_binary(
            Backend::DuckDb,
            settings,
        ))));
        registry
    }

    /// Create an empty registry (for testing).
    pub fn empty() -> Self {
        Self {
            executors: HashMap::new(),
        }
    }

    /// Register an executor under its backend, replacing any previous one.
    pub fn register(&mut self, executor: Arc<dyn QueryExecutor>) {
        self.executors.insert(executor.backend(), executor);
    }

    pub fn get(&self, backend: Backend) -> Option<Arc<dyn QueryExecutor>> {
        self.executors.get(&backend).cloned()
    }

    pub fn len(&self) -> usize {
        self.executors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.executors.is_empty()
    }
}

impl std::fmt::Debug for dyn QueryExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryExecutor")
            .field("backend", &self.backend())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_covers_every_backend() {
        let registry = ExecutorRegistry::new(&Settings::default());
        for backend in Backend::ALL {
            assert!(registry.get(backend).is_some(), "missing {backend}");
            assert_eq!(registry.get(backend).unwrap().backend(), backend);
        }
        assert_eq!(registry.len(), Backend::ALL.len());
    }

    #[test]
    fn test_empty() {
        let registry = ExecutorRegistry::empty();
        assert!(registry.is_empty());
        assert!(registry.get(Backend::Sqlite).is_none());
    }

    #[test]
    fn test_register_replaces() {
        let mut registry = ExecutorRegistry::empty();
        registry.register(Arc::new(DuckDbExecutor::new("/a/duckdb")));
        registry.register(Arc::new(DuckDbExecutor::new("/b/duckdb")));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_debug_shows_backend() {
        let registry = ExecutorRegistry::new(&Settings::default());
        let text = format!("{:?}", registry.get(Backend::Sqlite).unwrap());
        assert!(text.contains("Sqlite"));
    }
}
