/*
 * executor/cli.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Backend command-line clients as query executors.
 */

//! Backend command-line clients.
//!
//! This module provides functions for:
//! - Finding the `duckdb` / `sqlite3` binaries
//! - Building their argument lists
//! - Running them, asynchronously or blocking, and interpreting the output
//!
//! # Finding a binary
//!
//! [`find_binary`] searches in this order:
//! 1. The explicit path from settings (`duckdb-binary`, `sqlite3-binary`)
//! 2. The `DBMD_DUCKDB` / `DBMD_SQLITE3` environment variable
//! 3. System PATH via `which`
//! 4. The bare program name, so a spawn failure reports the OS error
//!
//! # Passing the query
//!
//! No shell is involved, so the query text needs no quoting.
//!
//! - `duckdb <db> -json -c <sql>`: the query is the value of `-c`
//! - `sqlite3 -bail -json <db>`: the query is written to standard input.
//!   sqlite3 treats any positional argument starting with `-` as an
//!   option, which would reject queries opening with a `--` comment.
//!
//! # Output contract
//!
//! Both clients are asked for JSON output. Standard output is interpreted
//! by [`parse_output`]:
//!
//! | stdout | rows |
//! |--------|------|
//! | empty or whitespace | none |
//! | JSON array of objects | one row per object, key order kept |
//! | anything else | one `result` column, one row per non-empty line |

use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Output, Stdio};

use serde_json::Value;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use super::Backend;
use super::row::Row;
use crate::config::Settings;
use crate::error::QueryError;

/// Column name used for plain-text fallback rows.
pub const FALLBACK_COLUMN: &str = "result";

/// Find the command-line client for `backend`.
pub fn find_binary(backend: Backend, settings: &Settings) -> PathBuf {
    let configured = match backend {
        Backend::DuckDb => settings.duckdb_binary.clone(),
        Backend::Sqlite => settings.sqlite3_binary.clone(),
    };
    if let Some(path) = configured {
        return path;
    }

    let env_var = match backend {
        Backend::DuckDb => "DBMD_DUCKDB",
        Backend::Sqlite => "DBMD_SQLITE3",
    };
    if let Some(path) = std::env::var_os(env_var).filter(|v| !v.is_empty()) {
        return PathBuf::from(path);
    }

    which::which(backend.cli_program()).unwrap_or_else(|_| PathBuf::from(backend.cli_program()))
}

/// How a backend client is invoked for one query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientCommand {
    pub args: Vec<OsString>,
    /// Text written to the client's standard input, if any.
    pub stdin: Option<String>,
}

/// Invocation running `sql` against `database` with JSON output.
pub fn client_command(backend: Backend, database: &Path, sql: &str) -> ClientCommand {
    match backend {
        Backend::DuckDb => ClientCommand {
            args: vec![
                database.as_os_str().to_owned(),
                OsString::from("-json"),
                OsString::from("-c"),
                OsString::from(sql),
            ],
            stdin: None,
        },
        Backend::Sqlite => ClientCommand {
            args: vec![
                OsString::from("-bail"),
                OsString::from("-json"),
                database.as_os_str().to_owned(),
            ],
            stdin: Some(sql.to_string()),
        },
    }
}

/// Interpret a client's standard output as result rows.
pub fn parse_output(stdout: &str) -> Vec<Row> {
    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Array(items)) => items
            .into_iter()
            .map(|item| match item {
                Value::Object(map) => Row::from(map),
                other => Row::new().with(FALLBACK_COLUMN, other),
            })
            .collect(),
        _ => plain_text_rows(trimmed),
    }
}

fn plain_text_rows(text: &str) -> Vec<Row> {
    text.lines()
        .filter(|line| !line.is_empty())
        .map(|line| Row::new().with(FALLBACK_COLUMN, line))
        .collect()
}

/// Turn a finished process into rows or a query error.
fn interpret(program: &Path, output: Output) -> Result<Vec<Row>, QueryError> {
    if !output.status.success() {
        return Err(QueryError::new(failure_message(
            program,
            output.status,
            &output.stderr,
        )));
    }
    Ok(parse_output(&String::from_utf8_lossy(&output.stdout)))
}

/// Message for a failed run: standard error if there is any.
fn failure_message(program: &Path, status: ExitStatus, stderr: &[u8]) -> String {
    let stderr = String::from_utf8_lossy(stderr);
    let stderr = stderr.trim();
    if stderr.is_empty() {
        format!("{} exited with {}", program.display(), status)
    } else {
        stderr.to_string()
    }
}

fn spawn_message(program: &Path, err: &std::io::Error) -> String {
    format!("Failed to run {}: {}", program.display(), err)
}

/// Run a query through a backend client, awaiting the process.
pub async fn run(
    backend: Backend,
    program: &Path,
    database: &Path,
    sql: &str,
) -> Result<Vec<Row>, QueryError> {
    debug!(backend = %backend, program = %program.display(), "Spawning backend client");
    let command = client_command(backend, database, sql);
    let mut child = tokio::process::Command::new(program)
        .args(&command.args)
        .stdin(stdin_mode(&command))
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| QueryError::new(spawn_message(program, &e)))?;

    // Feed input while collecting output, so a client that fills its
    // output pipe before reading everything cannot deadlock against us
    let input = child.stdin.take().zip(command.stdin);
    let feed = async move {
        if let Some((mut stdin, input)) = input {
            if let Err(e) = stdin.write_all(input.as_bytes()).await {
                // The exit status and stderr report what went wrong
                debug!(error = %e, "Backend client closed its input early");
            }
        }
    };
    let ((), output) = tokio::join!(feed, child.wait_with_output());
    let output = output.map_err(|e| QueryError::new(spawn_message(program, &e)))?;
    interpret(program, output)
}

/// Run a query through a backend client, blocking the calling thread.
///
/// Used where the caller cannot await (the inline render hook).
pub fn run_blocking(
    backend: Backend,
    program: &Path,
    database: &Path,
    sql: &str,
) -> Result<Vec<Row>, QueryError> {
    debug!(backend = %backend, program = %program.display(), "Running backend client (blocking)");
    let command = client_command(backend, database, sql);
    let mut child = std::process::Command::new(program)
        .args(&command.args)
        .stdin(stdin_mode(&command))
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| QueryError::new(spawn_message(program, &e)))?;

    let writer = match (child.stdin.take(), command.stdin) {
        (Some(mut stdin), Some(input)) => Some(std::thread::spawn(move || {
            if let Err(e) = stdin.write_all(input.as_bytes()) {
                debug!(error = %e, "Backend client closed its input early");
            }
        })),
        _ => None,
    };

    let output = child
        .wait_with_output()
        .map_err(|e| QueryError::new(spawn_message(program, &e)))?;
    if let Some(writer) = writer {
        let _ = writer.join();
    }
    interpret(program, output)
}

fn stdin_mode(command: &ClientCommand) -> Stdio {
    if command.stdin.is_some() {
        Stdio::piped()
    } else {
        Stdio::null()
    }
}
