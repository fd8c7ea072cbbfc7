//! In-memory executor that records statements and replays canned responses
//!
//! Used by tests and by the CLI to show what a facade call would send.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde_json::Value;

use super::SqlExecutor;
use crate::error::{CompatError, CompatResult};
use crate::query::Statement;
use crate::Document;

#[derive(Debug)]
enum Response {
    Rows(Vec<Document>),
    Affected(u64),
    Error(String),
}

#[derive(Debug, Default)]
struct RecorderState {
    statements: Vec<Statement>,
    responses: VecDeque<Response>,
}

/// Records every statement; answers from a FIFO of queued responses
///
/// With nothing queued, `fetch_all` returns no rows and `execute` reports
/// zero affected rows.
#[derive(Debug, Default)]
pub struct RecordingExecutor {
    state: Mutex<RecorderState>,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, RecorderState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queues rows for the next call
    pub fn push_rows(&self, rows: Vec<Document>) {
        self.state().responses.push_back(Response::Rows(rows));
    }

    /// Queues rows given as a JSON array of objects; non-objects are skipped
    pub fn push_json_rows(&self, rows: Value) {
        let rows = match rows {
            Value::Array(items) => items
                .into_iter()
                .filter_map(|item| match item {
                    Value::Object(map) => Some(map),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        };
        self.push_rows(rows);
    }

    /// Queues an affected-row count for the next call
    pub fn push_affected(&self, count: u64) {
        self.state().responses.push_back(Response::Affected(count));
    }

    /// Queues a failure for the next call
    pub fn push_error(&self, message: impl Into<String>) {
        self.state().responses.push_back(Response::Error(message.into()));
    }

    /// Statements seen so far, oldest first
    pub fn statements(&self) -> Vec<Statement> {
        self.state().statements.clone()
    }

    pub fn last_statement(&self) -> Option<Statement> {
        self.state().statements.last().cloned()
    }

    /// Drops recorded statements and queued responses
    pub fn reset(&self) {
        let mut state = self.state();
        state.statements.clear();
        state.responses.clear();
    }

    fn record(&self, statement: &Statement) -> Option<Response> {
        let mut state = self.state();
        state.statements.push(statement.clone());
        state.responses.pop_front()
    }
}

#[async_trait]
impl SqlExecutor for RecordingExecutor {
    async fn fetch_all(&self, statement: &Statement) -> CompatResult<Vec<Document>> {
        match self.record(statement) {
            Some(Response::Rows(rows)) => Ok(rows),
            Some(Response::Error(message)) => Err(CompatError::execution(message)),
            Some(Response::Affected(_)) | None => Ok(Vec::new()),
        }
    }

    async fn execute(&self, statement: &Statement) -> CompatResult<u64> {
        match self.record(statement) {
            Some(Response::Affected(count)) => Ok(count),
            Some(Response::Rows(rows)) => Ok(rows.len() as u64),
            Some(Response::Error(message)) => Err(CompatError::execution(message)),
            None => Ok(0),
        }
    }
}
