//! Statement execution
//!
//! [`SqlExecutor`] is the seam between compiled statements and a database.
//! Each call runs exactly one statement on one pooled connection; there is no
//! transaction, retry or timeout beyond what the pool itself enforces.

mod postgres;
mod recording;

pub use postgres::PgExecutor;
pub use recording::RecordingExecutor;

use async_trait::async_trait;

use crate::config::PoolConfig;
use crate::error::CompatResult;
use crate::query::Statement;
use crate::Document;

/// Runs compiled statements
#[async_trait]
pub trait SqlExecutor: Send + Sync {
    /// Runs a row-returning statement; rows come back keyed by column name
    async fn fetch_all(&self, statement: &Statement) -> CompatResult<Vec<Document>>;

    /// Runs a statement and returns the affected row count
    async fn execute(&self, statement: &Statement) -> CompatResult<u64>;
}

/// Opens the shared PostgreSQL pool
pub async fn connect(config: &PoolConfig) -> CompatResult<PgExecutor> {
    PgExecutor::connect(config).await
}
