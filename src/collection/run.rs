//! Single-statement execution with logging
//!
//! Failures are logged with SQL text and parameters, then returned unchanged.

use crate::error::CompatResult;
use crate::observability::Event;
use crate::pool::SqlExecutor;
use crate::query::Statement;
use crate::schema::Table;
use crate::Document;

pub(crate) async fn fetch(
    executor: &dyn SqlExecutor,
    table: Table,
    statement: &Statement,
) -> CompatResult<Vec<Document>> {
    match executor.fetch_all(statement).await {
        Ok(rows) => {
            tracing::debug!(
                event = Event::QueryExecuted.as_str(),
                table = table.name(),
                sql = %statement.sql,
                rows = rows.len(),
                "query executed"
            );
            Ok(rows)
        }
        Err(err) => {
            log_failure(table, statement, &err);
            Err(err)
        }
    }
}

pub(crate) async fn execute(
    executor: &dyn SqlExecutor,
    table: Table,
    statement: &Statement,
) -> CompatResult<u64> {
    match executor.execute(statement).await {
        Ok(affected) => {
            tracing::debug!(
                event = Event::QueryExecuted.as_str(),
                table = table.name(),
                sql = %statement.sql,
                affected,
                "statement executed"
            );
            Ok(affected)
        }
        Err(err) => {
            log_failure(table, statement, &err);
            Err(err)
        }
    }
}

fn log_failure(table: Table, statement: &Statement, err: &crate::error::CompatError) {
    tracing::error!(
        event = Event::QueryFailed.as_str(),
        table = table.name(),
        sql = %statement.sql,
        params = ?statement.params,
        error = %err,
        "query failed"
    );
}
