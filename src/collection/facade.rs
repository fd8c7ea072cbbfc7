//! Document-collection facade over the fixed tables
//!
//! Each method compiles one statement, runs it on one pooled connection and
//! decodes the result. Nothing is wrapped in a transaction.
//!
//! Reported counts are deliberately coarse: `update_one` / `delete_one`
//! report 1 whenever a statement ran, the `_many` variants report
//! [`AffectedCount::Unknown`].

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use super::cursor::Cursor;
use super::results::{AffectedCount, DeleteResult, InsertOneResult, UpdateResult};
use super::run::{execute, fetch};
use crate::config::PoolConfig;
use crate::error::{CompatError, CompatResult};
use crate::naming::FieldNameTranslator;
use crate::observability::Event;
use crate::pool::{PgExecutor, SqlExecutor};
use crate::query::{statement, DocumentMutator, FilterCompiler, RowScope, Statement};
use crate::schema::Table;
use crate::Document;

/// One table, presented as a document collection
#[derive(Clone)]
pub struct Collection {
    table: Table,
    executor: Arc<dyn SqlExecutor>,
}

impl Collection {
    pub fn new(table: Table, executor: Arc<dyn SqlExecutor>) -> Self {
        Self { table, executor }
    }

    pub fn table(&self) -> Table {
        self.table
    }

    fn filters(&self) -> FilterCompiler {
        FilterCompiler::new(self.table)
    }

    fn mutator(&self) -> DocumentMutator {
        DocumentMutator::new(self.table)
    }

    fn names(&self) -> FieldNameTranslator {
        FieldNameTranslator::for_table(self.table)
    }

    /// First matching document, if any
    pub async fn find_one(&self, filter: &Value) -> CompatResult<Option<Document>> {
        let compiled = self.filters().compile_value(filter, 1)?;
        let statement = statement::select(self.table, compiled, None, Some(1), None);
        let rows = fetch(self.executor.as_ref(), self.table, &statement).await?;
        Ok(rows.into_iter().next().map(|row| self.names().decode_row(row)))
    }

    /// Deferred query; nothing runs until the cursor is materialized
    pub fn find(&self, filter: Value) -> Cursor {
        Cursor::new(self.table, Arc::clone(&self.executor), filter)
    }

    /// Inserts allow-listed fields and returns the generated id
    pub async fn insert_one(&self, document: &Value) -> CompatResult<InsertOneResult> {
        let compiled = self.mutator().compile_insert_value(document)?;
        let statement = statement::insert(self.table, compiled);
        let rows = fetch(self.executor.as_ref(), self.table, &statement).await?;

        let inserted_id = rows
            .into_iter()
            .next()
            .and_then(|mut row| row.remove("id"))
            .filter(|id| !id.is_null())
            .ok_or_else(|| CompatError::MissingInsertedId(self.table.name().to_string()))?;

        Ok(InsertOneResult { inserted_id })
    }

    /// Reports `1` whether or not a statement was needed
    pub async fn update_one(&self, filter: &Value, update: &Value) -> CompatResult<UpdateResult> {
        if let Some(statement) = self.update_statement(filter, update, RowScope::One)? {
            execute(self.executor.as_ref(), self.table, &statement).await?;
        }
        Ok(UpdateResult {
            modified_count: AffectedCount::Exact(1),
        })
    }

    /// Always reports `"unknown"`, even when nothing was issued
    pub async fn update_many(&self, filter: &Value, update: &Value) -> CompatResult<UpdateResult> {
        if let Some(statement) = self.update_statement(filter, update, RowScope::Many)? {
            execute(self.executor.as_ref(), self.table, &statement).await?;
        }
        Ok(UpdateResult {
            modified_count: AffectedCount::Unknown,
        })
    }

    /// Compiles an update; `None` when it has nothing to set
    pub fn update_statement(
        &self,
        filter: &Value,
        update: &Value,
        scope: RowScope,
    ) -> CompatResult<Option<Statement>> {
        let set = self.mutator().compile_update_value(update, None, 1)?;
        let compiled = self.filters().compile_value(filter, set.params.len() + 1)?;
        let statement = statement::update(self.table, set, compiled, scope);

        if statement.is_none() {
            tracing::debug!(
                event = Event::UpdateSkipped.as_str(),
                table = self.table.name(),
                "update has no fields to set"
            );
        }
        Ok(statement)
    }

    pub async fn delete_one(&self, filter: &Value) -> CompatResult<DeleteResult> {
        let compiled = self.filters().compile_value(filter, 1)?;
        let statement = statement::delete(self.table, compiled, RowScope::One);
        execute(self.executor.as_ref(), self.table, &statement).await?;
        Ok(DeleteResult {
            deleted_count: AffectedCount::Exact(1),
        })
    }

    pub async fn delete_many(&self, filter: &Value) -> CompatResult<DeleteResult> {
        let compiled = self.filters().compile_value(filter, 1)?;
        let statement = statement::delete(self.table, compiled, RowScope::Many);
        execute(self.executor.as_ref(), self.table, &statement).await?;
        Ok(DeleteResult {
            deleted_count: AffectedCount::Unknown,
        })
    }

    pub async fn count_documents(&self, filter: &Value) -> CompatResult<i64> {
        let compiled = self.filters().compile_value(filter, 1)?;
        let statement = statement::count(self.table, compiled);
        let rows = fetch(self.executor.as_ref(), self.table, &statement).await?;
        Ok(rows
            .first()
            .and_then(|row| row.get("count"))
            .and_then(Value::as_i64)
            .unwrap_or(0))
    }
}

impl fmt::Debug for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collection").field("table", &self.table).finish()
    }
}

/// Entry point holding the shared executor
#[derive(Clone)]
pub struct Database {
    executor: Arc<dyn SqlExecutor>,
}

impl Database {
    pub fn new(executor: Arc<dyn SqlExecutor>) -> Self {
        Self { executor }
    }

    /// Opens a PostgreSQL pool and wraps it
    pub async fn connect(config: &PoolConfig) -> CompatResult<Self> {
        let executor = PgExecutor::connect(config).await?;
        Ok(Self::new(Arc::new(executor)))
    }

    pub fn executor(&self) -> Arc<dyn SqlExecutor> {
        Arc::clone(&self.executor)
    }

    pub fn collection(&self, table: Table) -> Collection {
        Collection::new(table, Arc::clone(&self.executor))
    }

    /// Looks a collection up by name
    pub fn collection_by_name(&self, name: &str) -> CompatResult<Collection> {
        Ok(self.collection(Table::from_name(name)?))
    }

    pub fn users(&self) -> Collection {
        self.collection(Table::Users)
    }

    pub fn posts(&self) -> Collection {
        self.collection(Table::Posts)
    }

    pub fn stories(&self) -> Collection {
        self.collection(Table::Stories)
    }

    pub fn notifications(&self) -> Collection {
        self.collection(Table::Notifications)
    }
}

impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database").finish_non_exhaustive()
    }
}
