//! Deferred query builder
//!
//! A cursor only records options. Nothing is compiled or sent until
//! [`Cursor::to_list`], which consumes it.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use super::run::fetch;
use crate::error::CompatResult;
use crate::naming::{FieldNameTranslator, NameContext};
use crate::pool::SqlExecutor;
use crate::query::{checked_column, statement, FilterCompiler, SortOrder, SortSpec, Statement};
use crate::schema::Table;
use crate::Document;

pub struct Cursor {
    table: Table,
    executor: Arc<dyn SqlExecutor>,
    filter: Value,
    sort: Option<(String, SortOrder)>,
    limit: Option<u64>,
    skip: Option<u64>,
}

impl Cursor {
    pub(crate) fn new(table: Table, executor: Arc<dyn SqlExecutor>, filter: Value) -> Self {
        Self {
            table,
            executor,
            filter,
            sort: None,
            limit: None,
            skip: None,
        }
    }

    /// Orders by an external field name; a later call replaces an earlier one
    pub fn sort(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort = Some((field.into(), order));
        self
    }

    /// Caps the row count; `0` means no cap
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = (limit > 0).then_some(limit);
        self
    }

    /// Skips leading rows; `0` means none
    pub fn skip(mut self, skip: u64) -> Self {
        self.skip = (skip > 0).then_some(skip);
        self
    }

    /// Compiles the statement this cursor would run
    pub fn to_statement(&self) -> CompatResult<Statement> {
        let compiled = FilterCompiler::new(self.table).compile_value(&self.filter, 1)?;

        let sort = match &self.sort {
            Some((field, order)) => {
                let names = FieldNameTranslator::for_table(self.table);
                Some(SortSpec {
                    column: checked_column(names.to_internal(field, NameContext::Filter))?,
                    order: *order,
                })
            }
            None => None,
        };

        Ok(statement::select(
            self.table,
            compiled,
            sort.as_ref(),
            self.limit,
            self.skip,
        ))
    }

    /// SQL text only, for previews
    pub fn to_sql(&self) -> CompatResult<String> {
        Ok(self.to_statement()?.sql)
    }

    /// Runs the query and decodes the rows
    pub async fn to_list(self) -> CompatResult<Vec<Document>> {
        let statement = self.to_statement()?;
        let rows = fetch(self.executor.as_ref(), self.table, &statement).await?;
        let names = FieldNameTranslator::for_table(self.table);
        Ok(rows.into_iter().map(|row| names.decode_row(row)).collect())
    }
}

impl fmt::Debug for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("table", &self.table)
            .field("filter", &self.filter)
            .field("sort", &self.sort)
            .field("limit", &self.limit)
            .field("skip", &self.skip)
            .finish()
    }
}
