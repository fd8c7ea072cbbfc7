//! CLI command implementations
//!
//! The `compile-*` and `names` commands never touch a database; they are
//! pure functions over their arguments. `count` and `find` open a pool from
//! the configuration file or the environment and run one statement.

use std::sync::Arc;

use serde_json::{json, Value};

use crate::collection::Database;
use crate::config::PoolConfig;
use crate::error::{CompatError, CompatResult};
use crate::naming::FieldNameTranslator;
use crate::pool::RecordingExecutor;
use crate::query::{statement, DocumentMutator, FilterCompiler, RowScope, SortOrder};
use crate::schema::Table;

use super::args::{Command, ConnectionArgs};
use super::errors::CliResult;
use super::io::json_arg;

/// Dispatch a parsed command; returns the `data` payload
pub async fn run_command(command: Command) -> CliResult<Value> {
    match command {
        Command::CompileFilter {
            collection,
            filter,
            offset,
        } => {
            let filter = json_arg(filter.as_deref())?;
            Ok(compile_filter(&collection, &filter, offset as usize)?)
        }
        Command::CompileUpdate {
            collection,
            update,
            filter,
            many,
        } => {
            let update = json_arg(update.as_deref())?;
            let filter: Value = serde_json::from_str(&filter)?;
            Ok(compile_update(&collection, &filter, &update, many)?)
        }
        Command::CompileInsert {
            collection,
            document,
        } => {
            let document = json_arg(document.as_deref())?;
            Ok(compile_insert(&collection, &document)?)
        }
        Command::Names { collection } => Ok(names(collection.as_deref())?),
        Command::Count {
            collection,
            filter,
            connection,
        } => {
            let filter = optional_json(filter.as_deref())?;
            let db = connect(&connection).await?;
            let count = db
                .collection_by_name(&collection)?
                .count_documents(&filter)
                .await?;
            Ok(json!({ "count": count }))
        }
        Command::Find {
            collection,
            filter,
            sort,
            order,
            limit,
            skip,
            dry_run,
            connection,
        } => {
            let filter = optional_json(filter.as_deref())?;
            let query = FindQuery {
                filter,
                sort,
                order,
                limit,
                skip,
            };
            if dry_run {
                Ok(preview_find(&collection, query)?)
            } else {
                let db = connect(&connection).await?;
                Ok(find(&db, &collection, query).await?)
            }
        }
    }
}

/// Filters on the command line default to match-all rather than stdin
fn optional_json(arg: Option<&str>) -> CliResult<Value> {
    match arg {
        Some(text) => Ok(serde_json::from_str(text)?),
        None => Ok(json!({})),
    }
}

async fn connect(args: &ConnectionArgs) -> CompatResult<Database> {
    let config = match &args.config {
        Some(path) => PoolConfig::load(path)?,
        None => PoolConfig::from_env()?,
    };
    Database::connect(&config).await
}

/// `compile-filter`: predicate and parameters; `offset` starts at 1
pub fn compile_filter(collection: &str, filter: &Value, offset: usize) -> CompatResult<Value> {
    let table = Table::from_name(collection)?;
    let compiled = FilterCompiler::new(table).compile_value(filter, offset)?;
    Ok(json!({
        "predicate": compiled.predicate,
        "params": compiled.params,
    }))
}

/// `compile-update`: the statement `update_one` / `update_many` would run
pub fn compile_update(
    collection: &str,
    filter: &Value,
    update: &Value,
    many: bool,
) -> CompatResult<Value> {
    let scope = if many { RowScope::Many } else { RowScope::One };
    let db = Database::new(Arc::new(RecordingExecutor::new()));
    let statement = db
        .collection_by_name(collection)?
        .update_statement(filter, update, scope)?;

    Ok(match statement {
        Some(statement) => json!({ "skipped": false, "statement": statement }),
        None => json!({ "skipped": true, "statement": null }),
    })
}

/// `compile-insert`: the statement `insert_one` would run
pub fn compile_insert(collection: &str, document: &Value) -> CompatResult<Value> {
    let table = Table::from_name(collection)?;
    let compiled = DocumentMutator::new(table).compile_insert_value(document)?;
    Ok(json!({ "statement": statement::insert(table, compiled) }))
}

/// `names`: overrides without an exact inverse, per collection
pub fn names(collection: Option<&str>) -> CompatResult<Value> {
    let tables = match collection {
        Some(name) => vec![Table::from_name(name)?],
        None => Table::ALL.to_vec(),
    };

    let mut report = serde_json::Map::new();
    for table in tables {
        let mismatches = FieldNameTranslator::for_table(table).asymmetric_overrides();
        let mismatches = serde_json::to_value(mismatches)
            .map_err(|e| CompatError::invalid_document(e.to_string()))?;
        report.insert(table.name().to_string(), mismatches);
    }
    Ok(Value::Object(report))
}

/// Options shared by `find` and its dry run
#[derive(Debug, Clone)]
pub struct FindQuery {
    pub filter: Value,
    pub sort: Option<String>,
    pub order: SortOrder,
    pub limit: u64,
    pub skip: u64,
}

fn cursor(db: &Database, collection: &str, query: FindQuery) -> CompatResult<crate::collection::Cursor> {
    let mut cursor = db
        .collection_by_name(collection)?
        .find(query.filter)
        .limit(query.limit)
        .skip(query.skip);
    if let Some(field) = query.sort {
        cursor = cursor.sort(field, query.order);
    }
    Ok(cursor)
}

pub fn preview_find(collection: &str, query: FindQuery) -> CompatResult<Value> {
    let db = Database::new(Arc::new(RecordingExecutor::new()));
    let statement = cursor(&db, collection, query)?.to_statement()?;
    Ok(json!({ "statement": statement }))
}

pub async fn find(db: &Database, collection: &str, query: FindQuery) -> CompatResult<Value> {
    let documents = cursor(db, collection, query)?.to_list().await?;
    Ok(Value::Array(documents.into_iter().map(Value::Object).collect()))
}
