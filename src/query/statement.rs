//! Statement assembly
//!
//! Glues compiled predicates, assignments and column lists into complete SQL
//! statements. Every statement is a single non-transactional round trip.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use super::filter::CompiledFilter;
use super::update::{CompiledInsert, CompiledUpdate};
use super::value::{ParamBuffer, SqlParam};
use crate::error::{CompatError, CompatResult};
use crate::schema::Table;

/// SQL text with its positional parameters
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<SqlParam>,
}

impl Statement {
    /// Number of distinct `$N` placeholders in the SQL text
    pub fn placeholder_count(&self) -> usize {
        placeholders(&self.sql).into_iter().collect::<BTreeSet<_>>().len()
    }
}

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$(\d+)").expect("placeholder pattern is a valid regex"))
}

/// Every `$N` in `sql`, in order of appearance
pub fn placeholders(sql: &str) -> Vec<usize> {
    placeholder_pattern()
        .captures_iter(sql)
        .filter_map(|caps| caps[1].parse().ok())
        .collect()
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.sql)?;
        if !self.params.is_empty() {
            let rendered: Vec<String> = self.params.iter().map(|p| p.to_string()).collect();
            write!(f, " -- [{}]", rendered.join(", "))?;
        }
        Ok(())
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    /// Document-store style direction: negative means descending
    pub fn from_direction(direction: i64) -> Self {
        if direction < 0 {
            SortOrder::Descending
        } else {
            SortOrder::Ascending
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Ascending => "ASC",
            SortOrder::Descending => "DESC",
        }
    }
}

impl FromStr for SortOrder {
    type Err = CompatError;

    fn from_str(s: &str) -> CompatResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "asc" | "ascending" | "1" => Ok(SortOrder::Ascending),
            "desc" | "descending" | "-1" => Ok(SortOrder::Descending),
            other => Err(CompatError::invalid_document(format!(
                "invalid sort order: {}",
                other
            ))),
        }
    }
}

/// A translated, validated sort key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub column: String,
    pub order: SortOrder,
}

/// How many rows a write may touch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowScope {
    One,
    Many,
}

/// `SELECT * FROM t WHERE p [ORDER BY c ASC] [LIMIT n] [OFFSET m]`
pub fn select(
    table: Table,
    filter: CompiledFilter,
    sort: Option<&SortSpec>,
    limit: Option<u64>,
    skip: Option<u64>,
) -> Statement {
    let mut sql = format!("SELECT * FROM {} WHERE {}", table.name(), filter.predicate);
    if let Some(sort) = sort {
        sql.push_str(&format!(" ORDER BY {} {}", sort.column, sort.order.as_sql()));
    }
    if let Some(limit) = limit {
        sql.push_str(&format!(" LIMIT {}", limit));
    }
    if let Some(skip) = skip {
        sql.push_str(&format!(" OFFSET {}", skip));
    }
    Statement {
        sql,
        params: filter.params,
    }
}

/// `SELECT COUNT(*) AS count FROM t WHERE p`
pub fn count(table: Table, filter: CompiledFilter) -> Statement {
    Statement {
        sql: format!(
            "SELECT COUNT(*) AS count FROM {} WHERE {}",
            table.name(),
            filter.predicate
        ),
        params: filter.params,
    }
}

/// `INSERT INTO t (a, b) VALUES ($1, $2) RETURNING id`
///
/// Text and NULL values headed for non-text columns are cast to the column
/// type.
pub fn insert(table: Table, insert: CompiledInsert) -> Statement {
    if insert.columns.is_empty() {
        return Statement {
            sql: format!("INSERT INTO {} DEFAULT VALUES RETURNING id", table.name()),
            params: Vec::new(),
        };
    }

    let mut params = ParamBuffer::starting_at(1);
    let values: Vec<String> = insert
        .columns
        .iter()
        .zip(insert.params)
        .map(|(column, param)| params.bind_for(table.column_type(column), param))
        .collect();
    Statement {
        sql: format!(
            "INSERT INTO {} ({}) VALUES ({}) RETURNING id",
            table.name(),
            insert.columns.join(", "),
            values.join(", ")
        ),
        params: params.into_params(),
    }
}

/// `UPDATE t SET ... WHERE ...`
///
/// `filter` must have been compiled with its offset just past the SET
/// parameters. Returns `None` for an empty update.
pub fn update(
    table: Table,
    set: CompiledUpdate,
    filter: CompiledFilter,
    scope: RowScope,
) -> Option<Statement> {
    if set.is_empty() {
        return None;
    }

    let sql = format!(
        "UPDATE {} SET {} WHERE {}",
        table.name(),
        set.set_clause(),
        scoped_predicate(table, &filter.predicate, scope)
    );
    let mut params = set.params;
    params.extend(filter.params);
    Some(Statement { sql, params })
}

/// `DELETE FROM t WHERE ...`
pub fn delete(table: Table, filter: CompiledFilter, scope: RowScope) -> Statement {
    Statement {
        sql: format!(
            "DELETE FROM {} WHERE {}",
            table.name(),
            scoped_predicate(table, &filter.predicate, scope)
        ),
        params: filter.params,
    }
}

fn scoped_predicate(table: Table, predicate: &str, scope: RowScope) -> String {
    match scope {
        RowScope::Many => predicate.to_string(),
        RowScope::One => format!(
            "id = (SELECT id FROM {} WHERE {} LIMIT 1)",
            table.name(),
            predicate
        ),
    }
}
