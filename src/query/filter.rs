//! Filter compiler
//!
//! Turns a document-style filter into a SQL predicate plus positional
//! parameters. Placeholders start at the caller-supplied offset and stay
//! contiguous through any nesting of `$and` / `$or`.
//!
//! Unknown operators are skipped, not rejected. An empty `$in` / `$nin` list
//! contributes no clause at all. Text and NULL parameters on non-text
//! columns carry a cast to the column's type.

use serde::Serialize;
use serde_json::Value;

use super::ident::checked_column;
use super::value::{ParamBuffer, SqlParam};
use crate::error::{CompatError, CompatResult};
use crate::naming::{FieldNameTranslator, NameContext};
use crate::schema::{ColumnType, Table};
use crate::Document;

/// Predicate matching every row
pub const MATCH_ALL: &str = "TRUE";

/// A compiled WHERE predicate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompiledFilter {
    pub predicate: String,
    pub params: Vec<SqlParam>,
}

impl CompiledFilter {
    pub fn match_all() -> Self {
        Self {
            predicate: MATCH_ALL.to_string(),
            params: Vec::new(),
        }
    }

    pub fn is_match_all(&self) -> bool {
        self.predicate == MATCH_ALL
    }
}

/// Compiles filters for one table
#[derive(Debug, Clone, Copy)]
pub struct FilterCompiler {
    names: FieldNameTranslator,
}

impl FilterCompiler {
    pub fn new(table: Table) -> Self {
        Self {
            names: FieldNameTranslator::for_table(table),
        }
    }

    /// Compiles a filter whose first placeholder is `$param_offset`
    pub fn compile(&self, filter: &Document, param_offset: usize) -> CompatResult<CompiledFilter> {
        let mut params = ParamBuffer::starting_at(param_offset);
        let fragments = self.compile_fragments(filter, &mut params)?;
        Ok(CompiledFilter {
            predicate: join_conjunction(fragments),
            params: params.into_params(),
        })
    }

    /// Like [`compile`](Self::compile) for an arbitrary JSON value
    ///
    /// `null` is treated as the empty filter.
    pub fn compile_value(&self, filter: &Value, param_offset: usize) -> CompatResult<CompiledFilter> {
        match filter {
            Value::Null => Ok(CompiledFilter::match_all()),
            Value::Object(map) => self.compile(map, param_offset),
            other => Err(CompatError::invalid_document(format!(
                "filter must be an object, got {}",
                other
            ))),
        }
    }

    fn compile_fragments(
        &self,
        filter: &Document,
        params: &mut ParamBuffer,
    ) -> CompatResult<Vec<String>> {
        let mut fragments = Vec::new();

        for (key, value) in filter {
            match key.as_str() {
                "$and" => {
                    if let Some(group) = self.compile_group(value, " AND ", params)? {
                        fragments.push(group);
                    }
                }
                "$or" => {
                    if let Some(group) = self.compile_group(value, " OR ", params)? {
                        fragments.push(group);
                    }
                }
                k if k.starts_with('$') => {}
                field => {
                    let column = checked_column(self.names.to_internal(field, NameContext::Filter))?;
                    let column_type = self.names.table().column_type(&column);
                    self.compile_field(&column, column_type, value, params, &mut fragments);
                }
            }
        }

        Ok(fragments)
    }

    /// `((a) OR (b))`; `None` when there is nothing to combine
    fn compile_group(
        &self,
        value: &Value,
        separator: &str,
        params: &mut ParamBuffer,
    ) -> CompatResult<Option<String>> {
        let Some(subexpressions) = value.as_array() else {
            return Ok(None);
        };

        let mut parts = Vec::with_capacity(subexpressions.len());
        for sub in subexpressions {
            if let Value::Object(map) = sub {
                let fragments = self.compile_fragments(map, params)?;
                parts.push(format!("({})", join_conjunction(fragments)));
            }
        }

        if parts.is_empty() {
            return Ok(None);
        }
        Ok(Some(format!("({})", parts.join(separator))))
    }

    fn compile_field(
        &self,
        column: &str,
        column_type: ColumnType,
        value: &Value,
        params: &mut ParamBuffer,
        fragments: &mut Vec<String>,
    ) {
        match value {
            Value::Object(operators) => {
                for (op, operand) in operators {
                    match op.as_str() {
                        "$ne" => {
                            let param = SqlParam::for_column(column, operand);
                            let ph = params.bind_for(column_type, param);
                            fragments.push(format!("{} != {}", column, ph));
                        }
                        "$in" => {
                            let list = in_list(column, column_type, operand, "IN", params);
                            fragments.extend(list);
                        }
                        "$nin" => {
                            let list = in_list(column, column_type, operand, "NOT IN", params);
                            fragments.extend(list);
                        }
                        "$regex" => {
                            let ph = params.bind(SqlParam::from_value(operand));
                            if column_type.is_textual() {
                                fragments.push(format!("{} ~* {}", column, ph));
                            } else {
                                fragments.push(format!("{}::text ~* {}", column, ph));
                            }
                        }
                        _ => {}
                    }
                }
            }
            Value::Array(_) => {
                if let Some(list) = in_list(column, column_type, value, "IN", params) {
                    fragments.push(list);
                }
            }
            literal => {
                let param = SqlParam::for_column(column, literal);
                let ph = params.bind_for(column_type, param);
                fragments.push(format!("{} = {}", column, ph));
            }
        }
    }
}

/// `col IN ($1, $2)`; `None` for an empty or non-list operand
fn in_list(
    column: &str,
    column_type: ColumnType,
    operand: &Value,
    keyword: &str,
    params: &mut ParamBuffer,
) -> Option<String> {
    let items = operand.as_array().filter(|items| !items.is_empty())?;
    let placeholders: Vec<String> = items
        .iter()
        .map(|item| params.bind_for(column_type, SqlParam::for_column(column, item)))
        .collect();
    Some(format!("{} {} ({})", column, keyword, placeholders.join(", ")))
}

fn join_conjunction(fragments: Vec<String>) -> String {
    if fragments.is_empty() {
        MATCH_ALL.to_string()
    } else {
        fragments.join(" AND ")
    }
}
