//! Document mutator
//!
//! Compiles update expressions into SET assignments and insert documents into
//! column/value lists.
//!
//! Update forms:
//! - `{"$set": {...}}` and a bare `{...}` mean the same thing
//! - `$push`, `$addToSet`, `$pull` rewrite a JSON-text list column in place,
//!   server side, with a single placeholder each
//!
//! An update with no surviving field compiles to an empty assignment list,
//! which must not be issued: `UPDATE t SET  WHERE` is not SQL.

use serde::Serialize;
use serde_json::Value;

use super::ident::checked_column;
use super::value::{ParamBuffer, SqlParam};
use crate::error::{CompatError, CompatResult};
use crate::naming::{FieldNameTranslator, NameContext};
use crate::schema::Table;
use crate::Document;

/// Server-side list operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayOp {
    /// Append unconditionally
    Push,
    /// Append unless an equal element exists
    AddToSet,
    /// Remove every equal element
    Pull,
}

impl ArrayOp {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "$push" => Some(ArrayOp::Push),
            "$addToSet" => Some(ArrayOp::AddToSet),
            "$pull" => Some(ArrayOp::Pull),
            _ => None,
        }
    }

    /// Assignment expression for `column`, with `ph` bound as jsonb
    fn assignment(&self, column: &str, ph: &str) -> String {
        let current = format!("COALESCE({}::jsonb, '[]'::jsonb)", column);
        match self {
            ArrayOp::Push => format!(
                "{col} = ({cur} || jsonb_build_array({ph}::jsonb))::text",
                col = column,
                cur = current,
                ph = ph
            ),
            ArrayOp::AddToSet => format!(
                "{col} = (SELECT CASE WHEN EXISTS (SELECT 1 FROM jsonb_array_elements(s.cur) AS e(v) WHERE e.v = s.item) \
                 THEN s.cur ELSE s.cur || jsonb_build_array(s.item) END \
                 FROM (SELECT {cur} AS cur, {ph}::jsonb AS item) AS s)::text",
                col = column,
                cur = current,
                ph = ph
            ),
            ArrayOp::Pull => format!(
                "{col} = (SELECT COALESCE(jsonb_agg(t.e ORDER BY t.o), '[]'::jsonb) \
                 FROM jsonb_array_elements({cur}) WITH ORDINALITY AS t(e, o) \
                 WHERE t.e <> {ph}::jsonb)::text",
                col = column,
                cur = current,
                ph = ph
            ),
        }
    }
}

/// Compiled SET assignments
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompiledUpdate {
    pub assignments: Vec<String>,
    pub params: Vec<SqlParam>,
}

impl CompiledUpdate {
    /// `a = $1, b = $2`
    pub fn set_clause(&self) -> String {
        self.assignments.join(", ")
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }
}

/// Compiled INSERT column list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompiledInsert {
    pub columns: Vec<String>,
    pub params: Vec<SqlParam>,
}

/// Compiles updates and inserts for one table
#[derive(Debug, Clone, Copy)]
pub struct DocumentMutator {
    table: Table,
    names: FieldNameTranslator,
}

impl DocumentMutator {
    pub fn new(table: Table) -> Self {
        Self {
            table,
            names: FieldNameTranslator::for_table(table),
        }
    }

    /// Compiles an update expression; placeholders start at `$param_offset`
    ///
    /// With an allow-list, assignments to columns outside it are dropped.
    pub fn compile_update(
        &self,
        update: &Document,
        allow_list: Option<&[&str]>,
        param_offset: usize,
    ) -> CompatResult<CompiledUpdate> {
        let mut params = ParamBuffer::starting_at(param_offset);
        let mut assignments = Vec::new();

        for (key, value) in update {
            if key == "$set" {
                if let Value::Object(fields) = value {
                    for (field, field_value) in fields {
                        if let Some(column) = self.update_column(field, allow_list)? {
                            assignments.push(self.assign(&column, field_value, &mut params));
                        }
                    }
                }
            } else if let Some(op) = ArrayOp::from_token(key) {
                if let Value::Object(fields) = value {
                    for (field, item) in fields {
                        if let Some(column) = self.update_column(field, allow_list)? {
                            let ph = params.bind(SqlParam::Json(item.clone()));
                            assignments.push(op.assignment(&column, &ph));
                        }
                    }
                }
            } else if key.starts_with('$') {
                continue;
            } else if let Some(column) = self.update_column(key, allow_list)? {
                assignments.push(self.assign(&column, value, &mut params));
            }
        }

        Ok(CompiledUpdate {
            assignments,
            params: params.into_params(),
        })
    }

    /// Like [`compile_update`](Self::compile_update) for an arbitrary JSON value
    pub fn compile_update_value(
        &self,
        update: &Value,
        allow_list: Option<&[&str]>,
        param_offset: usize,
    ) -> CompatResult<CompiledUpdate> {
        match update {
            Value::Object(map) => self.compile_update(map, allow_list, param_offset),
            other => Err(CompatError::invalid_document(format!(
                "update must be an object, got {}",
                other
            ))),
        }
    }

    /// `col = $N`, cast to the column's type when the value is text or null
    fn assign(&self, column: &str, value: &Value, params: &mut ParamBuffer) -> String {
        let param = SqlParam::for_column(column, value);
        let ph = params.bind_for(self.table.column_type(column), param);
        format!("{} = {}", column, ph)
    }

    fn update_column(&self, field: &str, allow_list: Option<&[&str]>) -> CompatResult<Option<String>> {
        let column = checked_column(self.names.to_internal(field, NameContext::Update))?;
        Ok(match allow_list {
            Some(allowed) if !allowed.contains(&column.as_str()) => None,
            _ => Some(column),
        })
    }

    /// Compiles an insert document against the table allow-list
    ///
    /// `id` is always dropped. A field repeated under two spellings keeps the
    /// value that came last.
    pub fn compile_insert(&self, document: &Document) -> CompiledInsert {
        let mut columns: Vec<String> = Vec::new();
        let mut params: Vec<SqlParam> = Vec::new();

        for (field, value) in document {
            let column = self.names.to_internal(field, NameContext::Insert);
            if column == "id" || !self.table.has_column(&column) {
                continue;
            }
            let param = SqlParam::for_column(&column, value);
            match columns.iter().position(|c| *c == column) {
                Some(idx) => params[idx] = param,
                None => {
                    columns.push(column);
                    params.push(param);
                }
            }
        }

        CompiledInsert { columns, params }
    }

    pub fn compile_insert_value(&self, document: &Value) -> CompatResult<CompiledInsert> {
        match document {
            Value::Object(map) => Ok(self.compile_insert(map)),
            other => Err(CompatError::invalid_document(format!(
                "document must be an object, got {}",
                other
            ))),
        }
    }
}
