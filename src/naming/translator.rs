//! Bidirectional field-name translation
//!
//! External names are what callers put in filters and documents (camelCase,
//! plus a few legacy spellings). Internal names are column names (snake_case).

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use super::overrides::{self, OverrideSet, Pairs};
use crate::schema::Table;
use crate::Document;

/// Which encode table applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NameContext {
    /// Filters, sort keys and anything not covered below
    Filter,
    /// Insert documents
    Insert,
    /// Update expressions
    Update,
}

impl NameContext {
    pub const ALL: [NameContext; 3] = [NameContext::Filter, NameContext::Insert, NameContext::Update];

    pub fn as_str(&self) -> &'static str {
        match self {
            NameContext::Filter => "filter",
            NameContext::Insert => "insert",
            NameContext::Update => "update",
        }
    }
}

impl fmt::Display for NameContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An override that has no exact inverse in the opposite direction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OverrideMismatch {
    /// Decoding the target column does not give back the external name
    NoDecodeInverse {
        context: NameContext,
        external: &'static str,
        column: &'static str,
        decoded: String,
    },
    /// Encoding the decoded name does not reach the column it came from
    NoEncodeInverse {
        context: NameContext,
        column: &'static str,
        external: &'static str,
        encoded: String,
    },
}

/// Field-name translator bound to one table
#[derive(Debug, Clone, Copy)]
pub struct FieldNameTranslator {
    table: Table,
    overrides: &'static OverrideSet,
}

impl FieldNameTranslator {
    pub fn for_table(table: Table) -> Self {
        Self {
            table,
            overrides: overrides::for_table(table),
        }
    }

    pub fn table(&self) -> Table {
        self.table
    }

    fn encode_pairs(&self, context: NameContext) -> Pairs {
        match context {
            NameContext::Filter => self.overrides.filter,
            NameContext::Insert => self.overrides.insert,
            NameContext::Update => self.overrides.update,
        }
    }

    /// External name -> column name
    pub fn to_internal(&self, name: &str, context: NameContext) -> String {
        match overrides::lookup(self.encode_pairs(context), name) {
            Some(column) => column.to_string(),
            None => camel_to_snake(name),
        }
    }

    /// Column name -> external name
    pub fn to_external_name(&self, column: &str) -> String {
        match overrides::lookup(self.overrides.decode, column) {
            Some(name) => name.to_string(),
            None => snake_to_camel(column),
        }
    }

    /// Renames every key of a result row
    pub fn to_external(&self, row: &Document) -> Document {
        row.iter()
            .map(|(column, value)| (self.to_external_name(column), value.clone()))
            .collect()
    }

    /// Renames keys and parses JSON-text columns back into arrays/objects
    ///
    /// A JSON column whose text does not parse is passed through unchanged.
    pub fn decode_row(&self, row: Document) -> Document {
        row.into_iter()
            .map(|(column, value)| {
                let value = match value {
                    Value::String(text) if self.table.is_json_column(&column) => {
                        serde_json::from_str(&text).unwrap_or(Value::String(text))
                    }
                    other => other,
                };
                (self.to_external_name(&column), value)
            })
            .collect()
    }

    /// Lists every override lacking an exact inverse
    pub fn asymmetric_overrides(&self) -> Vec<OverrideMismatch> {
        let mut mismatches = Vec::new();

        for context in NameContext::ALL {
            for (external, column) in self.encode_pairs(context) {
                let decoded = self.to_external_name(column);
                if decoded != *external {
                    mismatches.push(OverrideMismatch::NoDecodeInverse {
                        context,
                        external,
                        column,
                        decoded,
                    });
                }
            }

            for (column, external) in self.overrides.decode {
                let encoded = self.to_internal(external, context);
                if encoded != *column {
                    mismatches.push(OverrideMismatch::NoEncodeInverse {
                        context,
                        column,
                        external,
                        encoded,
                    });
                }
            }
        }

        mismatches
    }
}

/// `userId` -> `user_id`, `_id` -> `id`
pub fn camel_to_snake(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        if c.is_uppercase() {
            out.push('_');
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out.trim_start_matches('_').to_string()
}

/// `user_id` -> `userId`
pub fn snake_to_camel(name: &str) -> String {
    let mut parts = name.split('_');
    let mut out = parts.next().unwrap_or_default().to_string();
    for part in parts {
        let mut chars = part.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(&chars.as_str().to_lowercase());
        }
    }
    out
}
