//! Bind parameters and identifier coercion

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::schema::{is_identifier_column, ColumnType};

/// A positional bind parameter
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SqlParam {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    /// Bound as `jsonb`; used by the array operators
    Json(Value),
}

impl SqlParam {
    /// Converts a document value into a parameter
    ///
    /// Lists and maps become JSON text, matching how list-valued columns are
    /// stored. Integers past `i64::MAX` keep their digits as text so the
    /// database rejects them instead of comparing a rounded float.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Null => SqlParam::Null,
            Value::Bool(b) => SqlParam::Bool(*b),
            Value::Number(n) => match (n.as_i64(), n.as_u64()) {
                (Some(i), _) => SqlParam::Int(i),
                (None, Some(_)) => SqlParam::Text(n.to_string()),
                (None, None) => SqlParam::Float(n.as_f64().unwrap_or_default()),
            },
            Value::String(s) => SqlParam::Text(s.clone()),
            Value::Array(_) | Value::Object(_) => SqlParam::Text(value.to_string()),
        }
    }

    /// Converts a value bound for `column`, applying identifier coercion
    pub fn for_column(column: &str, value: &Value) -> Self {
        match coerce_identifier(column, value) {
            Coerced::Converted(id) => SqlParam::Int(id),
            Coerced::Unchanged(original) => SqlParam::from_value(original),
        }
    }
}

impl SqlParam {
    /// Bound as `text` and left for a cast to type
    pub(crate) fn is_untyped(&self) -> bool {
        matches!(self, SqlParam::Null | SqlParam::Text(_))
    }
}

impl fmt::Display for SqlParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlParam::Null => write!(f, "NULL"),
            SqlParam::Bool(b) => write!(f, "{}", b),
            SqlParam::Int(i) => write!(f, "{}", i),
            SqlParam::Float(x) => write!(f, "{}", x),
            SqlParam::Text(s) => write!(f, "{:?}", s),
            SqlParam::Json(v) => write!(f, "{}::jsonb", v),
        }
    }
}

impl From<i64> for SqlParam {
    fn from(value: i64) -> Self {
        SqlParam::Int(value)
    }
}

impl From<bool> for SqlParam {
    fn from(value: bool) -> Self {
        SqlParam::Bool(value)
    }
}

impl From<&str> for SqlParam {
    fn from(value: &str) -> Self {
        SqlParam::Text(value.to_string())
    }
}

/// Accumulates parameters and hands out contiguous `$N` placeholders
#[derive(Debug)]
pub(crate) struct ParamBuffer {
    first: usize,
    params: Vec<SqlParam>,
}

impl ParamBuffer {
    pub(crate) fn starting_at(first: usize) -> Self {
        Self {
            first,
            params: Vec::new(),
        }
    }

    /// Appends a parameter and returns its placeholder
    pub(crate) fn bind(&mut self, param: SqlParam) -> String {
        self.params.push(param);
        format!("${}", self.first + self.params.len() - 1)
    }

    /// Like [`bind`](Self::bind), with a cast when the column's type can't
    /// be inferred from the parameter
    ///
    /// Text and NULL parameters are sent as `text`, which Postgres never
    /// converts implicitly to timestamps, booleans or integers.
    pub(crate) fn bind_for(&mut self, column_type: ColumnType, param: SqlParam) -> String {
        let needs_cast = !column_type.is_textual() && param.is_untyped();
        let placeholder = self.bind(param);
        if needs_cast {
            format!("{}::{}", placeholder, column_type.sql_name())
        } else {
            placeholder
        }
    }

    pub(crate) fn into_params(self) -> Vec<SqlParam> {
        self.params
    }
}

/// Outcome of best-effort identifier coercion
#[derive(Debug, Clone, PartialEq)]
pub enum Coerced<'a> {
    /// A numeric string on an identifier column
    Converted(i64),
    /// Anything else, returned as given
    Unchanged(&'a Value),
}

impl Coerced<'_> {
    pub fn is_converted(&self) -> bool {
        matches!(self, Coerced::Converted(_))
    }
}

/// Coerces numeric strings to integers on identifier columns
pub fn coerce_identifier<'a>(column: &str, value: &'a Value) -> Coerced<'a> {
    if !is_identifier_column(column) {
        return Coerced::Unchanged(value);
    }
    match value {
        Value::String(s) => match s.trim().parse::<i64>() {
            Ok(id) => Coerced::Converted(id),
            Err(_) => Coerced::Unchanged(value),
        },
        _ => Coerced::Unchanged(value),
    }
}
