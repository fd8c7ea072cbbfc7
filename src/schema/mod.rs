//! Table catalog for the compatibility layer
//!
//! Four fixed tables back the document collections. Each carries a column
//! allow-list that the insert path enforces.
//!
//! # Invariants
//!
//! - No insert references a column outside the allow-list
//! - `id` is database-generated and never written by an insert

mod tables;

pub use tables::{is_identifier_column, ColumnType, Table, IDENTIFIER_COLUMNS};
