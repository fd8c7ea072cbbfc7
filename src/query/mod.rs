//! Query translation subsystem
//!
//! Compiles document-style filters and updates into parameterized SQL.
//!
//! # Flow
//!
//! 1. Translate field names (see [`crate::naming`])
//! 2. Coerce identifier values and convert to bind parameters
//! 3. Emit predicate / assignments with contiguous `$N` placeholders
//! 4. Assemble the final statement
//!
//! # Invariants
//!
//! - Placeholder count equals parameter count
//! - Numbering is contiguous from the caller-supplied offset
//! - Empty `$in` / `$nin` lists never produce `IN ()`

mod filter;
mod ident;
mod update;
mod value;

pub mod statement;

pub use filter::{CompiledFilter, FilterCompiler, MATCH_ALL};
pub use ident::is_plain_identifier;
pub(crate) use ident::checked_column;
pub use statement::{placeholders, RowScope, SortOrder, SortSpec, Statement};
pub use update::{ArrayOp, CompiledInsert, CompiledUpdate, DocumentMutator};
pub use value::{coerce_identifier, Coerced, SqlParam};
