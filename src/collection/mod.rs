//! Collection facade
//!
//! Presents each fixed table as a document collection with `find_one`,
//! `find`, `insert_one`, `update_one`, `update_many`, `delete_one`,
//! `delete_many` and `count_documents`.
//!
//! # Concurrency
//!
//! Every call is one statement on one pooled connection. A read followed by
//! a write is two calls and can lose updates under concurrent requests; use
//! `$push` / `$addToSet` / `$pull` for list fields instead.

mod cursor;
mod facade;
mod results;
mod run;

pub use cursor::Cursor;
pub use facade::{Collection, Database};
pub use results::{AffectedCount, DeleteResult, InsertOneResult, UpdateResult};
