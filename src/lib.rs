//! docshim - document-store style queries over a relational schema
//!
//! Callers describe queries and updates as nested JSON mappings in the
//! document-store dialect (`$and`, `$or`, `$ne`, `$in`, `$nin`, `$regex`,
//! `$set`, `$push`, `$addToSet`, `$pull`). The crate compiles them into
//! parameterized PostgreSQL statements for four fixed tables (users, posts,
//! stories, notifications), translating camelCase field names to
//! snake_case columns and back.
//!
//! # Layers
//!
//! - [`naming`]: field-name translation with per-table overrides
//! - [`query`]: filter compiler, document mutator, statement assembly
//! - [`pool`]: the executor seam and its PostgreSQL implementation
//! - [`collection`]: the `Collection` / `Database` facade
//! - [`flags`]: feature-flag cache
//!
//! # Example
//!
//! ```ignore
//! use docshim::{config::PoolConfig, collection::Database};
//! use serde_json::json;
//!
//! let db = Database::connect(&PoolConfig::from_env()?).await?;
//! let posts = db.posts()
//!     .find(json!({"userId": "5", "isArchived": {"$ne": true}}))
//!     .limit(20)
//!     .to_list()
//!     .await?;
//! ```

pub mod cli;
pub mod collection;
pub mod config;
pub mod error;
pub mod flags;
pub mod naming;
pub mod observability;
pub mod pool;
pub mod query;
pub mod schema;

/// A JSON object in insertion order; both the input and output shape of
/// every facade call
pub type Document = serde_json::Map<String, serde_json::Value>;

pub use collection::{Collection, Cursor, Database};
pub use error::{CompatError, CompatResult, ErrorCode};
