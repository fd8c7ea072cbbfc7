//! Field-name translation between documents and columns
//!
//! Encoding checks a per-table, per-context override table first and falls
//! back to camelCase -> snake_case. Decoding checks a separate override table
//! and falls back to snake_case -> camelCase.
//!
//! The override tables are not inverses of one another. Use
//! [`FieldNameTranslator::asymmetric_overrides`] to list the gaps.

mod overrides;
mod translator;

pub use translator::{
    camel_to_snake, snake_to_camel, FieldNameTranslator, NameContext, OverrideMismatch,
};
