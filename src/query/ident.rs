//! Column-name validation
//!
//! Column names are interpolated into SQL text, so anything that is not a
//! plain identifier is refused before it reaches a statement.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::{CompatError, CompatResult};

fn identifier_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern is a valid regex")
    })
}

pub fn is_plain_identifier(name: &str) -> bool {
    identifier_pattern().is_match(name)
}

/// Returns the column unchanged if it is safe to interpolate
pub fn checked_column(column: String) -> CompatResult<String> {
    if is_plain_identifier(&column) {
        Ok(column)
    } else {
        Err(CompatError::invalid_field(column))
    }
}
