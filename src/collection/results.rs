//! Write results

use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::Value;

/// Rows touched by a write, as far as this layer reports it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AffectedCount {
    Exact(u64),
    /// Not tracked; serializes as the string `"unknown"`
    Unknown,
}

impl AffectedCount {
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            AffectedCount::Exact(n) => Some(*n),
            AffectedCount::Unknown => None,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, AffectedCount::Unknown)
    }
}

impl fmt::Display for AffectedCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AffectedCount::Exact(n) => write!(f, "{}", n),
            AffectedCount::Unknown => write!(f, "unknown"),
        }
    }
}

impl Serialize for AffectedCount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            AffectedCount::Exact(n) => serializer.serialize_u64(*n),
            AffectedCount::Unknown => serializer.serialize_str("unknown"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsertOneResult {
    pub inserted_id: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UpdateResult {
    pub modified_count: AffectedCount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeleteResult {
    pub deleted_count: AffectedCount,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unknown_serializes_as_sentinel() {
        let result = UpdateResult {
            modified_count: AffectedCount::Unknown,
        };
        assert_eq!(serde_json::to_value(result).unwrap(), json!({"modified_count": "unknown"}));

        let result = DeleteResult {
            deleted_count: AffectedCount::Exact(1),
        };
        assert_eq!(serde_json::to_value(result).unwrap(), json!({"deleted_count": 1}));
    }

    #[test]
    fn test_affected_count_accessors() {
        assert_eq!(AffectedCount::Exact(4).as_u64(), Some(4));
        assert_eq!(AffectedCount::Unknown.as_u64(), None);
        assert!(AffectedCount::Unknown.is_unknown());
        assert_eq!(AffectedCount::Unknown.to_string(), "unknown");
    }
}
