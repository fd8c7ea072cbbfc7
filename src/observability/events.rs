//! Observable events
//!
//! Every log line emitted by the crate carries one of these names in its
//! `event` field.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Pool
    /// Pool connected
    PoolConnected,

    // Statements
    /// Statement completed
    QueryExecuted,
    /// Statement failed; SQL text and parameters are attached
    QueryFailed,
    /// Update compiled to an empty SET list and was not sent
    UpdateSkipped,

    // Feature flags
    /// Flag value fetched from its source
    FlagLoaded,
    /// One cached flag dropped
    FlagCacheInvalidated,
    /// Whole flag cache dropped
    FlagCacheCleared,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::PoolConnected => "POOL_CONNECTED",
            Event::QueryExecuted => "QUERY_EXECUTED",
            Event::QueryFailed => "QUERY_FAILED",
            Event::UpdateSkipped => "UPDATE_SKIPPED",
            Event::FlagLoaded => "FLAG_LOADED",
            Event::FlagCacheInvalidated => "FLAG_CACHE_INVALIDATED",
            Event::FlagCacheCleared => "FLAG_CACHE_CLEARED",
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
