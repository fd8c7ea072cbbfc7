//! Feature-flag cache
//!
//! [`FeatureFlags`] memoizes answers from a [`FlagSource`]. The cache is an
//! explicit object owned by the caller; there is no process-wide state.
//! Entries never expire on their own, only through [`FeatureFlags::invalidate`]
//! and [`FeatureFlags::clear`].

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use serde_json::Value;

use crate::error::CompatResult;
use crate::observability::Event;
use crate::pool::SqlExecutor;
use crate::query::{SqlParam, Statement};

/// Where flag values come from
#[async_trait]
pub trait FlagSource: Send + Sync {
    /// `None` when the flag is not defined
    async fn load(&self, name: &str) -> CompatResult<Option<bool>>;
}

/// Fixed flag values, for tests and local runs
#[derive(Debug, Clone, Default)]
pub struct StaticFlagSource {
    flags: HashMap<String, bool>,
}

impl StaticFlagSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, enabled: bool) -> Self {
        self.flags.insert(name.into(), enabled);
        self
    }

    /// Parses `"a,b,-c"`: bare names are on, `-` prefixed names are off
    pub fn from_list(list: &str) -> Self {
        let flags = list
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .filter_map(|item| match item.strip_prefix('-') {
                Some(name) => (!name.is_empty()).then(|| (name.to_string(), false)),
                None => Some((item.to_string(), true)),
            })
            .collect();
        Self { flags }
    }
}

#[async_trait]
impl FlagSource for StaticFlagSource {
    async fn load(&self, name: &str) -> CompatResult<Option<bool>> {
        Ok(self.flags.get(name).copied())
    }
}

/// Reads flags from the `feature_flags` table
#[derive(Clone)]
pub struct SqlFlagSource {
    executor: Arc<dyn SqlExecutor>,
}

impl SqlFlagSource {
    pub const LOOKUP_SQL: &'static str =
        "SELECT enabled FROM feature_flags WHERE name = $1 LIMIT 1";

    pub fn new(executor: Arc<dyn SqlExecutor>) -> Self {
        Self { executor }
    }
}

#[async_trait]
impl FlagSource for SqlFlagSource {
    async fn load(&self, name: &str) -> CompatResult<Option<bool>> {
        let statement = Statement {
            sql: Self::LOOKUP_SQL.to_string(),
            params: vec![SqlParam::Text(name.to_string())],
        };
        let rows = self.executor.fetch_all(&statement).await?;
        Ok(rows
            .first()
            .and_then(|row| row.get("enabled"))
            .and_then(Value::as_bool))
    }
}

/// Memoizing flag lookup
pub struct FeatureFlags<S: FlagSource> {
    source: S,
    cache: RwLock<HashMap<String, bool>>,
}

impl<S: FlagSource> FeatureFlags<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Cached answer, or the source's answer (missing flags are off)
    pub async fn is_enabled(&self, name: &str) -> CompatResult<bool> {
        if let Some(enabled) = self.cached(name) {
            return Ok(enabled);
        }

        let enabled = self.source.load(name).await?.unwrap_or(false);
        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_string(), enabled);

        tracing::debug!(event = Event::FlagLoaded.as_str(), flag = name, enabled, "flag loaded");
        Ok(enabled)
    }

    /// Cached value without consulting the source
    pub fn cached(&self, name: &str) -> Option<bool> {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .copied()
    }

    pub fn invalidate(&self, name: &str) {
        let removed = self
            .cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name)
            .is_some();
        if removed {
            tracing::debug!(
                event = Event::FlagCacheInvalidated.as_str(),
                flag = name,
                "flag cache entry dropped"
            );
        }
    }

    pub fn clear(&self) {
        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        let entries = cache.len();
        cache.clear();
        tracing::debug!(
            event = Event::FlagCacheCleared.as_str(),
            entries,
            "flag cache cleared"
        );
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::RecordingExecutor;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        inner: StaticFlagSource,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl FlagSource for CountingSource {
        async fn load(&self, name: &str) -> CompatResult<Option<bool>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.load(name).await
        }
    }

    fn counting(list: &str) -> FeatureFlags<CountingSource> {
        FeatureFlags::new(CountingSource {
            inner: StaticFlagSource::from_list(list),
            calls: AtomicUsize::new(0),
        })
    }

    #[tokio::test]
    async fn test_from_list() {
        let source = StaticFlagSource::from_list(" stories , -reels,,feed ");
        assert_eq!(source.load("stories").await.unwrap(), Some(true));
        assert_eq!(source.load("feed").await.unwrap(), Some(true));
        assert_eq!(source.load("reels").await.unwrap(), Some(false));
        assert_eq!(source.load("chat").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_cache_hit_skips_source() {
        let flags = counting("stories");
        assert!(flags.is_enabled("stories").await.unwrap());
        assert!(flags.is_enabled("stories").await.unwrap());
        assert_eq!(flags.source().calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_missing_flag_is_off_and_cached() {
        let flags = counting("");
        assert!(!flags.is_enabled("chat").await.unwrap());
        assert_eq!(flags.cached("chat"), Some(false));
        assert!(!flags.is_enabled("chat").await.unwrap());
        assert_eq!(flags.source().calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalidate_and_clear_reload() {
        let flags = counting("a,b");
        flags.is_enabled("a").await.unwrap();
        flags.is_enabled("b").await.unwrap();

        flags.invalidate("a");
        assert_eq!(flags.cached("a"), None);
        assert_eq!(flags.cached("b"), Some(true));
        flags.is_enabled("a").await.unwrap();
        assert_eq!(flags.source().calls.load(Ordering::SeqCst), 3);

        flags.clear();
        assert_eq!(flags.cached("b"), None);
        flags.is_enabled("b").await.unwrap();
        assert_eq!(flags.source().calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_sql_source_reads_enabled_column() {
        let executor = Arc::new(RecordingExecutor::new());
        executor.push_json_rows(json!([{"enabled": true}]));
        let flags = FeatureFlags::new(SqlFlagSource::new(executor.clone()));

        assert!(flags.is_enabled("new_feed").await.unwrap());

        let statement = executor.last_statement().unwrap();
        assert_eq!(statement.sql, SqlFlagSource::LOOKUP_SQL);
        assert_eq!(statement.params, vec![SqlParam::Text("new_feed".to_string())]);
    }

    #[tokio::test]
    async fn test_sql_source_error_is_not_cached() {
        let executor = Arc::new(RecordingExecutor::new());
        executor.push_error("relation \"feature_flags\" does not exist");
        let flags = FeatureFlags::new(SqlFlagSource::new(executor.clone()));

        assert!(flags.is_enabled("new_feed").await.is_err());
        assert_eq!(flags.cached("new_feed"), None);
    }
}
