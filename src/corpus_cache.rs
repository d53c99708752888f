use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};

/// Time-bounded single-value cache with an explicit clock.
///
/// The caller owns the cache and passes `now`; nothing here reads wall time.
#[derive(Debug, Clone)]
pub struct CorpusCache<T> {
    ttl: Duration,
    entry: Option<CacheEntry<T>>,
}

#[derive(Debug, Clone)]
struct CacheEntry<T> {
    fetched_at: DateTime<Utc>,
    value: T,
}

impl<T> CorpusCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, entry: None }
    }

    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.entry
            .as_ref()
            .is_some_and(|e| now >= e.fetched_at && now - e.fetched_at < self.ttl)
    }

    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.entry.as_ref().map(|e| e.fetched_at)
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    /// Returns the cached value, calling `refresh` first when it is absent or stale.
    ///
    /// A failed refresh falls back to a stale value if there is one.
    pub fn get_or_refresh<F>(&mut self, now: DateTime<Utc>, refresh: F) -> Result<&T>
    where
        F: FnOnce() -> Result<T>,
    {
        if !self.is_fresh(now) {
            match refresh() {
                Ok(value) => {
                    info!(%now, "corpus cache refreshed");
                    self.entry = Some(CacheEntry {
                        fetched_at: now,
                        value,
                    });
                }
                Err(err) => match self.entry.as_ref() {
                    Some(stale) => {
                        warn!(error = %err, fetched_at = %stale.fetched_at, "refresh failed, serving stale corpus");
                    }
                    None => return Err(err),
                },
            }
        }
        match self.entry.as_ref() {
            Some(entry) => Ok(&entry.value),
            None => Err(anyhow::anyhow!("corpus cache empty after refresh")),
        }
    }
}
