//! Flag status cache.
//!
//! Entries are never invalidated when a flag setting changes. A status update
//! becomes visible to evaluation once the cached entry's TTL has elapsed.

use async_trait::async_trait;
use moka::future::Cache;
use moka::Expiry;
use std::fmt;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Key of a cached flag status.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub project_key: String,
    pub environment: String,
    pub flag: String,
}

impl CacheKey {
    pub fn new(project_key: &str, environment: &str, flag: &str) -> Self {
        Self {
            project_key: project_key.to_string(),
            environment: environment.to_string(),
            flag: flag.to_string(),
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "status:{}:{}:{}", self.project_key, self.environment, self.flag)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    #[error("Cache unavailable: {0}")]
    Unavailable(String),
}

/// TTL-bounded key-value cache of flag statuses.
///
/// Concurrent writers to the same key race and the last write wins.
#[async_trait]
pub trait FlagStatusCache: Send + Sync {
    async fn exists(&self, key: &CacheKey) -> Result<bool, CacheError>;

    async fn get(&self, key: &CacheKey) -> Result<Option<bool>, CacheError>;

    async fn set(&self, key: &CacheKey, value: bool, ttl: Duration) -> Result<(), CacheError>;
}

#[derive(Debug, Clone, Copy)]
struct CachedStatus {
    value: bool,
    ttl: Duration,
}

/// Expires each entry after the TTL it was written with.
struct PerEntryTtl;

impl Expiry<String, CachedStatus> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CachedStatus,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CachedStatus,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// In-process cache backed by moka.
#[derive(Clone)]
pub struct InProcessFlagStatusCache {
    cache: Cache<String, CachedStatus>,
}

impl InProcessFlagStatusCache {
    pub fn new(max_capacity: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(PerEntryTtl)
            .build();

        Self { cache }
    }

    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }
}

#[async_trait]
impl FlagStatusCache for InProcessFlagStatusCache {
    async fn exists(&self, key: &CacheKey) -> Result<bool, CacheError> {
        Ok(self.cache.contains_key(&key.to_string()))
    }

    async fn get(&self, key: &CacheKey) -> Result<Option<bool>, CacheError> {
        Ok(self.cache.get(&key.to_string()).await.map(|s| s.value))
    }

    async fn set(&self, key: &CacheKey, value: bool, ttl: Duration) -> Result<(), CacheError> {
        self.cache
            .insert(key.to_string(), CachedStatus { value, ttl })
            .await;
        Ok(())
    }
}
