use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::persist::PersistError;
use crate::{Request, Response};

pub const DEFAULT_CACHE_NAME: &str = "v1";

/// Entries are keyed by method and absolute URL. Headers play no part.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CacheKey {
    pub method: String,
    pub url: String,
}

impl CacheKey {
    pub fn for_request(request: &Request) -> Self {
        Self {
            method: request.method.to_ascii_uppercase(),
            url: request.url.clone(),
        }
    }
}

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache storage error: {0}")]
    Persist(#[from] PersistError),
    #[error("cache entry {path} is corrupt: {reason}")]
    Corrupt { path: String, reason: String },
    #[error("cache serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("cache task failed: {0}")]
    Task(String),
}

/// A named request/response store, shared by every fetch a worker handles.
/// Concurrent writers to the same key race; the last write wins.
#[async_trait::async_trait]
pub trait DurableCache: Send + Sync {
    fn name(&self) -> &str;

    async fn lookup(&self, request: &Request) -> Result<Option<Response>, CacheError>;

    async fn put(&self, request: &Request, response: &Response) -> Result<(), CacheError>;

    /// Removes the entry for `request`. Removing a missing entry succeeds.
    async fn delete(&self, request: &Request) -> Result<(), CacheError>;

    async fn keys(&self) -> Result<Vec<CacheKey>, CacheError>;
}

/// In-process cache. Lives as long as the worker host.
#[derive(Debug)]
pub struct MemoryCache {
    name: String,
    entries: Mutex<HashMap<CacheKey, Response>>,
}

impl MemoryCache {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_NAME)
    }
}

#[async_trait::async_trait]
impl DurableCache for MemoryCache {
    fn name(&self) -> &str {
        &self.name
    }

    async fn lookup(&self, request: &Request) -> Result<Option<Response>, CacheError> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(&CacheKey::for_request(request)).cloned())
    }

    async fn put(&self, request: &Request, response: &Response) -> Result<(), CacheError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(CacheKey::for_request(request), response.clone());
        Ok(())
    }

    async fn delete(&self, request: &Request) -> Result<(), CacheError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(&CacheKey::for_request(request));
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<CacheKey>, CacheError> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let mut keys: Vec<CacheKey> = entries.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn last_write_wins() {
        let cache = MemoryCache::default();
        let request = Request::get("https://app.test/a.css");

        cache
            .put(&request, &Response::new(200, &request.url, "old"))
            .await
            .unwrap();
        cache
            .put(&request, &Response::new(200, &request.url, "new"))
            .await
            .unwrap();

        let hit = cache.lookup(&request).await.unwrap().unwrap();
        assert_eq!(hit.text(), "new");
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn method_is_part_of_the_key() {
        let cache = MemoryCache::default();
        let get = Request::get("https://app.test/api");
        cache
            .put(&get, &Response::new(200, &get.url, "list"))
            .await
            .unwrap();

        let head = Request::new("head", "https://app.test/api");
        assert!(cache.lookup(&head).await.unwrap().is_none());
        assert!(cache.lookup(&Request::new("get", &get.url)).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn delete_removes_only_the_matching_entry() {
        let cache = MemoryCache::default();
        let a = Request::get("https://app.test/a.css");
        let b = Request::get("https://app.test/b.css");
        cache.put(&a, &Response::new(200, &a.url, "a")).await.unwrap();
        cache.put(&b, &Response::new(200, &b.url, "b")).await.unwrap();

        cache.delete(&a).await.unwrap();
        cache.delete(&a).await.unwrap();

        assert!(cache.lookup(&a).await.unwrap().is_none());
        assert_eq!(cache.len(), 1);
    }
}
