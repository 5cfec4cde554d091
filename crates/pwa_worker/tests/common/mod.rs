#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use pwa_worker::{
    CacheError, CacheKey, DurableCache, FailureKind, FetchError, FetchStrategy, Fetcher,
    MemoryCache, Request, Response, ServiceWorker,
};
use url::Url;

pub const ORIGIN: &str = "https://app.test/";

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(pwa_logging::initialize_for_tests);
}

/// Scripted network that counts every request it sees.
#[derive(Default)]
pub struct FakeNetwork {
    routes: Mutex<HashMap<String, (u16, String)>>,
    calls: AtomicUsize,
    seen: Mutex<Vec<String>>,
    latency: Mutex<Option<Duration>>,
}

impl FakeNetwork {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn route(&self, path: &str, status: u16, body: &str) {
        let url = Url::parse(ORIGIN).unwrap().join(path).unwrap().to_string();
        self.routes
            .lock()
            .unwrap()
            .insert(url, (status, body.to_string()));
    }

    /// Every later fetch waits this long before answering.
    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock().unwrap() = Some(latency);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Fetcher for FakeNetwork {
    async fn fetch(&self, request: &Request) -> Result<Response, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(request.url.clone());
        let latency = *self.latency.lock().unwrap();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        match self.routes.lock().unwrap().get(&request.url) {
            Some((status, body)) => Ok(Response::new(*status, &request.url, body.clone())),
            None => Err(FetchError::new(FailureKind::Network, "connection refused")),
        }
    }
}

/// Memory cache that can be told to fail lookups, or every put after the
/// first `puts_allowed`.
pub struct FlakyCache {
    inner: MemoryCache,
    fail_lookups: bool,
    puts_allowed: Option<usize>,
    puts: AtomicUsize,
}

impl FlakyCache {
    pub fn failing_lookups() -> Arc<Self> {
        Arc::new(Self {
            inner: MemoryCache::default(),
            fail_lookups: true,
            puts_allowed: None,
            puts: AtomicUsize::new(0),
        })
    }

    pub fn failing_puts_after(puts_allowed: usize) -> Arc<Self> {
        Arc::new(Self {
            inner: MemoryCache::default(),
            fail_lookups: false,
            puts_allowed: Some(puts_allowed),
            puts: AtomicUsize::new(0),
        })
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }
}

#[async_trait::async_trait]
impl DurableCache for FlakyCache {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn lookup(&self, request: &Request) -> Result<Option<Response>, CacheError> {
        if self.fail_lookups {
            return Err(CacheError::Task("lookup refused".to_string()));
        }
        self.inner.lookup(request).await
    }

    async fn put(&self, request: &Request, response: &Response) -> Result<(), CacheError> {
        let done = self.puts.fetch_add(1, Ordering::SeqCst);
        if self.puts_allowed.is_some_and(|allowed| done >= allowed) {
            return Err(CacheError::Task("disk full".to_string()));
        }
        self.inner.put(request, response).await
    }

    async fn delete(&self, request: &Request) -> Result<(), CacheError> {
        self.inner.delete(request).await
    }

    async fn keys(&self) -> Result<Vec<CacheKey>, CacheError> {
        self.inner.keys().await
    }
}

pub fn worker_with(
    network: Arc<FakeNetwork>,
    cache: Arc<MemoryCache>,
    strategy: FetchStrategy,
) -> ServiceWorker {
    worker_with_cache(network, cache, strategy)
}

pub fn worker_with_cache(
    network: Arc<FakeNetwork>,
    cache: Arc<dyn DurableCache>,
    strategy: FetchStrategy,
) -> ServiceWorker {
    let script = Url::parse(ORIGIN).unwrap().join("/sw.js").unwrap();
    ServiceWorker::new(1, script, strategy, network, cache)
}
