//! PWA worker: the service worker agent, its durable cache and the network
//! plumbing it intercepts.
mod cache;
mod disk_cache;
mod fetch;
mod host;
mod persist;
mod policy;
mod precache;
mod registration;
mod types;
mod worker;

pub use cache::{CacheError, CacheKey, DurableCache, MemoryCache, DEFAULT_CACHE_NAME};
pub use disk_cache::DiskCache;
pub use fetch::{FetchSettings, Fetcher, ReqwestFetcher};
pub use host::WorkerHandle;
pub use persist::{ensure_dir, AtomicFileWriter, PersistError};
pub use policy::{FetchOutcome, FetchStrategy, ResponseSource};
pub use precache::discover_precache;
pub use registration::{register_and_log, Registration, RegistrationError, ServiceWorkerContainer};
pub use types::{FailureKind, FetchError, Request, Response};
pub use worker::{ServiceWorker, WorkerError};
