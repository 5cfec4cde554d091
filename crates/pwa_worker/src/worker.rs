use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use pwa_core::{LifecycleError, WorkerState};
use pwa_logging::{pwa_debug, pwa_info, pwa_warn};
use thiserror::Error;
use url::Url;

use crate::policy::{self, FetchOutcome, FetchStrategy};
use crate::{CacheError, DurableCache, FetchError, Fetcher, Request};

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("worker is {state}, not active")]
    NotActive { state: WorkerState },
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Cache(#[from] CacheError),
    #[error("precache of {path} failed: {reason}")]
    Precache { path: String, reason: String },
    #[error("another install is already running")]
    InstallInProgress,
    #[error("worker host is gone")]
    HostClosed,
}

/// One service worker instance: lifecycle plus the fetch policy it applies
/// while active.
pub struct ServiceWorker {
    id: u64,
    script_url: Url,
    strategy: FetchStrategy,
    state: Mutex<WorkerState>,
    install_claimed: AtomicBool,
    fetcher: Arc<dyn Fetcher>,
    cache: Arc<dyn DurableCache>,
}

/// Held for the duration of one install; released even if the install
/// future is dropped part way.
struct InstallClaim<'a>(&'a AtomicBool);

impl<'a> InstallClaim<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InstallClaim<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl std::fmt::Debug for ServiceWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceWorker")
            .field("id", &self.id)
            .field("script_url", &self.script_url.as_str())
            .field("strategy", &self.strategy)
            .field("state", &self.state())
            .field("cache", &self.cache.name())
            .finish()
    }
}

impl ServiceWorker {
    pub fn new(
        id: u64,
        script_url: Url,
        strategy: FetchStrategy,
        fetcher: Arc<dyn Fetcher>,
        cache: Arc<dyn DurableCache>,
    ) -> Self {
        Self {
            id,
            script_url,
            strategy,
            state: Mutex::new(WorkerState::Installing),
            install_claimed: AtomicBool::new(false),
            fetcher,
            cache,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn script_url(&self) -> &Url {
        &self.script_url
    }

    pub fn strategy(&self) -> FetchStrategy {
        self.strategy
    }

    pub fn state(&self) -> WorkerState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn cache(&self) -> &Arc<dyn DurableCache> {
        &self.cache
    }

    fn transition(
        &self,
        step: impl FnOnce(WorkerState) -> Result<WorkerState, LifecycleError>,
    ) -> Result<WorkerState, LifecycleError> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        *state = step(*state)?;
        Ok(*state)
    }

    /// Handles the install signal: precache `paths` (resolved against the
    /// script URL), then activate immediately. Either every path is cached
    /// or none is, and a failed install leaves the worker installing.
    /// Only one install runs at a time; a concurrent call is rejected.
    pub async fn install(&self, paths: &[String]) -> Result<(), WorkerError> {
        let Some(_claim) = InstallClaim::acquire(&self.install_claimed) else {
            return Err(WorkerError::InstallInProgress);
        };
        let state = self.state();
        if state != WorkerState::Installing {
            return Err(LifecycleError {
                from: state,
                to: WorkerState::Active,
            }
            .into());
        }

        let mut fetched = Vec::with_capacity(paths.len());
        for path in paths {
            let request = Request::get(path.as_str()).resolve(&self.script_url)?;
            let response = self
                .fetcher
                .fetch(&request)
                .await
                .map_err(|err| WorkerError::Precache {
                    path: path.clone(),
                    reason: err.to_string(),
                })?;
            if !response.is_success() {
                return Err(WorkerError::Precache {
                    path: path.clone(),
                    reason: format!("http status {}", response.status),
                });
            }
            fetched.push((request, response));
        }

        let mut written = Vec::with_capacity(fetched.len());
        for (request, response) in &fetched {
            if let Err(err) = self.cache.put(request, response).await {
                self.discard(&written).await;
                return Err(err.into());
            }
            written.push(request);
            pwa_debug!("precached {}", request.url);
        }

        let state = match self.transition(WorkerState::skip_waiting) {
            Ok(state) => state,
            Err(err) => {
                self.discard(&written).await;
                return Err(err.into());
            }
        };
        pwa_info!(
            "worker {} {} after precaching {} assets",
            self.id,
            state,
            fetched.len()
        );
        Ok(())
    }

    /// Best effort. Failed deletes are logged and skipped.
    async fn discard(&self, written: &[&Request]) {
        for request in written {
            if let Err(err) = self.cache.delete(request).await {
                pwa_warn!("could not discard precached {}: {}", request.url, err);
            }
        }
    }

    /// Intercepts one fetch. Relative URLs resolve against the script URL.
    pub async fn handle_fetch(&self, request: &Request) -> Result<FetchOutcome, WorkerError> {
        let state = self.state();
        if !state.can_intercept_fetch() {
            return Err(WorkerError::NotActive { state });
        }
        let request = request.resolve(&self.script_url)?;
        let outcome = policy::respond(
            self.strategy,
            &request,
            self.fetcher.as_ref(),
            self.cache.as_ref(),
        )
        .await?;
        Ok(outcome)
    }

    /// A newer worker took over this registration.
    pub fn supersede(&self) -> Result<(), WorkerError> {
        let state = self.transition(WorkerState::supersede)?;
        pwa_info!("worker {} {}", self.id, state);
        Ok(())
    }
}
