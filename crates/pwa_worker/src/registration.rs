use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use pwa_logging::{pwa_info, pwa_warn};
use thiserror::Error;
use url::Url;

use crate::{DurableCache, FetchError, FetchStrategy, Fetcher, Request, ServiceWorker};

#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("invalid service worker script url {url}: {reason}")]
    InvalidScriptUrl { url: String, reason: String },
    #[error("service worker scripts must be served over http(s), got {scheme}")]
    UnsupportedScheme { scheme: String },
    #[error("script {script} is not same-origin with {origin}")]
    CrossOrigin { script: String, origin: String },
    #[error("could not fetch script: {0}")]
    ScriptFetch(#[from] FetchError),
    #[error("script request returned http status {0}")]
    ScriptStatus(u16),
}

#[derive(Debug)]
pub struct Registration {
    pub scope: String,
    pub worker: Arc<ServiceWorker>,
}

/// Page-side registry of service workers, keyed by scope.
pub struct ServiceWorkerContainer {
    origin: Url,
    strategy: FetchStrategy,
    fetcher: Arc<dyn Fetcher>,
    cache: Arc<dyn DurableCache>,
    registrations: Mutex<HashMap<String, Arc<Registration>>>,
    next_id: AtomicU64,
}

impl ServiceWorkerContainer {
    pub fn new(
        origin: Url,
        strategy: FetchStrategy,
        fetcher: Arc<dyn Fetcher>,
        cache: Arc<dyn DurableCache>,
    ) -> Self {
        Self {
            origin,
            strategy,
            fetcher,
            cache,
            registrations: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn origin(&self) -> &Url {
        &self.origin
    }

    /// Fetches the script and installs a fresh worker for its scope. An
    /// existing registration for the same scope is superseded.
    pub async fn register(&self, script_url: &str) -> Result<Arc<Registration>, RegistrationError> {
        let script = self
            .origin
            .join(script_url)
            .map_err(|err| RegistrationError::InvalidScriptUrl {
                url: script_url.to_string(),
                reason: err.to_string(),
            })?;
        if !matches!(script.scheme(), "http" | "https") {
            return Err(RegistrationError::UnsupportedScheme {
                scheme: script.scheme().to_string(),
            });
        }
        if script.origin() != self.origin.origin() {
            return Err(RegistrationError::CrossOrigin {
                script: script.to_string(),
                origin: self.origin.origin().ascii_serialization(),
            });
        }

        let response = self.fetcher.fetch(&Request::get(script.as_str())).await?;
        if !response.is_success() {
            return Err(RegistrationError::ScriptStatus(response.status));
        }

        let scope = default_scope(&script);
        let worker = Arc::new(ServiceWorker::new(
            self.next_id.fetch_add(1, Ordering::Relaxed),
            script,
            self.strategy,
            self.fetcher.clone(),
            self.cache.clone(),
        ));
        let registration = Arc::new(Registration {
            scope: scope.clone(),
            worker,
        });

        let previous = self
            .registrations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(scope, registration.clone());
        if let Some(previous) = previous {
            if !previous.worker.state().is_terminal() {
                let _ = previous.worker.supersede();
            }
        }
        Ok(registration)
    }

    pub fn registration(&self, scope: &str) -> Option<Arc<Registration>> {
        self.registrations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(scope)
            .cloned()
    }

    /// The registration whose scope is the longest prefix of `url`.
    pub fn controller_for(&self, url: &str) -> Option<Arc<Registration>> {
        let url = self.origin.join(url).ok()?;
        self.registrations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|registration| url.as_str().starts_with(&registration.scope))
            .max_by_key(|registration| registration.scope.len())
            .cloned()
    }
}

/// Scope defaults to the script's directory.
fn default_scope(script: &Url) -> String {
    let mut scope = script.clone();
    scope.set_query(None);
    scope.set_fragment(None);
    match scope.join("./") {
        Ok(dir) => dir.to_string(),
        Err(_) => scope.to_string(),
    }
}

/// Fire-and-forget registration: the outcome is only logged.
pub async fn register_and_log(
    container: &ServiceWorkerContainer,
    script_url: &str,
) -> Option<Arc<Registration>> {
    match container.register(script_url).await {
        Ok(registration) => {
            pwa_info!("Registration successful, scope is: {}", registration.scope);
            Some(registration)
        }
        Err(err) => {
            pwa_warn!("Service worker registration failed, error: {}", err);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_is_script_directory() {
        let script = Url::parse("https://app.test/pwa/pwa_service_worker.js?v=3").unwrap();
        assert_eq!(default_scope(&script), "https://app.test/pwa/");

        let root = Url::parse("https://app.test/sw.js").unwrap();
        assert_eq!(default_scope(&root), "https://app.test/");
    }
}
