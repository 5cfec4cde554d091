use pwa_logging::{pwa_debug, pwa_warn};
use serde::{Deserialize, Serialize};

use crate::{DurableCache, FetchError, Fetcher, Request, Response};

/// How a worker answers an intercepted fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchStrategy {
    /// Serve cached entries without revalidating; on a miss go to the
    /// network and store successful GET responses.
    #[default]
    CacheFirst,
    /// Pass every request straight through. The cache is never touched.
    NetworkOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseSource {
    Cache,
    Network,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutcome {
    pub response: Response,
    pub source: ResponseSource,
}

pub(crate) async fn respond(
    strategy: FetchStrategy,
    request: &Request,
    fetcher: &dyn Fetcher,
    cache: &dyn DurableCache,
) -> Result<FetchOutcome, FetchError> {
    match strategy {
        FetchStrategy::NetworkOnly => network(request, fetcher).await,
        FetchStrategy::CacheFirst => cache_first(request, fetcher, cache).await,
    }
}

async fn network(request: &Request, fetcher: &dyn Fetcher) -> Result<FetchOutcome, FetchError> {
    let response = fetcher.fetch(request).await?;
    Ok(FetchOutcome {
        response,
        source: ResponseSource::Network,
    })
}

async fn cache_first(
    request: &Request,
    fetcher: &dyn Fetcher,
    cache: &dyn DurableCache,
) -> Result<FetchOutcome, FetchError> {
    match cache.lookup(request).await {
        Ok(Some(response)) => {
            pwa_debug!("cache hit {} {}", request.method, request.url);
            return Ok(FetchOutcome {
                response,
                source: ResponseSource::Cache,
            });
        }
        Ok(None) => {}
        Err(err) => pwa_warn!("cache lookup failed for {}: {}", request.url, err),
    }

    // Network errors propagate to the page untouched.
    let response = fetcher.fetch(request).await?;

    if request.is_get() && response.is_success() {
        let copy = response.clone();
        match cache.put(request, &copy).await {
            Ok(()) => pwa_debug!("cached {} in {}", request.url, cache.name()),
            Err(err) => pwa_warn!("failed to cache {}: {}", request.url, err),
        }
    }

    Ok(FetchOutcome {
        response,
        source: ResponseSource::Network,
    })
}
