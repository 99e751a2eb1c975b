//! In-process model of the generated service worker.
//!
//! Runs the same lifecycle and routing policy as the emitted script against a
//! [`Network`] seam and an in-memory [`CacheStorage`], so hosts and tests can
//! exercise offline behavior without a browser.

pub mod cache;
pub mod clients;
pub mod routing;

pub use cache::{CacheStorage, Response, ResponseKind};
pub use clients::{resolve_click, ClickAction, WindowClient};
pub use routing::{cache_key, route, Request, RequestMode, Route};

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::error::FetchError;
use crate::models::command::SKIP_WAITING;
use crate::models::push::Notification;
use crate::services::generator::GeneratorConfig;

/// Live network access from the worker context.
#[async_trait]
pub trait Network: Send + Sync {
    async fn fetch(&self, request: &Request) -> Result<Response, FetchError>;
}

/// Lifecycle position of the worker instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Parsed,
    Installed,
    Activated,
    /// Install failed; the previous worker stays in control.
    Redundant,
}

/// Result of a fetch event.
pub struct FetchResponse {
    pub route: Route,
    pub result: Result<Response, FetchError>,
    /// Background cache write still in flight (the `waitUntil` work).
    pub wait_until: Option<JoinHandle<()>>,
}

impl FetchResponse {
    /// Wait for background work, then hand back the response.
    pub async fn settle(self) -> Result<Response, FetchError> {
        if let Some(task) = self.wait_until {
            if let Err(e) = task.await {
                warn!(error = %e, "background cache write failed");
            }
        }
        self.result
    }
}

pub struct ServiceWorker<N> {
    origin: String,
    config: GeneratorConfig,
    network: Arc<N>,
    caches: CacheStorage,
    state: RwLock<WorkerState>,
    skip_waiting: AtomicBool,
}

impl<N: Network + 'static> ServiceWorker<N> {
    pub fn new(
        origin: impl Into<String>,
        config: GeneratorConfig,
        network: Arc<N>,
        caches: CacheStorage,
    ) -> Self {
        Self {
            origin: origin.into(),
            config,
            network,
            caches,
            state: RwLock::new(WorkerState::Parsed),
            skip_waiting: AtomicBool::new(false),
        }
    }

    pub fn caches(&self) -> &CacheStorage {
        &self.caches
    }

    pub async fn state(&self) -> WorkerState {
        *self.state.read().await
    }

    fn key(&self, url: &str) -> String {
        cache_key(&self.origin, url)
    }

    /// Whether the page asked this worker to skip waiting.
    pub fn skip_waiting_requested(&self) -> bool {
        self.skip_waiting.load(Ordering::SeqCst)
    }

    /// Precache every configured URL. All responses are fetched before
    /// anything is written, so a single failure leaves the store untouched.
    #[instrument(skip(self), fields(cache = %self.config.cache_name))]
    pub async fn install(&self) -> Result<(), FetchError> {
        let mut entries = Vec::with_capacity(self.config.precache_urls.len());
        for url in &self.config.precache_urls {
            let outcome = match self.network.fetch(&Request::get(url.as_str())).await {
                Ok(response) if response.ok() => Ok(response),
                Ok(response) => Err(FetchError::Precache {
                    url: url.clone(),
                    status: response.status,
                }),
                Err(e) => Err(e),
            };
            match outcome {
                Ok(response) => entries.push((self.key(url), response)),
                Err(e) => {
                    warn!(url = %url, error = %e, "install failed");
                    *self.state.write().await = WorkerState::Redundant;
                    return Err(e);
                }
            }
        }

        self.caches.put_all(&self.config.cache_name, entries).await;
        *self.state.write().await = WorkerState::Installed;
        info!(count = self.config.precache_urls.len(), "precached");
        Ok(())
    }

    /// Delete every cache store other than the current one. Returns the deleted names.
    ///
    /// Only an installed worker activates; after a failed install the stores
    /// still serve the worker in control and are left alone.
    #[instrument(skip(self), fields(cache = %self.config.cache_name))]
    pub async fn activate(&self) -> Vec<String> {
        let state = self.state().await;
        if state != WorkerState::Installed {
            warn!(?state, "activate skipped, worker not installed");
            return Vec::new();
        }

        let mut deleted = Vec::new();
        for name in self.caches.keys().await {
            if name != self.config.cache_name && self.caches.delete(&name).await {
                deleted.push(name);
            }
        }
        *self.state.write().await = WorkerState::Activated;
        info!(deleted = deleted.len(), "activated");
        deleted
    }

    /// Only `SKIP_WAITING` is understood; anything else is ignored.
    pub fn handle_message(&self, message: &serde_json::Value) -> bool {
        if message.as_str() == Some(SKIP_WAITING) {
            self.skip_waiting.store(true, Ordering::SeqCst);
            true
        } else {
            false
        }
    }

    pub async fn fetch(&self, request: &Request) -> FetchResponse {
        let route = route(&self.config, request);
        debug!(url = %request.url, ?route, "fetch");
        let cache_name = self.config.cache_name.as_str();
        let key = self.key(&request.url);

        match route {
            Route::NavigationFallback => {
                let shell = self.key(&self.config.navigation_fallback);
                let result = match self.caches.match_in(cache_name, &shell).await {
                    Some(shell) => Ok(shell),
                    None => self.network.fetch(request).await,
                };
                FetchResponse { route, result, wait_until: None }
            }
            Route::NetworkOnly => FetchResponse {
                route,
                result: self.network.fetch(request).await,
                wait_until: None,
            },
            Route::NetworkFirst => match self.network.fetch(request).await {
                Ok(response) => {
                    let wait_until = response.ok().then(|| {
                        let caches = self.caches.clone();
                        let name = cache_name.to_string();
                        let key = key.clone();
                        let copy = response.clone();
                        tokio::spawn(async move { caches.put(&name, &key, copy).await })
                    });
                    FetchResponse { route, result: Ok(response), wait_until }
                }
                Err(e) => {
                    let result = self.caches.match_in(cache_name, &key).await.ok_or(e);
                    FetchResponse { route, result, wait_until: None }
                }
            },
            Route::CacheFirst => {
                let result = match self.caches.match_in(cache_name, &key).await {
                    Some(hit) => Ok(hit),
                    None => self.network.fetch(request).await,
                };
                FetchResponse { route, result, wait_until: None }
            }
        }
    }

    pub fn push(&self, payload: Option<&[u8]>) -> Notification {
        Notification::from_push(payload)
    }

    pub fn notification_click(
        &self,
        notification: &Notification,
        clients: &[WindowClient],
    ) -> ClickAction {
        resolve_click(&self.origin, &notification.data, clients)
    }
}
