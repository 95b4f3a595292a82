//! Routing configuration cache.
//!
//! # Responsibilities
//! - Serve the current routing snapshot with bounded staleness (TTL)
//! - Poll the configuration source with the stored continuation token
//! - Keep serving the last good snapshot when the source misbehaves
//!
//! # Concurrency
//! ```text
//! readers ──load──▶ ArcSwapOption<CacheEntry>   (lock-free, never torn)
//! refresher ─lock─▶ Mutex<Option<token>>        (single in-flight fetch)
//!                └─store─▶ ArcSwapOption<CacheEntry>
//! ```
//! A caller that finds a refresh in flight gets the previous snapshot. Only
//! when nothing has ever been cached does it wait for the refresh.

use arc_swap::ArcSwapOption;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{timeout, Instant};

use crate::observability::metrics;
use crate::routing::snapshot::RoutingConfig;
use crate::source::{ConfigFetchError, ConfigSource};

/// A cached snapshot and the time it was last confirmed by the source.
#[derive(Debug)]
pub struct CacheEntry {
    pub snapshot: Arc<RoutingConfig>,
    pub fetched_at: Instant,
}

/// TTL cache over a [`ConfigSource`].
pub struct ConfigCache {
    source: Option<Arc<dyn ConfigSource>>,
    ttl: Duration,
    fetch_timeout: Duration,
    static_default: Arc<RoutingConfig>,
    current: ArcSwapOption<CacheEntry>,
    /// Continuation token. Holding this lock is what makes a caller the refresher.
    token: Mutex<Option<String>>,
    stale: AtomicBool,
    /// Completed refresh attempts, successful or not.
    attempts: AtomicU64,
}

impl ConfigCache {
    pub fn new(
        source: Arc<dyn ConfigSource>,
        ttl: Duration,
        fetch_timeout: Duration,
        static_default_backend: &str,
    ) -> Self {
        Self {
            source: Some(source),
            ttl,
            fetch_timeout,
            static_default: Arc::new(RoutingConfig::static_default(static_default_backend)),
            current: ArcSwapOption::empty(),
            token: Mutex::new(None),
            stale: AtomicBool::new(false),
            attempts: AtomicU64::new(0),
        }
    }

    /// A cache with no source; always serves the static default.
    pub fn static_only(static_default_backend: &str) -> Self {
        Self {
            source: None,
            ttl: Duration::MAX,
            fetch_timeout: Duration::ZERO,
            static_default: Arc::new(RoutingConfig::static_default(static_default_backend)),
            current: ArcSwapOption::empty(),
            token: Mutex::new(None),
            stale: AtomicBool::new(false),
            attempts: AtomicU64::new(0),
        }
    }

    pub fn is_static(&self) -> bool {
        self.source.is_none()
    }

    /// Current routing rules. Never fails.
    pub async fn get_config(&self) -> Arc<RoutingConfig> {
        let Some(source) = self.source.as_ref() else {
            return self.static_default.clone();
        };

        if let Some(snapshot) = self.fresh_snapshot() {
            return snapshot;
        }

        let attempts_seen = self.attempts.load(Ordering::Acquire);
        let mut token = match self.token.try_lock() {
            Ok(guard) => guard,
            Err(_) => {
                if let Some(entry) = self.current.load_full() {
                    tracing::trace!("Refresh in flight, serving previous snapshot");
                    return entry.snapshot.clone();
                }
                self.token.lock().await
            }
        };

        // Another caller may have refreshed while we waited for the lock.
        if let Some(snapshot) = self.fresh_snapshot() {
            return snapshot;
        }
        // Its attempt failed; waiters share that outcome instead of queueing their own.
        if self.attempts.load(Ordering::Acquire) != attempts_seen {
            drop(token);
            return self.snapshot_or_default();
        }

        if let Err(e) = self.refresh(source.as_ref(), &mut token).await {
            tracing::warn!(
                source = %source.describe(),
                error = %e,
                "Config fetch failed, serving last known configuration"
            );
            metrics::record_config_fetch(e.kind());
        }
        drop(token);

        self.snapshot_or_default()
    }

    /// Read accessor for the cached entry, if any.
    pub fn current(&self) -> Option<Arc<CacheEntry>> {
        self.current.load_full()
    }

    /// Force the next read to refetch.
    pub fn invalidate(&self) {
        self.stale.store(true, Ordering::Release);
    }

    fn fresh_snapshot(&self) -> Option<Arc<RoutingConfig>> {
        if self.stale.load(Ordering::Acquire) {
            return None;
        }
        self.current
            .load_full()
            .filter(|entry| entry.fetched_at.elapsed() < self.ttl)
            .map(|entry| entry.snapshot.clone())
    }

    fn snapshot_or_default(&self) -> Arc<RoutingConfig> {
        self.current
            .load_full()
            .map(|entry| entry.snapshot.clone())
            .unwrap_or_else(|| self.static_default.clone())
    }

    async fn refresh(
        &self,
        source: &dyn ConfigSource,
        token: &mut Option<String>,
    ) -> Result<(), ConfigFetchError> {
        let was_stale = self.stale.swap(false, Ordering::AcqRel);
        let result = self.fetch(source, token).await;
        if result.is_err() && was_stale {
            self.stale.store(true, Ordering::Release);
        }
        self.attempts.fetch_add(1, Ordering::AcqRel);
        result
    }

    async fn fetch(
        &self,
        source: &dyn ConfigSource,
        token: &mut Option<String>,
    ) -> Result<(), ConfigFetchError> {
        let current_token = match token.clone() {
            Some(t) => t,
            None => {
                let t = self.bounded(source.start_session()).await?;
                *token = Some(t.clone());
                t
            }
        };

        let outcome = match self.bounded(source.poll(&current_token)).await {
            Err(ConfigFetchError::SessionExpired) => {
                // Start over with a fresh session on the next fetch.
                *token = None;
                return Err(ConfigFetchError::SessionExpired);
            }
            other => other?,
        };

        // The source has moved on; keep its token even if parsing fails below.
        *token = Some(outcome.next_token);
        let fetched_at = Instant::now();

        match outcome.content {
            None => {
                if let Some(previous) = self.current.load_full() {
                    self.current.store(Some(Arc::new(CacheEntry {
                        snapshot: previous.snapshot.clone(),
                        fetched_at,
                    })));
                }
                tracing::debug!("Routing configuration unchanged");
                metrics::record_config_fetch("unchanged");
            }
            Some(bytes) => {
                let snapshot =
                    RoutingConfig::from_document(&bytes, &self.static_default.default_backend)?;
                tracing::info!(
                    default_backend = %snapshot.default_backend,
                    overrides = snapshot.overrides_by_category.len(),
                    "Routing configuration updated"
                );
                self.current.store(Some(Arc::new(CacheEntry {
                    snapshot: Arc::new(snapshot),
                    fetched_at,
                })));
                metrics::record_config_fetch("updated");
            }
        }

        Ok(())
    }

    async fn bounded<T, F>(&self, fut: F) -> Result<T, ConfigFetchError>
    where
        F: Future<Output = Result<T, ConfigFetchError>>,
    {
        timeout(self.fetch_timeout, fut)
            .await
            .map_err(|_| ConfigFetchError::Timeout(self.fetch_timeout))?
    }
}

impl std::fmt::Debug for ConfigCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigCache")
            .field("source", &self.source.as_ref().map(|s| s.describe()))
            .field("ttl", &self.ttl)
            .field("current", &self.current.load_full())
            .finish()
    }
}
