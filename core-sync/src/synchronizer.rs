//! # Synchronizer
//!
//! One refresh pass: fetch-or-load, normalize, merge, persist.
//!
//! ## Sources
//!
//! - **Local**: no remote configured. The persisted snapshot is loaded
//!   leniently, every series normalized, and the cache replaced. Nothing is
//!   written back.
//! - **Remote**: films and series are listed concurrently. A failed list
//!   counts as empty; the result is merged with the persisted snapshot, then
//!   replaces the cache and is persisted.
//! - **Fallback**: both lists failed. The persisted snapshot is loaded as-is
//!   (no normalization).
//! - **Unchanged**: nothing usable was loaded; the cache keeps its content.
//!
//! Every path returns the resulting cache; refresh never fails.

use std::sync::Arc;

use core_catalog::{Category, ContentCache, ContentGateway, ContentStore, GatewayError};
use core_runtime::events::{CatalogEvent, EventBus, RefreshSource};
use tracing::{debug, info, instrument, warn};

use crate::local_store::LocalSnapshotStore;
use crate::merge::merge_with_local;

/// Result of one refresh pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshOutcome {
    pub source: RefreshSource,
    pub cache: ContentCache,
}

pub struct Synchronizer {
    gateway: Arc<dyn ContentGateway>,
    local: LocalSnapshotStore,
    store: ContentStore,
    events: EventBus,
}

impl Synchronizer {
    pub fn new(
        gateway: Arc<dyn ContentGateway>,
        local: LocalSnapshotStore,
        store: ContentStore,
        events: EventBus,
    ) -> Self {
        Self {
            gateway,
            local,
            store,
            events,
        }
    }

    pub fn is_remote_configured(&self) -> bool {
        self.gateway.is_configured()
    }

    pub fn store(&self) -> &ContentStore {
        &self.store
    }

    /// Run a refresh and return the resulting cache
    pub async fn refresh(&self) -> ContentCache {
        self.refresh_with_source().await.cache
    }

    /// Run a refresh, reporting where the content came from
    #[instrument(skip(self))]
    pub async fn refresh_with_source(&self) -> RefreshOutcome {
        let source = if self.gateway.is_configured() {
            self.refresh_remote().await
        } else {
            self.refresh_local().await
        };

        let cache = self.store.snapshot();
        debug!(
            source = %source,
            films = cache.films.len(),
            series = cache.series.len(),
            "Refresh finished"
        );
        self.emit(CatalogEvent::RefreshCompleted {
            source,
            films: cache.films.len(),
            series: cache.series.len(),
        });

        RefreshOutcome { source, cache }
    }

    async fn refresh_local(&self) -> RefreshSource {
        match self.local.load_raw().await {
            Some(snapshot) => {
                self.store.replace(snapshot.into_cache());
                RefreshSource::Local
            }
            None => RefreshSource::Unchanged,
        }
    }

    async fn refresh_remote(&self) -> RefreshSource {
        let (films, series) = tokio::join!(
            self.gateway.list(Category::Film),
            self.gateway.list(Category::Serie)
        );

        let (films, series) = match (films, series) {
            (Err(films_err), Err(series_err)) => {
                warn!(
                    films_error = %films_err,
                    series_error = %series_err,
                    "Remote refresh failed, falling back to local snapshot"
                );
                return self.fallback(films_err).await;
            }
            (films, series) => (
                rows_or_empty(Category::Film, films),
                rows_or_empty(Category::Serie, series),
            ),
        };

        let mut cache = ContentCache::new(
            films.iter().map(|row| row.to_film_item()).collect(),
            series.iter().map(|row| row.to_series_item()).collect(),
        );

        if let Some(local) = self.local.load_raw().await {
            let adopted = merge_with_local(&mut cache, &local);
            if adopted > 0 {
                debug!(adopted, "Merged local fields into remote content");
            }
        }

        self.store.replace(cache.clone());
        self.local.persist(&cache).await;
        RefreshSource::Remote
    }

    async fn fallback(&self, error: GatewayError) -> RefreshSource {
        match self.local.load().await {
            Some(cache) => {
                self.store.replace(cache);
                RefreshSource::Fallback
            }
            None => {
                info!("No usable local snapshot; keeping current catalog");
                self.emit(CatalogEvent::RefreshFailed {
                    message: error.to_string(),
                });
                RefreshSource::Unchanged
            }
        }
    }

    fn emit(&self, event: CatalogEvent) {
        // No subscribers is not an error here
        let _ = self.events.emit(event);
    }
}

fn rows_or_empty<T>(category: Category, result: Result<Vec<T>, GatewayError>) -> Vec<T> {
    match result {
        Ok(rows) => rows,
        Err(e) => {
            warn!(category = %category, error = %e, "Remote list failed, treating as empty");
            Vec::new()
        }
    }
}
