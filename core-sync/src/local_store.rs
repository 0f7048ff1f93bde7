//! Local Persistence Adapter
//!
//! The whole catalog lives under one key of the host's [`KeyValueStore`] as
//! a single JSON document. Reads never fail: a missing entry, a storage
//! error or malformed text all mean "no local data".

use std::sync::Arc;

use bridge_traits::storage::KeyValueStore;
use core_catalog::{ContentCache, RawSnapshot};
use tracing::{debug, warn};

use crate::error::Result;

#[derive(Clone)]
pub struct LocalSnapshotStore {
    store: Arc<dyn KeyValueStore>,
    key: String,
}

impl LocalSnapshotStore {
    pub fn new(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    async fn load_text(&self) -> Option<String> {
        match self.store.get_string(&self.key).await {
            Ok(text) => text,
            Err(e) => {
                debug!(key = %self.key, error = %e, "Local snapshot unreadable");
                None
            }
        }
    }

    /// Lenient view of the snapshot, for normalization and merging
    pub async fn load_raw(&self) -> Option<RawSnapshot> {
        let text = self.load_text().await?;
        match RawSnapshot::from_json(&text) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                debug!(key = %self.key, error = %e, "Local snapshot malformed");
                None
            }
        }
    }

    /// The snapshot exactly as stored. Anything that does not decode into
    /// the canonical shape counts as absent.
    pub async fn load(&self) -> Option<ContentCache> {
        let text = self.load_text().await?;
        match serde_json::from_str::<ContentCache>(&text) {
            Ok(cache) => Some(cache),
            Err(e) => {
                debug!(key = %self.key, error = %e, "Local snapshot not in canonical form");
                None
            }
        }
    }

    pub async fn save(&self, cache: &ContentCache) -> Result<()> {
        let text = cache.to_json()?;
        self.store.set_string(&self.key, &text).await?;
        Ok(())
    }

    /// Save, logging instead of propagating failures (quota exhaustion and
    /// the like must not break a write that already succeeded).
    pub async fn persist(&self, cache: &ContentCache) {
        if let Err(e) = self.save(cache).await {
            warn!(key = %self.key, error = %e, "Failed to persist catalog locally");
        }
    }
}
