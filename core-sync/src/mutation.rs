//! # Mutation API
//!
//! Writes to the catalog. With a remote configured, the remote is the
//! source of truth: the cache changes only after the remote write succeeded,
//! and remote failures propagate untouched. Items whose identifier was
//! generated locally never reach the remote.
//!
//! Every successful write persists the whole cache locally.

use std::sync::Arc;

use core_catalog::{
    is_local_id, CatalogItem, Category, ContentGateway, ContentPatchRow, ContentStore,
    GatewayError, ItemPatch, LocalIdGenerator, NewContentRow, NewItem, SeriesItem,
};
use core_runtime::events::{CatalogEvent, EventBus};
use tracing::{debug, info, instrument};

use crate::error::{Result, SyncError};
use crate::local_store::LocalSnapshotStore;

pub struct CatalogMutations {
    gateway: Arc<dyn ContentGateway>,
    local: LocalSnapshotStore,
    store: ContentStore,
    ids: LocalIdGenerator,
    events: EventBus,
}

impl CatalogMutations {
    pub fn new(
        gateway: Arc<dyn ContentGateway>,
        local: LocalSnapshotStore,
        store: ContentStore,
        ids: LocalIdGenerator,
        events: EventBus,
    ) -> Self {
        Self {
            gateway,
            local,
            store,
            ids,
            events,
        }
    }

    fn remote_applies(&self, id: &str) -> bool {
        self.gateway.is_configured() && !is_local_id(id)
    }

    /// Add an item and return its canonical form.
    #[instrument(skip(self, item), fields(title = %item.title))]
    pub async fn add_item(&self, category: Category, item: NewItem) -> Result<CatalogItem> {
        let entry = if self.gateway.is_configured() {
            match self.insert_remote(category, &item).await {
                Ok(entry) => entry,
                Err(SyncError::Gateway(GatewayError::NotConfigured)) => {
                    self.build_local(category, &item)
                }
                Err(e) => return Err(e),
            }
        } else {
            self.build_local(category, &item)
        };

        let (_, cache) = self.store.update(|cache| cache.push(entry.clone()));
        self.local.persist(&cache).await;

        info!(category = %category, item_id = %entry.id(), "Item added");
        let _ = self.events.emit(CatalogEvent::ItemAdded {
            category: category.to_string(),
            id: entry.id().to_string(),
        });
        Ok(entry)
    }

    async fn insert_remote(&self, category: Category, item: &NewItem) -> Result<CatalogItem> {
        let row = NewContentRow::from_new_item(category, item)?;
        let created = self.gateway.insert(&row).await?;

        Ok(match category {
            Category::Film => CatalogItem::Film(created.to_film_item()),
            Category::Serie => {
                let episodes = item.episodes_for(category);
                if episodes.is_empty() {
                    CatalogItem::Serie(created.to_series_item())
                } else {
                    CatalogItem::Serie(SeriesItem::new(created.to_film_item(), episodes))
                }
            }
        })
    }

    fn build_local(&self, category: Category, item: &NewItem) -> CatalogItem {
        let content = item.to_item(category, self.ids.next_id());
        match category {
            Category::Film => CatalogItem::Film(content),
            Category::Serie => {
                CatalogItem::Serie(SeriesItem::new(content, item.episodes_for(category)))
            }
        }
    }

    /// Apply `patch` to an existing item. Returns `false` when no item with
    /// `id` exists; nothing is written in that case.
    #[instrument(skip(self, patch))]
    pub async fn update_item(&self, category: Category, id: &str, patch: ItemPatch) -> Result<bool> {
        match self.apply_update(category, id, &patch).await {
            Ok(()) => Ok(true),
            Err(SyncError::NotFound { .. }) => {
                debug!(category = %category, item_id = %id, "Update target not found");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    async fn apply_update(&self, category: Category, id: &str, patch: &ItemPatch) -> Result<()> {
        if !self.store.contains(category, id) {
            return Err(SyncError::NotFound {
                category: category.to_string(),
                id: id.to_string(),
            });
        }

        if self.remote_applies(id) {
            let body = ContentPatchRow::from_patch(patch)?;
            self.gateway.patch(id, &body).await?;
        }

        let (_, cache) = self.store.update(|cache| match category {
            Category::Film => {
                if let Some(film) = cache.films.iter_mut().find(|f| f.id == id) {
                    patch.apply_to_item(film);
                }
            }
            Category::Serie => {
                if let Some(series) = cache.series.iter_mut().find(|s| s.id() == id) {
                    patch.apply_to_series(series);
                }
            }
        });
        self.local.persist(&cache).await;

        let _ = self.events.emit(CatalogEvent::ItemUpdated {
            category: category.to_string(),
            id: id.to_string(),
        });
        Ok(())
    }

    /// Remove an item. Deleting an unknown identifier leaves the cache as
    /// it is.
    #[instrument(skip(self))]
    pub async fn delete_item(&self, category: Category, id: &str) -> Result<()> {
        if self.remote_applies(id) {
            self.gateway.delete(id).await?;
        }

        let (removed, cache) = self.store.update(|cache| cache.remove(category, id));
        self.local.persist(&cache).await;

        if removed > 0 {
            info!(category = %category, item_id = %id, "Item deleted");
            let _ = self.events.emit(CatalogEvent::ItemDeleted {
                category: category.to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }
}
