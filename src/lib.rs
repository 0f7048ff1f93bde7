//! # Nova Stream Catalog
//!
//! Client-side content store for a streaming catalog: an in-memory cache of
//! films and series kept in sync with a Supabase `content` table, with a
//! local snapshot as fallback and change notifications for the UI layer.
//!
//! The workspace crates can be used individually; this crate re-exports the
//! pieces a host application needs.
//!
//! ```ignore
//! use nova_catalog::{bootstrap_desktop, CatalogConfig, Category, NewItem};
//!
//! let catalog = bootstrap_desktop(CatalogConfig::from_env()?).await?;
//! catalog.start().await;
//! catalog.add_item(Category::Film, NewItem::new("Heat")).await?;
//! ```

pub use core_catalog::{
    CatalogItem, Category, ContentCache, ContentItem, Episode, ItemPatch, NewItem, SeriesItem,
};
pub use core_runtime::config::{CatalogConfig, RemoteSettings};
pub use core_runtime::events::{CatalogEvent, RefreshSource};
pub use core_service::{CatalogDependencies, CatalogService, CoreError, Result};

#[cfg(feature = "desktop-shims")]
pub use core_service::bootstrap_desktop;
