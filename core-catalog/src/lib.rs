//! # Catalog Domain
//!
//! Data model and pure logic of the streaming catalog:
//!
//! - [`models`]: films, series, episodes and the `{films, series}` cache
//! - [`normalize`]: the Episode Normalizer
//! - [`rows`]: remote table rows and their mapping to canonical items
//! - [`snapshot`]: lenient decoding of the locally persisted catalog
//! - [`store`]: the shared Content Cache handle
//! - [`ids`]: locally generated `item_` identifiers
//! - [`gateway`]: the [`ContentGateway`] trait implemented by remote providers

pub mod error;
pub mod gateway;
pub mod ids;
pub mod models;
pub mod normalize;
pub mod rows;
pub mod snapshot;
pub mod store;

pub use error::{CatalogError, GatewayError, GatewayResult, Result};
pub use gateway::{ContentGateway, UnconfiguredGateway};
pub use ids::{is_local_id, LocalIdGenerator, LOCAL_ID_PREFIX};
pub use models::{
    CatalogItem, Category, ContentCache, ContentItem, Episode, ItemPatch, NewItem, SeriesItem,
};
pub use rows::{ContentPatchRow, ContentRow, NewContentRow};
pub use snapshot::{RawItem, RawSnapshot};
pub use store::ContentStore;
