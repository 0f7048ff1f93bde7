//! # Core Runtime Module
//!
//! Runtime infrastructure shared by the catalog crates:
//! - Logging and tracing setup
//! - Configuration (`CatalogConfig`)
//! - Event bus (`CatalogEvent` broadcast)

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use config::{CatalogConfig, RemoteSettings};
pub use error::{Error, Result};
pub use events::{CatalogEvent, EventBus, RefreshSource};
