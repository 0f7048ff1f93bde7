//! # Supabase Provider
//!
//! Remote backend for the catalog, built on a Supabase project.
//!
//! ## Overview
//!
//! - [`SupabaseConnector`] implements
//!   [`ContentGateway`](core_catalog::ContentGateway) over the project's
//!   PostgREST API (`/rest/v1/content`).
//! - [`SupabaseRealtimeFeed`] implements
//!   [`ChangeFeed`](bridge_traits::realtime::ChangeFeed) over Supabase
//!   Realtime, so the catalog reacts to remote changes without waiting for
//!   the next poll.
//!
//! ## Usage
//!
//! ```ignore
//! use provider_supabase::{SupabaseConnector, SupabaseRealtimeFeed};
//! use core_runtime::config::RemoteSettings;
//!
//! let settings = RemoteSettings::new("https://xyz.supabase.co", "anon-key");
//! let gateway = SupabaseConnector::new(http_client, settings.clone());
//! let feed = SupabaseRealtimeFeed::new(settings);
//! ```
//!
//! ## Remote Table
//!
//! | column      | type        |
//! |-------------|-------------|
//! | id          | text/number |
//! | type        | `film` or `serie` |
//! | title, description, image, video_url, duration, year, genre | text |
//! | episodes    | text (JSON-serialized list) |
//! | created_at  | timestamp   |

pub mod connector;
pub mod error;
pub mod realtime;
pub mod types;

pub use connector::SupabaseConnector;
pub use error::{Result, SupabaseError};
pub use realtime::{SupabaseRealtimeFeed, DEFAULT_HEARTBEAT_INTERVAL};
