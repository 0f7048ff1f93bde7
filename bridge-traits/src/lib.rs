//! # Host Bridge Traits
//!
//! Capability traits the catalog core needs from its host platform.
//!
//! ## Overview
//!
//! The core never talks to the network, the disk or a websocket directly.
//! Each capability is a trait implemented per platform (desktop, web,
//! tests) and injected at bootstrap.
//!
//! ## Traits
//!
//! - [`HttpClient`](http::HttpClient) - REST calls to the remote backend
//! - [`KeyValueStore`](storage::KeyValueStore) - persistent string storage for the local snapshot
//! - [`ChangeFeed`](realtime::ChangeFeed) - optional push notifications from the remote table
//! - [`Clock`](time::Clock) - time source for locally generated identifiers
//! - [`LoggerSink`](time::LoggerSink) - forward structured logs to host logging
//!
//! ## Missing Capabilities
//!
//! `ChangeFeed` is optional: hosts without a push transport use
//! [`NoopChangeFeed`](realtime::NoopChangeFeed) and the core relies on
//! polling alone. The other capabilities are required; bootstrap fails with
//! a descriptive error when one is absent.
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError). Implementations
//! should convert platform errors into it and keep messages actionable.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` so implementations can be shared
//! across async tasks behind an `Arc`.

pub mod error;
pub mod http;
pub mod realtime;
pub mod storage;
pub mod time;

pub use error::BridgeError;

pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
pub use realtime::{ChangeFeed, ChangeKind, ChangeSignal, ChangeStream, NoopChangeFeed};
pub use storage::{KeyValueStore, MemoryKeyValueStore};
pub use time::{Clock, LogEntry, LogLevel, LoggerSink, SystemClock};
