//! Push Change Feed Abstraction
//!
//! A change feed is a best-effort stream of "something changed" signals for a
//! remote resource. The core never depends on it for correctness: periodic
//! polling stays the guaranteed delivery path, and hosts without a push
//! transport plug in [`NoopChangeFeed`].

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

use crate::error::{BridgeError, Result};

/// Kind of row change reported by the feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
    /// The transport reported a change without a recognizable type
    Unknown,
}

impl ChangeKind {
    /// Parse the event type strings used by Postgres change feeds
    pub fn from_event_type(value: &str) -> Self {
        match value.to_ascii_uppercase().as_str() {
            "INSERT" => ChangeKind::Insert,
            "UPDATE" => ChangeKind::Update,
            "DELETE" => ChangeKind::Delete,
            _ => ChangeKind::Unknown,
        }
    }
}

/// A single push notification. Carries no row data: receivers re-read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSignal {
    /// Resource (table) the change happened on
    pub resource: String,
    pub kind: ChangeKind,
}

/// Stream of change signals. Ends when the underlying connection closes.
pub type ChangeStream = BoxStream<'static, ChangeSignal>;

/// Push subscription capability
///
/// # Example
///
/// ```ignore
/// use bridge_traits::realtime::ChangeFeed;
/// use futures::StreamExt;
///
/// async fn watch(feed: &dyn ChangeFeed) -> Result<()> {
///     let mut stream = feed.subscribe("content").await?;
///     while let Some(signal) = stream.next().await {
///         println!("{:?} on {}", signal.kind, signal.resource);
///     }
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait ChangeFeed: Send + Sync {
    /// Open a subscription to changes on `resource`
    ///
    /// Errors mean the subscription could not be established; callers are
    /// expected to carry on without push updates.
    async fn subscribe(&self, resource: &str) -> Result<ChangeStream>;
}

/// Change feed for hosts without a push transport
#[derive(Debug, Clone, Default)]
pub struct NoopChangeFeed;

#[async_trait]
impl ChangeFeed for NoopChangeFeed {
    async fn subscribe(&self, resource: &str) -> Result<ChangeStream> {
        Err(BridgeError::NotAvailable(format!(
            "no push transport configured for '{}'",
            resource
        )))
    }
}
