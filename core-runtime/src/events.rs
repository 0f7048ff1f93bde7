//! # Event Bus System
//!
//! Broadcasts catalog events to the rest of the application using
//! `tokio::sync::broadcast`.
//!
//! ## Overview
//!
//! - **Event Types**: [`CatalogEvent`] and its diagnostic variants
//! - **EventBus**: central broadcast channel for publishing events
//! - **EventStream**: wrapper for consuming events with filtering
//!
//! ```text
//! ┌───────────────┐    emit     ┌───────────┐   subscribe   ┌────────────┐
//! │ Change        ├────────────>│           ├──────────────>│ UI layer   │
//! │ Notifier      │             │ EventBus  │               └────────────┘
//! └───────────────┘             │ (broadcast│
//! ┌───────────────┐    emit     │  channel) │   subscribe   ┌────────────┐
//! │ Mutation API  ├────────────>│           ├──────────────>│ Logger     │
//! └───────────────┘             └───────────┘               └────────────┘
//! ```
//!
//! ## The Change Signal
//!
//! [`CatalogEvent::ContentUpdated`] carries no payload. Receivers treat it
//! as "re-read the cache", never as a diff. It fires only when a refresh
//! produced a serialized cache different from the previous one.
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{CatalogEvent, EventBus};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let bus = EventBus::new(100);
//! let mut rx = bus.subscribe();
//!
//! bus.emit(CatalogEvent::ContentUpdated).ok();
//! assert_eq!(rx.recv().await.unwrap(), CatalogEvent::ContentUpdated);
//! # }
//! ```
//!
//! ## Error Handling
//!
//! - **`RecvError::Lagged(n)`**: the subscriber missed `n` events. Non-fatal;
//!   for `ContentUpdated` it is enough to re-read the cache once.
//! - **`RecvError::Closed`**: all senders dropped, i.e. shutdown.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

/// Where the content of a refresh came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshSource {
    /// Both lists fetched from the remote backend (possibly one empty)
    Remote,
    /// No remote configured; loaded from the local snapshot
    Local,
    /// Remote failed entirely; fell back to the local snapshot as-is
    Fallback,
    /// Nothing usable was loaded; the cache kept its previous content
    Unchanged,
}

impl fmt::Display for RefreshSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RefreshSource::Remote => "remote",
            RefreshSource::Local => "local",
            RefreshSource::Fallback => "fallback",
            RefreshSource::Unchanged => "unchanged",
        };
        f.write_str(label)
    }
}

/// Events published by the catalog core.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CatalogEvent {
    /// The cache content changed; re-read it.
    ContentUpdated,

    /// A refresh pass finished.
    RefreshCompleted {
        source: RefreshSource,
        films: usize,
        series: usize,
    },

    /// A refresh could not reach any data source.
    RefreshFailed { message: String },

    ItemAdded { category: String, id: String },

    ItemUpdated { category: String, id: String },

    ItemDeleted { category: String, id: String },
}

impl CatalogEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            CatalogEvent::ContentUpdated => "Catalog content updated",
            CatalogEvent::RefreshCompleted { .. } => "Refresh completed",
            CatalogEvent::RefreshFailed { .. } => "Refresh failed",
            CatalogEvent::ItemAdded { .. } => "Item added",
            CatalogEvent::ItemUpdated { .. } => "Item updated",
            CatalogEvent::ItemDeleted { .. } => "Item deleted",
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            CatalogEvent::RefreshFailed { .. } => EventSeverity::Warning,
            CatalogEvent::ContentUpdated
            | CatalogEvent::ItemAdded { .. }
            | CatalogEvent::ItemUpdated { .. }
            | CatalogEvent::ItemDeleted { .. } => EventSeverity::Info,
            CatalogEvent::RefreshCompleted { .. } => EventSeverity::Debug,
        }
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    Debug,
    Info,
    Warning,
    Error,
}

/// Central event bus for broadcasting catalog events.
///
/// Cloning is cheap; clones share the same channel.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CatalogEvent>,
}

impl EventBus {
    /// Creates a new event bus with the specified buffer size.
    ///
    /// A subscriber falling behind by more than `capacity` events receives
    /// `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event, or an
    /// error if there are none. Publishers in the core ignore that error.
    pub fn emit(&self, event: CatalogEvent) -> Result<usize, SendError<CatalogEvent>> {
        self.sender.send(event)
    }

    /// Creates a new subscriber. Past events are not replayed.
    pub fn subscribe(&self) -> Receiver<CatalogEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

type EventFilter = Box<dyn Fn(&CatalogEvent) -> bool + Send + Sync>;

/// A wrapper around `broadcast::Receiver` with optional filtering.
///
/// ```rust
/// use core_runtime::events::{CatalogEvent, EventBus, EventStream};
///
/// let bus = EventBus::new(16);
/// let changes = EventStream::new(bus.subscribe())
///     .filter(|event| matches!(event, CatalogEvent::ContentUpdated));
/// ```
pub struct EventStream {
    receiver: Receiver<CatalogEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    pub fn new(receiver: Receiver<CatalogEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    /// Only events matching `predicate` are returned by `recv()`.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&CatalogEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    fn accepts(&self, event: &CatalogEvent) -> bool {
        self.filter.as_ref().map(|f| f(event)).unwrap_or(true)
    }

    /// Receives the next event that passes the filter.
    pub async fn recv(&mut self) -> Result<CatalogEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            if self.accepts(&event) {
                return Ok(event);
            }
        }
    }

    /// Attempts to receive a matching event without blocking.
    ///
    /// Returns `None` if no matching event is currently available.
    pub fn try_recv(&mut self) -> Option<Result<CatalogEvent, RecvError>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    if self.accepts(&event) {
                        return Some(Ok(event));
                    }
                }
                Err(broadcast::error::TryRecvError::Empty) => return None,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    return Some(Err(RecvError::Lagged(n)))
                }
                Err(broadcast::error::TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            }
        }
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}
