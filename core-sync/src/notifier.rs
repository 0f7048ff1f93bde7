//! # Change Notifier
//!
//! Keeps the cache fresh while a remote backend is configured and announces
//! [`CatalogEvent::ContentUpdated`] whenever the serialized cache differs
//! from the last announced state.
//!
//! ## Triggers
//!
//! Two producers feed a single reconciliation task through a one-slot
//! channel:
//!
//! - the interval ticker (every `poll_interval`)
//! - the push listener, when a [`ChangeFeed`] subscription can be opened.
//!   A subscription that ends is reopened after [`PUSH_RESUBSCRIBE_DELAY`].
//!
//! A trigger arriving while one is already pending is dropped; the pending
//! reconciliation will observe the same state. Reconciliations never run
//! concurrently, so baseline comparisons cannot race.
//!
//! ## States
//!
//! `Idle` until [`ChangeNotifier::start`] succeeds, then `Polling` for the
//! lifetime of the handle. [`ChangeNotifier::shutdown`] stops the background
//! tasks.

use std::sync::Arc;
use std::time::Duration;

use bridge_traits::realtime::{ChangeFeed, ChangeStream};
use core_runtime::events::{CatalogEvent, EventBus};
use futures::StreamExt;
use tokio::sync::{mpsc, Mutex};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::synchronizer::Synchronizer;

/// Remote resource watched by the push listener
pub const CONTENT_RESOURCE: &str = "content";

/// Pause before reopening a push subscription that ended
pub const PUSH_RESUBSCRIBE_DELAY: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifierState {
    Idle,
    Polling,
}

struct Reconciler {
    synchronizer: Arc<Synchronizer>,
    events: EventBus,
    baseline: Mutex<String>,
}

impl Reconciler {
    /// Refresh and announce a change if the serialized cache moved.
    async fn reconcile(&self) -> bool {
        let mut baseline = self.baseline.lock().await;
        let cache = self.synchronizer.refresh().await;

        let serialized = match cache.to_json() {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "Could not serialize catalog for change detection");
                return false;
            }
        };

        if *baseline == serialized {
            return false;
        }

        *baseline = serialized;
        debug!(
            films = cache.films.len(),
            series = cache.series.len(),
            "Catalog changed"
        );
        let _ = self.events.emit(CatalogEvent::ContentUpdated);
        true
    }

    async fn set_baseline(&self, serialized: String) {
        *self.baseline.lock().await = serialized;
    }
}

pub struct ChangeNotifier {
    reconciler: Arc<Reconciler>,
    feed: Arc<dyn ChangeFeed>,
    poll_interval: Duration,
    push_enabled: bool,
    state: std::sync::Mutex<NotifierState>,
    cancel: CancellationToken,
}

impl ChangeNotifier {
    pub fn new(
        synchronizer: Arc<Synchronizer>,
        events: EventBus,
        feed: Arc<dyn ChangeFeed>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            reconciler: Arc::new(Reconciler {
                synchronizer,
                events,
                baseline: Mutex::new(String::new()),
            }),
            feed,
            poll_interval,
            push_enabled: true,
            state: std::sync::Mutex::new(NotifierState::Idle),
            cancel: CancellationToken::new(),
        }
    }

    /// Disable the push listener; polling alone keeps the cache fresh
    pub fn with_push(mut self, enabled: bool) -> Self {
        self.push_enabled = enabled;
        self
    }

    pub fn state(&self) -> NotifierState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Enter the polling state.
    ///
    /// Does nothing (and returns `false`) when no remote is configured or
    /// the notifier already runs. Otherwise performs one immediate refresh,
    /// records its serialized result as the baseline and spawns the
    /// background tasks.
    pub async fn start(&self) -> bool {
        if !self.reconciler.synchronizer.is_remote_configured() {
            debug!("No remote configured; change notifier stays idle");
            return false;
        }

        {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            if *state == NotifierState::Polling {
                return false;
            }
            *state = NotifierState::Polling;
        }

        let initial = self.reconciler.synchronizer.refresh().await;
        match initial.to_json() {
            Ok(serialized) => self.reconciler.set_baseline(serialized).await,
            Err(e) => warn!(error = %e, "Could not serialize initial catalog"),
        }

        let (trigger_tx, trigger_rx) = mpsc::channel::<()>(1);

        tokio::spawn(run_reconciler(
            self.reconciler.clone(),
            trigger_rx,
            self.cancel.clone(),
        ));
        tokio::spawn(run_ticker(
            self.poll_interval,
            trigger_tx.clone(),
            self.cancel.clone(),
        ));
        if self.push_enabled {
            tokio::spawn(run_push_listener(
                self.feed.clone(),
                trigger_tx,
                self.cancel.clone(),
            ));
        }

        info!(
            interval_ms = self.poll_interval.as_millis() as u64,
            push = self.push_enabled,
            "Change notifier polling"
        );
        true
    }

    /// Run one refresh-diff-notify cycle right away
    pub async fn check_now(&self) -> bool {
        self.reconciler.reconcile().await
    }

    /// Stop the background tasks
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

impl Drop for ChangeNotifier {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn run_reconciler(
    reconciler: Arc<Reconciler>,
    mut triggers: mpsc::Receiver<()>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            trigger = triggers.recv() => {
                if trigger.is_none() {
                    break;
                }
                reconciler.reconcile().await;
            }
        }
    }
    debug!("Reconciliation task stopped");
}

async fn run_ticker(period: Duration, triggers: mpsc::Sender<()>, cancel: CancellationToken) {
    // The initial refresh already happened in start()
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                // Full slot: a reconciliation is already pending
                let _ = triggers.try_send(());
            }
        }
    }
}

async fn run_push_listener(
    feed: Arc<dyn ChangeFeed>,
    triggers: mpsc::Sender<()>,
    cancel: CancellationToken,
) {
    let mut stream = match feed.subscribe(CONTENT_RESOURCE).await {
        Ok(stream) => stream,
        Err(e) => {
            debug!(error = %e, "Push subscription unavailable; relying on polling");
            return;
        }
    };

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            signal = stream.next() => match signal {
                Some(signal) => {
                    debug!(resource = %signal.resource, kind = ?signal.kind, "Push change received");
                    let _ = triggers.try_send(());
                }
                None => {
                    debug!("Push subscription ended; polling until it is reopened");
                    match resubscribe(feed.as_ref(), &cancel).await {
                        Some(next) => stream = next,
                        None => break,
                    }
                }
            }
        }
    }
}

/// Keep retrying the subscription until it opens or the notifier stops.
async fn resubscribe(feed: &dyn ChangeFeed, cancel: &CancellationToken) -> Option<ChangeStream> {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => return None,
            _ = tokio::time::sleep(PUSH_RESUBSCRIBE_DELAY) => {}
        }

        match feed.subscribe(CONTENT_RESOURCE).await {
            Ok(stream) => {
                info!("Push subscription reopened");
                return Some(stream);
            }
            Err(e) => warn!(error = %e, "Push resubscribe failed"),
        }
    }
}
