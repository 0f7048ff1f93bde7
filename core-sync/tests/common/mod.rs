//! Shared fakes for the sync integration tests

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bridge_traits::error::Result as BridgeResult;
use bridge_traits::realtime::{ChangeFeed, ChangeKind, ChangeSignal, ChangeStream};
use bridge_traits::storage::{KeyValueStore, MemoryKeyValueStore};
use core_catalog::{
    Category, ContentGateway, ContentPatchRow, ContentRow, ContentStore, GatewayError,
    GatewayResult, LocalIdGenerator, NewContentRow,
};
use core_runtime::events::{CatalogEvent, EventBus};
use core_sync::{CatalogMutations, ChangeNotifier, LocalSnapshotStore, Synchronizer};
use futures::StreamExt;
use serde_json::{json, Map, Value};
use tokio::sync::broadcast;
use tokio::sync::mpsc;

pub const STORAGE_KEY: &str = "novaStream_content";

/// In-memory stand-in for the remote `content` table
#[derive(Default)]
pub struct FakeGateway {
    configured: bool,
    rows: Mutex<Vec<Map<String, Value>>>,
    next_id: AtomicU64,
    failing_lists: Mutex<HashSet<Category>>,
    reject_writes: AtomicBool,
    calls: Mutex<Vec<String>>,
}

impl FakeGateway {
    pub fn configured() -> Self {
        Self {
            configured: true,
            next_id: AtomicU64::new(100),
            ..Default::default()
        }
    }

    pub fn unconfigured() -> Self {
        Self::default()
    }

    /// Seed a row as the remote would store it
    pub fn seed(&self, row: Value) {
        if let Value::Object(map) = row {
            self.rows.lock().unwrap().push(map);
        }
    }

    pub fn fail_list(&self, category: Category) {
        self.failing_lists.lock().unwrap().insert(category);
    }

    pub fn heal(&self) {
        self.failing_lists.lock().unwrap().clear();
        self.reject_writes.store(false, Ordering::SeqCst);
    }

    pub fn reject_writes(&self) {
        self.reject_writes.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn write_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| !c.starts_with("list"))
            .count()
    }

    pub fn row(&self, id: &str) -> Option<Value> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.get("id").map(id_text).as_deref() == Some(id))
            .cloned()
            .map(Value::Object)
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn check_write(&self) -> GatewayResult<()> {
        if !self.configured {
            return Err(GatewayError::NotConfigured);
        }
        if self.reject_writes.load(Ordering::SeqCst) {
            return Err(GatewayError::Rejected {
                status: 403,
                body: r#"{"message":"permission denied"}"#.to_string(),
            });
        }
        Ok(())
    }
}

fn id_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[async_trait]
impl ContentGateway for FakeGateway {
    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn list(&self, category: Category) -> GatewayResult<Vec<ContentRow>> {
        self.record(format!("list {}", category));
        if !self.configured {
            return Err(GatewayError::NotConfigured);
        }
        if self.failing_lists.lock().unwrap().contains(&category) {
            return Err(GatewayError::Transport("connection refused".to_string()));
        }

        let rows = self.rows.lock().unwrap().clone();
        Ok(rows
            .into_iter()
            .filter(|r| r.get("type").and_then(Value::as_str) == Some(category.as_str()))
            .filter_map(|r| serde_json::from_value(Value::Object(r)).ok())
            .collect())
    }

    async fn insert(&self, row: &NewContentRow) -> GatewayResult<ContentRow> {
        self.record("insert".to_string());
        self.check_write()?;

        let mut stored = match serde_json::to_value(row) {
            Ok(Value::Object(map)) => map,
            _ => return Err(GatewayError::Parse("bad row".into())),
        };
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        stored.insert("id".into(), json!(id));
        self.rows.lock().unwrap().push(stored.clone());

        serde_json::from_value(Value::Object(stored)).map_err(|e| GatewayError::Parse(e.to_string()))
    }

    async fn patch(&self, id: &str, patch: &ContentPatchRow) -> GatewayResult<()> {
        self.record(format!("patch {}", id));
        self.check_write()?;

        let Ok(Value::Object(fields)) = serde_json::to_value(patch) else {
            return Err(GatewayError::Parse("bad patch".into()));
        };
        let mut rows = self.rows.lock().unwrap();
        for row in rows.iter_mut() {
            if row.get("id").map(id_text).as_deref() == Some(id) {
                row.extend(fields.clone());
            }
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> GatewayResult<()> {
        self.record(format!("delete {}", id));
        self.check_write()?;
        self.rows
            .lock()
            .unwrap()
            .retain(|r| r.get("id").map(id_text).as_deref() != Some(id));
        Ok(())
    }
}

/// Push feed driven by the test. Signals pushed before the first
/// subscription are buffered for it.
pub struct FakeFeed {
    inner: Mutex<FeedInner>,
}

struct FeedInner {
    sender: Option<mpsc::UnboundedSender<ChangeSignal>>,
    pending: Option<mpsc::UnboundedReceiver<ChangeSignal>>,
    subscriptions: usize,
}

impl FakeFeed {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            inner: Mutex::new(FeedInner {
                sender: Some(sender),
                pending: Some(receiver),
                subscriptions: 0,
            }),
        }
    }

    pub fn push(&self, kind: ChangeKind) {
        if let Some(sender) = &self.inner.lock().unwrap().sender {
            let _ = sender.send(ChangeSignal {
                resource: "content".to_string(),
                kind,
            });
        }
    }

    /// End the current subscription stream
    pub fn disconnect(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.sender = None;
        inner.pending = None;
    }

    pub fn subscriptions(&self) -> usize {
        self.inner.lock().unwrap().subscriptions
    }
}

#[async_trait]
impl ChangeFeed for FakeFeed {
    async fn subscribe(&self, _resource: &str) -> BridgeResult<ChangeStream> {
        let mut inner = self.inner.lock().unwrap();
        inner.subscriptions += 1;
        let mut receiver = match inner.pending.take() {
            Some(receiver) => receiver,
            None => {
                let (sender, receiver) = mpsc::unbounded_channel();
                inner.sender = Some(sender);
                receiver
            }
        };
        Ok(futures::stream::poll_fn(move |cx| receiver.poll_recv(cx)).boxed())
    }
}

/// All components wired over shared fakes
pub struct Harness {
    pub gateway: Arc<FakeGateway>,
    pub kv: Arc<MemoryKeyValueStore>,
    pub store: ContentStore,
    pub events: EventBus,
    pub synchronizer: Arc<Synchronizer>,
    pub mutations: CatalogMutations,
}

impl Harness {
    pub fn new(gateway: FakeGateway) -> Self {
        Self::with_kv(gateway, MemoryKeyValueStore::new())
    }

    pub fn with_kv(gateway: FakeGateway, kv: MemoryKeyValueStore) -> Self {
        let gateway = Arc::new(gateway);
        let kv = Arc::new(kv);
        let store = ContentStore::new();
        let events = EventBus::new(64);
        let local = LocalSnapshotStore::new(kv.clone(), STORAGE_KEY);

        let synchronizer = Arc::new(Synchronizer::new(
            gateway.clone(),
            local.clone(),
            store.clone(),
            events.clone(),
        ));
        let mutations = CatalogMutations::new(
            gateway.clone(),
            local,
            store.clone(),
            LocalIdGenerator::default(),
            events.clone(),
        );

        Self {
            gateway,
            kv,
            store,
            events,
            synchronizer,
            mutations,
        }
    }

    pub fn notifier(&self, feed: Arc<dyn ChangeFeed>, interval: Duration) -> ChangeNotifier {
        ChangeNotifier::new(self.synchronizer.clone(), self.events.clone(), feed, interval)
    }

    pub async fn persisted(&self) -> Option<String> {
        self.kv.get_string(STORAGE_KEY).await.unwrap()
    }

    pub async fn persist_raw(&self, text: &str) {
        self.kv.set_string(STORAGE_KEY, text).await.unwrap();
    }
}

/// Number of `ContentUpdated` events waiting in `rx`
pub fn drain_updates(rx: &mut broadcast::Receiver<CatalogEvent>) -> usize {
    let mut count = 0;
    while let Ok(event) = rx.try_recv() {
        if event == CatalogEvent::ContentUpdated {
            count += 1;
        }
    }
    count
}
