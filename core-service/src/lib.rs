//! Catalog service façade and bootstrap helpers.
//!
//! This crate wires host-provided bridge implementations (HTTP, key-value
//! storage, push feed) into the catalog core and exposes the public read and
//! write accessors. Desktop hosts typically enable the `desktop-shims`
//! feature (which depends on `bridge-desktop`) and call
//! [`bootstrap_desktop`].
//!
//! ```ignore
//! use core_runtime::config::CatalogConfig;
//! use core_service::bootstrap_desktop;
//!
//! let service = bootstrap_desktop(CatalogConfig::from_env()?).await?;
//! service.start().await;
//!
//! let mut changes = service.subscribe();
//! while changes.recv().await.is_ok() {
//!     println!("{} films", service.get_content().films.len());
//! }
//! ```

pub mod error;

pub use error::{CoreError, Result};

use std::sync::Arc;

use bridge_traits::{
    http::HttpClient,
    realtime::{ChangeFeed, NoopChangeFeed},
    storage::KeyValueStore,
    time::{Clock, SystemClock},
};
use core_catalog::{
    CatalogItem, Category, ContentCache, ContentGateway, ContentStore, ItemPatch,
    LocalIdGenerator, NewItem,
};
use core_runtime::config::CatalogConfig;
use core_runtime::events::{CatalogEvent, EventBus, EventStream, Receiver};
use core_sync::{
    CatalogMutations, ChangeNotifier, LocalSnapshotStore, NotifierState, RefreshOutcome,
    Synchronizer,
};
use provider_supabase::SupabaseConnector;
use tracing::info;

/// Aggregated handle to all bridge dependencies the core requires.
pub struct CatalogDependencies {
    pub http_client: Arc<dyn HttpClient>,
    pub storage: Arc<dyn KeyValueStore>,
    pub change_feed: Option<Arc<dyn ChangeFeed>>,
    pub clock: Arc<dyn Clock>,
    /// Overrides the REST gateway built from the configuration
    pub gateway: Option<Arc<dyn ContentGateway>>,
}

impl CatalogDependencies {
    /// Construct a dependency bundle from explicit bridge handles.
    pub fn new(http_client: Arc<dyn HttpClient>, storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            http_client,
            storage,
            change_feed: None,
            clock: Arc::new(SystemClock),
            gateway: None,
        }
    }

    pub fn with_change_feed(mut self, feed: Arc<dyn ChangeFeed>) -> Self {
        self.change_feed = Some(feed);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_gateway(mut self, gateway: Arc<dyn ContentGateway>) -> Self {
        self.gateway = Some(gateway);
        self
    }
}

struct ServiceInner {
    config: CatalogConfig,
    store: ContentStore,
    events: EventBus,
    synchronizer: Arc<Synchronizer>,
    mutations: CatalogMutations,
    notifier: ChangeNotifier,
}

/// Primary façade exposed to host applications.
///
/// Cloning is cheap; clones share the same cache and background tasks.
#[derive(Clone)]
pub struct CatalogService {
    inner: Arc<ServiceInner>,
}

impl CatalogService {
    /// Create a new service from the provided configuration and dependencies.
    ///
    /// Nothing is loaded until [`CatalogService::start`] runs.
    pub fn new(config: CatalogConfig, deps: CatalogDependencies) -> Result<Self> {
        config.validate()?;

        let gateway: Arc<dyn ContentGateway> = match deps.gateway {
            Some(gateway) => gateway,
            None => Arc::new(SupabaseConnector::new(
                deps.http_client.clone(),
                config.remote.clone(),
            )),
        };
        let feed: Arc<dyn ChangeFeed> = match deps.change_feed {
            Some(feed) => feed,
            None => Arc::new(NoopChangeFeed),
        };

        let store = ContentStore::new();
        let events = EventBus::new(config.event_buffer_size);
        let local = LocalSnapshotStore::new(deps.storage, config.storage_key.clone());

        let synchronizer = Arc::new(Synchronizer::new(
            gateway.clone(),
            local.clone(),
            store.clone(),
            events.clone(),
        ));
        let mutations = CatalogMutations::new(
            gateway,
            local,
            store.clone(),
            LocalIdGenerator::new(deps.clock),
            events.clone(),
        );
        let notifier = ChangeNotifier::new(
            synchronizer.clone(),
            events.clone(),
            feed,
            config.poll_interval,
        )
        .with_push(config.enable_realtime);

        Ok(Self {
            inner: Arc::new(ServiceInner {
                config,
                store,
                events,
                synchronizer,
                mutations,
                notifier,
            }),
        })
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.inner.config
    }

    pub fn is_remote_configured(&self) -> bool {
        self.inner.synchronizer.is_remote_configured()
    }

    /// Initial load. With a remote configured this also starts polling
    /// (and the push subscription when enabled).
    pub async fn start(&self) -> ContentCache {
        if self.inner.notifier.start().await {
            info!(remote = true, "Catalog started");
        } else if self.inner.notifier.state() == NotifierState::Idle {
            self.inner.synchronizer.refresh().await;
            info!(remote = false, "Catalog started");
        }
        self.get_content()
    }

    /// Run one synchronization pass now
    pub async fn refresh(&self) -> RefreshOutcome {
        self.inner.synchronizer.refresh_with_source().await
    }

    /// Current cache snapshot
    pub fn get_content(&self) -> ContentCache {
        self.inner.store.snapshot()
    }

    pub fn get_item(&self, category: Category, id: &str) -> Option<CatalogItem> {
        self.inner.store.get_item(category, id)
    }

    pub async fn add_item(&self, category: Category, item: NewItem) -> Result<CatalogItem> {
        Ok(self.inner.mutations.add_item(category, item).await?)
    }

    /// `Ok(false)` when no item with `id` exists
    pub async fn update_item(&self, category: Category, id: &str, patch: ItemPatch) -> Result<bool> {
        Ok(self.inner.mutations.update_item(category, id, patch).await?)
    }

    pub async fn delete_item(&self, category: Category, id: &str) -> Result<()> {
        Ok(self.inner.mutations.delete_item(category, id).await?)
    }

    /// Subscribe to every catalog event
    pub fn subscribe(&self) -> Receiver<CatalogEvent> {
        self.inner.events.subscribe()
    }

    /// Subscribe to change notifications only
    pub fn changes(&self) -> EventStream {
        EventStream::new(self.inner.events.subscribe())
            .filter(|event| matches!(event, CatalogEvent::ContentUpdated))
    }

    pub fn notifier_state(&self) -> NotifierState {
        self.inner.notifier.state()
    }

    /// Stop polling and the push subscription
    pub fn shutdown(&self) {
        self.inner.notifier.shutdown();
    }
}

/// Convenience bootstrapper for desktop hosts.
///
/// Uses reqwest for HTTP, SQLite for the local snapshot (in memory when no
/// `database_path` is configured) and Supabase Realtime for push updates.
#[cfg(feature = "desktop-shims")]
pub async fn bootstrap_desktop(config: CatalogConfig) -> Result<CatalogService> {
    use bridge_desktop::{ReqwestHttpClient, SqliteKeyValueStore};
    use provider_supabase::SupabaseRealtimeFeed;

    let http_client = ReqwestHttpClient::new()
        .map_err(|e| CoreError::InitializationFailed(e.to_string()))?;

    let storage = match &config.database_path {
        Some(path) => {
            let shown = path.to_string_lossy();
            info!(
                database = core_runtime::logging::strip_path(&shown),
                "Opening local snapshot database"
            );
            SqliteKeyValueStore::new(path.clone()).await
        }
        None => {
            info!("No database path configured; local snapshot kept in memory");
            SqliteKeyValueStore::in_memory().await
        }
    }
    .map_err(|e| CoreError::InitializationFailed(e.to_string()))?;

    let mut deps = CatalogDependencies::new(Arc::new(http_client), Arc::new(storage));
    if config.enable_realtime && config.remote.is_configured() {
        deps = deps.with_change_feed(Arc::new(SupabaseRealtimeFeed::new(config.remote.clone())));
    }

    CatalogService::new(config, deps)
}
