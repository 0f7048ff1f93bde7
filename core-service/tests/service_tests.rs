use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bridge_traits::error::Result as BridgeResult;
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
use bridge_traits::storage::{KeyValueStore, MemoryKeyValueStore};
use bytes::Bytes;
use core_catalog::{CatalogItem, Category, ItemPatch, NewItem};
use core_runtime::config::{CatalogConfig, DEFAULT_STORAGE_KEY};
use core_runtime::events::CatalogEvent;
use core_service::{CatalogDependencies, CatalogService, CoreError};
use core_sync::{NotifierState, SyncError};
use mockall::mock;

mock! {
    HttpClient {}

    #[async_trait]
    impl HttpClient for HttpClient {
        async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse>;
    }
}

fn response(status: u16, body: &str) -> HttpResponse {
    HttpResponse {
        status,
        headers: HashMap::new(),
        body: Bytes::from(body.to_string()),
    }
}

fn local_config() -> CatalogConfig {
    CatalogConfig::builder().build().unwrap()
}

fn remote_config() -> CatalogConfig {
    CatalogConfig::builder()
        .remote_endpoint("https://demo.supabase.co")
        .remote_access_key("anon-key")
        .enable_realtime(false)
        .build()
        .unwrap()
}

fn service(config: CatalogConfig, http: MockHttpClient, kv: Arc<MemoryKeyValueStore>) -> CatalogService {
    CatalogService::new(config, CatalogDependencies::new(Arc::new(http), kv)).unwrap()
}

#[tokio::test]
async fn test_local_only_round_trip() {
    let mut http = MockHttpClient::new();
    http.expect_execute().times(0);
    let kv = Arc::new(MemoryKeyValueStore::new());
    let catalog = service(local_config(), http, kv.clone());

    assert!(catalog.start().await.is_empty());
    assert_eq!(catalog.notifier_state(), NotifierState::Idle);

    let added = catalog
        .add_item(Category::Film, NewItem::new("Heat").with_labels("170min", "1995", ""))
        .await
        .unwrap();
    let id = added.id().to_string();
    assert!(id.starts_with("item_"));

    let patch = ItemPatch {
        description: Some("A heist".into()),
        ..Default::default()
    };
    assert!(catalog.update_item(Category::Film, &id, patch).await.unwrap());

    let film = catalog.get_item(Category::Film, &id).unwrap();
    assert_eq!(film.item().description, "A heist");
    assert_eq!(film.item().genre, "-");

    // A second service over the same storage sees the persisted catalog
    let reloaded = service(local_config(), MockHttpClient::new(), kv.clone());
    assert_eq!(reloaded.start().await, catalog.get_content());

    catalog.delete_item(Category::Film, &id).await.unwrap();
    assert!(catalog.get_item(Category::Film, &id).is_none());
    let persisted = kv.get_string(DEFAULT_STORAGE_KEY).await.unwrap().unwrap();
    assert_eq!(persisted, r#"{"films":[],"series":[]}"#);
}

#[tokio::test]
async fn test_remote_start_loads_rows_and_polls() {
    let mut http = MockHttpClient::new();
    http.expect_execute()
        .withf(|req| req.method == HttpMethod::Get && req.url.contains("type=eq.film"))
        .returning(|_| Ok(response(200, r#"[{"id":1,"type":"film","title":"Heat"}]"#)));
    http.expect_execute()
        .withf(|req| req.method == HttpMethod::Get && req.url.contains("type=eq.serie"))
        .returning(|_| {
            Ok(response(
                200,
                r#"[{"id":2,"type":"serie","title":"Dark","video_url":"d.mp4","episodes":"[]"}]"#,
            ))
        });

    let catalog = service(remote_config(), http, Arc::new(MemoryKeyValueStore::new()));
    let cache = catalog.start().await;

    assert_eq!(catalog.notifier_state(), NotifierState::Polling);
    assert_eq!(cache.films[0].id, "1");
    let Some(CatalogItem::Serie(series)) = catalog.get_item(Category::Serie, "2") else {
        panic!("expected series 2");
    };
    assert_eq!(series.episodes.len(), 1);
    assert_eq!(series.episodes[0].title, "Épisode 1");
    catalog.shutdown();
}

#[tokio::test]
async fn test_remote_rejection_surfaces_from_mutations() {
    let mut http = MockHttpClient::new();
    http.expect_execute()
        .withf(|req| req.method == HttpMethod::Post)
        .times(1)
        .returning(|_| Ok(response(401, r#"{"message":"Invalid API key"}"#)));

    let catalog = service(remote_config(), http, Arc::new(MemoryKeyValueStore::new()));
    let error = catalog
        .add_item(Category::Film, NewItem::new("Heat"))
        .await
        .unwrap_err();

    match error {
        CoreError::Sync(SyncError::Gateway(gateway)) => {
            assert!(gateway.to_string().contains("Invalid API key"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(catalog.get_content().is_empty());
}

#[tokio::test]
async fn test_mutation_events_are_broadcast() {
    let catalog = service(
        local_config(),
        MockHttpClient::new(),
        Arc::new(MemoryKeyValueStore::new()),
    );
    let mut rx = catalog.subscribe();

    let added = catalog.add_item(Category::Serie, NewItem::new("Dark")).await.unwrap();
    catalog.delete_item(Category::Serie, added.id()).await.unwrap();

    assert!(matches!(rx.recv().await.unwrap(), CatalogEvent::ItemAdded { .. }));
    assert!(matches!(rx.recv().await.unwrap(), CatalogEvent::ItemDeleted { .. }));
}

#[tokio::test(start_paused = true)]
async fn test_change_stream_fires_on_remote_change() {
    let calls = Arc::new(std::sync::atomic::AtomicUsize::new(0));
    let counter = calls.clone();

    let mut http = MockHttpClient::new();
    http.expect_execute()
        .withf(|req| req.url.contains("type=eq.film"))
        .returning(move |_| {
            let n = counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            let body = if n == 0 {
                "[]"
            } else {
                r#"[{"id":1,"type":"film","title":"Heat"}]"#
            };
            Ok(response(200, body))
        });
    http.expect_execute()
        .withf(|req| req.url.contains("type=eq.serie"))
        .returning(|_| Ok(response(200, "[]")));

    let config = CatalogConfig::builder()
        .remote_endpoint("https://demo.supabase.co")
        .remote_access_key("anon-key")
        .enable_realtime(false)
        .poll_interval(Duration::from_millis(1000))
        .build()
        .unwrap();
    let catalog = service(config, http, Arc::new(MemoryKeyValueStore::new()));
    let mut changes = catalog.changes();

    assert!(catalog.start().await.is_empty());
    tokio::time::sleep(Duration::from_millis(1100)).await;

    assert_eq!(changes.recv().await.unwrap(), CatalogEvent::ContentUpdated);
    assert_eq!(catalog.get_content().films.len(), 1);
    catalog.shutdown();
}

#[test]
fn test_invalid_config_is_rejected() {
    let mut config = local_config();
    config.poll_interval = Duration::from_millis(1);

    let result = CatalogService::new(
        config,
        CatalogDependencies::new(
            Arc::new(MockHttpClient::new()),
            Arc::new(MemoryKeyValueStore::new()),
        ),
    );
    assert!(matches!(result, Err(CoreError::Runtime(_))));
}

#[test]
fn test_category_names_parse() {
    let parsed: Result<Category, CoreError> = "serie".parse().map_err(CoreError::from);
    assert_eq!(parsed.unwrap(), Category::Serie);
    assert!(matches!(
        "show".parse::<Category>().map_err(CoreError::from),
        Err(CoreError::Catalog(_))
    ));
}
