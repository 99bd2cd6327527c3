// Cache router behavior tests - injected storage and network
// Author: kelexine (https://github.com/kelexine)

mod common;

use common::{active_router, url, FakeNetwork, ORIGIN};
use fluxcache::cache::{CacheStorage, MemoryStorage, RequestKey};
use fluxcache::config::CacheSettings;
use fluxcache::network::{Destination, ResourceRequest};
use fluxcache::router::strategy::network_first;
use fluxcache::router::{CacheRouter, ClientMessage, FetchOutcome, RouterConfig, Served, Source};
use std::sync::Arc;
use std::time::Duration;

async fn fetch(router: &CacheRouter, request: &ResourceRequest) -> Served {
    match router.handle_fetch(request).await {
        FetchOutcome::Respond(served) => served,
        FetchOutcome::Passthrough => panic!("{} was not intercepted", request.url),
    }
}

fn get(path: &str) -> ResourceRequest {
    ResourceRequest::get(&url(path)).unwrap()
}

#[tokio::test]
async fn test_index_survives_going_offline() {
    let (router, storage, network) = active_router().await;
    network.serve("/index.html", 200, "<h1>fluxlove</h1>");

    let online = fetch(&router, &get("/index.html")).await;
    assert_eq!(online.source, Source::Network);
    assert_eq!(network.calls(), 1);
    let static_cache = router.config().static_cache.clone();
    assert!(storage
        .get(&static_cache, &RequestKey::from(&get("/index.html")))
        .await
        .is_some());

    network.go_offline();
    let offline = fetch(&router, &get("/index.html")).await;
    assert_eq!(offline.source, Source::Cache);
    assert_eq!(offline.response.status, 200);
    assert_eq!(offline.response.body, "<h1>fluxlove</h1>");
    assert_eq!(network.calls(), 1);
}

#[tokio::test]
async fn test_installed_shell_needs_no_network() {
    let storage = Arc::new(MemoryStorage::new());
    let network = Arc::new(FakeNetwork::new());
    let router = CacheRouter::new(
        RouterConfig::with_origin(ORIGIN.parse().unwrap()),
        storage.clone(),
        network.clone(),
    );
    for path in &router.config().critical_resources {
        network.serve(path, 200, path);
    }

    let report = router.install().await;
    assert!(report.error.is_none());
    router.activate().await;
    let after_install = network.calls();

    for path in ["/", "/src/css/hero.css", "/src/js/core.js", "/manifest.json"] {
        let served = fetch(&router, &get(path)).await;
        assert_eq!(served.source, Source::Cache);
        assert_eq!(served.response.body, path);
    }
    assert_eq!(network.calls(), after_install);
}

#[tokio::test]
async fn test_image_fetched_once() {
    let (router, storage, network) = active_router().await;
    network.serve("/src/assets/images/reel.jpg", 200, "jpeg");

    let first = fetch(&router, &get("/src/assets/images/reel.jpg")).await;
    assert_eq!(first.source, Source::Network);
    assert_eq!(network.calls(), 1);
    assert_eq!(storage.keys(&router.config().dynamic_cache).await.len(), 1);

    let second = fetch(&router, &get("/src/assets/images/reel.jpg")).await;
    assert_eq!(second.source, Source::Cache);
    assert_eq!(network.calls(), 1);
}

#[tokio::test]
async fn test_font_stale_then_refreshed() {
    let (router, _, network) = active_router().await;
    let font = "https://fonts.gstatic.com/s/inter/v13/inter.woff2";
    let request = ResourceRequest::get(font)
        .unwrap()
        .with_destination(Destination::Font);

    network.serve(font, 200, "v1");
    assert_eq!(fetch(&router, &request).await.response.body, "v1");

    // Background refresh fails: the cached copy is still served
    network.go_offline();
    let stale = fetch(&router, &request).await;
    assert_eq!(stale.source, Source::Cache);
    assert_eq!(stale.response.body, "v1");

    // Background refresh succeeds: a later request sees the new copy
    network.go_online();
    network.serve(font, 200, "v2");
    assert_eq!(fetch(&router, &request).await.response.body, "v1");

    let refreshed = tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            if fetch(&router, &request).await.response.body == "v2" {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;
    assert!(refreshed.is_ok());
}

#[tokio::test]
async fn test_external_stylesheet_is_stale_while_revalidate() {
    let (router, storage, network) = active_router().await;
    let css = "https://fonts.googleapis.com/css2?family=Inter:wght@400;700";
    network.serve(css, 200, "@font-face{}");

    let served = fetch(&router, &ResourceRequest::get(css).unwrap()).await;
    assert_eq!(served.source, Source::Network);
    assert_eq!(storage.keys(&router.config().static_cache).await.len(), 1);
}

#[tokio::test]
async fn test_dynamic_falls_back_to_cache() {
    let (router, _, network) = active_router().await;
    network.serve("/api/films.json", 200, "[1,2]");
    fetch(&router, &get("/api/films.json")).await;

    network.go_offline();
    let served = fetch(&router, &get("/api/films.json")).await;
    assert_eq!(served.source, Source::Cache);
    assert_eq!(served.response.body, "[1,2]");

    // Nothing cached: the strategy itself rejects...
    let storage = MemoryStorage::new();
    let err = network_first(&storage, network.as_ref(), "dynamic", &get("/api/other.json")).await;
    assert!(err.is_err());

    // ...and the interceptor turns that into a 503
    let served = fetch(&router, &get("/api/other.json")).await;
    assert_eq!(served.source, Source::Offline);
    assert_eq!(served.response.status, 503);
}

#[tokio::test]
async fn test_new_version_sweeps_old_partitions() {
    let (old_router, storage, network) = active_router().await;
    network.serve("/index.html", 200, "old shell");
    fetch(&old_router, &get("/index.html")).await;

    let settings = CacheSettings {
        version: "v2.1.0".to_string(),
        ..CacheSettings::default()
    };
    let config = RouterConfig::new(
        ORIGIN.parse().unwrap(),
        &settings,
        &Default::default(),
    )
    .unwrap();
    let new_router = CacheRouter::new(config, storage.clone(), network.clone());
    storage.open(&new_router.config().static_cache).await;
    storage.open("unrelated-cache").await;

    new_router.activate().await;
    let mut after_first = storage.partitions().await;
    after_first.sort();
    assert_eq!(after_first, vec!["fluxlove-static-v2.1.0".to_string()]);

    new_router.activate().await;
    let mut after_second = storage.partitions().await;
    after_second.sort();
    assert_eq!(after_first, after_second);
}

#[tokio::test]
async fn test_cleanup_message_caps_dynamic_partition() {
    let (router, storage, network) = active_router().await;
    for i in 0..60 {
        let path = format!("/src/assets/images/still-{}.png", i);
        network.serve(&path, 200, "png");
        fetch(&router, &get(&path)).await;
    }

    let report = router
        .handle_message(&ClientMessage {
            action: "CLEAN_CACHE".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(report.dynamic_removed, 10);

    let keys = storage.keys(&router.config().dynamic_cache).await;
    assert_eq!(keys.len(), 50);
    assert_eq!(keys[0], RequestKey::from(&get("/src/assets/images/still-10.png")));
    assert_eq!(keys[49], RequestKey::from(&get("/src/assets/images/still-59.png")));
}
