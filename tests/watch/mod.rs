use std::sync::Arc;
use std::time::Duration;

use getwatch::call_with_timeout;
use getwatch::handle_get;
use getwatch::serve_watch;
use getwatch::CallContext;
use getwatch::ClientConfig;
use getwatch::MemoryStore;
use getwatch::WatchConfig;
use getwatch::Watcher;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tonic::Code;

use crate::commons::ConfigEndpoint;
use crate::commons::ConfigReply;
use crate::commons::ConfigRequest;
use crate::enable_logger;

const WAIT: Duration = Duration::from_secs(2);

fn request(target: &str) -> ConfigRequest {
    ConfigRequest {
        target: target.to_string(),
    }
}

fn reply(
    target: &str,
    data: &str,
) -> ConfigReply {
    ConfigReply {
        target: target.to_string(),
        data: data.to_string(),
    }
}

async fn next(watcher: &mut Watcher<ConfigReply>) -> Result<Option<ConfigReply>, tonic::Status> {
    timeout(WAIT, watcher.next()).await.expect("watcher stalled")
}

async fn wait_for_subscribers(
    store: &MemoryStore<String>,
    key: &str,
    expected: usize,
) {
    timeout(WAIT, async {
        while store.subscriber_count(key) != expected {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("subscription did not settle");
}

#[tokio::test]
async fn test_watcher_follows_served_watch() {
    enable_logger();
    let store = Arc::new(MemoryStore::from_config(&WatchConfig::default()));
    store.put("/config/lain", "v1".to_string());
    let endpoint = ConfigEndpoint::new(store.clone());

    let stream = serve_watch(endpoint, request("lain"), CallContext::default())
        .await
        .unwrap();
    let mut watcher = Watcher::with_config(stream, CancellationToken::new(), &ClientConfig::default());

    assert_eq!(next(&mut watcher).await.unwrap(), Some(reply("lain", "v1")));
    wait_for_subscribers(&store, "/config/lain", 1).await;

    store.put("/config/lain", "v1".to_string());
    store.put("/config/lain", "v2".to_string());
    store.put("/config/other", "x".to_string());
    store.delete("/config/lain");

    assert_eq!(next(&mut watcher).await.unwrap(), Some(reply("lain", "v2")));
    assert_eq!(next(&mut watcher).await.unwrap(), Some(reply("lain", "")));

    store.fail("/config/lain", "backend compacted");
    let status = next(&mut watcher).await.unwrap_err();
    assert_eq!(status.code(), Code::Internal);
    assert!(status.message().contains("Key: /config/lain"));
    assert_eq!(watcher.last_error().unwrap().code(), Code::Internal);
    wait_for_subscribers(&store, "/config/lain", 0).await;
}

#[tokio::test]
async fn test_dropping_watcher_releases_server_subscription() {
    enable_logger();
    let store = Arc::new(MemoryStore::default());
    store.put("/config/lain", "v1".to_string());
    let client_cancel = CancellationToken::new();

    let stream = serve_watch(ConfigEndpoint::new(store.clone()), request("lain"), CallContext::default())
        .await
        .unwrap();
    let mut watcher = Watcher::spawn(stream, client_cancel.child_token());
    next(&mut watcher).await.unwrap();
    wait_for_subscribers(&store, "/config/lain", 1).await;

    drop(watcher);

    wait_for_subscribers(&store, "/config/lain", 0).await;
    assert!(!client_cancel.is_cancelled());
}

#[tokio::test]
async fn test_client_cancel_ends_every_watcher() {
    let store = Arc::new(MemoryStore::default());
    store.put("/config/a", "1".to_string());
    store.put("/config/b", "2".to_string());
    let client_cancel = CancellationToken::new();

    let mut watchers = Vec::new();
    for target in ["a", "b"] {
        let stream = serve_watch(ConfigEndpoint::new(store.clone()), request(target), CallContext::default())
            .await
            .unwrap();
        let mut watcher = Watcher::spawn(stream, client_cancel.child_token());
        next(&mut watcher).await.unwrap();
        watchers.push(watcher);
    }

    client_cancel.cancel();

    for watcher in watchers.iter_mut() {
        assert_eq!(next(watcher).await.unwrap(), None);
        assert!(watcher.is_closed());
    }
    wait_for_subscribers(&store, "/config/a", 0).await;
    wait_for_subscribers(&store, "/config/b", 0).await;
}

#[tokio::test]
async fn test_unary_get_through_timeout_wrapper() {
    let store = Arc::new(MemoryStore::default());
    store.put("/config/lain", "v1".to_string());
    let endpoint = ConfigEndpoint::new(store);
    let timeout_duration = ClientConfig::default().request_timeout();

    let call = async {
        handle_get(&endpoint, &request("lain"), &CallContext::default())
            .await
            .map(tonic::Response::new)
    };
    let got = call_with_timeout(timeout_duration, call).await.unwrap();
    assert_eq!(got, reply("lain", "v1"));

    let call = async {
        handle_get(&endpoint, &request(""), &CallContext::default())
            .await
            .map(tonic::Response::new)
    };
    let status = call_with_timeout(timeout_duration, call).await.unwrap_err();
    assert_eq!(status.code(), Code::InvalidArgument);
}
