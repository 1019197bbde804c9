#![allow(clippy::unwrap_used)]
// End-to-end binding and polling tests against a wiremock server.

use std::time::Duration;

use futures_util::StreamExt;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use url::Url;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use medtrack_core::{ClientConfig, CollectionBinding, CollectionClient, Phase, PollingManager};

async fn setup() -> (MockServer, PollingManager<CollectionClient>) {
    let server = MockServer::start().await;
    let config = ClientConfig::new(Url::parse(&format!("{}/api", server.uri())).unwrap());
    let client = config.build_client().unwrap();
    (server, PollingManager::new(client))
}

fn as_values(docs: &[medtrack_core::Document]) -> Vec<Value> {
    docs.iter().cloned().map(Value::from).collect()
}

#[tokio::test]
async fn test_add_item_appends_without_refetch() {
    let (server, poller) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/medicine"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/medicine"))
        .and(body_json(json!({"name": "Aspirin", "quantity": 10})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "42"})))
        .expect(1)
        .mount(&server)
        .await;

    let mut binding = CollectionBinding::new(poller, "medicine", false);
    binding.mount().await;
    assert_eq!(binding.state().phase, Phase::Ready);

    let fields = json!({"name": "Aspirin", "quantity": 10});
    let id = binding
        .add_item(fields.as_object().unwrap().clone())
        .await
        .unwrap();

    assert_eq!(id, "42");
    assert_eq!(
        as_values(&binding.state().data),
        [json!({"id": "42", "name": "Aspirin", "quantity": 10})]
    );
}

#[tokio::test]
async fn test_one_shot_failure_surfaces_error() {
    let (server, poller) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/medicine"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let mut binding = CollectionBinding::new(poller, "medicine", false);
    binding.mount().await;

    let state = binding.state();
    assert!(!state.loading);
    assert!(state.data.is_empty());
    assert_eq!(state.phase, Phase::Failed);
    assert_eq!(state.error.as_ref().unwrap().status(), Some(500));
}

#[tokio::test]
async fn test_realtime_binding_follows_server() {
    let (server, poller) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/Ambient"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{"id": "1", "temperature": 21.5, "humidity": 40}])),
        )
        .mount(&server)
        .await;

    let mut binding =
        CollectionBinding::new(poller, "Ambient", true).with_interval(Duration::from_millis(50));
    let mut view = binding.watch();
    binding.mount().await;

    let state = tokio::time::timeout(Duration::from_secs(5), view.wait_for(|s| !s.loading))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(state.data[0].get_f64("temperature"), Some(21.5));
    assert!(state.error.is_none());

    binding.unmount();
}

#[tokio::test]
async fn test_snapshot_stream_polls_until_dropped() {
    let (server, poller) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/Ambient"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": "1"}])))
        .mount(&server)
        .await;

    let mut stream = poller.stream("Ambient", Duration::from_millis(20));
    for _ in 0..3 {
        let docs = tokio::time::timeout(Duration::from_secs(5), stream.next())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(docs[0].id(), "1");
    }
    assert!(stream.subscription().stats().delivered >= 3);
}
