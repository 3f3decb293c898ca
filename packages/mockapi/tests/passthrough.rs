#![cfg(feature = "passthrough")]

use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use sandbench_kv::MemoryStore;
use sandbench_mockapi::{ApiRequest, ChaosConfig, HttpUpstream, MockBackend};

#[tokio::test]
async fn non_api_requests_reach_the_real_server() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/assets/data.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "real": true })))
        .mount(&server)
        .await;

    let uri = server.uri();
    let response = tokio::task::spawn_blocking(move || {
        let mut backend = MockBackend::new("demo", MemoryStore::new())
            .with_chaos(ChaosConfig::quiet())
            .with_upstream(Box::new(HttpUpstream::new(&uri).unwrap()));
        backend.fetch(&ApiRequest::get("/assets/data.json"))
    })
    .await
    .unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.body, json!({ "real": true }));
}

#[tokio::test]
async fn api_requests_never_reach_the_real_server() {
    let server = MockServer::start().await;

    // Any hit on the real server would be a routing bug; expect none.
    Mock::given(method("GET"))
        .and(path("/api/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "real": true }])))
        .expect(0)
        .mount(&server)
        .await;

    let uri = server.uri();
    let response = tokio::task::spawn_blocking(move || {
        let mut backend = MockBackend::new("demo", MemoryStore::new())
            .with_chaos(ChaosConfig::quiet())
            .with_upstream(Box::new(HttpUpstream::new(&uri).unwrap()));
        backend.fetch(&ApiRequest::get("/api/products"))
    })
    .await
    .unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.body, json!([]));
}

#[tokio::test]
async fn passthrough_forwards_bodies_unchanged() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/echo"))
        .and(body_json(json!({ "payload": 7 })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "ok": true })))
        .mount(&server)
        .await;

    let uri = server.uri();
    let response = tokio::task::spawn_blocking(move || {
        let mut backend = MockBackend::new("demo", MemoryStore::new())
            .with_chaos(ChaosConfig::quiet())
            .with_upstream(Box::new(HttpUpstream::new(&uri).unwrap()));
        backend.fetch(
            &ApiRequest::post("/echo")
                .with_body(&json!({ "payload": 7 }))
                .unwrap(),
        )
    })
    .await
    .unwrap();

    assert_eq!(response.status, 201);
    assert_eq!(response.body, json!({ "ok": true }));
}
