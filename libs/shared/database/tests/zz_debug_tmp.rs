use serde_json::json;
use shared_database::store::StoreClient;
use shared_config::AppConfig;
use wiremock::{Mock, MockServer, ResponseTemplate};
use wiremock::matchers::{header, method, path, query_param};

async fn send(server: &MockServer) -> bool {
    let c = StoreClient::new(&AppConfig {
        store_url: server.uri(),
        store_api_key: "k".into(),
        jwt_secret: "u".into(),
    });
    c.insert_unless_conflict("appointments", "doctor_id,appointment_time", json!({"doctor_id":1}))
        .await
        .is_ok()
}

#[tokio::test]
async fn m_method_path() {
    let server = MockServer::start().await;
    Mock::given(method("POST")).and(path("/appointments"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([])))
        .mount(&server).await;
    assert!(send(&server).await, "method+path failed");
}

#[tokio::test]
async fn m_query() {
    let server = MockServer::start().await;
    Mock::given(method("POST")).and(query_param("on_conflict", "doctor_id,appointment_time"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([])))
        .mount(&server).await;
    assert!(send(&server).await, "query_param failed");
}

#[tokio::test]
async fn m_header() {
    let server = MockServer::start().await;
    Mock::given(method("POST")).and(header("Prefer", "resolution=ignore-duplicates,return=representation"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([])))
        .mount(&server).await;
    assert!(send(&server).await, "header failed");
}
