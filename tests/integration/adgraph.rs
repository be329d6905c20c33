use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use adpulse::models::execution::EntityStatus;
use adpulse::services::adgraph::{AdGraphClient, AdGraphError, HttpAdGraphClient};

async fn client_for(server: &MockServer) -> HttpAdGraphClient {
    HttpAdGraphClient::new(server.uri())
}

#[tokio::test]
async fn get_status_prefers_effective_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/120211111111111111"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "effective_status": "ACTIVE",
            "status": "PAUSED",
        })))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let status = client
        .get_status("token", "120211111111111111")
        .await
        .unwrap();
    assert_eq!(status, EntityStatus::Active);
}

#[tokio::test]
async fn get_status_treats_non_delivering_states_as_paused() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/120211111111111111"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "effective_status": "IN_PROCESS",
        })))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let status = client
        .get_status("token", "120211111111111111")
        .await
        .unwrap();
    assert_eq!(status, EntityStatus::Paused);
}

#[tokio::test]
async fn graph_error_codes_classify_into_the_taxonomy() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/1"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": { "code": 17, "message": "User request limit reached" }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/2"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": { "code": 10, "message": "Permission denied" }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/3"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": { "code": 803, "message": "Unknown object" }
        })))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    assert!(matches!(
        client.get_status("token", "1").await,
        Err(AdGraphError::RateLimited(_))
    ));
    assert!(matches!(
        client.get_status("token", "2").await,
        Err(AdGraphError::PermissionDenied(_))
    ));
    assert!(matches!(
        client.get_status("token", "3").await,
        Err(AdGraphError::NotFound(_))
    ));
}

#[tokio::test]
async fn plain_429_maps_to_rate_limited() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/1"))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let err = client.get_status("token", "1").await.unwrap_err();
    assert!(matches!(err, AdGraphError::RateLimited(_)));
    assert!(err.is_transient());
}

#[tokio::test]
async fn set_status_posts_the_status_form() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/120211111111111111"))
        .and(body_string_contains("status=PAUSED"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    client
        .set_status("token", "120211111111111111", EntityStatus::Paused)
        .await
        .unwrap();
}

#[tokio::test]
async fn batch_set_reports_per_entity_outcomes() {
    let server = MockServer::start().await;
    let body = json!([
        { "code": 200, "body": "{\"success\":true}" },
        {
            "code": 400,
            "body": "{\"error\":{\"code\":10,\"message\":\"no permission\"}}"
        },
        null,
    ]);
    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let ids = vec!["e1".to_string(), "e2".to_string(), "e3".to_string()];
    let results = client
        .set_status_batch("token", &ids, EntityStatus::Paused)
        .await
        .unwrap();

    assert!(results["e1"].is_ok());
    assert!(matches!(
        results["e2"],
        Err(AdGraphError::PermissionDenied(_))
    ));
    // A null batch item is a per-entity timeout, transient by definition
    assert!(matches!(results["e3"], Err(AdGraphError::Transport(_))));
}

#[tokio::test]
async fn metrics_batch_parses_insights_and_drops_failures() {
    let server = MockServer::start().await;
    let insights = json!({
        "data": [{
            "spend": "12.50",
            "actions": [
                { "action_type": "lead", "value": "2" },
                { "action_type": "purchase", "value": "1" },
                { "action_type": "link_click", "value": "40" },
            ],
        }]
    })
    .to_string();
    let body = json!([
        { "code": 200, "body": insights },
        { "code": 500, "body": null },
    ]);
    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_string_contains("insights"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let ids = vec!["e1".to_string(), "e2".to_string()];
    let metrics = client.get_metrics_batch("token", &ids, "today").await.unwrap();

    let e1 = &metrics["e1"];
    assert_eq!(e1.spend, 12.5);
    // Only conversion actions count as results
    assert_eq!(e1.results, 3);
    assert!(!metrics.contains_key("e2"));
}

#[tokio::test]
async fn entity_with_no_delivery_has_no_metrics_entry() {
    let server = MockServer::start().await;
    let body = json!([
        { "code": 200, "body": json!({ "data": [] }).to_string() },
    ]);
    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let ids = vec!["e1".to_string()];
    let metrics = client.get_metrics_batch("token", &ids, "today").await.unwrap();
    assert!(metrics.is_empty());
}
