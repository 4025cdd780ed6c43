//! End-to-end tests: token exchange, aggregation over HTTP and the JSON API,
//! all against a mock platform server.

use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use presence_auth::{AuthConfig, Credentials};
use presence_monitor::{
    create_router, AppState, LiveScheduler, MonitorConfig, PresenceMonitor, SnapshotSource,
};

const TOKEN: &str = "integration-token";

async fn mount_token(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(header("authorization", "Basic aWQ6c2VjcmV0"))
        .and(body_string_contains("grant_type=client_credentials"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": TOKEN,
            "token_type": "bearer",
            "expires_in": 86399
        })))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_users(server: &MockServer, users: Value) {
    Mock::given(method("GET"))
        .and(path("/users"))
        .and(query_param("pageSize", "100"))
        .and(query_param("pageNumber", "1"))
        .and(header("authorization", format!("Bearer {TOKEN}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "entities": users })))
        .mount(server)
        .await;
}

async fn mount_presence(server: &MockServer, user_id: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(format!("/presence/{user_id}")))
        .and(query_param("sourceId", "PURECLOUD"))
        .respond_with(response)
        .mount(server)
        .await;
}

fn presence(label: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "presenceDefinition": { "id": "def", "systemPresence": label },
        "modifiedDate": "2024-05-01T09:30:00Z"
    }))
}

fn config() -> MonitorConfig {
    MonitorConfig {
        lookup_timeout_seconds: 1,
        ..MonitorConfig::default()
    }
}

async fn login(server: &MockServer) -> (PresenceMonitor, LiveScheduler) {
    let monitor = PresenceMonitor::new(config(), AuthConfig::new(server.uri()));
    let scheduler = monitor
        .login(&Credentials::new("id", "secret"))
        .await
        .expect("login should succeed");
    scheduler
        .subscribe()
        .wait_for(Option::is_some)
        .await
        .expect("first snapshot");
    (monitor, scheduler)
}

async fn get_json(scheduler: &LiveScheduler, uri: &str) -> (StatusCode, Value) {
    let response = create_router(AppState::new(scheduler.clone()))
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn five_users_with_one_failed_lookup() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    mount_users(
        &server,
        json!([
            {"id": "u1", "name": "Maya", "email": "maya@x.com", "department": "Sales", "title": "Lead"},
            {"id": "u2", "name": "Ben", "email": "ben@x.com", "department": "Customer Billing"},
            {"id": "u3", "name": "Ivy", "email": "ivy@x.com", "department": "IT Operations"},
            {"id": "u4", "name": "Omar", "email": "omar@x.com"},
            {"id": "u5", "name": "Cleo", "email": "cleo@x.com", "department": "Service Desk"},
            {"id": "u6", "name": "No Email"}
        ]),
    )
    .await;
    mount_presence(&server, "u1", presence("Available")).await;
    mount_presence(&server, "u2", presence("BUSY")).await;
    mount_presence(&server, "u3", presence("away")).await;
    mount_presence(&server, "u4", presence("Offline")).await;
    mount_presence(&server, "u5", ResponseTemplate::new(503)).await;

    let (monitor, scheduler) = login(&server).await;
    let snapshot = monitor.snapshot().unwrap();

    assert_eq!(snapshot.source, SnapshotSource::Live);
    assert_eq!(snapshot.agents.len(), 5);
    assert_eq!(snapshot.presence_failures, 1);

    let names: Vec<_> = snapshot.agents.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["Ben", "Cleo", "Ivy", "Maya", "Omar"]);

    let cleo = &snapshot.agents[1];
    assert_eq!(cleo.presence_status.label(), "Unknown");
    assert!(cleo.is_online);
    assert_eq!(cleo.queue_names, vec!["Technical Support", "Customer Service"]);

    let maya = &snapshot.agents[3];
    assert_eq!(maya.title.as_deref(), Some("Lead"));
    assert!(maya.last_status_change.is_some());

    let (status, stats) = get_json(&scheduler, "/v1/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["total_count"], 5);
    assert_eq!(stats["online_count"], 4);
    assert_eq!(stats["utilization"], 40);
    assert_eq!(stats["source"], "live");

    let (status, agents) = get_json(&scheduler, "/v1/queues/Billing%20Queue/agents").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(agents["agents"][0]["name"], "Ben");

    monitor.logout();
    let (status, _) = get_json(&scheduler, "/v1/agents").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn forbidden_listing_falls_back_to_sample_data() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(403).set_body_string("missing permission"))
        .mount(&server)
        .await;

    let (monitor, _scheduler) = login(&server).await;
    let snapshot = monitor.snapshot().unwrap();

    assert_eq!(snapshot.source, SnapshotSource::Fallback);
    assert_eq!(snapshot.agents.len(), 8);
    assert_eq!(snapshot.fallback_reason, Some("permission_denied"));
    assert!(snapshot.agents.iter().all(|a| !a.queue_names.is_empty()));
}

#[tokio::test]
async fn slow_lookup_is_bounded_by_timeout() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    mount_users(
        &server,
        json!([
            {"id": "u1", "name": "Fast", "email": "fast@x.com"},
            {"id": "u2", "name": "Slow", "email": "slow@x.com"}
        ]),
    )
    .await;
    mount_presence(&server, "u1", presence("Available")).await;
    mount_presence(
        &server,
        "u2",
        presence("Available").set_delay(Duration::from_secs(5)),
    )
    .await;

    let started = std::time::Instant::now();
    let (monitor, _scheduler) = login(&server).await;
    assert!(started.elapsed() < Duration::from_secs(4));

    let snapshot = monitor.snapshot().unwrap();
    assert_eq!(snapshot.agents.len(), 2);
    assert_eq!(snapshot.presence_failures, 1);
    let slow = snapshot.agents.iter().find(|a| a.name == "Slow").unwrap();
    assert_eq!(slow.presence_status.label(), "Unknown");
}

#[tokio::test]
async fn rejected_credentials_fail_login() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(400).set_body_string(r#"{"error":"invalid_client"}"#))
        .mount(&server)
        .await;

    let monitor = PresenceMonitor::new(config(), AuthConfig::new(server.uri()));
    let err = monitor
        .login(&Credentials::new("id", "wrong"))
        .await
        .unwrap_err();

    assert!(err.to_string().contains("HTTP 400"));
    assert!(!monitor.is_logged_in());
}
