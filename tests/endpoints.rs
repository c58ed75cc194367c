//! Endpoint behaviour against a live service.

use axum::http::StatusCode;
use serde_json::Value;

mod common;

use common::{client, spawn_service, start_mock_backend, start_programmable_backend, test_config};

#[tokio::test]
async fn test_root_returns_text() {
    let service = spawn_service(test_config()).await;
    let res = client().get(service.url("/")).send().await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().contains_key("x-request-id"));
    assert_eq!(res.text().await.unwrap(), "Hello from the observability demo!");
}

#[tokio::test]
async fn test_health_is_always_healthy() {
    let service = spawn_service(test_config()).await;
    let client = client();

    for _ in 0..5 {
        let res = client.get(service.url("/health")).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = res.json().await.unwrap();
        assert_eq!(body["status"], "healthy");
        let ts = body["timestamp"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(ts).is_ok(), "bad timestamp {ts}");
    }
}

#[tokio::test]
async fn test_error_is_always_server_error() {
    let service = spawn_service(test_config()).await;
    let client = client();

    for _ in 0..5 {
        let res = client.get(service.url("/error")).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            res.headers().get("content-type").unwrap(),
            "application/problem+json"
        );
        let body: Value = res.json().await.unwrap();
        assert_eq!(body["status"], 500);
        assert_eq!(body["title"], "Simulated error");
    }
}

#[tokio::test]
async fn test_test_logs_summary() {
    let service = spawn_service(test_config()).await;
    let res = client().get(service.url("/test-logs")).send().await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Test logs generated");
    assert_eq!(
        body["levels"],
        serde_json::json!(["Information", "Warning", "Error"])
    );
    assert!(chrono::DateTime::parse_from_rfc3339(body["timestamp"].as_str().unwrap()).is_ok());
}

#[tokio::test]
async fn test_loki_test_ready_backend() {
    let loki = start_mock_backend("ready").await;
    let mut config = test_config();
    config.loki.url = loki.url();
    let service = spawn_service(config).await;

    let res = client().get(service.url("/loki-test")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["lokiStatus"], "Loki is ready");
    assert!(body["timestamp"].is_string());
    assert_eq!(loki.requests()[0].path, "/ready");
}

#[tokio::test]
async fn test_loki_test_backend_not_ready_is_still_ok() {
    let loki = start_programmable_backend(|_req| async { (503, "starting".to_string()) }).await;
    let mut config = test_config();
    config.loki.url = loki.url();
    let service = spawn_service(config).await;

    let res = client().get(service.url("/loki-test")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert!(body["lokiStatus"].as_str().unwrap().contains("503"));
}

#[tokio::test]
async fn test_loki_test_unreachable_backend_returns_problem() {
    let service = spawn_service(test_config()).await;

    let res = client().get(service.url("/loki-test")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["title"], "An error occurred while processing your request.");
    assert!(service.telemetry.render().contains("outcome=\"error\""));
}

#[tokio::test]
async fn test_slow_handler_times_out() {
    let loki = start_programmable_backend(|_req| async {
        tokio::time::sleep(std::time::Duration::from_secs(3)).await;
        (200, "ready".to_string())
    })
    .await;
    let mut config = test_config();
    config.loki.url = loki.url();
    config.timeouts.request_secs = 1;
    config.http_client.timeout_secs = 10;
    let service = spawn_service(config).await;

    let res = client().get(service.url("/loki-test")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::REQUEST_TIMEOUT);
}

#[tokio::test]
async fn test_force_logs_pushes_to_backend() {
    let loki = start_programmable_backend(|_req| async { (204, String::new()) }).await;
    let mut config = test_config();
    config.loki.url = loki.url();
    config.loki.burst_size = 3;
    let service = spawn_service(config).await;

    let res = client().get(service.url("/force-logs")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["count"], 3);
    assert_eq!(body["lokiPush"], "ok");

    let requests = loki.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "POST");
    assert_eq!(requests[0].path, "/loki/api/v1/push");
}

#[tokio::test]
async fn test_force_logs_survives_unreachable_backend() {
    let service = spawn_service(test_config()).await;

    let res = client().get(service.url("/force-logs")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert!(body["lokiPush"].as_str().unwrap().starts_with("failed"));
}

#[tokio::test]
async fn test_trace_test_propagates_trace_context() {
    let external = start_mock_backend("{}").await;
    let mut config = test_config();
    config.trace.external_url = format!("{}/anything", external.url());
    let service = spawn_service(config).await;

    let res = client().get(service.url("/trace-test")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    let trace_id = body["traceId"].as_str().unwrap();
    let span_id = body["spanId"].as_str().unwrap();
    assert_eq!(trace_id.len(), 32);
    assert_eq!(span_id.len(), 16);
    assert_eq!(body["externalStatus"], "200");

    let traceparent = external.requests()[0].header("traceparent").unwrap();
    assert_eq!(traceparent, format!("00-{}-{}-01", trace_id, span_id));
}

#[tokio::test]
async fn test_trace_test_continues_inbound_trace() {
    let external = start_mock_backend("{}").await;
    let mut config = test_config();
    config.trace.external_url = external.url();
    let service = spawn_service(config).await;

    let res = client()
        .get(service.url("/trace-test"))
        .header("traceparent", "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01")
        .send()
        .await
        .unwrap();
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["traceId"], "4bf92f3577b34da6a3ce929d0e0e4736");
}

#[tokio::test]
async fn test_trace_test_external_failure_is_degraded() {
    let service = spawn_service(test_config()).await;

    let res = client().get(service.url("/trace-test")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert!(body["externalStatus"].as_str().unwrap().starts_with("error"));
}

#[tokio::test]
async fn test_metrics_scrape() {
    let service = spawn_service(test_config()).await;
    let client = client();
    client.get(service.url("/health")).send().await.unwrap();
    client.get(service.url("/error")).send().await.unwrap();

    let res = client.get(service.url("/metrics")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let text = res.text().await.unwrap();
    assert!(text.contains("demo_http_requests_total"));
    assert!(text.contains("status=\"500\""));
    assert!(text.contains("operation=\"health\""));
    assert_eq!(service.requests_served(), 2.0);
}

#[tokio::test]
async fn test_metrics_can_be_disabled() {
    let mut config = test_config();
    config.metrics.enabled = false;
    let service = spawn_service(config).await;

    let res = client().get(service.url("/metrics")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_path_is_not_found() {
    let service = spawn_service(test_config()).await;

    let res = client().get(service.url("/does-not-exist")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert!(service.telemetry.render().contains("path=\"unmatched\""));
}

#[tokio::test]
async fn test_request_id_is_preserved() {
    let service = spawn_service(test_config()).await;

    let res = client()
        .get(service.url("/health"))
        .header("x-request-id", "fixed-id-1")
        .send()
        .await
        .unwrap();
    assert_eq!(res.headers().get("x-request-id").unwrap(), "fixed-id-1");
}
