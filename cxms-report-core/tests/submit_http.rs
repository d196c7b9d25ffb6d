use cxms_report_core::config::EndpointConfig;
use cxms_report_core::submit::{Submit, SubmitClient, SyncSubmitter};
use cxms_report_core::{Error, MetricsRecord};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn endpoint(server: &MockServer) -> EndpointConfig {
    EndpointConfig {
        base_url: server.uri(),
        table: "cxms_telemetry".to_string(),
        api_key: "anon-test-key".to_string(),
    }
}

fn sample_record() -> MetricsRecord {
    let mut record = MetricsRecord::default();
    record.identity.installation_id = "3f1c9a52-0000-4000-8000-000000000001".to_string();
    record.identity.submission_number = 7;
    record.tasks.active = 2;
    record
}

#[tokio::test]
async fn submit_posts_record_with_endpoint_headers() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/cxms_telemetry"))
        .and(header("apikey", "anon-test-key"))
        .and(header("authorization", "Bearer anon-test-key"))
        .and(header("prefer", "return=minimal"))
        .and(header("content-type", "application/json"))
        .and(body_partial_json(json!({
            "identity": { "submission_number": 7 },
            "tasks": { "active": 2, "completion_rate": null }
        })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let client = SubmitClient::new(&endpoint(&server)).unwrap();
    client.submit(&sample_record()).await.unwrap();
}

#[tokio::test]
async fn submit_accepts_any_2xx() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let client = SubmitClient::new(&endpoint(&server)).unwrap();
    assert!(client.submit(&sample_record()).await.is_ok());
}

#[tokio::test]
async fn submit_reports_http_status_on_rejection() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "message": "Invalid API key"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = SubmitClient::new(&endpoint(&server)).unwrap();
    let err = client.submit(&sample_record()).await.unwrap_err();
    match err {
        Error::Submit(reason) => assert_eq!(reason, "HTTP 401"),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn submit_reports_transport_failure() {
    let server = MockServer::builder().start().await;
    let config = endpoint(&server);
    drop(server);

    let client = SubmitClient::new(&config).unwrap();
    let err = client.submit(&sample_record()).await.unwrap_err();
    match err {
        Error::Submit(reason) => assert!(reason.starts_with("request failed")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn sync_submitter_blocks_until_sent() {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    let server = runtime.block_on(async {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/cxms_telemetry"))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;
        server
    });

    let mut submitter = SyncSubmitter::new(&endpoint(&server)).unwrap();
    submitter.submit(&sample_record()).unwrap();

    let requests = runtime.block_on(server.received_requests()).unwrap();
    assert_eq!(requests.len(), 1);
}
