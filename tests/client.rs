//! Integration tests for the HTTP surface, against a local mock of the
//! Vidmill API.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use vidmill::{ClientBuilder, ConfigBuilder, VidmillError, WaitOptions};

async fn client_for(server: &MockServer) -> vidmill::Client {
    ClientBuilder::new()
        .api_key("vm_test_key")
        .base_url(server.uri())
        .build()
        .unwrap()
}

fn test_config() -> String {
    ConfigBuilder::new()
        .source("https://example.com/video.mp4")
        .webhook("http://mysite.com/webhook")
        .output("mp4", "s3://a:s@bucket/video.mp4")
        .build()
        .unwrap()
}

#[tokio::test]
async fn submit_posts_config_text_and_returns_processing_job() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/job"))
        .and(header("authorization", "Bearer vm_test_key"))
        .and(header("content-type", "text/plain"))
        .and(body_string_contains("set source = https://example.com/video.mp4"))
        .and(body_string_contains("-> mp4 = s3://a:s@bucket/video.mp4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "processing",
            "id": 1234,
        })))
        .expect(1)
        .mount(&server)
        .await;

    let job = client_for(&server).await.submit(&test_config()).await.unwrap();

    assert_eq!(job.id, 1234);
    assert!(job.is_processing());
    assert!(!job.is_terminal());
}

#[tokio::test]
async fn rejected_config_surfaces_service_error_code() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/job"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "status": "error",
            "error_code": "config_not_valid",
            "message": "missing output targets",
        })))
        .mount(&server)
        .await;

    let err = client_for(&server).await.submit(&test_config()).await.unwrap_err();

    match err {
        VidmillError::Service {
            status_code,
            error_code,
            message,
            ..
        } => {
            assert_eq!(status_code, 400);
            assert_eq!(error_code.as_deref(), Some("config_not_valid"));
            assert_eq!(message, "missing output targets");
        }
        other => panic!("expected Service error, got {other:?}"),
    }
}

#[tokio::test]
async fn rejection_in_success_body_is_still_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/job"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "error",
            "error_code": "config_not_valid",
        })))
        .mount(&server)
        .await;

    let err = client_for(&server).await.submit(&test_config()).await.unwrap_err();

    assert!(matches!(
        err,
        VidmillError::Service { error_code: Some(ref code), .. } if code == "config_not_valid"
    ));
}

#[tokio::test]
async fn bad_key_maps_to_authentication_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/job"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "status": "error",
            "error_code": "authentication_failed",
            "message": "invalid API key",
        })))
        .mount(&server)
        .await;

    let err = client_for(&server).await.submit(&test_config()).await.unwrap_err();

    assert!(matches!(err, VidmillError::Authentication { .. }));
}

#[tokio::test]
async fn get_job_parses_record() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/jobs/1234"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1234,
            "status": "completed",
            "progress": "100%",
            "created_at": "2026-08-01T10:00:00Z",
            "completed_at": "2026-08-01T10:03:12Z",
            "output_urls": { "mp4": "s3://a:s@bucket/video.mp4" },
        })))
        .mount(&server)
        .await;

    let job = client_for(&server).await.get_job(1234).await.unwrap();

    assert_eq!(job.id, 1234);
    assert!(job.is_complete());
    assert_eq!(job.output_url("mp4"), Some("s3://a:s@bucket/video.mp4"));
}

#[tokio::test]
async fn unknown_job_maps_to_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/jobs/99"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "status": "error",
            "error_code": "job_not_found",
            "message": "unknown job",
        })))
        .mount(&server)
        .await;

    let err = client_for(&server).await.get_job(99).await.unwrap_err();

    assert!(matches!(err, VidmillError::NotFound { .. }));
}

#[tokio::test]
async fn metadata_is_none_until_probed() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/metadata/jobs/1234"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(null)))
        .mount(&server)
        .await;

    let metadata = client_for(&server).await.get_all_metadata(1234).await.unwrap();

    assert!(metadata.is_none());
}

#[tokio::test]
async fn metadata_exposes_probed_targets() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/metadata/jobs/1234"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "metadata": {
                "source": { "format": "mpeg4", "duration": 10.05 },
                "mp4": { "format": "mpeg4", "duration": 10.05 },
            }
        })))
        .mount(&server)
        .await;

    let metadata = client_for(&server)
        .await
        .get_all_metadata(1234)
        .await
        .unwrap()
        .expect("metadata should be present");

    assert_eq!(metadata.targets(), vec!["mp4", "source"]);
    assert_eq!(
        metadata.source().and_then(|s| s.get("format")).and_then(|f| f.as_str()),
        Some("mpeg4")
    );
}

#[tokio::test]
async fn single_target_metadata_round_trips() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/metadata/jobs/1234/source"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "format": "mpeg4",
            "duration": 10.05,
        })))
        .mount(&server)
        .await;

    let record = client_for(&server)
        .await
        .get_metadata_for(1234, "source")
        .await
        .unwrap()
        .expect("source metadata should be present");

    assert_eq!(record.get("format").and_then(|f| f.as_str()), Some("mpeg4"));
}

#[tokio::test]
async fn encode_polls_until_completed() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/job"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "processing",
            "id": 77,
        })))
        .mount(&server)
        .await;

    // First poll sees the job still processing, the next one completed.
    Mock::given(method("GET"))
        .and(path("/jobs/77"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 77,
            "status": "processing",
            "progress": "40%",
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/jobs/77"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 77,
            "status": "completed",
            "progress": "100%",
        })))
        .mount(&server)
        .await;

    let opts = WaitOptions {
        poll_interval: Duration::from_millis(10),
        timeout: Duration::from_secs(5),
        on_progress: None,
    };

    let job = client_for(&server)
        .await
        .encode(&test_config(), Some(opts))
        .await
        .unwrap();

    assert!(job.is_complete());
    assert_eq!(job.progress.as_deref(), Some("100%"));
}

#[tokio::test]
async fn wait_reports_failed_jobs() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/jobs/78"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 78,
            "status": "error",
            "error_code": "source_not_found",
        })))
        .mount(&server)
        .await;

    let opts = WaitOptions {
        poll_interval: Duration::from_millis(10),
        timeout: Duration::from_secs(5),
        on_progress: None,
    };

    let err = client_for(&server).await.wait(78, &opts).await.unwrap_err();

    match err {
        VidmillError::JobFailed(message) => assert!(message.contains("source_not_found")),
        other => panic!("expected JobFailed, got {other:?}"),
    }
}

#[test]
fn builder_requires_an_api_key() {
    // Keep set/remove in one test so parallel tests never race on the var.
    std::env::remove_var("VIDMILL_API_KEY");
    let err = ClientBuilder::new().build().unwrap_err();
    assert!(matches!(err, VidmillError::Authentication { .. }));

    std::env::set_var("VIDMILL_API_KEY", "vm_test_from_env");
    assert!(ClientBuilder::new().build().is_ok());
    std::env::remove_var("VIDMILL_API_KEY");
}
