use std::sync::{Arc, Mutex};

use inkwell_core::FileRef;
use inkwell_engine::{
    EngineEvent, FailureKind, ProgressSink, ReqwestTransport, TransportSettings, UploadOptions,
    UploadTransport,
};
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Default)]
struct TestSink {
    events: Mutex<Vec<EngineEvent>>,
}

impl TestSink {
    fn percents(&self) -> Vec<u8> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|event| match event {
                EngineEvent::Progress { percent, .. } => Some(*percent),
                _ => None,
            })
            .collect()
    }
}

impl ProgressSink for TestSink {
    fn emit(&self, event: EngineEvent) {
        self.events.lock().unwrap().push(event);
    }
}

fn transport_for(server: &MockServer) -> ReqwestTransport {
    ReqwestTransport::new(TransportSettings {
        endpoint: format!("{}/upload", server.uri()),
        upload_preset: Some("unsigned-posts".to_string()),
        chunk_size: 4,
        ..TransportSettings::default()
    })
    .expect("client")
}

fn png(name: &str) -> FileRef {
    FileRef::from_bytes(name, "image/png", b"0123456789".to_vec())
}

#[tokio::test]
async fn uploads_multipart_form_and_reports_progress() {
    editor_logging::initialize_for_tests();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .and(body_string_contains("name=\"folder\""))
        .and(body_string_contains("blog-posts"))
        .and(body_string_contains("unsigned-posts"))
        .and(body_string_contains("0123456789"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "secure_url": "https://cdn.example/blog-posts/cat.png",
            "public_id": "blog-posts/cat",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let transport = transport_for(&server);
    let sink = Arc::new(TestSink::default());
    let options = UploadOptions {
        folder: Some("blog-posts".to_string()),
    };

    let receipt = transport
        .upload(1, &png("cat.png"), &options, sink.clone())
        .await
        .expect("upload ok");
    assert_eq!(receipt.url, "https://cdn.example/blog-posts/cat.png");
    assert_eq!(receipt.public_id, "blog-posts/cat");

    let percents = sink.percents();
    assert!(percents.len() >= 2);
    assert_eq!(percents.last(), Some(&100));
    assert!(percents.windows(2).all(|pair| pair[0] <= pair[1]));
}

#[tokio::test]
async fn sends_bearer_token_when_configured() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .and(header("authorization", "Bearer secret-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "url": "http://cdn.example/a.png",
            "public_id": "a",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let transport = ReqwestTransport::new(TransportSettings {
        endpoint: format!("{}/upload", server.uri()),
        api_key: Some("secret-key".to_string()),
        ..TransportSettings::default()
    })
    .expect("client");

    let receipt = transport
        .upload(
            2,
            &png("a.png"),
            &UploadOptions::default(),
            Arc::new(TestSink::default()),
        )
        .await
        .expect("upload ok");
    assert_eq!(receipt.url, "http://cdn.example/a.png");
}

#[tokio::test]
async fn http_error_carries_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": { "message": "Invalid image file" }
        })))
        .mount(&server)
        .await;

    let err = transport_for(&server)
        .upload(
            3,
            &png("bad.png"),
            &UploadOptions::default(),
            Arc::new(TestSink::default()),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(400));
    assert_eq!(err.user_message(), "Invalid image file");
}

#[tokio::test]
async fn http_error_without_body_falls_back_to_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = transport_for(&server)
        .upload(
            4,
            &png("a.png"),
            &UploadOptions::default(),
            Arc::new(TestSink::default()),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(503));
    assert!(err.user_message().contains("503"));
}

#[tokio::test]
async fn success_status_with_garbage_body_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = transport_for(&server)
        .upload(
            5,
            &png("a.png"),
            &UploadOptions::default(),
            Arc::new(TestSink::default()),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidResponse);
}

#[tokio::test]
async fn reads_files_from_disk() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .and(body_string_contains("bytes-on-disk"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "secure_url": "https://cdn.example/disk.png",
            "public_id": "disk",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::TempDir::new().unwrap();
    let file_path = dir.path().join("disk.png");
    std::fs::write(&file_path, "bytes-on-disk").unwrap();
    let file = FileRef::from_path(&file_path, "image/png", 13);

    let receipt = transport_for(&server)
        .upload(
            6,
            &file,
            &UploadOptions::default(),
            Arc::new(TestSink::default()),
        )
        .await
        .expect("upload ok");
    assert_eq!(receipt.public_id, "disk");
}

#[tokio::test]
async fn missing_file_is_an_io_failure() {
    let file = FileRef::from_path("/definitely/not/here.png", "image/png", 10);
    let transport = ReqwestTransport::new(TransportSettings::default()).expect("client");

    let err = transport
        .upload(
            7,
            &file,
            &UploadOptions::default(),
            Arc::new(TestSink::default()),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::Io);
}

#[tokio::test]
async fn malformed_endpoint_is_rejected_before_reading() {
    let transport = ReqwestTransport::new(TransportSettings {
        endpoint: "not a url".to_string(),
        ..TransportSettings::default()
    })
    .expect("client");

    let err = transport
        .upload(
            8,
            &png("a.png"),
            &UploadOptions::default(),
            Arc::new(TestSink::default()),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidEndpoint);
}
