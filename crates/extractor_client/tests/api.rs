use std::fs;

use extractor_client::{ApiErrorKind, ClientSettings, ExtractionApi, ReqwestApi, WireField};
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_json, body_string_contains, header, method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn api_for(server: &MockServer) -> ReqwestApi {
    ReqwestApi::new(ClientSettings {
        base_url: server.uri(),
        ..ClientSettings::default()
    })
    .expect("client")
}

fn document(dir: &TempDir, name: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, b"%PDF-1.4 fake").unwrap();
    path
}

#[tokio::test]
async fn upload_sends_multipart_file_and_parses_fields() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/upload"))
        .and(body_string_contains("name=\"file\""))
        .and(body_string_contains("filename=\"report.pdf\""))
        .and(body_string_contains("%PDF-1.4 fake"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "session_id": "abc",
            "filename": "report.pdf",
            "default_fields": [
                { "id": "name" },
                { "name": "Дата", "type": "date" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let file = document(&dir, "report.pdf");

    let reply = api_for(&server)
        .upload(&file, "report.pdf")
        .await
        .expect("upload ok");

    assert_eq!(reply.session_id, "abc");
    assert_eq!(
        reply.fields,
        vec![
            WireField {
                id: Some("name".to_string()),
                name: None,
                kind: None,
            },
            WireField {
                id: None,
                name: Some("Дата".to_string()),
                kind: Some("date".to_string()),
            },
        ]
    );
}

#[tokio::test]
async fn upload_error_status_surfaces_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/upload"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "Неподдерживаемый формат файла. Разрешены только .docx и .pdf"
        })))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let file = document(&dir, "report.pdf");

    let err = api_for(&server).upload(&file, "report.pdf").await.unwrap_err();

    assert_eq!(
        err.server_message(),
        Some("Неподдерживаемый формат файла. Разрешены только .docx и .pdf")
    );
}

#[tokio::test]
async fn upload_of_missing_file_fails_before_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let err = api_for(&server)
        .upload(&dir.path().join("gone.pdf"), "gone.pdf")
        .await
        .unwrap_err();

    assert_eq!(err.kind, ApiErrorKind::Io);
}

#[tokio::test]
async fn session_cookie_is_replayed_on_preview() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/upload"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Set-Cookie", "session=xyz; Path=/")
                .set_body_json(json!({
                    "success": true,
                    "session_id": "abc",
                    "default_fields": []
                })),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/preview"))
        .and(header("cookie", "session=xyz"))
        .and(body_json(json!({ "fields": ["name", "date"] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "preview": { "preview_data": [ { "name": "A", "date": "2024-01-01" } ] }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let file = document(&dir, "report.docx");
    let api = api_for(&server);
    api.upload(&file, "report.docx").await.expect("upload ok");

    let rows = api
        .preview(&["name".to_string(), "date".to_string()])
        .await
        .expect("preview ok");

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["name"], json!("A"));
}

#[tokio::test]
async fn preview_without_data_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/preview"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "preview": {}
        })))
        .mount(&server)
        .await;

    let rows = api_for(&server)
        .preview(&["name".to_string()])
        .await
        .expect("preview ok");

    assert!(rows.is_empty());
}

#[tokio::test]
async fn success_false_is_rejected_with_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/preview"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "error": "Файл не загружен"
        })))
        .mount(&server)
        .await;

    let err = api_for(&server)
        .preview(&["name".to_string()])
        .await
        .unwrap_err();

    assert_eq!(
        err.kind,
        ApiErrorKind::Rejected {
            server_message: Some("Файл не загружен".to_string())
        }
    );
}

#[tokio::test]
async fn non_json_error_page_maps_to_http_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/process"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&server)
        .await;

    let err = api_for(&server)
        .process(&["name".to_string()])
        .await
        .unwrap_err();

    assert_eq!(err.kind, ApiErrorKind::HttpStatus(502));
    assert_eq!(err.server_message(), None);
}

#[tokio::test]
async fn non_json_success_maps_to_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/process"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;

    let err = api_for(&server)
        .process(&["name".to_string()])
        .await
        .unwrap_err();

    assert_eq!(err.kind, ApiErrorKind::Decode);
}

#[tokio::test]
async fn process_returns_download_url() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/process"))
        .and(body_json(json!({ "fields": ["name"] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "output_file": "abc_20240101_120000.xlsx",
            "download_url": "/api/download/abc_20240101_120000.xlsx"
        })))
        .mount(&server)
        .await;

    let reply = api_for(&server)
        .process(&["name".to_string()])
        .await
        .expect("process ok");

    assert_eq!(reply.download_url, "/api/download/abc_20240101_120000.xlsx");
}

#[tokio::test]
async fn process_success_without_url_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/process"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .mount(&server)
        .await;

    let err = api_for(&server)
        .process(&["name".to_string()])
        .await
        .unwrap_err();

    assert_eq!(err.kind, ApiErrorKind::Decode);
}

#[tokio::test]
async fn download_saves_file_under_its_server_name() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/download/out.xlsx"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"PK\x03\x04sheet".to_vec()))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let target = dir.path().join("downloads");

    let saved = api_for(&server)
        .download("/api/download/out.xlsx", &target)
        .await
        .expect("download ok");

    assert_eq!(saved, target.join("out.xlsx"));
    assert_eq!(fs::read(&saved).unwrap(), b"PK\x03\x04sheet");
}

#[tokio::test]
async fn download_decodes_percent_encoded_name_and_replaces_earlier_copy() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path_regex("^/api/download/"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"new".to_vec()))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("отчёт 1.xlsx"), b"old").unwrap();

    let saved = api_for(&server)
        .download("/api/download/%D0%BE%D1%82%D1%87%D1%91%D1%82%201.xlsx", dir.path())
        .await
        .expect("download ok");

    assert_eq!(saved, dir.path().join("отчёт 1.xlsx"));
    assert_eq!(fs::read(&saved).unwrap(), b"new");
}

#[tokio::test]
async fn missing_download_reports_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/download/gone.xlsx"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "error": "Файл не найден" })))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let err = api_for(&server)
        .download("/api/download/gone.xlsx", dir.path())
        .await
        .unwrap_err();

    assert_eq!(err.server_message(), Some("Файл не найден"));
    assert!(!dir.path().join("gone.xlsx").exists());
}

#[tokio::test]
async fn unreachable_server_is_a_network_error() {
    // Port 9 (discard) is closed on test machines.
    let api = ReqwestApi::new(ClientSettings {
        base_url: "http://127.0.0.1:9".to_string(),
        ..ClientSettings::default()
    })
    .unwrap();

    let err = api.preview(&["name".to_string()]).await.unwrap_err();

    assert_eq!(err.kind, ApiErrorKind::Network);
}
