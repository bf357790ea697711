
use reqwest::{header, StatusCode};
use serde_json::Value;
use test_utils::*;

const PNG_MAGIC: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

#[actix_rt::test]
async fn uploaded_file_is_listed_and_served() {
    let app = TestApp::spawn().await;

    let response = app.upload_file(PNG_MAGIC.to_vec(), "logo.png").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["filename"], "logo.png");
    assert_eq!(body["message"], "You successfully uploaded logo.png!");

    let urls: Vec<String> = app.client
        .get(app.url("/files"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(urls.len(), 1);
    assert!(urls[0].ends_with("/api/v1/files/logo.png"), "unexpected url {}", urls[0]);

    let served = app.client.get(&urls[0]).send().await.unwrap();
    assert_eq!(served.status(), StatusCode::OK);
    assert_eq!(served.headers()[header::CONTENT_TYPE], "image/png");
    assert_eq!(served.headers()[header::CONTENT_DISPOSITION], "inline; filename=\"logo.png\"");
    assert_eq!(served.headers()[header::CACHE_CONTROL], "public, max-age=3600");
    assert_eq!(served.bytes().await.unwrap().to_vec(), PNG_MAGIC.to_vec());
}

#[actix_rt::test]
async fn unknown_content_is_served_as_octet_stream() {
    let app = TestApp::spawn().await;
    app.upload_file(b"plain bytes".to_vec(), "notes.bin").await;

    let served = app.client.get(app.url("/files/notes.bin")).send().await.unwrap();

    assert_eq!(served.status(), StatusCode::OK);
    assert_eq!(served.headers()[header::CONTENT_TYPE], "application/octet-stream");
}

#[actix_rt::test]
async fn same_name_uploads_do_not_overwrite_each_other() {
    let app = TestApp::spawn().await;

    app.upload_file(vec![1], "dup.jpg").await;
    let second: Value = app.upload_file(vec![2], "dup.jpg").await.json().await.unwrap();

    let second_name = second["filename"].as_str().unwrap();
    assert_ne!(second_name, "dup.jpg");
    assert_eq!(app.stored_bytes("dup.jpg"), Some(vec![1]));
    assert_eq!(app.stored_bytes(second_name), Some(vec![2]));
}

#[actix_rt::test]
async fn missing_file_is_404() {
    let app = TestApp::spawn().await;

    let response = app.client.get(app.url("/files/missing.jpg")).send().await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn hidden_names_are_rejected_when_serving() {
    let app = TestApp::spawn().await;

    let response = app.client.get(app.url("/files/.env")).send().await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn health_reports_storage() {
    let app = TestApp::spawn().await;
    app.upload_file(vec![1], "a.jpg").await;

    let health: Value = app.client
        .get(app.url("/health"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(health["status"], "healthy");
    assert_eq!(health["storage"], "OK");
    assert_eq!(health["stored_files"], 1);
}
