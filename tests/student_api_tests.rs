
use reqwest::StatusCode;
use serde_json::{json, Value};
use student_registry::{constants::DEFAULT_IMAGE, repositories::student::StudentRepository};
use test_utils::*;

#[actix_rt::test]
async fn photo_lifecycle_follows_the_student() {
    let app = TestApp::spawn().await;

    let created = app.create_ana().await;
    assert_eq!(created["id"], 1);
    assert_eq!(created["imagePath"], DEFAULT_IMAGE);

    let response = app.upload_photo(1, vec![0x01, 0x02], "ana.jpg").await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["student"]["imagePath"], "ana.jpg");
    assert_eq!(app.stored_bytes("ana.jpg"), Some(vec![0x01, 0x02]));

    let response = app.upload_photo(1, vec![0x03], "ana2.jpg").await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["student"]["imagePath"], "ana2.jpg");
    assert_eq!(app.stored_bytes("ana.jpg"), None);
    assert_eq!(app.stored_bytes("ana2.jpg"), Some(vec![0x03]));

    let response = app.delete_student(1).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(app.repo.find_by_id(1).await.unwrap().is_none());
    assert_eq!(app.stored_bytes("ana2.jpg"), None);

    assert_eq!(app.get_student(1).await.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn empty_photo_upload_leaves_student_unchanged() {
    let app = TestApp::spawn().await;
    let created = app.create_ana().await;

    let response = app.upload_photo(1, Vec::new(), "empty.jpg").await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["student"], created);
    assert_eq!(app.stored_bytes("empty.jpg"), None);
}

#[actix_rt::test]
async fn uploading_for_a_missing_student_is_404_and_stores_nothing() {
    let app = TestApp::spawn().await;

    let response = app.upload_photo(99, vec![1, 2, 3], "ghost.jpg").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(app.stored_bytes("ghost.jpg"), None);
}

#[actix_rt::test]
async fn photo_with_unsafe_name_is_rejected() {
    let app = TestApp::spawn().await;
    app.create_ana().await;

    let response = app.upload_photo(1, vec![1], ".hidden.jpg").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let student: Value = app.get_student(1).await.json().await.unwrap();
    assert_eq!(student["imagePath"], DEFAULT_IMAGE);
}

#[actix_rt::test]
async fn create_with_missing_fields_is_400() {
    let app = TestApp::spawn().await;

    let response = app.create_student(&json!({ "studentName": "Ana" })).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Validation failed");
    assert!(app.repo.find_all().await.unwrap().is_empty());
}

#[actix_rt::test]
async fn blank_names_are_400() {
    let app = TestApp::spawn().await;
    let mut form = ana_ruiz();
    form["studentName"] = json!("   ");

    let response = app.create_student(&form).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(app.repo.find_all().await.unwrap().is_empty());
}

#[actix_rt::test]
async fn malformed_json_is_400() {
    let app = TestApp::spawn().await;

    let response = app.client
        .post(app.url("/students"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn update_changes_fields_but_keeps_the_photo() {
    let app = TestApp::spawn().await;
    app.create_ana().await;
    app.upload_photo(1, vec![9], "ana.jpg").await;

    let mut changes = ana_ruiz();
    changes["lastName"] = json!("Gomez");
    changes["registrationEndDate"] = json!("2028-06-30");
    changes["imagePath"] = json!("someone-else.jpg");

    let response = app.client
        .put(app.url("/students/1"))
        .json(&changes)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let student: Value = response.json().await.unwrap();
    assert_eq!(student["lastName"], "Gomez");
    assert_eq!(student["registrationEndDate"], "2028-06-30");
    assert_eq!(student["imagePath"], "ana.jpg");
}

#[actix_rt::test]
async fn update_of_unknown_student_is_404() {
    let app = TestApp::spawn().await;

    let response = app.client
        .put(app.url("/students/5"))
        .json(&ana_ruiz())
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn list_returns_every_student() {
    let app = TestApp::spawn().await;
    app.create_ana().await;
    app.create_ana().await;

    let students: Vec<Value> = app.client
        .get(app.url("/students"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let ids: Vec<_> = students.iter().map(|s| s["id"].as_i64().unwrap()).collect();
    assert_eq!(ids, vec![1, 2]);
}

#[actix_rt::test]
async fn deleting_a_student_with_default_image_keeps_other_files() {
    let app = TestApp::spawn().await;
    app.create_ana().await;
    app.upload_file(vec![1], DEFAULT_IMAGE).await;

    let response = app.delete_student(1).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(app.stored_bytes(DEFAULT_IMAGE), Some(vec![1]));
}

#[actix_rt::test]
async fn deleting_a_missing_student_is_404() {
    let app = TestApp::spawn().await;

    assert_eq!(app.delete_student(3).await.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn non_numeric_id_is_400() {
    let app = TestApp::spawn().await;

    let response = app.client
        .get(app.url("/students/abc"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
