//! Router-level tests: auth, status mapping, multipart detection
#![cfg(unix)]

mod common;

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use beanscan_server::api::{
    self,
    middleware::{PlainUserIdVerifier, TokenVerifier},
};
use beanscan_server::storage::LocalFileStore;
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::util::ServiceExt;

const BOUNDARY: &str = "beanscan-test-boundary";

fn setup_app(
    db: &DatabaseConnection,
    dir: &TempDir,
    classifier_stdout: &str,
    exit_code: i32,
) -> Router {
    let script = common::classifier_script(dir.path(), classifier_stdout, exit_code);
    let pipeline = Arc::new(common::pipeline(db, &script, &["black", "broken"]));
    let verifier: Arc<dyn TokenVerifier> = Arc::new(PlainUserIdVerifier);
    api::router(
        db.clone(),
        pipeline,
        LocalFileStore::new(dir.path().join("uploads")),
        verifier,
    )
}

fn authed(method: &str, uri: &str, user_id: i32) -> axum::http::request::Builder {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", user_id))
}

fn json_request(method: &str, uri: &str, user_id: i32, body: Value) -> Request<Body> {
    authed(method, uri, user_id)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn multipart_request(uri: &str, user_id: i32, file_name: &str, data: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    authed("POST", uri, user_id)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn extract_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

#[tokio::test]
async fn health_needs_no_auth() {
    let (dir, db) = common::setup_db().await;
    let app = setup_app(&db, &dir, "{}", 0);

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn protected_routes_reject_missing_or_bad_tokens() {
    let (dir, db) = common::setup_db().await;
    let app = setup_app(&db, &dir, "{}", 0);

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/favorites").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/favorites")
                .header(header::AUTHORIZATION, "Bearer not-a-user")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn session_cookie_is_accepted() {
    let (dir, db) = common::setup_db().await;
    let app = setup_app(&db, &dir, "{}", 0);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/favorites")
                .header(header::COOKIE, "beanscan_session=3")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn favorite_lifecycle_maps_business_errors_to_statuses() {
    let (dir, db) = common::setup_db().await;
    let app = setup_app(&db, &dir, "{}", 0);
    let detection = common::seed_detection(&db, 1, &["crack"]).await;

    let response = app
        .clone()
        .oneshot(json_request("POST", "/favorites", 1, json!({"detection_id": 9999})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .clone()
        .oneshot(json_request("POST", "/favorites", 1, json!({"detection_id": detection.id})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let favorite = extract_json(response).await;
    assert_eq!(favorite["defects_name"], "crack");
    let favorite_id = favorite["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(json_request("POST", "/favorites", 1, json!({"detection_id": detection.id})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app
        .clone()
        .oneshot(
            authed("GET", "/favorites/search?keyword=cra", 1)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(extract_json(response).await.as_array().unwrap().len(), 1);

    let uri = format!("/favorites/{}", favorite_id);
    let response = app
        .clone()
        .oneshot(authed("DELETE", &uri, 2).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .clone()
        .oneshot(authed("DELETE", &uri, 1).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(extract_json(response).await, json!({"deleted": true}));
}

#[tokio::test]
async fn detect_upload_returns_detection_and_records_history() {
    let (dir, db) = common::setup_db().await;
    common::seed_grade(&db, "broken").await;
    let app = setup_app(&db, &dir, r#"{"output":[0.1,0.88]}"#, 0);

    let response = app
        .clone()
        .oneshot(multipart_request("/coffee/detect", 4, "bean.jpg", b"fake-jpeg-bytes"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response).await;
    assert!(body["detection_id"].as_i64().unwrap() > 0);
    assert_eq!(body["defects_name"], "broken");
    assert_eq!(body["english_name"], "broken");
    assert_eq!(body["flavor_impact"], "Harsh, woody");

    let response = app
        .oneshot(authed("GET", "/detection/history", 4).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let history = extract_json(response).await;
    assert_eq!(history.as_array().unwrap().len(), 1);
    assert_eq!(history[0]["defects_name"], "broken");
}

#[tokio::test]
async fn failed_classifier_surfaces_output_and_discards_upload() {
    let (dir, db) = common::setup_db().await;
    let app = setup_app(&db, &dir, "CUDA out of memory", 2);

    let response = app
        .oneshot(multipart_request("/coffee/detect", 4, "bean.jpg", b"fake-jpeg-bytes"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = extract_json(response).await;
    assert!(body["output"].as_str().unwrap().contains("CUDA out of memory"));

    let leftovers = std::fs::read_dir(dir.path().join("uploads")).unwrap().count();
    assert_eq!(leftovers, 0);
}

#[tokio::test]
async fn non_image_upload_is_rejected() {
    let (dir, db) = common::setup_db().await;
    let app = setup_app(&db, &dir, "{}", 0);

    let response = app
        .oneshot(multipart_request("/coffee/detect", 4, "notes.txt", b"hello"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn sample_image_attaches_to_existing_grade_only() {
    let (dir, db) = common::setup_db().await;
    let grade = common::seed_grade(&db, "black").await;
    let app = setup_app(&db, &dir, "{}", 0);

    let response = app
        .clone()
        .oneshot(multipart_request(
            &format!("/grades/{}/sample-image", grade.id),
            1,
            "black.png",
            b"png",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response).await;
    assert!(body["sample_image_url"].as_str().unwrap().ends_with(".png"));

    let response = app
        .oneshot(multipart_request("/grades/999/sample-image", 1, "x.png", b"png"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
