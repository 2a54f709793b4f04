//! Router-level tests driven through `tower::ServiceExt::oneshot`, no socket

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::{json, Value};
use tower::util::ServiceExt; // for `oneshot` method

use church_ssl::config::AppConfig;
use church_ssl::database::MemoryStore;
use church_ssl::models::language::{ENGLISH_ID, SPANISH_ID};
use church_ssl::{build_router, AppState};

fn setup_app() -> axum::Router {
    build_router(AppState::new(Arc::new(MemoryStore::new()), &AppConfig::development()))
}

fn lesson_with_day(day: &str) -> Value {
    json!({
        "title": "Rest",
        "content": "<p>Sabbath</p>",
        "year": 2026,
        "quarter": "Q1",
        "languageId": ENGLISH_ID,
        "dailySections": [{ "day": day, "content": "Creation", "bibleTexts": "Gen 2:1-3" }],
    })
}

fn test_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

#[tokio::test]
async fn health_reports_ok() {
    let response = setup_app().oneshot(test_request("GET", "/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["data"]["status"], "ok");
}

#[tokio::test]
async fn root_describes_service() {
    let response = setup_app().oneshot(test_request("GET", "/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["data"]["name"], "Church SSL API");
    assert!(body["data"]["version"].is_string());
}

#[tokio::test]
async fn static_lesson_routes_win_over_id() {
    let response = setup_app()
        .oneshot(test_request("GET", "/api/lessons/years"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn malformed_json_is_bad_request() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/lessons")
        .header("content-type", "application/json")
        .body(Body::from("{\"title\": "))
        .unwrap();
    let response = setup_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["success"], json!(false));
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn deactivated_language_is_hidden_by_default() {
    let app = setup_app();

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/languages/{}", SPANISH_ID),
            &json!({ "isActive": false }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["data"]["isActive"], json!(false));

    let response = app.clone().oneshot(test_request("GET", "/api/languages")).await.unwrap();
    let active = extract_json(response.into_body()).await;
    assert!(active["data"]
        .as_array()
        .unwrap()
        .iter()
        .all(|l| l["code"] != "es"));

    let response = app.oneshot(test_request("GET", "/api/languages?all=true")).await.unwrap();
    let all = extract_json(response.into_body()).await;
    assert_eq!(all["data"].as_array().map(Vec::len), Some(3));
}

#[tokio::test]
async fn section_append_requires_lesson_id() {
    let response = setup_app()
        .oneshot(json_request(
            "POST",
            "/api/sections",
            &json!({ "day": "Sunday", "content": "Rest", "bibleTexts": "Gen 2:1-3" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn notification_requires_title_and_message() {
    let app = setup_app();

    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/notifications", &json!({ "title": "" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/notifications",
            &json!({ "title": "Camp meeting", "message": "Registration is open", "type": "info" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["data"]["read"], json!(false));
}

#[tokio::test]
async fn search_with_huge_page_is_empty() {
    let response = setup_app()
        .oneshot(test_request("GET", "/api/lessons/search?page=9223372036854775807"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["data"]["lessons"], json!([]));
    assert_eq!(body["data"]["pagination"]["hasNextPage"], json!(false));
}

#[tokio::test]
async fn lowercase_day_is_canonicalized_on_create() {
    let response = setup_app()
        .oneshot(json_request("POST", "/api/lessons", &lesson_with_day(" monday ")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["data"]["sections"][0]["day"], "Monday");
}

#[tokio::test]
async fn blank_day_is_a_field_error() {
    let response = setup_app()
        .oneshot(json_request("POST", "/api/lessons", &lesson_with_day("")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(body["fieldErrors"]["dailySections"], "Section 1: Day is required");
}
