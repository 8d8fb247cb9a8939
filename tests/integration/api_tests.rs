//! API integration tests over the in-memory repository

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt; // For oneshot()

use shareit_server::{
    api::create_router, config::AppConfig, repository::Repository, services::Services, AppState,
};

fn app() -> Router {
    let state = AppState::new(AppConfig::default(), Services::new(Repository::in_memory()));
    create_router(state)
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    user: Option<i64>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header("X-Sharer-User-Id", user.to_string());
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn create_user(app: &Router, name: &str) -> i64 {
    let (status, body) = send(
        app,
        "POST",
        "/users",
        None,
        Some(json!({ "name": name, "email": format!("{}@example.com", name.to_lowercase()) })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_i64().unwrap()
}

async fn create_item(app: &Router, owner: i64, request_id: Option<i64>) -> i64 {
    let (status, body) = send(
        app,
        "POST",
        "/items",
        Some(owner),
        Some(json!({
            "name": "Drill",
            "description": "Cordless drill",
            "available": true,
            "requestId": request_id
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_i64().unwrap()
}

fn window(item_id: i64, from_days: i64, to_days: i64) -> Value {
    let now = Utc::now();
    json!({
        "itemId": item_id,
        "start": (now + Duration::days(from_days)).to_rfc3339(),
        "end": (now + Duration::days(to_days)).to_rfc3339()
    })
}

#[tokio::test]
async fn test_health_check() {
    let app = app();

    let (status, body) = send(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = send(&app, "GET", "/ready", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = app();
    let (status, body) = send(&app, "GET", "/api-docs/openapi.json", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/bookings/owner"].is_object());
}

#[tokio::test]
async fn test_user_crud() {
    let app = app();
    let id = create_user(&app, "Alice").await;

    let (status, body) = send(&app, "GET", &format!("/users/{}", id), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Alice");

    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/users/{}", id),
        None,
        Some(json!({ "name": "Alicia" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Alicia");
    assert_eq!(body["email"], "alice@example.com");

    let (status, body) = send(&app, "GET", "/users", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, _) = send(&app, "DELETE", &format!("/users/{}", id), None, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, "GET", &format!("/users/{}", id), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], 404);
}

#[tokio::test]
async fn test_user_validation_and_conflict() {
    let app = app();
    create_user(&app, "Alice").await;

    let (status, body) = send(
        &app,
        "POST",
        "/users",
        None,
        Some(json!({ "name": "Other", "email": "ALICE@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], 409);

    let (status, body) = send(
        &app,
        "POST",
        "/users",
        None,
        Some(json!({ "name": "Bob", "email": "not-an-email" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["description"], "Email should be valid");

    let (status, _) = send(&app, "POST", "/users", None, Some(json!({ "name": "  " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_sharer_header_is_required() {
    let app = app();

    let (status, body) = send(&app, "GET", "/items", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], 400);

    let request = Request::builder()
        .uri("/bookings")
        .header("X-Sharer-User-Id", "abc")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_search_without_header() {
    let app = app();
    let owner = create_user(&app, "Owner").await;
    create_item(&app, owner, None).await;

    let (status, body) = send(&app, "GET", "/items/search?text=DRILL", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, body) = send(&app, "GET", "/items/search?text=", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let (_, body) = send(&app, "GET", "/items/search", None, None).await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_item_ownership() {
    let app = app();
    let owner = create_user(&app, "Owner").await;
    let other = create_user(&app, "Other").await;
    let item = create_item(&app, owner, None).await;

    let uri = format!("/items/{}", item);
    let (status, _) = send(&app, "PATCH", &uri, Some(other), Some(json!({ "available": false }))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(&app, "PATCH", &uri, Some(owner), Some(json!({ "available": false }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["available"], false);
    assert_eq!(body["name"], "Drill");

    let (status, body) = send(&app, "GET", &uri, Some(other), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["comments"], json!([]));
    assert!(body["lastBooking"].is_null());

    let (status, _) = send(&app, "DELETE", &uri, Some(other), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let (status, _) = send(&app, "DELETE", &uri, Some(owner), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "GET", &uri, Some(owner), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_booking_flow() {
    let app = app();
    let owner = create_user(&app, "Owner").await;
    let booker = create_user(&app, "Booker").await;
    let stranger = create_user(&app, "Stranger").await;
    let item = create_item(&app, owner, None).await;

    let (status, body) = send(&app, "POST", "/bookings", Some(booker), Some(window(item, 1, 2))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "WAITING");
    assert_eq!(body["item"]["id"], item);
    assert_eq!(body["booker"]["id"], booker);
    let booking = body["id"].as_i64().unwrap();

    let decide = format!("/bookings/{}?approved=true", booking);
    let (status, _) = send(&app, "PATCH", &decide, Some(stranger), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, "PATCH", &decide, Some(owner), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "APPROVED");

    let uri = format!("/bookings/{}", booking);
    let (status, _) = send(&app, "GET", &uri, Some(booker), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, "GET", &uri, Some(stranger), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, "GET", "/bookings?state=future", Some(booker), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (_, body) = send(&app, "GET", "/bookings/owner?state=WAITING", Some(owner), None).await;
    assert_eq!(body, json!([]));

    let (_, body) = send(&app, "GET", "/bookings/owner", Some(owner), None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, body) = send(
        &app,
        "GET",
        "/bookings?state=UNSUPPORTED_STATUS",
        Some(booker),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["description"], "Unknown state: UNSUPPORTED_STATUS");

    // Owner sees the upcoming booking on the item
    let (_, body) = send(&app, "GET", &format!("/items/{}", item), Some(owner), None).await;
    assert_eq!(body["nextBooking"]["id"], booking);
}

#[tokio::test]
async fn test_booking_validation() {
    let app = app();
    let owner = create_user(&app, "Owner").await;
    let booker = create_user(&app, "Booker").await;
    let item = create_item(&app, owner, None).await;

    let (status, _) = send(&app, "POST", "/bookings", Some(booker), Some(window(item, -1, 2))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "POST", "/bookings", Some(booker), Some(window(item, 3, 2))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "POST", "/bookings", Some(owner), Some(window(item, 1, 2))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "POST", "/bookings", Some(booker), Some(window(999, 1, 2))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        "POST",
        "/bookings",
        Some(booker),
        Some(json!({ "itemId": item })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_comment_requires_finished_booking() {
    let app = app();
    let owner = create_user(&app, "Owner").await;
    let booker = create_user(&app, "Booker").await;
    let item = create_item(&app, owner, None).await;

    let (status, _) = send(
        &app,
        "POST",
        &format!("/items/{}/comment", item),
        Some(booker),
        Some(json!({ "text": "Great drill" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        &format!("/items/{}/comment", item),
        Some(booker),
        Some(json!({ "text": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_request_aggregation() {
    let app = app();
    let requester = create_user(&app, "Requester").await;
    let owner = create_user(&app, "Owner").await;

    let (status, body) = send(
        &app,
        "POST",
        "/requests",
        Some(requester),
        Some(json!({ "description": "Need a drill" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["items"], json!([]));
    let request = body["id"].as_i64().unwrap();

    let (_, empty) = send(
        &app,
        "POST",
        "/requests",
        Some(requester),
        Some(json!({ "description": "Need a tent" })),
    )
    .await;

    let first = create_item(&app, owner, Some(request)).await;
    let second = create_item(&app, owner, Some(request)).await;

    let (status, body) = send(&app, "GET", &format!("/requests/{}", request), Some(owner), None).await;
    assert_eq!(status, StatusCode::OK);
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["id"], first);
    assert_eq!(items[1]["id"], second);
    assert_eq!(items[0]["ownerId"], owner);

    let (_, body) = send(&app, "GET", &format!("/requests/{}", empty["id"]), Some(owner), None).await;
    assert_eq!(body["items"], json!([]));

    let (_, body) = send(&app, "GET", "/requests", Some(requester), None).await;
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (_, body) = send(&app, "GET", "/requests/all", Some(owner), None).await;
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (_, body) = send(&app, "GET", "/requests/all", Some(requester), None).await;
    assert_eq!(body, json!([]));

    let (status, _) = send(
        &app,
        "POST",
        "/items",
        Some(owner),
        Some(json!({ "name": "Tent", "description": "Two person", "available": true, "requestId": 999 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_item_validation() {
    let app = app();
    let owner = create_user(&app, "Owner").await;

    for body in [
        json!({ "name": "", "description": "Drill", "available": true }),
        json!({ "name": "Drill", "description": " ", "available": true }),
        json!({ "name": "Drill", "description": "Drill" }),
    ] {
        let (status, body) = send(&app, "POST", "/items", Some(owner), Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], 400);
    }
}
