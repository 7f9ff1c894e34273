//! Handler tests for the Users domain: routing, status codes and JSON
//! shapes, exercised against the in-memory store.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use domain_users::{InMemoryUserRepository, UserService, handlers};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt; // For oneshot()

struct TestApp {
    admin: Router,
    subscriptions: Router,
}

fn test_app() -> TestApp {
    let service = UserService::new(InMemoryUserRepository::new());

    TestApp {
        admin: handlers::admin_router(service.clone()),
        subscriptions: handlers::subscription_router(service),
    }
}

async fn json_body(body: Body) -> Value {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(body).unwrap()))
        .unwrap()
}

fn post(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn register(app: &TestApp, name: &str, email: &str) -> i64 {
    let response = app
        .admin
        .clone()
        .oneshot(post_json("/", &json!({ "name": name, "email": email })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    json_body(response.into_body()).await["id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_create_user_returns_201() {
    let app = test_app();

    let response = app
        .admin
        .oneshot(post_json(
            "/",
            &json!({ "name": "Alice", "email": "alice@example.com" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let user = json_body(response.into_body()).await;
    assert_eq!(user["name"], "Alice");
    assert_eq!(user["email"], "alice@example.com");
}

#[tokio::test]
async fn test_create_user_with_invalid_email_returns_400() {
    let app = test_app();

    let response = app
        .admin
        .oneshot(post_json(
            "/",
            &json!({ "name": "Alice", "email": "not-an-email" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_user_with_taken_email_returns_409() {
    let app = test_app();
    register(&app, "Alice", "alice@example.com").await;

    let response = app
        .admin
        .oneshot(post_json(
            "/",
            &json!({ "name": "Another Alice", "email": "alice@example.com" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_list_users_filters_by_ids() {
    let app = test_app();
    let alice = register(&app, "Alice", "alice@example.com").await;
    register(&app, "Bob", "bob@example.com").await;

    let response = app
        .admin
        .oneshot(get(&format!("/?ids={alice}")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let users = json_body(response.into_body()).await;
    assert_eq!(users.as_array().unwrap().len(), 1);
    assert_eq!(users[0]["id"], alice);
}

#[tokio::test]
async fn test_delete_user_returns_204() {
    let app = test_app();
    let alice = register(&app, "Alice", "alice@example.com").await;

    let response = app
        .admin
        .oneshot(delete(&format!("/{alice}")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_subscribe_then_list_subscriptions() {
    let app = test_app();
    let alice = register(&app, "Alice", "alice@example.com").await;
    let bob = register(&app, "Bob", "bob@example.com").await;

    let response = app
        .subscriptions
        .clone()
        .oneshot(post(&format!("/{alice}/subscriptions/{bob}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let listing = app
        .subscriptions
        .oneshot(get(&format!("/{alice}/subscriptions")))
        .await
        .unwrap();
    assert_eq!(listing.status(), StatusCode::OK);
    let ids = json_body(listing.into_body()).await;
    assert_eq!(ids, json!([bob]));
}

#[tokio::test]
async fn test_subscribe_to_self_returns_409() {
    let app = test_app();
    let alice = register(&app, "Alice", "alice@example.com").await;

    let response = app
        .subscriptions
        .oneshot(post(&format!("/{alice}/subscriptions/{alice}")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_unsubscribe_removes_subscription() {
    let app = test_app();
    let alice = register(&app, "Alice", "alice@example.com").await;
    let bob = register(&app, "Bob", "bob@example.com").await;

    app.subscriptions
        .clone()
        .oneshot(post(&format!("/{alice}/subscriptions/{bob}")))
        .await
        .unwrap();
    let removed = app
        .subscriptions
        .clone()
        .oneshot(delete(&format!("/{alice}/subscriptions/{bob}")))
        .await
        .unwrap();
    assert_eq!(removed.status(), StatusCode::NO_CONTENT);

    let listing = app
        .subscriptions
        .oneshot(get(&format!("/{alice}/subscriptions")))
        .await
        .unwrap();
    let ids = json_body(listing.into_body()).await;
    assert!(ids.as_array().unwrap().is_empty());
}
