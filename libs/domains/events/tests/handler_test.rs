//! Handler tests for the Events domain: routing, status codes and JSON
//! shapes, exercised against the in-memory store.

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{DateTime, Duration, Utc};
use domain_events::ports::{CategorySource, HitSink, ParticipationCounter, UserSource, ViewSource};
use domain_events::*;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use tower::ServiceExt; // For oneshot()

struct StubCategories;

#[async_trait]
impl CategorySource for StubCategories {
    async fn category_exists(&self, _category_id: i64) -> EventResult<bool> {
        Ok(true)
    }
}

struct StubUsers;

#[async_trait]
impl UserSource for StubUsers {
    async fn user_exists(&self, _user_id: i64) -> EventResult<bool> {
        Ok(true)
    }

    async fn followed_ids(&self, _user_id: i64) -> EventResult<Vec<i64>> {
        Ok(Vec::new())
    }
}

struct StubCounter;

#[async_trait]
impl ParticipationCounter for StubCounter {
    async fn confirmed_counts(&self, _event_ids: Vec<i64>) -> EventResult<HashMap<i64, i64>> {
        Ok(HashMap::new())
    }
}

struct StubViews;

#[async_trait]
impl ViewSource for StubViews {
    async fn view_counts(
        &self,
        _uris: Vec<String>,
        _start: DateTime<Utc>,
        _end: DateTime<Utc>,
        _unique: bool,
    ) -> EventResult<HashMap<String, i64>> {
        Ok(HashMap::new())
    }
}

struct NoopHits;

#[async_trait]
impl HitSink for NoopHits {
    async fn record_hit(&self, _uri: String, _ip: Option<String>) {}
}

struct TestApp {
    service: EventService<InMemoryEventRepository>,
    admin: Router,
    users: Router,
    public: Router,
}

fn test_app() -> TestApp {
    let service = EventService::new(
        InMemoryEventRepository::new(),
        Arc::new(InMemoryLocationStore::new()),
        Arc::new(StubCategories),
        Arc::new(StubUsers),
        Arc::new(StubCounter),
        Arc::new(StubViews),
    );

    TestApp {
        admin: handlers::admin_router(service.clone()),
        users: handlers::user_router(service.clone()),
        public: handlers::public_router(service.clone(), Arc::new(NoopHits)),
        service,
    }
}

async fn json_body(body: Body) -> Value {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn new_event_json(title: &str) -> Value {
    json!({
        "title": title,
        "annotation": "An annotation of sufficient length for checks",
        "description": "A description of sufficient length for checks",
        "category_id": 1,
        "event_date": Utc::now() + Duration::days(7),
        "location": { "lat": 55.7, "lon": 37.6 },
        "paid": false,
        "participant_limit": 0
    })
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(body).unwrap()))
        .unwrap()
}

fn patch_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("PATCH")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(body).unwrap()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_create_event_returns_201_pending() {
    let app = test_app();

    let response = app
        .users
        .oneshot(post_json("/1/events", &new_event_json("Open air")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let event = json_body(response.into_body()).await;
    assert_eq!(event["state"], "PENDING");
    assert_eq!(event["request_moderation"], true);
    assert_eq!(event["confirmed_requests"], 0);
    assert_eq!(event["views"], 0);
}

#[tokio::test]
async fn test_create_event_with_short_title_returns_400() {
    let app = test_app();

    let response = app
        .users
        .oneshot(post_json("/1/events", &new_event_json("ab")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_admin_publish_returns_200_published() {
    let app = test_app();
    let created = app
        .service
        .create_event(
            1,
            serde_json::from_value(new_event_json("Open air")).unwrap(),
        )
        .await
        .unwrap();

    let response = app
        .admin
        .oneshot(patch_json(
            &format!("/{}", created.id),
            &json!({ "state_action": "PUBLISH_EVENT" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let event = json_body(response.into_body()).await;
    assert_eq!(event["state"], "PUBLISHED");
    assert!(event["published_on"].is_string());
}

#[tokio::test]
async fn test_admin_publish_published_event_returns_409() {
    let app = test_app();
    let created = app
        .service
        .create_event(
            1,
            serde_json::from_value(new_event_json("Open air")).unwrap(),
        )
        .await
        .unwrap();
    app.service
        .admin_update(
            created.id,
            AdminEventUpdate {
                state_action: Some(AdminStateAction::PublishEvent),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let response = app
        .admin
        .oneshot(patch_json(
            &format!("/{}", created.id),
            &json!({ "state_action": "PUBLISH_EVENT" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_public_read_of_pending_event_returns_404() {
    let app = test_app();
    let created = app
        .service
        .create_event(
            1,
            serde_json::from_value(new_event_json("Open air")).unwrap(),
        )
        .await
        .unwrap();

    let response = app
        .public
        .oneshot(get(&format!("/{}", created.id)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_public_search_returns_published_events() {
    let app = test_app();
    let created = app
        .service
        .create_event(
            1,
            serde_json::from_value(new_event_json("Open air")).unwrap(),
        )
        .await
        .unwrap();
    app.service
        .admin_update(
            created.id,
            AdminEventUpdate {
                state_action: Some(AdminStateAction::PublishEvent),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let response = app.public.oneshot(get("/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let events = json_body(response.into_body()).await;
    assert_eq!(events.as_array().unwrap().len(), 1);
    assert_eq!(events[0]["id"], created.id);
}

#[tokio::test]
async fn test_public_search_rejects_inverted_range() {
    let app = test_app();

    let response = app
        .public
        .oneshot(get(
            "/?range_start=2026-09-02T00:00:00Z&range_end=2026-09-01T00:00:00Z",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_owner_listing_and_lookup() {
    let app = test_app();
    let created = app
        .service
        .create_event(
            1,
            serde_json::from_value(new_event_json("Open air")).unwrap(),
        )
        .await
        .unwrap();

    let listing = app
        .users
        .clone()
        .oneshot(get("/1/events"))
        .await
        .unwrap();
    assert_eq!(listing.status(), StatusCode::OK);
    let events = json_body(listing.into_body()).await;
    assert_eq!(events.as_array().unwrap().len(), 1);

    let lookup = app
        .users
        .oneshot(get(&format!("/2/events/{}", created.id)))
        .await
        .unwrap();
    assert_eq!(lookup.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_followed_feed_route_returns_200() {
    let app = test_app();

    let response = app.users.oneshot(get("/1/events/followed")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let events = json_body(response.into_body()).await;
    assert!(events.as_array().unwrap().is_empty());
}
