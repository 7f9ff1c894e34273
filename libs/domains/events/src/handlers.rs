use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, patch},
};
use axum_helpers::{
    AuditEvent, AuditOutcome, ValidatedJson,
    errors::responses::{
        BadRequestValidationResponse, ConflictResponse, InternalServerErrorResponse,
        NotFoundResponse,
    },
    extract_ip_from_headers, extract_user_agent,
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::enrich::Enricher;
use crate::error::EventResult;
use crate::models::{
    AdminEventUpdate, AdminSearch, AdminStateAction, EventFull, EventPage, EventPatch, EventSort,
    EventState, Location, NewEvent, PublicSearch, UserEventUpdate, UserStateAction,
};
use crate::ports::HitSink;
use crate::repository::EventRepository;
use crate::service::EventService;

const TAG: &str = "events";

/// OpenAPI documentation for the Events API
#[derive(OpenApi)]
#[openapi(
    paths(
        admin_search,
        admin_update,
        create_event,
        events_of_user,
        followed_events,
        event_of_user,
        user_update,
        public_search,
        published_event,
    ),
    components(
        schemas(
            EventFull,
            NewEvent,
            EventPatch,
            AdminEventUpdate,
            UserEventUpdate,
            EventState,
            AdminStateAction,
            UserStateAction,
            EventSort,
            Location,
        ),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            ConflictResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = TAG, description = "Event discovery and moderation")
    )
)]
pub struct ApiDoc;

/// Admin router: moderation search and updates
pub fn admin_router<R: EventRepository + 'static>(service: EventService<R>) -> Router {
    Router::new()
        .route("/", get(admin_search))
        .route("/{id}", patch(admin_update))
        .with_state(Arc::new(service))
}

/// Owner router, nested under `/users`
pub fn user_router<R: EventRepository + 'static>(service: EventService<R>) -> Router {
    Router::new()
        .route("/{user_id}/events", get(events_of_user).post(create_event))
        .route("/{user_id}/events/followed", get(followed_events))
        .route(
            "/{user_id}/events/{event_id}",
            get(event_of_user).patch(user_update),
        )
        .with_state(Arc::new(service))
}

/// State of the public router: the service plus the hit sink that records
/// every public read.
pub struct PublicState<R: EventRepository> {
    pub service: Arc<EventService<R>>,
    pub hits: Arc<dyn HitSink>,
}

impl<R: EventRepository> Clone for PublicState<R> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            hits: Arc::clone(&self.hits),
        }
    }
}

/// Public router: read-only discovery endpoints
pub fn public_router<R: EventRepository + 'static>(
    service: EventService<R>,
    hits: Arc<dyn HitSink>,
) -> Router {
    Router::new()
        .route("/", get(public_search))
        .route("/{id}", get(published_event))
        .with_state(PublicState {
            service: Arc::new(service),
            hits,
        })
}

fn record_hit(hits: &Arc<dyn HitSink>, uri: String, headers: &HeaderMap) {
    let hits = Arc::clone(hits);
    let ip = extract_ip_from_headers(headers);
    // fire and forget, the response never waits on the collector
    tokio::spawn(async move {
        hits.record_hit(uri, ip).await;
    });
}

/// Search events for moderation
#[utoipa::path(
    get,
    path = "/admin/events",
    tag = TAG,
    params(AdminSearch),
    responses(
        (status = 200, description = "Matching events", body = Vec<EventFull>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn admin_search<R: EventRepository>(
    State(service): State<Arc<EventService<R>>>,
    Query(search): Query<AdminSearch>,
) -> EventResult<Json<Vec<EventFull>>> {
    let events = service.admin_search(search).await?;
    Ok(Json(events))
}

/// Moderate an event: edit fields, publish or reject
#[utoipa::path(
    patch,
    path = "/admin/events/{id}",
    tag = TAG,
    params(
        ("id" = i64, Path, description = "Event ID")
    ),
    request_body = AdminEventUpdate,
    responses(
        (status = 200, description = "Event updated successfully", body = EventFull),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn admin_update<R: EventRepository>(
    State(service): State<Arc<EventService<R>>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    ValidatedJson(update): ValidatedJson<AdminEventUpdate>,
) -> EventResult<Json<EventFull>> {
    let action = update.state_action;
    let event = service.admin_update(id, update).await?;

    if let Some(action) = action {
        AuditEvent::new(
            None,
            match action {
                AdminStateAction::PublishEvent => "event.publish",
                AdminStateAction::RejectEvent => "event.reject",
            },
            Some(format!("event:{}", event.id)),
            AuditOutcome::Success,
        )
        .with_ip(extract_ip_from_headers(&headers))
        .with_user_agent(extract_user_agent(&headers))
        .log();
    }

    Ok(Json(event))
}

/// Create a new event
#[utoipa::path(
    post,
    path = "/users/{user_id}/events",
    tag = TAG,
    params(
        ("user_id" = i64, Path, description = "Owner user ID")
    ),
    request_body = NewEvent,
    responses(
        (status = 201, description = "Event created successfully", body = EventFull),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_event<R: EventRepository>(
    State(service): State<Arc<EventService<R>>>,
    headers: HeaderMap,
    Path(user_id): Path<i64>,
    ValidatedJson(input): ValidatedJson<NewEvent>,
) -> EventResult<impl IntoResponse> {
    let event = service.create_event(user_id, input).await?;

    AuditEvent::new(
        Some(user_id.to_string()),
        "event.create",
        Some(format!("event:{}", event.id)),
        AuditOutcome::Success,
    )
    .with_ip(extract_ip_from_headers(&headers))
    .with_user_agent(extract_user_agent(&headers))
    .log();

    Ok((StatusCode::CREATED, Json(event)))
}

/// List the owner's events
#[utoipa::path(
    get,
    path = "/users/{user_id}/events",
    tag = TAG,
    params(
        ("user_id" = i64, Path, description = "Owner user ID"),
        EventPage
    ),
    responses(
        (status = 200, description = "The owner's events", body = Vec<EventFull>),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn events_of_user<R: EventRepository>(
    State(service): State<Arc<EventService<R>>>,
    Path(user_id): Path<i64>,
    Query(page): Query<EventPage>,
) -> EventResult<Json<Vec<EventFull>>> {
    let events = service.events_of_user(user_id, page).await?;
    Ok(Json(events))
}

/// Published events of the users this user follows
#[utoipa::path(
    get,
    path = "/users/{user_id}/events/followed",
    tag = TAG,
    params(
        ("user_id" = i64, Path, description = "Subscriber user ID"),
        PublicSearch
    ),
    responses(
        (status = 200, description = "Published events of followed users", body = Vec<EventFull>),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn followed_events<R: EventRepository>(
    State(service): State<Arc<EventService<R>>>,
    Path(user_id): Path<i64>,
    Query(search): Query<PublicSearch>,
) -> EventResult<Json<Vec<EventFull>>> {
    let events = service.published_events_of_followed(user_id, search).await?;
    Ok(Json(events))
}

/// One of the owner's events
#[utoipa::path(
    get,
    path = "/users/{user_id}/events/{event_id}",
    tag = TAG,
    params(
        ("user_id" = i64, Path, description = "Owner user ID"),
        ("event_id" = i64, Path, description = "Event ID")
    ),
    responses(
        (status = 200, description = "Event found", body = EventFull),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn event_of_user<R: EventRepository>(
    State(service): State<Arc<EventService<R>>>,
    Path((user_id, event_id)): Path<(i64, i64)>,
) -> EventResult<Json<EventFull>> {
    let event = service.event_of_user(user_id, event_id).await?;
    Ok(Json(event))
}

/// Owner update: edit fields, cancel or resubmit
#[utoipa::path(
    patch,
    path = "/users/{user_id}/events/{event_id}",
    tag = TAG,
    params(
        ("user_id" = i64, Path, description = "Owner user ID"),
        ("event_id" = i64, Path, description = "Event ID")
    ),
    request_body = UserEventUpdate,
    responses(
        (status = 200, description = "Event updated successfully", body = EventFull),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn user_update<R: EventRepository>(
    State(service): State<Arc<EventService<R>>>,
    Path((user_id, event_id)): Path<(i64, i64)>,
    ValidatedJson(update): ValidatedJson<UserEventUpdate>,
) -> EventResult<Json<EventFull>> {
    let event = service.user_update(user_id, event_id, update).await?;
    Ok(Json(event))
}

/// Public search over published events
#[utoipa::path(
    get,
    path = "/events",
    tag = TAG,
    params(PublicSearch),
    responses(
        (status = 200, description = "Matching published events", body = Vec<EventFull>),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn public_search<R: EventRepository>(
    State(state): State<PublicState<R>>,
    headers: HeaderMap,
    Query(search): Query<PublicSearch>,
) -> EventResult<Json<Vec<EventFull>>> {
    let events = state.service.public_search(search).await?;

    record_hit(&state.hits, "/events".to_string(), &headers);

    Ok(Json(events))
}

/// One published event
#[utoipa::path(
    get,
    path = "/events/{id}",
    tag = TAG,
    params(
        ("id" = i64, Path, description = "Event ID")
    ),
    responses(
        (status = 200, description = "Event found", body = EventFull),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn published_event<R: EventRepository>(
    State(state): State<PublicState<R>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> EventResult<Json<EventFull>> {
    let event = state.service.published_event(id).await?;

    record_hit(&state.hits, Enricher::event_uri(id), &headers);

    Ok(Json(event))
}
