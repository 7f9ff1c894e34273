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

use crate::error::RequestResult;
use crate::models::{
    ModerationDecision, ModerationResult, ModerationUpdate, NewRequest, ParticipationRequest,
    RequestState,
};
use crate::ports::{EventSource, UserSource};
use crate::repository::RequestRepository;
use crate::service::RequestService;

const TAG: &str = "requests";

/// OpenAPI documentation for the Participation Requests API
#[derive(OpenApi)]
#[openapi(
    paths(
        list_own_requests,
        create_request,
        cancel_request,
        list_event_requests,
        moderate_requests,
    ),
    components(
        schemas(
            ParticipationRequest,
            RequestState,
            NewRequest,
            ModerationUpdate,
            ModerationDecision,
            ModerationResult
        ),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            ConflictResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = TAG, description = "Participation request lifecycle")
    )
)]
pub struct ApiDoc;

/// Requester-facing router, nested under /users
pub fn requester_router<R, E, U>(service: RequestService<R, E, U>) -> Router
where
    R: RequestRepository + 'static,
    E: EventSource + 'static,
    U: UserSource + 'static,
{
    Router::new()
        .route(
            "/{user_id}/requests",
            get(list_own_requests).post(create_request),
        )
        .route("/{user_id}/requests/{request_id}/cancel", patch(cancel_request))
        .with_state(Arc::new(service))
}

/// Event-owner router, nested under /users
pub fn owner_router<R, E, U>(service: RequestService<R, E, U>) -> Router
where
    R: RequestRepository + 'static,
    E: EventSource + 'static,
    U: UserSource + 'static,
{
    Router::new()
        .route(
            "/{user_id}/events/{event_id}/requests",
            get(list_event_requests).patch(moderate_requests),
        )
        .with_state(Arc::new(service))
}

/// Requests submitted by the user
#[utoipa::path(
    get,
    path = "/{user_id}/requests",
    tag = TAG,
    params(
        ("user_id" = i64, Path, description = "Requester user ID")
    ),
    responses(
        (status = 200, description = "User's requests", body = Vec<ParticipationRequest>),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_own_requests<R, E, U>(
    State(service): State<Arc<RequestService<R, E, U>>>,
    Path(user_id): Path<i64>,
) -> RequestResult<Json<Vec<ParticipationRequest>>>
where
    R: RequestRepository,
    E: EventSource,
    U: UserSource,
{
    let requests = service.requests_of_user(user_id).await?;
    Ok(Json(requests))
}

/// Apply to attend an event
#[utoipa::path(
    post,
    path = "/{user_id}/requests",
    tag = TAG,
    params(
        ("user_id" = i64, Path, description = "Requester user ID"),
        NewRequest
    ),
    responses(
        (status = 201, description = "Request created", body = ParticipationRequest),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_request<R, E, U>(
    State(service): State<Arc<RequestService<R, E, U>>>,
    Path(user_id): Path<i64>,
    headers: HeaderMap,
    Query(query): Query<NewRequest>,
) -> RequestResult<impl IntoResponse>
where
    R: RequestRepository,
    E: EventSource,
    U: UserSource,
{
    let request = service.create_request(user_id, query.event_id).await?;

    AuditEvent::new(
        Some(user_id.to_string()),
        "request.create",
        Some(format!("request:{}", request.id)),
        AuditOutcome::Success,
    )
    .with_ip(extract_ip_from_headers(&headers))
    .with_user_agent(extract_user_agent(&headers))
    .log();

    Ok((StatusCode::CREATED, Json(request)))
}

/// Withdraw one's own request
#[utoipa::path(
    patch,
    path = "/{user_id}/requests/{request_id}/cancel",
    tag = TAG,
    params(
        ("user_id" = i64, Path, description = "Requester user ID"),
        ("request_id" = i64, Path, description = "Request ID")
    ),
    responses(
        (status = 200, description = "Request canceled", body = ParticipationRequest),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn cancel_request<R, E, U>(
    State(service): State<Arc<RequestService<R, E, U>>>,
    Path((user_id, request_id)): Path<(i64, i64)>,
) -> RequestResult<Json<ParticipationRequest>>
where
    R: RequestRepository,
    E: EventSource,
    U: UserSource,
{
    let request = service.cancel_request(user_id, request_id).await?;
    Ok(Json(request))
}

/// Requests targeting the owner's event
#[utoipa::path(
    get,
    path = "/{user_id}/events/{event_id}/requests",
    tag = TAG,
    params(
        ("user_id" = i64, Path, description = "Event owner user ID"),
        ("event_id" = i64, Path, description = "Event ID")
    ),
    responses(
        (status = 200, description = "Requests for the event", body = Vec<ParticipationRequest>),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_event_requests<R, E, U>(
    State(service): State<Arc<RequestService<R, E, U>>>,
    Path((user_id, event_id)): Path<(i64, i64)>,
) -> RequestResult<Json<Vec<ParticipationRequest>>>
where
    R: RequestRepository,
    E: EventSource,
    U: UserSource,
{
    let requests = service.requests_for_event(user_id, event_id).await?;
    Ok(Json(requests))
}

/// Confirm or reject pending requests in bulk
#[utoipa::path(
    patch,
    path = "/{user_id}/events/{event_id}/requests",
    tag = TAG,
    params(
        ("user_id" = i64, Path, description = "Event owner user ID"),
        ("event_id" = i64, Path, description = "Event ID")
    ),
    request_body = ModerationUpdate,
    responses(
        (status = 200, description = "Moderation outcome", body = ModerationResult),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn moderate_requests<R, E, U>(
    State(service): State<Arc<RequestService<R, E, U>>>,
    Path((user_id, event_id)): Path<(i64, i64)>,
    headers: HeaderMap,
    ValidatedJson(update): ValidatedJson<ModerationUpdate>,
) -> RequestResult<Json<ModerationResult>>
where
    R: RequestRepository,
    E: EventSource,
    U: UserSource,
{
    let decision = update.status;
    let result = service.moderate_requests(user_id, event_id, update).await?;

    AuditEvent::new(
        Some(user_id.to_string()),
        "request.moderate",
        Some(format!("event:{}", event_id)),
        AuditOutcome::Success,
    )
    .with_ip(extract_ip_from_headers(&headers))
    .with_user_agent(extract_user_agent(&headers))
    .with_details(serde_json::json!({
        "decision": decision.to_string(),
        "confirmed": result.confirmed_requests.len(),
        "rejected": result.rejected_requests.len(),
    }))
    .log();

    Ok(Json(result))
}
