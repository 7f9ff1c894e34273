use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{delete, get, post},
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

use crate::error::UserResult;
use crate::models::{NewUser, User, UserListQuery};
use crate::repository::UserRepository;
use crate::service::UserService;

const TAG: &str = "users";

/// OpenAPI documentation for the Users API
#[derive(OpenApi)]
#[openapi(
    paths(list_users, create_user, delete_user, subscribe, unsubscribe, list_subscriptions),
    components(
        schemas(User, NewUser, UserListQuery),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            ConflictResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = TAG, description = "User accounts and subscriptions")
    )
)]
pub struct ApiDoc;

/// Admin router: list, register and delete users
pub fn admin_router<R: UserRepository + 'static>(service: UserService<R>) -> Router {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/{id}", delete(delete_user))
        .with_state(Arc::new(service))
}

/// User-facing router: manage own subscriptions
pub fn subscription_router<R: UserRepository + 'static>(service: UserService<R>) -> Router {
    Router::new()
        .route("/{user_id}/subscriptions", get(list_subscriptions))
        .route(
            "/{user_id}/subscriptions/{target_id}",
            post(subscribe).delete(unsubscribe),
        )
        .with_state(Arc::new(service))
}

/// List users
#[utoipa::path(
    get,
    path = "",
    tag = TAG,
    params(UserListQuery),
    responses(
        (status = 200, description = "List of users", body = Vec<User>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_users<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    Query(query): Query<UserListQuery>,
) -> UserResult<Json<Vec<User>>> {
    let users = service
        .list_users(query.id_list(), query.from, query.size)
        .await?;
    Ok(Json(users))
}

/// Register a new user
#[utoipa::path(
    post,
    path = "",
    tag = TAG,
    request_body = NewUser,
    responses(
        (status = 201, description = "User created successfully", body = User),
        (status = 400, response = BadRequestValidationResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    headers: HeaderMap,
    ValidatedJson(input): ValidatedJson<NewUser>,
) -> UserResult<impl IntoResponse> {
    let user = service.create_user(input).await?;

    AuditEvent::new(
        None,
        "user.create",
        Some(format!("user:{}", user.id)),
        AuditOutcome::Success,
    )
    .with_ip(extract_ip_from_headers(&headers))
    .with_user_agent(extract_user_agent(&headers))
    .log();

    Ok((StatusCode::CREATED, Json(user)))
}

/// Delete a user
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = i64, Path, description = "User ID")
    ),
    responses(
        (status = 204, description = "User deleted successfully"),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> UserResult<impl IntoResponse> {
    service.delete_user(id).await?;

    AuditEvent::new(
        None,
        "user.delete",
        Some(format!("user:{}", id)),
        AuditOutcome::Success,
    )
    .with_ip(extract_ip_from_headers(&headers))
    .with_user_agent(extract_user_agent(&headers))
    .log();

    Ok(StatusCode::NO_CONTENT)
}

/// Subscribe to another user's events
#[utoipa::path(
    post,
    path = "/{user_id}/subscriptions/{target_id}",
    tag = TAG,
    params(
        ("user_id" = i64, Path, description = "Follower user ID"),
        ("target_id" = i64, Path, description = "User to follow")
    ),
    responses(
        (status = 204, description = "Subscription created"),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn subscribe<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    Path((id, target_id)): Path<(i64, i64)>,
) -> UserResult<StatusCode> {
    service.subscribe(id, target_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Unsubscribe from another user's events
#[utoipa::path(
    delete,
    path = "/{user_id}/subscriptions/{target_id}",
    tag = TAG,
    params(
        ("user_id" = i64, Path, description = "Follower user ID"),
        ("target_id" = i64, Path, description = "User to unfollow")
    ),
    responses(
        (status = 204, description = "Subscription removed"),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn unsubscribe<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    Path((id, target_id)): Path<(i64, i64)>,
) -> UserResult<StatusCode> {
    service.unsubscribe(id, target_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// IDs of users the given user follows
#[utoipa::path(
    get,
    path = "/{user_id}/subscriptions",
    tag = TAG,
    params(
        ("user_id" = i64, Path, description = "Follower user ID")
    ),
    responses(
        (status = 200, description = "Followed user IDs", body = Vec<i64>),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_subscriptions<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    Path(id): Path<i64>,
) -> UserResult<Json<Vec<i64>>> {
    let ids = service.followed_ids(id).await?;
    Ok(Json(ids))
}
