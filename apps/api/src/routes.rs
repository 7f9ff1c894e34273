//! Route assembly.
//!
//! Domain routers carry their own state; this module mounts them under the
//! path conventions of the API:
//!
//! - `/admin/categories`, `/admin/users`, `/admin/events`: moderation surface
//! - `/categories`, `/events`: public read surface
//! - `/users/{user_id}/...`: owner and requester surface

use axum::Router;
use std::sync::Arc;

use domain_categories::{CategoryService, repository::CategoryRepository};
use domain_events::ports::HitSink;
use domain_events::{EventService, repository::EventRepository};
use domain_requests::{
    EventSource, RequestService, UserSource as RequestUserSource, repository::RequestRepository,
};
use domain_users::{UserService, repository::UserRepository};

pub fn api_routes<C, U, E, R, ES, US>(
    categories: CategoryService<C>,
    users: UserService<U>,
    events: EventService<E>,
    requests: RequestService<R, ES, US>,
    hits: Arc<dyn HitSink>,
) -> Router
where
    C: CategoryRepository + Clone + 'static,
    U: UserRepository + Clone + 'static,
    E: EventRepository + 'static,
    R: RequestRepository + Clone + 'static,
    ES: EventSource + Clone + 'static,
    US: RequestUserSource + Clone + 'static,
{
    let user_routes = domain_users::handlers::subscription_router(users.clone())
        .merge(domain_events::handlers::user_router(events.clone()))
        .merge(domain_requests::handlers::requester_router(requests.clone()))
        .merge(domain_requests::handlers::owner_router(requests));

    Router::new()
        .nest(
            "/admin/categories",
            domain_categories::handlers::admin_router(categories.clone()),
        )
        .nest(
            "/categories",
            domain_categories::handlers::public_router(categories),
        )
        .nest("/admin/users", domain_users::handlers::admin_router(users))
        .nest(
            "/admin/events",
            domain_events::handlers::admin_router(events.clone()),
        )
        .nest(
            "/events",
            domain_events::handlers::public_router(events, hits),
        )
        .nest("/users", user_routes)
}
