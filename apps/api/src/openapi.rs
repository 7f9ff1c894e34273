//! OpenAPI documentation configuration

use utoipa::OpenApi;

/// Combined OpenAPI documentation for the Eventboard API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Eventboard API",
        version = "0.1.0",
        description = "Events discovery, participation and moderation API",
        license(name = "MIT")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    ),
    nest(
        (path = "/api/categories", api = domain_categories::handlers::ApiDoc),
        (path = "/api/users", api = domain_users::handlers::ApiDoc),
        (path = "/api/users", api = domain_requests::handlers::ApiDoc),
        (path = "/api", api = domain_events::handlers::ApiDoc)
    ),
    tags(
        (name = "categories", description = "Event category dictionary"),
        (name = "users", description = "User accounts and subscriptions"),
        (name = "events", description = "Event discovery and moderation"),
        (name = "requests", description = "Participation request lifecycle")
    )
)]
pub struct ApiDoc;
