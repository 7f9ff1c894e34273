//! Eventboard API - events discovery, participation and moderation server

use axum_helpers::server::{create_production_app, health_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_categories::{CategoryService, PgCategoryRepository};
use domain_events::{EventService, PgEventRepository, PgLocationStore};
use domain_requests::{PgRequestRepository, RequestService};
use domain_users::{PgUserRepository, UserService};
use stats_client::StatsClient;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

mod adapters;
mod config;
mod openapi;
mod routes;

use adapters::{
    CategoryLookupAdapter, CollectorHitSink, CollectorViewSource, ConfirmedCountsAdapter,
    EventFactsAdapter, UserLookupAdapter,
};
use config::Config;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);

    info!("Connecting to Postgres");
    let db = sea_orm::Database::connect(&config.database.url).await?;
    info!("Database connection established");

    let stats = Arc::new(StatsClient::new(
        config.stats.base_url.clone(),
        config.stats.app_name.clone(),
    ));

    let categories = CategoryService::new(PgCategoryRepository::new(db.clone()));
    let users = UserService::new(PgUserRepository::new(db.clone()));

    let events = EventService::new(
        PgEventRepository::new(db.clone()),
        Arc::new(PgLocationStore::new(db.clone())),
        Arc::new(CategoryLookupAdapter::new(Arc::new(
            PgCategoryRepository::new(db.clone()),
        ))),
        Arc::new(UserLookupAdapter::new(Arc::new(PgUserRepository::new(
            db.clone(),
        )))),
        Arc::new(ConfirmedCountsAdapter::new(Arc::new(
            PgRequestRepository::new(db.clone()),
        ))),
        Arc::new(CollectorViewSource::new(stats.clone())),
    );

    let requests = RequestService::new(
        PgRequestRepository::new(db.clone()),
        EventFactsAdapter::new(Arc::new(PgEventRepository::new(db.clone()))),
        UserLookupAdapter::new(Arc::new(PgUserRepository::new(db.clone()))),
    );

    let hits = Arc::new(CollectorHitSink::new(stats));

    let api_routes = routes::api_routes(categories, users, events, requests, hits);
    let router = axum_helpers::create_router::<openapi::ApiDoc>(api_routes).await?;
    let app = router.merge(health_router(config.app.clone()));

    info!("Starting Eventboard API on port {}", config.server.port);

    create_production_app(app, &config.server, Duration::from_secs(30), async move {
        info!("Shutting down: closing database connection");
        if let Err(e) = db.close().await {
            tracing::warn!(error = %e, "Error while closing database connection");
        }
    })
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Eventboard API shutdown complete");
    Ok(())
}
