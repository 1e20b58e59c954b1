use axum::{
    Router, middleware,
    routing::{get, post, put},
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::auth::{GuardPipeline, TokenService};
use crate::config::Config;
use crate::db::{Store, seed};
use crate::services::{
    CatalogService, IdentityService, SeaOrmCatalogService, SeaOrmIdentityService,
};

pub mod auth;
pub mod cors;
mod error;
pub mod extractors;
mod observability;
mod products;
mod types;

pub use error::ApiError;
pub use types::*;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,

    pub identity: Arc<dyn IdentityService>,

    pub catalog: Arc<dyn CatalogService>,

    pub tokens: Arc<TokenService>,

    pub prometheus_handle: Option<PrometheusHandle>,
}

/// Connects the store, runs migrations, seeds sample data if enabled and
/// wires the services together.
pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let store = Store::with_pool_options(
        &config.general.database_path,
        config.general.max_db_connections,
        config.general.min_db_connections,
    )
    .await?;

    if config.general.seed_sample_data {
        seed::seed_if_empty(&store, &config.security).await?;
    }

    let tokens = Arc::new(TokenService::from_config(&config.auth));

    let identity: Arc<dyn IdentityService> = Arc::new(SeaOrmIdentityService::new(
        store.clone(),
        tokens.clone(),
        config.security.clone(),
    ));
    let catalog: Arc<dyn CatalogService> = Arc::new(SeaOrmCatalogService::new(store));

    Ok(Arc::new(AppState {
        config: Arc::new(config),
        identity,
        catalog,
        tokens,
        prometheus_handle,
    }))
}

pub fn router(state: Arc<AppState>) -> Router {
    let authenticated = auth::GateState::new(state.tokens.clone(), GuardPipeline::authenticated());
    let privileged = auth::GateState::new(state.tokens.clone(), GuardPipeline::privileged());

    let public_routes = Router::new()
        .route("/login", post(auth::login))
        .route("/register", post(auth::register))
        .route("/products", get(products::list_products))
        .route("/products/{id}", get(products::get_product))
        .route(
            "/products/category/{category}",
            get(products::list_by_category),
        );

    let authenticated_routes = Router::new()
        .route("/profile", get(auth::profile))
        .route_layer(middleware::from_fn_with_state(authenticated, auth::gate));

    let privileged_routes = Router::new()
        .route("/products", post(products::create_product))
        .route(
            "/products/{id}",
            put(products::update_product).delete(products::delete_product),
        )
        .route_layer(middleware::from_fn_with_state(privileged, auth::gate));

    let api_router = Router::new()
        .merge(public_routes)
        .merge(authenticated_routes)
        .merge(privileged_routes);

    let mut app = Router::new().nest("/api", api_router);

    if state.prometheus_handle.is_some() {
        app = app.route("/metrics", get(observability::get_metrics));
    }

    let cors_origins = state.config.server.cors_allowed_origins.clone();

    app.with_state(state)
        .layer(middleware::from_fn(cors::stamp_cors_headers))
        .layer(cors::cors_layer(&cors_origins))
        .layer(middleware::from_fn(observability::logging_middleware))
        .layer(TraceLayer::new_for_http())
}

/// Logs the served endpoints once at startup.
pub fn log_endpoints(config: &Config) {
    let base = format!("http://{}:{}", config.server.host, config.server.port);
    info!("Endpoints:");
    info!("  POST   {base}/api/login");
    info!("  POST   {base}/api/register");
    info!("  GET    {base}/api/profile                      (authenticated)");
    info!("  GET    {base}/api/products");
    info!("  GET    {base}/api/products/{{id}}");
    info!("  GET    {base}/api/products/category/{{category}}");
    info!("  POST   {base}/api/products                     (admin)");
    info!("  PUT    {base}/api/products/{{id}}                (admin)");
    info!("  DELETE {base}/api/products/{{id}}                (admin)");
    if config.observability.metrics_enabled {
        info!("  GET    {base}/metrics");
    }
}
