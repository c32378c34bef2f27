use anyhow::Context;
use axum::Router;
use axum::extract::State;
use dotenv::dotenv;
use sqlx::postgres::PgPoolOptions;
use std::env;
use std::sync::Arc;
use tracing::info;

mod api;
mod app_env;
mod domain;
mod dto;
mod external_connections;
mod logging;
mod persistence;
mod routing_utils;
mod security;

/// State shared across every request handler
pub struct SharedData {
    pub ext_cxn: persistence::ExternalConnectivity,
}

/// Extractor alias for pulling [SharedData] out of the request context
pub type AppState = State<Arc<SharedData>>;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    dotenv().ok();

    let otel_exporters = match (
        env::var(app_env::OTEL_SPAN_EXPORT_URL),
        env::var(app_env::OTEL_METRIC_EXPORT_URL),
    ) {
        (Ok(span_url), Ok(metric_url)) => Some(logging::init_exporters(&span_url, &metric_url)?),
        _ => None,
    };
    logging::setup_logging_and_tracing(logging::init_env_filter()?, otel_exporters);

    let db_url = env::var(app_env::DB_URL)
        .with_context(|| format!("reading the database URL from {}", app_env::DB_URL))?;
    let db_pool = PgPoolOptions::new()
        .max_connections(16)
        .connect(&db_url)
        .await
        .context("connecting to the database")?;

    let shared_data = Arc::new(SharedData {
        ext_cxn: persistence::ExternalConnectivity::new(db_pool),
    });

    let router = Router::new()
        .nest("/auth", api::auth::auth_routes())
        .nest("/tasks", api::task::task_routes())
        .nest("/lists", api::list::list_routes())
        .merge(api::swagger_main::build_documentation())
        .with_state(shared_data);
    let router = logging::attach_tracing_http(router);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:8080")
        .await
        .context("binding the server port")?;
    info!("Server starting on port 8080");
    axum::serve(listener, router)
        .await
        .context("serving the API")?;

    Ok(())
}
