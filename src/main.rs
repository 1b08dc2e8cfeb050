// Main entry point - Dependency injection and server setup
mod domain;
mod application;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};
use axum::{routing::{get, post}, Router};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::application::dashboard_service::DashboardService;
use crate::application::refresh_service::RefreshService;
use crate::infrastructure::config::{load_backend_config, load_dashboard_config};
use crate::infrastructure::supabase_repository::SupabaseRepository;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    alerts, dashboard_page, facility_chart, facility_series, facility_table, health_check,
    park_listing, pass_summary, refresh, stream_updates,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing, RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let backend_config = load_backend_config()?;
    let dashboard = load_dashboard_config()?.dashboard;
    let utc_offset = dashboard.utc_offset()?;

    // Create repository (infrastructure layer)
    let repository = Arc::new(SupabaseRepository::new(&backend_config.backend, utc_offset)?);

    // Create services (application layer)
    let refresh_service = Arc::new(RefreshService::new(
        repository,
        backend_config.parks,
        utc_offset,
        dashboard.short_name_ttl(),
    ));
    if dashboard.auto_refresh {
        let _auto_refresh = refresh_service.clone().spawn_auto_refresh(dashboard.refresh_interval());
    } else if let Err(e) = refresh_service.refresh().await {
        // Served as "not ready" until a manual refresh succeeds
        tracing::error!("Initial refresh failed: {:#}", e);
    }
    let dashboard_service = DashboardService::new(refresh_service, dashboard.alert_thresholds());

    // Create application state
    let state = Arc::new(AppState {
        dashboard_service,
        refresh_interval_secs: dashboard.refresh_interval().as_secs(),
    });

    // Build router (presentation layer)
    // JSON bodies are Brotli-encoded by the handlers, so no CompressionLayer here
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/", get(dashboard_page))
        .route("/api/parks/:park", get(park_listing))
        .route("/api/passes", get(pass_summary))
        .route("/api/alerts", get(alerts))
        .route("/api/facilities", get(facility_table))
        .route("/api/facilities/:id/series", get(facility_series))
        .route("/facilities/:id/chart.svg", get(facility_chart))
        .route("/api/refresh", post(refresh))
        .route("/api/stream", get(stream_updates))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = dashboard.listen_addr.parse()?;
    tracing::info!("Starting park-wait-dashboard on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutting down");
}
