//! API server — the thin HTTP front door over the orchestration pipeline.

use crate::rest::{self, AppState};
use adpilot_core::config::ApiConfig;
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

pub struct ApiServer {
    config: ApiConfig,
    state: AppState,
}

impl ApiServer {
    pub fn new(config: ApiConfig, state: AppState) -> Self {
        Self { config, state }
    }

    pub fn router(&self) -> Router {
        Router::new()
            // Pipeline and platform endpoints
            .route("/v1/campaigns/auto", post(rest::run_pipeline))
            .route("/v1/audiences", post(rest::create_audience))
            .route("/v1/insights", get(rest::get_insights))
            // Operational endpoints
            .route("/", get(rest::home))
            .route("/health", get(rest::health_check))
            // Middleware
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    pub async fn start_http(&self) -> anyhow::Result<()> {
        let addr = SocketAddr::new(self.config.host.parse()?, self.config.http_port);
        info!(addr = %addr, "Starting HTTP server");

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, self.router()).await?;

        Ok(())
    }
}
