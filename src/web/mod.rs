//! Web layer module
//!
//! HTTP interface for the tahap progress engine. Handlers are thin and
//! delegate to [`ProgressEngine`]; responses share one envelope and one
//! error-to-status mapping.

use anyhow::{Context, Result};
use axum::{
    Router,
    routing::{get, put},
};
use axum_tracing_opentelemetry::middleware::OtelAxumLayer;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;

use crate::{config::WebConfig, database::Database, services::ProgressEngine};

pub mod extractors;
pub mod handlers;
pub mod openapi;
pub mod responses;
pub mod utils;

pub use extractors::RequestContext;
pub use responses::{ApiResponse, handle_error, handle_result};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ProgressEngine>,
    /// Absent when the engine runs on a non-database repository
    pub database: Option<Database>,
    /// Application start time for uptime calculation
    pub start_time: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    pub fn new(engine: Arc<ProgressEngine>, database: Option<Database>) -> Self {
        Self {
            engine,
            database,
            start_time: chrono::Utc::now(),
        }
    }
}

/// Web server configuration and setup
pub struct WebServer {
    app: Router,
    addr: SocketAddr,
}

impl WebServer {
    pub fn new(config: &WebConfig, state: AppState) -> Result<Self> {
        let addr: SocketAddr = format!("{}:{}", config.host, config.port)
            .parse()
            .with_context(|| format!("Invalid listen address {}:{}", config.host, config.port))?;

        Ok(Self {
            app: Self::router(state, config.request_timeout),
            addr,
        })
    }

    /// Create the router with all routes and middleware
    pub fn router(state: AppState, request_timeout: Duration) -> Router {
        Router::new()
            .route("/health", get(handlers::health::health_check))
            .route("/ready", get(handlers::health::readiness_check))
            .route("/live", get(handlers::health::liveness_check))
            .merge(Self::openapi_routes())
            .nest("/api/v1", Self::api_v1_routes())
            .layer(TimeoutLayer::new(request_timeout))
            .layer(CorsLayer::permissive())
            .layer(OtelAxumLayer::default())
            .with_state(state)
    }

    /// OpenAPI documentation routes
    fn openapi_routes() -> Router<AppState> {
        use utoipa_swagger_ui::SwaggerUi;

        Router::new()
            .merge(SwaggerUi::new("/docs").url("/api/openapi.json", openapi::get_openapi_spec()))
    }

    fn api_v1_routes() -> Router<AppState> {
        use handlers::tahap;

        Router::new()
            .route("/kegiatan/{id}/tahap", get(tahap::get_tahap_status))
            .route("/kegiatan/{id}/tahap/{tahap}", get(tahap::get_tahap_detail))
            .route(
                "/kegiatan/{id}/tahap/{tahap}/persentase",
                get(tahap::get_tahap_persentase),
            )
            .route(
                "/kegiatan/{id}/tahap/{tahap}/subtahap/{subtahap}",
                get(tahap::get_subtahap_detail),
            )
            .route(
                "/kegiatan/{id}/tahap/{tahap}/subtahap/{subtahap}/selesai",
                get(tahap::get_subtahap_selesai),
            )
            .route(
                "/kegiatan/{id}/tahap/{tahap}/subtahap/{subtahap}/status",
                put(tahap::update_subtahap_status),
            )
            .route(
                "/kegiatan/{id}/tahap/{tahap}/subtahap/{subtahap}/tanggal-perencanaan",
                put(tahap::update_tanggal_perencanaan),
            )
            .route(
                "/kegiatan/{id}/tahap/{tahap}/subtahap/{subtahap}/tanggal-realisasi",
                put(tahap::update_tanggal_realisasi),
            )
            .route("/tahap/schema", get(tahap::get_stage_schema))
    }

    /// Serve with a notification when the server is actually listening or fails to bind
    pub async fn serve_with_signal(
        self,
        ready_signal: tokio::sync::oneshot::Sender<Result<()>>,
    ) -> Result<()> {
        match tokio::net::TcpListener::bind(&self.addr).await {
            Ok(listener) => {
                let _ = ready_signal.send(Ok(()));

                axum::serve(listener, self.app)
                    .with_graceful_shutdown(shutdown_signal())
                    .await?;
                Ok(())
            }
            Err(bind_error) => {
                let bind_err_msg = format!("Failed to bind to {}: {}", self.addr, bind_error);
                let _ = ready_signal.send(Err(anyhow::anyhow!("{}", bind_err_msg)));
                Err(anyhow::anyhow!("{}", bind_err_msg))
            }
        }
    }

    /// Get the host address
    pub fn host(&self) -> String {
        self.addr.ip().to_string()
    }

    /// Get the port number
    pub fn port(&self) -> u16 {
        self.addr.port()
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match (
            signal(SignalKind::terminate()),
            signal(SignalKind::interrupt()),
        ) {
            (Ok(mut sigterm), Ok(mut sigint)) => {
                tokio::select! {
                    _ = sigterm.recv() => {
                        tracing::info!("Received SIGTERM, shutting down gracefully");
                    }
                    _ = sigint.recv() => {
                        tracing::info!("Received SIGINT (Ctrl+C), shutting down gracefully");
                    }
                }
            }
            _ => {
                tracing::warn!("Failed to install signal handlers, falling back to Ctrl+C");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Received Ctrl+C, shutting down gracefully");
        }
    }
}
