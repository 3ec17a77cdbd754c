//! Health check HTTP handlers

use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::web::{
    AppState,
    extractors::RequestContext,
    responses::{ok, service_unavailable},
    utils::log_request,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// "connected", "disconnected", or "not_configured" for storage-less setups
    pub database: String,
    pub uptime_seconds: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DatabaseStatus {
    Connected,
    Disconnected,
    NotConfigured,
}

impl DatabaseStatus {
    fn as_str(self) -> &'static str {
        match self {
            Self::Connected => "connected",
            Self::Disconnected => "disconnected",
            Self::NotConfigured => "not_configured",
        }
    }

    fn is_available(self) -> bool {
        self != Self::Disconnected
    }
}

async fn database_status(state: &AppState) -> DatabaseStatus {
    match &state.database {
        Some(database) => match database.ping().await {
            Ok(()) => DatabaseStatus::Connected,
            Err(e) => {
                tracing::warn!("Health check database ping failed: {:#}", e);
                DatabaseStatus::Disconnected
            }
        },
        None => DatabaseStatus::NotConfigured,
    }
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>, context: RequestContext) -> Response {
    log_request(&context);

    let database = database_status(&state).await;
    let status = if database.is_available() {
        "healthy"
    } else {
        "unhealthy"
    };

    ok(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: database.as_str().to_string(),
        uptime_seconds: (chrono::Utc::now() - state.start_time).num_seconds(),
    })
    .into_response()
}

/// Readiness check (for Kubernetes probes)
pub async fn readiness_check(State(state): State<AppState>, context: RequestContext) -> Response {
    log_request(&context);

    if !database_status(&state).await.is_available() {
        return service_unavailable("Database connection failed").into_response();
    }

    ok(serde_json::json!({
        "status": "ready",
        "timestamp": chrono::Utc::now()
    }))
    .into_response()
}

/// Liveness check (for Kubernetes probes)
pub async fn liveness_check(context: RequestContext) -> Response {
    log_request(&context);

    ok(serde_json::json!({
        "status": "alive",
        "timestamp": chrono::Utc::now()
    }))
    .into_response()
}
