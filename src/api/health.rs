//! Health check endpoints
//!
//! Health check endpoints for monitoring and container orchestration.

use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::server::state::AppState;

/// Response for the main health check endpoint
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub environment: String,
    pub uptime_seconds: u64,
}

/// Response for readiness probe
#[derive(Serialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    pub checks: ReadinessChecks,
    /// When the current market snapshot was received
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_market_at: Option<DateTime<Utc>>,
}

/// Individual readiness checks
#[derive(Debug, Serialize)]
pub struct ReadinessChecks {
    pub config_loaded: bool,
    pub client_connected: bool,
    pub market_available: bool,
}

/// Response for liveness probe
#[derive(Serialize)]
pub struct LivenessResponse {
    pub alive: bool,
}

/// Main health check endpoint
///
/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: state.settings.app_version.clone(),
        environment: state.settings.environment.to_string(),
        uptime_seconds: state.uptime_seconds(),
    })
}

/// Readiness probe endpoint
///
/// The service is ready once the headless client holds a live connection
/// and at least one market snapshot has been received.
///
/// GET /ready
pub async fn readiness(State(state): State<AppState>) -> (StatusCode, Json<ReadinessResponse>) {
    let checks = ReadinessChecks {
        config_loaded: true,
        client_connected: state.exchange.is_connected(),
        market_available: state.exchange.has_market(),
    };

    let ready = checks.client_connected && checks.market_available;
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    if !ready {
        tracing::warn!(checks = ?checks, "Service not ready");
    }

    (
        status,
        Json(ReadinessResponse {
            ready,
            checks,
            last_market_at: state.exchange.latest().map(|s| s.received_at),
        }),
    )
}

/// Liveness probe endpoint
///
/// GET /liveness
pub async fn liveness() -> Json<LivenessResponse> {
    // If we can respond, we're alive
    Json(LivenessResponse { alive: true })
}
