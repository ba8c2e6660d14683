use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::AppState;

const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

static PROBE_SEQ: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReadinessResponse {
    pub status: String,
    pub storage: String,
    /// `available` or `unavailable`; never fails readiness.
    pub video_encoder: String,
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses((status = 200, description = "Process is up", body = HealthResponse))
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
    })
}

#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "health",
    responses(
        (status = 200, description = "Uploads root writable", body = ReadinessResponse),
        (status = 503, description = "Uploads root not writable", body = ReadinessResponse)
    )
)]
pub async fn readiness(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let storage = match tokio::time::timeout(PROBE_TIMEOUT, check_writable(&state)).await {
        Ok(Ok(())) => "healthy".to_string(),
        Ok(Err(e)) => {
            tracing::error!(error = %e, "Uploads root not writable");
            format!("unhealthy: {}", e)
        }
        Err(_) => {
            tracing::error!("Storage readiness check timed out");
            "timeout".to_string()
        }
    };

    // A missing encoder degrades video compression but never readiness.
    let video_encoder = match tokio::time::timeout(
        PROBE_TIMEOUT,
        state.media.video.probe().is_available(),
    )
    .await
    {
        Ok(true) => "available",
        Ok(false) | Err(_) => "unavailable",
    };

    let healthy = storage == "healthy";
    let response = ReadinessResponse {
        status: if healthy { "ready" } else { "not_ready" }.to_string(),
        storage,
        video_encoder: video_encoder.to_string(),
    };
    let status_code = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(response))
}

async fn check_writable(state: &AppState) -> std::io::Result<()> {
    let probe = state
        .media
        .store
        .layout()
        .root()
        .join(format!(
            ".ready-{}-{}",
            std::process::id(),
            PROBE_SEQ.fetch_add(1, Ordering::Relaxed)
        ));
    tokio::fs::write(&probe, b"ok").await?;
    tokio::fs::remove_file(&probe).await
}
