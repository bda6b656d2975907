//! Locally served API endpoints.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use serde_json::json;

use crate::audit::AuditSnapshot;
use crate::http::server::AppState;

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub tracked_clients: usize,
    pub audit_lines: usize,
}

/// `GET /api/status`
pub async fn get_status(State(state): State<AppState>) -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        tracked_clients: state.inspector.rate_limiter().tracked_clients(),
        audit_lines: state.inspector.audit().len(),
    })
}

/// `GET /api/live-logs`
pub async fn get_live_logs(State(state): State<AppState>) -> Json<AuditSnapshot> {
    Json(state.inspector.audit().snapshot())
}

/// `GET /api/security-reports`
pub async fn list_reports(State(state): State<AppState>) -> impl IntoResponse {
    match state.reports.list().await {
        Ok(reports) => (StatusCode::OK, Json(json!({ "success": true, "data": reports }))),
        Err(e) => {
            tracing::error!(error = %e, "Error fetching security reports");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to fetch security reports" })),
            )
        }
    }
}

/// `POST /api/security-reports`
pub async fn save_report(
    State(state): State<AppState>,
    Json(report): Json<serde_json::Value>,
) -> impl IntoResponse {
    match state.reports.save(report).await {
        Ok(stored) => (StatusCode::OK, Json(json!({ "success": true, "data": [stored] }))),
        Err(e) => {
            tracing::error!(error = %e, "Error saving security report");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to save security report" })),
            )
        }
    }
}
