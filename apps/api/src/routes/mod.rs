pub mod health;

use axum::{
    routing::{get, patch, post},
    Json, Router,
};
use serde::Serialize;

use crate::dashboard;
use crate::jobs::handlers as jobs;
use crate::lifecycle::handlers as applications;
use crate::matching::handlers as matching;
use crate::state::AppState;

/// Success envelope shared by every API route: `{"success": true, "data": ...}`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data,
        })
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Job board
        .route(
            "/api/v1/jobs",
            get(jobs::handle_list_jobs).post(jobs::handle_create_job),
        )
        .route("/api/v1/jobs/:id", get(jobs::handle_get_job))
        // Application lifecycle
        .route("/api/v1/applications", post(applications::handle_apply))
        .route(
            "/api/v1/applications/my",
            get(applications::handle_my_applications),
        )
        .route(
            "/api/v1/applications/job/:job_id",
            get(applications::handle_job_applications),
        )
        .route(
            "/api/v1/applications/:id",
            patch(applications::handle_change_status),
        )
        .route(
            "/api/v1/applications/:id/withdraw",
            patch(applications::handle_withdraw),
        )
        // Matching
        .route(
            "/api/v1/match/job/:job_id",
            get(matching::handle_match_candidates),
        )
        // Dashboard
        .route("/api/v1/dashboard/stats", get(dashboard::handle_stats))
        .with_state(state)
}
