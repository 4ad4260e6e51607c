use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::auth::Actor;
use crate::errors::AppError;
use crate::jobs::service::{self, CreateJobRequest, JobListParams};
use crate::models::job::{Job, JobPage};
use crate::models::user::Role;
use crate::routes::ApiResponse;
use crate::state::AppState;

/// POST /api/v1/jobs
pub async fn handle_create_job(
    State(state): State<AppState>,
    actor: Actor,
    Json(req): Json<CreateJobRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Job>>), AppError> {
    actor.require_role(&[Role::Recruiter, Role::Admin])?;
    let job = service::create_job(state.store.as_ref(), &actor, req).await?;
    Ok((StatusCode::CREATED, ApiResponse::ok(job)))
}

/// GET /api/v1/jobs
pub async fn handle_list_jobs(
    State(state): State<AppState>,
    Query(params): Query<JobListParams>,
) -> Result<Json<ApiResponse<JobPage>>, AppError> {
    let page = service::list_jobs(state.store.as_ref(), params).await?;
    Ok(ApiResponse::ok(page))
}

/// GET /api/v1/jobs/:id
pub async fn handle_get_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Job>>, AppError> {
    let job = service::get_job(state.store.as_ref(), id).await?;
    Ok(ApiResponse::ok(job))
}
