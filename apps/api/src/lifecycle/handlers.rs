use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::auth::Actor;
use crate::errors::AppError;
use crate::lifecycle::service::{self, ApplyRequest, StatusChangeRequest};
use crate::models::application::{Application, CandidateApplicationView, JobApplicationView};
use crate::models::user::Role;
use crate::routes::ApiResponse;
use crate::state::AppState;

const MANAGERS: &[Role] = &[Role::Recruiter, Role::Admin];

/// POST /api/v1/applications
pub async fn handle_apply(
    State(state): State<AppState>,
    actor: Actor,
    Json(req): Json<ApplyRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Application>>), AppError> {
    actor.require_role(&[Role::Candidate])?;
    let application = service::apply_to_job(state.store.as_ref(), &actor, req).await?;
    Ok((StatusCode::CREATED, ApiResponse::ok(application)))
}

/// GET /api/v1/applications/my
pub async fn handle_my_applications(
    State(state): State<AppState>,
    actor: Actor,
) -> Result<Json<ApiResponse<Vec<CandidateApplicationView>>>, AppError> {
    actor.require_role(&[Role::Candidate])?;
    let applications = service::list_for_candidate(state.store.as_ref(), &actor).await?;
    Ok(ApiResponse::ok(applications))
}

/// PATCH /api/v1/applications/:id/withdraw
pub async fn handle_withdraw(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Application>>, AppError> {
    actor.require_role(&[Role::Candidate])?;
    let application = service::withdraw(state.store.as_ref(), &actor, id).await?;
    Ok(ApiResponse::ok(application))
}

/// PATCH /api/v1/applications/:id
pub async fn handle_change_status(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(req): Json<StatusChangeRequest>,
) -> Result<Json<ApiResponse<Application>>, AppError> {
    actor.require_role(MANAGERS)?;
    let application = service::change_status(state.store.as_ref(), &actor, id, req).await?;
    Ok(ApiResponse::ok(application))
}

/// GET /api/v1/applications/job/:job_id
pub async fn handle_job_applications(
    State(state): State<AppState>,
    actor: Actor,
    Path(job_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<JobApplicationView>>>, AppError> {
    actor.require_role(MANAGERS)?;
    let applications = service::list_for_job(state.store.as_ref(), &actor, job_id).await?;
    Ok(ApiResponse::ok(applications))
}
