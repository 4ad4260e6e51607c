use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::auth::Actor;
use crate::errors::AppError;
use crate::matching::ranking::{rank_for_job, RankedCandidate};
use crate::models::user::Role;
use crate::routes::ApiResponse;
use crate::state::AppState;

/// GET /api/v1/match/job/:job_id
pub async fn handle_match_candidates(
    State(state): State<AppState>,
    actor: Actor,
    Path(job_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<RankedCandidate>>>, AppError> {
    actor.require_role(&[Role::Recruiter, Role::Admin])?;
    let ranked = rank_for_job(state.store.as_ref(), job_id).await?;
    Ok(ApiResponse::ok(ranked))
}
