use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::matching::scorer::{score, MatchScore};
use crate::models::job::Job;
use crate::models::user::CandidateProfile;
use crate::store::HiringStore;

/// Number of candidates returned by the recruiter "match candidates" view.
pub const TOP_CANDIDATES: usize = 10;

#[derive(Debug, Clone, Serialize)]
pub struct RankedCandidate {
    pub candidate_id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(flatten)]
    pub score: MatchScore,
}

/// Scores every candidate against `job` and keeps the best `limit`,
/// highest total first. Equal totals keep their input order.
///
/// Works over the full in-memory candidate set; large pools would need
/// paging or a skill index in front of this.
pub fn rank_candidates(
    job: &Job,
    candidates: &[CandidateProfile],
    limit: usize,
) -> Vec<RankedCandidate> {
    let mut ranked: Vec<RankedCandidate> = candidates
        .iter()
        .map(|candidate| RankedCandidate {
            candidate_id: candidate.id,
            name: candidate.name.clone(),
            email: candidate.email.clone(),
            score: score(job, candidate),
        })
        .collect();

    ranked.sort_by(|a, b| b.score.total_score.cmp(&a.score.total_score));
    ranked.truncate(limit);
    ranked
}

/// Batch ranking mode: the top candidates for an existing job.
pub async fn rank_for_job(
    store: &dyn HiringStore,
    job_id: Uuid,
) -> Result<Vec<RankedCandidate>, AppError> {
    let job = store
        .find_job(job_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))?;

    let candidates = store.list_candidates().await?;
    let ranked = rank_candidates(&job, &candidates, TOP_CANDIDATES);
    info!(
        "Ranked {} of {} candidates for job {job_id}",
        ranked.len(),
        candidates.len()
    );
    Ok(ranked)
}
