//! Match Scorer: weighted compatibility between a candidate profile and a job.
//!
//! Pure and deterministic: the same (job, candidate) pair always yields the
//! same `MatchScore`. Both the application write path and the recruiter
//! ranking view go through `score`; the read path goes through
//! `score_or_recompute`, which only falls back to `score`.
//!
//! Algorithm:
//! 1. skill      = |required ∩ candidate| / |required| × 100 (0 if either side is empty)
//! 2. experience = 100 when nothing is required or the candidate meets it,
//!    otherwise candidate / required × 100
//! 3. location   = 100 only for a non-remote job in the candidate's location
//! 4. total      = round(0.6 × skill + 0.3 × experience + 0.1 × location)

use serde::{Deserialize, Serialize};

use crate::models::job::Job;
use crate::models::user::CandidateProfile;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchWeights {
    pub skill: f64,
    pub experience: f64,
    pub location: f64,
}

/// Fixed for every job; not configurable.
pub const MATCH_WEIGHTS: MatchWeights = MatchWeights {
    skill: 0.6,
    experience: 0.3,
    location: 0.1,
};

const REMOTE: &str = "remote";

/// Integer scores in 0 – 100.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchScore {
    pub skill_score: i32,
    pub experience_score: i32,
    pub location_score: i32,
    pub total_score: i32,
}

impl MatchWeights {
    /// Weighted total over already-rounded component scores.
    pub fn total(&self, skill: i32, experience: i32, location: i32) -> i32 {
        let weighted = f64::from(skill) * self.skill
            + f64::from(experience) * self.experience
            + f64::from(location) * self.location;
        (weighted.round() as i32).clamp(0, 100)
    }
}

/// Scores one job against one candidate.
pub fn score(job: &Job, candidate: &CandidateProfile) -> MatchScore {
    let required = normalize_skills(&job.required_skills);
    let offered = normalize_skills(&candidate.skills);

    let skill_score = round_component(skill_component(&required, &offered));
    let experience_score = round_component(experience_component(
        job.experience_required,
        candidate.experience_years,
    ));
    let location_score = round_component(location_component(&job.location, &candidate.location));

    MatchScore {
        skill_score,
        experience_score,
        location_score,
        total_score: MATCH_WEIGHTS.total(skill_score, experience_score, location_score),
    }
}

/// Read-path reconciliation for legacy records: keeps a stored score unless it
/// is missing or its total is zero, in which case the pair is re-scored.
pub fn score_or_recompute(
    stored: Option<MatchScore>,
    job: &Job,
    candidate: &CandidateProfile,
) -> MatchScore {
    match stored {
        Some(existing) if existing.total_score > 0 => existing,
        _ => score(job, candidate),
    }
}

/// Lower-cases and trims skill tokens. Entries that arrive as a single
/// comma-delimited string are split; empty tokens are dropped.
pub fn normalize_skills<S: AsRef<str>>(skills: &[S]) -> Vec<String> {
    skills
        .iter()
        .flat_map(|entry| entry.as_ref().split(','))
        .map(|token| token.trim().to_lowercase())
        .filter(|token| !token.is_empty())
        .collect()
}

pub fn normalize_location(location: &str) -> String {
    let trimmed = location.trim();
    if trimmed.is_empty() {
        REMOTE.to_string()
    } else {
        trimmed.to_lowercase()
    }
}

fn skill_component(required: &[String], offered: &[String]) -> f64 {
    if required.is_empty() || offered.is_empty() {
        return 0.0;
    }
    let overlap = required
        .iter()
        .filter(|skill| offered.contains(skill))
        .count();
    overlap as f64 / required.len() as f64 * 100.0
}

fn experience_component(required_years: f64, candidate_years: f64) -> f64 {
    if required_years <= 0.0 {
        return 100.0;
    }
    let candidate_years = candidate_years.max(0.0);
    if candidate_years >= required_years {
        100.0
    } else {
        (candidate_years / required_years * 100.0).clamp(0.0, 100.0)
    }
}

fn location_component(job_location: &str, candidate_location: &str) -> f64 {
    let job_location = normalize_location(job_location);
    if job_location != REMOTE && job_location == normalize_location(candidate_location) {
        100.0
    } else {
        0.0
    }
}

fn round_component(value: f64) -> i32 {
    (value.round() as i32).clamp(0, 100)
}
