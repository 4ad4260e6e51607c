use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use crate::lifecycle::status::ApplicationStatus;
use crate::matching::scorer::MatchScore;
use crate::models::job::JobSummary;
use crate::models::user::CandidateProfile;

/// One audit-trail row. Never edited once appended.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub status: ApplicationStatus,
    pub changed_by: Uuid,
    /// Filled in when history is read back for display.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changed_by_name: Option<String>,
    pub changed_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Application {
    pub id: Uuid,
    pub job_id: Uuid,
    pub candidate_id: Uuid,
    pub status: ApplicationStatus,
    pub notes: Option<String>,
    /// `None` for legacy records created before scoring existed.
    #[serde(flatten)]
    pub scores: Option<MatchScore>,
    /// Oldest first.
    pub history: Vec<HistoryEntry>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Recruiter view of an application: candidate identity plus healed scores.
#[derive(Debug, Clone, Serialize)]
pub struct JobApplicationView {
    pub id: Uuid,
    pub job_id: Uuid,
    pub status: ApplicationStatus,
    pub notes: Option<String>,
    pub candidate: CandidateProfile,
    #[serde(flatten)]
    pub scores: MatchScore,
    pub history: Vec<HistoryEntry>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Candidate view of their own application with the job embedded.
#[derive(Debug, Clone, Serialize)]
pub struct CandidateApplicationView {
    pub id: Uuid,
    pub status: ApplicationStatus,
    pub notes: Option<String>,
    pub job: JobSummary,
    #[serde(flatten)]
    pub scores: Option<MatchScore>,
    pub history: Vec<HistoryEntry>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Dashboard aggregates over a recruiter's jobs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, FromRow)]
pub struct StatusCount {
    pub status: String,
    pub count: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, FromRow)]
pub struct JobApplicationCount {
    pub job_title: String,
    pub count: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total_jobs: i64,
    pub total_applications: i64,
    pub applications_by_status: Vec<StatusCount>,
    pub applications_per_job: Vec<JobApplicationCount>,
}
