use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const REMOTE_LOCATION: &str = "Remote";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Job {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub company: String,
    /// Normalized (trimmed, lower-cased) skill tokens.
    pub required_skills: Vec<String>,
    /// Minimum years of experience, 0 when the posting has no requirement.
    pub experience_required: f64,
    pub location: String,
    pub posted_by: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Job fields embedded in a candidate's application list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSummary {
    pub id: Uuid,
    pub title: String,
    pub company: String,
    pub description: String,
}

/// Search filters for the public job listing.
#[derive(Debug, Clone, Default)]
pub struct JobQuery {
    pub search: Option<String>,
    pub company: Option<String>,
    pub posted_by: Option<Uuid>,
    pub offset: i64,
    pub limit: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobPage {
    pub total: i64,
    pub page: i64,
    pub pages: i64,
    pub jobs: Vec<Job>,
}
