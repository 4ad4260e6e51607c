//! Persistence collaborator for the hiring core.
//!
//! `AppState` carries an `Arc<dyn HiringStore>`: `PgStore` in production,
//! `MemoryStore` in tests.

pub mod postgres;

#[cfg(test)]
pub mod memory;

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::AppError;
use crate::lifecycle::status::ApplicationStatus;
use crate::models::application::{Application, DashboardStats, HistoryEntry};
use crate::models::job::{Job, JobQuery, JobSummary};
use crate::models::user::CandidateProfile;

pub use postgres::PgStore;

#[async_trait]
pub trait HiringStore: Send + Sync {
    async fn find_job(&self, id: Uuid) -> Result<Option<Job>, AppError>;

    /// Returns the total number of matching jobs and the requested page, newest first.
    async fn list_jobs(&self, query: &JobQuery) -> Result<(i64, Vec<Job>), AppError>;

    async fn insert_job(&self, job: &Job) -> Result<(), AppError>;

    async fn find_candidate(&self, id: Uuid) -> Result<Option<CandidateProfile>, AppError>;

    /// Every user with role `candidate`.
    async fn list_candidates(&self) -> Result<Vec<CandidateProfile>, AppError>;

    async fn find_application(&self, id: Uuid) -> Result<Option<Application>, AppError>;

    async fn find_application_for(
        &self,
        job_id: Uuid,
        candidate_id: Uuid,
    ) -> Result<Option<Application>, AppError>;

    async fn applications_for_job(
        &self,
        job_id: Uuid,
    ) -> Result<Vec<(Application, CandidateProfile)>, AppError>;

    /// Newest application first.
    async fn applications_for_candidate(
        &self,
        candidate_id: Uuid,
    ) -> Result<Vec<(Application, JobSummary)>, AppError>;

    /// Persists a new application together with its history.
    /// A second application for the same (job, candidate) fails with `Conflict`.
    async fn insert_application(&self, application: &Application) -> Result<(), AppError>;

    /// Saves status, notes and `updated_at`, and appends `entry` to the
    /// history, all or nothing. Only applies while the stored status is still
    /// `expected`; otherwise nothing is written and the current status is
    /// reported back.
    async fn record_change(
        &self,
        application: &Application,
        expected: ApplicationStatus,
        entry: Option<&HistoryEntry>,
    ) -> Result<ChangeOutcome, AppError>;

    /// Aggregates over jobs posted by `posted_by`, or over every job when `None`.
    async fn dashboard_stats(&self, posted_by: Option<Uuid>) -> Result<DashboardStats, AppError>;
}

/// Message used for duplicate (job, candidate) applications.
pub const DUPLICATE_APPLICATION: &str = "You have already applied for this job";

/// Result of a conditional application update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOutcome {
    Saved,
    /// Another request moved the application first; holds its current status.
    StatusChanged(ApplicationStatus),
}
