use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::AppError;
use crate::lifecycle::status::ApplicationStatus;
use crate::models::application::{
    Application, DashboardStats, HistoryEntry, JobApplicationCount, StatusCount,
};
use crate::models::job::{Job, JobQuery, JobSummary};
use crate::models::user::CandidateProfile;
use crate::store::{ChangeOutcome, HiringStore, DUPLICATE_APPLICATION};

#[derive(Default)]
struct Tables {
    jobs: Vec<Job>,
    candidates: Vec<CandidateProfile>,
    applications: Vec<Application>,
    /// Display names for non-candidate users (recruiters, admins).
    user_names: HashMap<Uuid, String>,
    /// Returned by `find_application` instead of the live row.
    snapshots: HashMap<Uuid, Application>,
}

/// In-memory `HiringStore` used by unit and router tests.
#[derive(Default, Clone)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
    fail_writes: bool,
    miss_existing: bool,
}

impl MemoryStore {
    /// A store whose writes fail as if the database were offline.
    pub fn failing_writes() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    /// A store whose `find_application_for` never finds anything, as when two
    /// applies race past the existence check.
    pub fn missing_existing_lookups() -> Self {
        Self {
            miss_existing: true,
            ..Self::default()
        }
    }

    pub fn add_user_name(&self, id: Uuid, name: &str) {
        self.tables
            .lock()
            .expect("store mutex poisoned")
            .user_names
            .insert(id, name.to_string());
    }

    /// Makes `find_application` keep returning `application` as it is now,
    /// whatever later writes do to the stored row.
    pub fn pin_snapshot(&self, application: Application) {
        self.tables
            .lock()
            .expect("store mutex poisoned")
            .snapshots
            .insert(application.id, application);
    }

    pub fn add_candidate(&self, candidate: CandidateProfile) {
        self.tables
            .lock()
            .expect("store mutex poisoned")
            .candidates
            .push(candidate);
    }

    pub fn add_job(&self, job: Job) {
        self.tables
            .lock()
            .expect("store mutex poisoned")
            .jobs
            .push(job);
    }

    pub fn application(&self, id: Uuid) -> Option<Application> {
        self.tables
            .lock()
            .expect("store mutex poisoned")
            .applications
            .iter()
            .find(|a| a.id == id)
            .cloned()
    }

    /// Inserts a record as-is, bypassing the duplicate check. Used to seed legacy rows.
    pub fn put_application(&self, application: Application) {
        self.tables
            .lock()
            .expect("store mutex poisoned")
            .applications
            .push(application);
    }

    fn check_writable(&self) -> Result<(), AppError> {
        if self.fail_writes {
            return Err(AppError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

fn summary(job: &Job) -> JobSummary {
    JobSummary {
        id: job.id,
        title: job.title.clone(),
        company: job.company.clone(),
        description: job.description.clone(),
    }
}

impl Tables {
    fn user_name(&self, id: Uuid) -> Option<String> {
        self.candidates
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.name.clone())
            .or_else(|| self.user_names.get(&id).cloned())
    }

    /// Copy of `application` with actor names filled into its history.
    fn named(&self, application: &Application) -> Application {
        let mut named = application.clone();
        for entry in &mut named.history {
            entry.changed_by_name = self.user_name(entry.changed_by);
        }
        named
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack
        .to_lowercase()
        .contains(&needle.trim().to_lowercase())
}

#[async_trait]
impl HiringStore for MemoryStore {
    async fn find_job(&self, id: Uuid) -> Result<Option<Job>, AppError> {
        let tables = self.tables.lock().expect("store mutex poisoned");
        Ok(tables.jobs.iter().find(|j| j.id == id).cloned())
    }

    async fn list_jobs(&self, query: &JobQuery) -> Result<(i64, Vec<Job>), AppError> {
        let tables = self.tables.lock().expect("store mutex poisoned");
        let mut matching: Vec<Job> = tables
            .jobs
            .iter()
            .filter(|j| query.search.as_deref().map_or(true, |s| contains_ci(&j.title, s)))
            .filter(|j| query.company.as_deref().map_or(true, |c| contains_ci(&j.company, c)))
            .filter(|j| query.posted_by.map_or(true, |p| j.posted_by == p))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = matching.len() as i64;
        let page = matching
            .into_iter()
            .skip(query.offset.max(0) as usize)
            .take(query.limit.max(0) as usize)
            .collect();
        Ok((total, page))
    }

    async fn insert_job(&self, job: &Job) -> Result<(), AppError> {
        self.check_writable()?;
        self.add_job(job.clone());
        Ok(())
    }

    async fn find_candidate(&self, id: Uuid) -> Result<Option<CandidateProfile>, AppError> {
        let tables = self.tables.lock().expect("store mutex poisoned");
        Ok(tables.candidates.iter().find(|c| c.id == id).cloned())
    }

    async fn list_candidates(&self) -> Result<Vec<CandidateProfile>, AppError> {
        Ok(self
            .tables
            .lock()
            .expect("store mutex poisoned")
            .candidates
            .clone())
    }

    async fn find_application(&self, id: Uuid) -> Result<Option<Application>, AppError> {
        let pinned = self
            .tables
            .lock()
            .expect("store mutex poisoned")
            .snapshots
            .get(&id)
            .cloned();
        Ok(pinned.or_else(|| self.application(id)))
    }

    async fn find_application_for(
        &self,
        job_id: Uuid,
        candidate_id: Uuid,
    ) -> Result<Option<Application>, AppError> {
        if self.miss_existing {
            return Ok(None);
        }
        let tables = self.tables.lock().expect("store mutex poisoned");
        Ok(tables
            .applications
            .iter()
            .find(|a| a.job_id == job_id && a.candidate_id == candidate_id)
            .cloned())
    }

    async fn applications_for_job(
        &self,
        job_id: Uuid,
    ) -> Result<Vec<(Application, CandidateProfile)>, AppError> {
        let tables = self.tables.lock().expect("store mutex poisoned");
        Ok(tables
            .applications
            .iter()
            .filter(|a| a.job_id == job_id)
            .filter_map(|a| {
                tables
                    .candidates
                    .iter()
                    .find(|c| c.id == a.candidate_id)
                    .map(|c| (tables.named(a), c.clone()))
            })
            .collect())
    }

    async fn applications_for_candidate(
        &self,
        candidate_id: Uuid,
    ) -> Result<Vec<(Application, JobSummary)>, AppError> {
        let tables = self.tables.lock().expect("store mutex poisoned");
        let mut found: Vec<(Application, JobSummary)> = tables
            .applications
            .iter()
            .filter(|a| a.candidate_id == candidate_id)
            .filter_map(|a| {
                tables
                    .jobs
                    .iter()
                    .find(|j| j.id == a.job_id)
                    .map(|j| (tables.named(a), summary(j)))
            })
            .collect();
        found.sort_by(|a, b| b.0.created_at.cmp(&a.0.created_at));
        Ok(found)
    }

    async fn insert_application(&self, application: &Application) -> Result<(), AppError> {
        self.check_writable()?;
        let mut tables = self.tables.lock().expect("store mutex poisoned");
        if tables
            .applications
            .iter()
            .any(|a| a.job_id == application.job_id && a.candidate_id == application.candidate_id)
        {
            return Err(AppError::Conflict(DUPLICATE_APPLICATION.to_string()));
        }
        tables.applications.push(application.clone());
        Ok(())
    }

    async fn record_change(
        &self,
        application: &Application,
        expected: ApplicationStatus,
        entry: Option<&HistoryEntry>,
    ) -> Result<ChangeOutcome, AppError> {
        self.check_writable()?;
        let mut tables = self.tables.lock().expect("store mutex poisoned");
        let stored = tables
            .applications
            .iter_mut()
            .find(|a| a.id == application.id)
            .ok_or_else(|| AppError::NotFound(format!("Application {} not found", application.id)))?;

        if stored.status != expected {
            return Ok(ChangeOutcome::StatusChanged(stored.status));
        }

        stored.status = application.status;
        stored.notes = application.notes.clone();
        stored.updated_at = application.updated_at;
        if let Some(entry) = entry {
            stored.history.push(entry.clone());
        }
        Ok(ChangeOutcome::Saved)
    }

    async fn dashboard_stats(&self, posted_by: Option<Uuid>) -> Result<DashboardStats, AppError> {
        let tables = self.tables.lock().expect("store mutex poisoned");
        let jobs: Vec<&Job> = tables
            .jobs
            .iter()
            .filter(|j| posted_by.map_or(true, |p| j.posted_by == p))
            .collect();

        let mut by_status: BTreeMap<String, i64> = BTreeMap::new();
        let mut per_job = Vec::new();
        let mut total_applications = 0;
        for job in &jobs {
            let count = tables
                .applications
                .iter()
                .filter(|a| a.job_id == job.id)
                .inspect(|a| *by_status.entry(a.status.label().to_string()).or_default() += 1)
                .count() as i64;
            total_applications += count;
            if count > 0 {
                per_job.push(JobApplicationCount {
                    job_title: job.title.clone(),
                    count,
                });
            }
        }
        per_job.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.job_title.cmp(&b.job_title)));

        Ok(DashboardStats {
            total_jobs: jobs.len() as i64,
            total_applications,
            applications_by_status: by_status
                .into_iter()
                .map(|(status, count)| StatusCount { status, count })
                .collect(),
            applications_per_job: per_job,
        })
    }
}
