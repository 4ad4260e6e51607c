use std::collections::HashMap;

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection, PgPool};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::lifecycle::status::ApplicationStatus;
use crate::matching::scorer::MatchScore;
use crate::models::application::{
    Application, DashboardStats, HistoryEntry, JobApplicationCount, StatusCount,
};
use crate::models::job::{Job, JobQuery, JobSummary};
use crate::models::user::CandidateProfile;
use crate::store::{ChangeOutcome, HiringStore, DUPLICATE_APPLICATION};

const APPLICATION_COLUMNS: &str = "a.id, a.job_id, a.candidate_id, a.status, a.notes, \
     a.match_score, a.skill_score, a.experience_score, a.location_score, \
     a.created_at, a.updated_at";

/// PostgreSQL-backed store. Applications are updated in place; history rows
/// are append-only and never UPDATEd or DELETEd.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct ApplicationRow {
    id: Uuid,
    job_id: Uuid,
    candidate_id: Uuid,
    status: String,
    notes: Option<String>,
    match_score: Option<i32>,
    skill_score: Option<i32>,
    experience_score: Option<i32>,
    location_score: Option<i32>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct HistoryRow {
    application_id: Uuid,
    status: String,
    changed_by: Uuid,
    changed_by_name: Option<String>,
    changed_at: DateTime<Utc>,
    note: Option<String>,
}

#[derive(Debug, FromRow)]
struct CandidateApplicationRow {
    #[sqlx(flatten)]
    application: ApplicationRow,
    candidate_name: String,
    candidate_email: String,
    candidate_skills: Vec<String>,
    candidate_experience_years: f64,
    candidate_location: String,
}

#[derive(Debug, FromRow)]
struct JobApplicationRow {
    #[sqlx(flatten)]
    application: ApplicationRow,
    job_title: String,
    job_company: String,
    job_description: String,
}

fn parse_status(raw: &str) -> Result<ApplicationStatus, AppError> {
    raw.parse::<ApplicationStatus>()
        .map_err(|e| AppError::Internal(anyhow!("corrupt application row: {e}")))
}

impl ApplicationRow {
    fn stored_scores(&self) -> Option<MatchScore> {
        Some(MatchScore {
            skill_score: self.skill_score?,
            experience_score: self.experience_score?,
            location_score: self.location_score?,
            total_score: self.match_score?,
        })
    }

    fn into_application(self, history: Vec<HistoryEntry>) -> Result<Application, AppError> {
        let scores = self.stored_scores();
        Ok(Application {
            id: self.id,
            job_id: self.job_id,
            candidate_id: self.candidate_id,
            status: parse_status(&self.status)?,
            notes: self.notes,
            scores,
            history,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl HistoryRow {
    fn into_entry(self) -> Result<HistoryEntry, AppError> {
        Ok(HistoryEntry {
            status: parse_status(&self.status)?,
            changed_by: self.changed_by,
            changed_by_name: self.changed_by_name,
            changed_at: self.changed_at,
            note: self.note,
        })
    }
}

fn map_unique_violation(err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            return AppError::Conflict(DUPLICATE_APPLICATION.to_string());
        }
    }
    AppError::Database(err)
}

/// Escapes LIKE wildcards so user search text is matched literally.
fn contains_pattern(text: &str) -> String {
    let escaped = text
        .trim()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

async fn append_history(
    conn: &mut PgConnection,
    application_id: Uuid,
    entry: &HistoryEntry,
) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO application_history (application_id, status, changed_by, changed_at, note)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(application_id)
    .bind(entry.status.label())
    .bind(entry.changed_by)
    .bind(entry.changed_at)
    .bind(entry.note.as_deref())
    .execute(conn)
    .await?;
    Ok(())
}

impl PgStore {
    /// Loads and groups history for a batch of applications, oldest entry first,
    /// with the acting user's name where the user still exists.
    async fn load_history(
        &self,
        application_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Vec<HistoryEntry>>, AppError> {
        let rows = sqlx::query_as::<_, HistoryRow>(
            r#"
            SELECT h.application_id, h.status, h.changed_by,
                   u.name AS changed_by_name, h.changed_at, h.note
            FROM application_history h
            LEFT JOIN users u ON u.id = h.changed_by
            WHERE h.application_id = ANY($1)
            ORDER BY h.application_id, h.id ASC
            "#,
        )
        .bind(application_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut grouped: HashMap<Uuid, Vec<HistoryEntry>> = HashMap::new();
        for row in rows {
            let application_id = row.application_id;
            grouped
                .entry(application_id)
                .or_default()
                .push(row.into_entry()?);
        }
        Ok(grouped)
    }

    async fn hydrate(&self, row: ApplicationRow) -> Result<Application, AppError> {
        let mut history = self.load_history(&[row.id]).await?;
        let entries = history.remove(&row.id).unwrap_or_default();
        row.into_application(entries)
    }
}

#[async_trait]
impl HiringStore for PgStore {
    async fn find_job(&self, id: Uuid) -> Result<Option<Job>, AppError> {
        Ok(sqlx::query_as::<_, Job>("SELECT * FROM jobs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_jobs(&self, query: &JobQuery) -> Result<(i64, Vec<Job>), AppError> {
        let search = query.search.as_deref().map(contains_pattern);
        let company = query.company.as_deref().map(contains_pattern);

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM jobs
            WHERE ($1::text IS NULL OR title ILIKE $1)
              AND ($2::text IS NULL OR company ILIKE $2)
              AND ($3::uuid IS NULL OR posted_by = $3)
            "#,
        )
        .bind(search.as_deref())
        .bind(company.as_deref())
        .bind(query.posted_by)
        .fetch_one(&self.pool)
        .await?;

        let jobs = sqlx::query_as::<_, Job>(
            r#"
            SELECT * FROM jobs
            WHERE ($1::text IS NULL OR title ILIKE $1)
              AND ($2::text IS NULL OR company ILIKE $2)
              AND ($3::uuid IS NULL OR posted_by = $3)
            ORDER BY created_at DESC
            OFFSET $4 LIMIT $5
            "#,
        )
        .bind(search.as_deref())
        .bind(company.as_deref())
        .bind(query.posted_by)
        .bind(query.offset)
        .bind(query.limit)
        .fetch_all(&self.pool)
        .await?;

        Ok((total, jobs))
    }

    async fn insert_job(&self, job: &Job) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO jobs
                (id, title, description, company, required_skills,
                 experience_required, location, posted_by, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(job.id)
        .bind(&job.title)
        .bind(&job.description)
        .bind(&job.company)
        .bind(&job.required_skills)
        .bind(job.experience_required)
        .bind(&job.location)
        .bind(job.posted_by)
        .bind(job.created_at)
        .execute(&self.pool)
        .await?;

        info!("Inserted job {} for recruiter {}", job.id, job.posted_by);
        Ok(())
    }

    async fn find_candidate(&self, id: Uuid) -> Result<Option<CandidateProfile>, AppError> {
        Ok(sqlx::query_as::<_, CandidateProfile>(
            r#"
            SELECT id, name, email, skills, experience_years, location
            FROM users
            WHERE id = $1 AND role = 'candidate'
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn list_candidates(&self) -> Result<Vec<CandidateProfile>, AppError> {
        Ok(sqlx::query_as::<_, CandidateProfile>(
            r#"
            SELECT id, name, email, skills, experience_years, location
            FROM users
            WHERE role = 'candidate'
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?)
    }

    async fn find_application(&self, id: Uuid) -> Result<Option<Application>, AppError> {
        let row = sqlx::query_as::<_, ApplicationRow>(&format!(
            "SELECT {APPLICATION_COLUMNS} FROM applications a WHERE a.id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(self.hydrate(row).await?)),
            None => Ok(None),
        }
    }

    async fn find_application_for(
        &self,
        job_id: Uuid,
        candidate_id: Uuid,
    ) -> Result<Option<Application>, AppError> {
        let row = sqlx::query_as::<_, ApplicationRow>(&format!(
            "SELECT {APPLICATION_COLUMNS} FROM applications a \
             WHERE a.job_id = $1 AND a.candidate_id = $2"
        ))
        .bind(job_id)
        .bind(candidate_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(self.hydrate(row).await?)),
            None => Ok(None),
        }
    }

    async fn applications_for_job(
        &self,
        job_id: Uuid,
    ) -> Result<Vec<(Application, CandidateProfile)>, AppError> {
        let rows = sqlx::query_as::<_, CandidateApplicationRow>(&format!(
            r#"
            SELECT {APPLICATION_COLUMNS},
                   u.name AS candidate_name,
                   u.email AS candidate_email,
                   u.skills AS candidate_skills,
                   u.experience_years AS candidate_experience_years,
                   u.location AS candidate_location
            FROM applications a
            JOIN users u ON u.id = a.candidate_id
            WHERE a.job_id = $1
            ORDER BY a.created_at ASC
            "#
        ))
        .bind(job_id)
        .fetch_all(&self.pool)
        .await?;

        let ids: Vec<Uuid> = rows.iter().map(|r| r.application.id).collect();
        let mut history = self.load_history(&ids).await?;

        rows.into_iter()
            .map(|row| {
                let candidate = CandidateProfile {
                    id: row.application.candidate_id,
                    name: row.candidate_name,
                    email: row.candidate_email,
                    skills: row.candidate_skills,
                    experience_years: row.candidate_experience_years,
                    location: row.candidate_location,
                };
                let entries = history.remove(&row.application.id).unwrap_or_default();
                Ok((row.application.into_application(entries)?, candidate))
            })
            .collect()
    }

    async fn applications_for_candidate(
        &self,
        candidate_id: Uuid,
    ) -> Result<Vec<(Application, JobSummary)>, AppError> {
        let rows = sqlx::query_as::<_, JobApplicationRow>(&format!(
            r#"
            SELECT {APPLICATION_COLUMNS},
                   j.title AS job_title,
                   j.company AS job_company,
                   j.description AS job_description
            FROM applications a
            JOIN jobs j ON j.id = a.job_id
            WHERE a.candidate_id = $1
            ORDER BY a.created_at DESC
            "#
        ))
        .bind(candidate_id)
        .fetch_all(&self.pool)
        .await?;

        let ids: Vec<Uuid> = rows.iter().map(|r| r.application.id).collect();
        let mut history = self.load_history(&ids).await?;

        rows.into_iter()
            .map(|row| {
                let job = JobSummary {
                    id: row.application.job_id,
                    title: row.job_title,
                    company: row.job_company,
                    description: row.job_description,
                };
                let entries = history.remove(&row.application.id).unwrap_or_default();
                Ok((row.application.into_application(entries)?, job))
            })
            .collect()
    }

    async fn insert_application(&self, application: &Application) -> Result<(), AppError> {
        let scores = application.scores;
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO applications
                (id, job_id, candidate_id, status, notes,
                 match_score, skill_score, experience_score, location_score,
                 created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(application.id)
        .bind(application.job_id)
        .bind(application.candidate_id)
        .bind(application.status.label())
        .bind(application.notes.as_deref())
        .bind(scores.map(|s| s.total_score))
        .bind(scores.map(|s| s.skill_score))
        .bind(scores.map(|s| s.experience_score))
        .bind(scores.map(|s| s.location_score))
        .bind(application.created_at)
        .bind(application.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(map_unique_violation)?;

        for entry in &application.history {
            append_history(&mut tx, application.id, entry).await?;
        }

        tx.commit().await?;

        info!(
            "Inserted application {} (job {}, candidate {})",
            application.id, application.job_id, application.candidate_id
        );
        Ok(())
    }

    async fn record_change(
        &self,
        application: &Application,
        expected: ApplicationStatus,
        entry: Option<&HistoryEntry>,
    ) -> Result<ChangeOutcome, AppError> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE applications SET status = $1, notes = $2, updated_at = $3
            WHERE id = $4 AND status = $5
            "#,
        )
        .bind(application.status.label())
        .bind(application.notes.as_deref())
        .bind(application.updated_at)
        .bind(application.id)
        .bind(expected.label())
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            let current: Option<String> =
                sqlx::query_scalar("SELECT status FROM applications WHERE id = $1")
                    .bind(application.id)
                    .fetch_optional(&mut *tx)
                    .await?;
            tx.rollback().await?;

            return match current {
                Some(raw) => Ok(ChangeOutcome::StatusChanged(parse_status(&raw)?)),
                None => Err(AppError::NotFound(format!(
                    "Application {} not found",
                    application.id
                ))),
            };
        }

        if let Some(entry) = entry {
            append_history(&mut tx, application.id, entry).await?;
        }

        tx.commit().await?;
        Ok(ChangeOutcome::Saved)
    }

    async fn dashboard_stats(&self, posted_by: Option<Uuid>) -> Result<DashboardStats, AppError> {
        let total_jobs: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM jobs WHERE ($1::uuid IS NULL OR posted_by = $1)")
                .bind(posted_by)
                .fetch_one(&self.pool)
                .await?;

        let total_applications: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM applications a
            JOIN jobs j ON j.id = a.job_id
            WHERE ($1::uuid IS NULL OR j.posted_by = $1)
            "#,
        )
        .bind(posted_by)
        .fetch_one(&self.pool)
        .await?;

        let applications_by_status = sqlx::query_as::<_, StatusCount>(
            r#"
            SELECT a.status AS status, COUNT(*) AS count
            FROM applications a
            JOIN jobs j ON j.id = a.job_id
            WHERE ($1::uuid IS NULL OR j.posted_by = $1)
            GROUP BY a.status
            ORDER BY a.status
            "#,
        )
        .bind(posted_by)
        .fetch_all(&self.pool)
        .await?;

        let applications_per_job = sqlx::query_as::<_, JobApplicationCount>(
            r#"
            SELECT j.title AS job_title, COUNT(*) AS count
            FROM applications a
            JOIN jobs j ON j.id = a.job_id
            WHERE ($1::uuid IS NULL OR j.posted_by = $1)
            GROUP BY j.id, j.title
            ORDER BY count DESC, j.title
            "#,
        )
        .bind(posted_by)
        .fetch_all(&self.pool)
        .await?;

        Ok(DashboardStats {
            total_jobs,
            total_applications,
            applications_by_status,
            applications_per_job,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(scores: [Option<i32>; 4]) -> ApplicationRow {
        ApplicationRow {
            id: Uuid::new_v4(),
            job_id: Uuid::new_v4(),
            candidate_id: Uuid::new_v4(),
            status: "HR".to_string(),
            notes: None,
            match_score: scores[0],
            skill_score: scores[1],
            experience_score: scores[2],
            location_score: scores[3],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern(" 100%_dev "), "%100\\%\\_dev%");
        assert_eq!(contains_pattern("rust"), "%rust%");
    }

    #[test]
    fn test_stored_scores_require_all_columns() {
        assert!(row([Some(50), Some(50), None, Some(100)]).stored_scores().is_none());
        let scores = row([Some(50), Some(50), Some(33), Some(100)])
            .stored_scores()
            .expect("complete scores");
        assert_eq!(scores.total_score, 50);
        assert_eq!(scores.experience_score, 33);
    }

    #[test]
    fn test_row_status_parses_labels() {
        let application = row([None; 4]).into_application(vec![]).unwrap();
        assert_eq!(application.status, ApplicationStatus::Hr);

        let mut corrupt = row([None; 4]);
        corrupt.status = "Promoted".to_string();
        assert!(matches!(
            corrupt.into_application(vec![]),
            Err(AppError::Internal(_))
        ));
    }
}
