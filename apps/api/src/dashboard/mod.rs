//! Recruiter dashboard aggregates.

use axum::{extract::State, Json};
use tracing::info;

use crate::auth::Actor;
use crate::errors::AppError;
use crate::models::application::DashboardStats;
use crate::models::user::Role;
use crate::routes::ApiResponse;
use crate::state::AppState;
use crate::store::HiringStore;

/// Stats over the actor's own jobs, or every job for an admin.
pub async fn stats_for(store: &dyn HiringStore, actor: &Actor) -> Result<DashboardStats, AppError> {
    let scope = if actor.is_admin() { None } else { Some(actor.id) };
    let stats = store.dashboard_stats(scope).await?;
    info!(
        "Dashboard stats for {}: {} jobs, {} applications",
        actor.id, stats.total_jobs, stats.total_applications
    );
    Ok(stats)
}

/// GET /api/v1/dashboard/stats
pub async fn handle_stats(
    State(state): State<AppState>,
    actor: Actor,
) -> Result<Json<ApiResponse<DashboardStats>>, AppError> {
    actor.require_role(&[Role::Recruiter, Role::Admin])?;
    let stats = stats_for(state.store.as_ref(), &actor).await?;
    Ok(ApiResponse::ok(stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::status::ApplicationStatus;
    use crate::models::application::{Application, JobApplicationCount, StatusCount};
    use crate::models::job::Job;
    use crate::store::memory::MemoryStore;
    use chrono::Utc;
    use uuid::Uuid;

    fn job(owner: Uuid, title: &str) -> Job {
        Job {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: "Build APIs".to_string(),
            company: "HireWave".to_string(),
            required_skills: vec![],
            experience_required: 0.0,
            location: "Remote".to_string(),
            posted_by: owner,
            created_at: Utc::now(),
        }
    }

    fn application(job_id: Uuid, status: ApplicationStatus) -> Application {
        let now = Utc::now();
        Application {
            id: Uuid::new_v4(),
            job_id,
            candidate_id: Uuid::new_v4(),
            status,
            notes: None,
            scores: None,
            history: vec![],
            created_at: now,
            updated_at: now,
        }
    }

    fn seeded() -> (MemoryStore, Actor) {
        let store = MemoryStore::default();
        let recruiter = Actor::new(Uuid::new_v4(), Role::Recruiter);
        let backend = job(recruiter.id, "Backend Engineer");
        let frontend = job(recruiter.id, "Frontend Developer");
        let foreign = job(Uuid::new_v4(), "Data Analyst");
        for j in [&backend, &frontend, &foreign] {
            store.add_job(j.clone());
        }
        store.put_application(application(backend.id, ApplicationStatus::Applied));
        store.put_application(application(backend.id, ApplicationStatus::Screening));
        store.put_application(application(frontend.id, ApplicationStatus::Applied));
        store.put_application(application(foreign.id, ApplicationStatus::Hired));
        (store, recruiter)
    }

    #[tokio::test]
    async fn test_recruiter_stats_are_scoped_to_own_jobs() {
        let (store, recruiter) = seeded();
        let stats = stats_for(&store, &recruiter).await.unwrap();

        assert_eq!(stats.total_jobs, 2);
        assert_eq!(stats.total_applications, 3);
        assert_eq!(
            stats.applications_by_status,
            vec![
                StatusCount {
                    status: "Applied".to_string(),
                    count: 2
                },
                StatusCount {
                    status: "Screening".to_string(),
                    count: 1
                },
            ]
        );
        assert_eq!(
            stats.applications_per_job[0],
            JobApplicationCount {
                job_title: "Backend Engineer".to_string(),
                count: 2
            }
        );
    }

    #[tokio::test]
    async fn test_admin_stats_cover_every_job() {
        let (store, _) = seeded();
        let admin = Actor::new(Uuid::new_v4(), Role::Admin);
        let stats = stats_for(&store, &admin).await.unwrap();
        assert_eq!(stats.total_jobs, 3);
        assert_eq!(stats.total_applications, 4);
        assert_eq!(stats.applications_per_job.len(), 3);
    }
}
