//! Application Lifecycle Manager.
//!
//! Every state change goes through here: the transition table is checked,
//! one history entry is appended, and status + history are persisted together.
//! History entries are only ever appended, never edited or removed.

use chrono::Utc;
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::Actor;
use crate::errors::AppError;
use crate::lifecycle::status::ApplicationStatus;
use crate::matching::scorer::{score, score_or_recompute};
use crate::models::application::{
    Application, CandidateApplicationView, HistoryEntry, JobApplicationView,
};
use crate::models::job::Job;
use crate::store::{ChangeOutcome, HiringStore, DUPLICATE_APPLICATION};

#[derive(Debug, Deserialize)]
pub struct ApplyRequest {
    pub job_id: Uuid,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Recruiter update: a status move, a notes edit, or both.
#[derive(Debug, Default, Deserialize)]
pub struct StatusChangeRequest {
    #[serde(default)]
    pub status: Option<String>,
    /// Recorded on the history entry for this move.
    #[serde(default)]
    pub note: Option<String>,
    /// Replaces the application's free-text notes.
    #[serde(default)]
    pub notes: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

async fn load_application(store: &dyn HiringStore, id: Uuid) -> Result<Application, AppError> {
    store
        .find_application(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Application {id} not found")))
}

async fn load_job(store: &dyn HiringStore, id: Uuid) -> Result<Job, AppError> {
    store
        .find_job(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {id} not found")))
}

fn ensure_can_manage(actor: &Actor, job: &Job) -> Result<(), AppError> {
    if actor.can_manage(job) {
        Ok(())
    } else {
        warn!("Actor {} does not own job {}", actor.id, job.id);
        Err(AppError::Forbidden(format!(
            "Not authorized to manage applications for job {}",
            job.id
        )))
    }
}

/// Creates an application in `Applied` with its initial scores and history entry.
pub async fn apply_to_job(
    store: &dyn HiringStore,
    actor: &Actor,
    request: ApplyRequest,
) -> Result<Application, AppError> {
    let job = load_job(store, request.job_id).await?;

    if store
        .find_application_for(job.id, actor.id)
        .await?
        .is_some()
    {
        warn!("Duplicate application by {} for job {}", actor.id, job.id);
        return Err(AppError::Conflict(DUPLICATE_APPLICATION.to_string()));
    }

    let candidate = store
        .find_candidate(actor.id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Candidate {} not found", actor.id)))?;

    let scores = score(&job, &candidate);
    let now = Utc::now();
    let application = Application {
        id: Uuid::new_v4(),
        job_id: job.id,
        candidate_id: candidate.id,
        status: ApplicationStatus::Applied,
        notes: non_blank(request.notes),
        scores: Some(scores),
        history: vec![HistoryEntry {
            status: ApplicationStatus::Applied,
            changed_by: actor.id,
            changed_by_name: None,
            changed_at: now,
            note: None,
        }],
        created_at: now,
        updated_at: now,
    };

    // The unique (job, candidate) constraint rejects a racing duplicate here.
    store.insert_application(&application).await?;

    info!(
        "Application {} created for job {} (match score {})",
        application.id, job.id, scores.total_score
    );
    Ok(application)
}

/// Moves an application along the transition table and/or edits its notes.
pub async fn change_status(
    store: &dyn HiringStore,
    actor: &Actor,
    application_id: Uuid,
    request: StatusChangeRequest,
) -> Result<Application, AppError> {
    let mut application = load_application(store, application_id).await?;
    let job = load_job(store, application.job_id).await?;
    ensure_can_manage(actor, &job)?;

    let requested = non_blank(request.status);
    let notes = non_blank(request.notes);
    if requested.is_none() && notes.is_none() {
        return Err(AppError::Validation(
            "Provide a status or notes to update".to_string(),
        ));
    }

    let now = Utc::now();
    let from = application.status;
    let mut entry = None;

    if let Some(requested) = requested {
        let next = requested
            .parse::<ApplicationStatus>()
            .ok()
            .filter(|next| from.can_transition_to(*next))
            .ok_or_else(|| {
                warn!("Rejected transition {from} -> {requested} on application {application_id}");
                AppError::InvalidTransition {
                    from,
                    to: requested.clone(),
                }
            })?;

        let appended = HistoryEntry {
            status: next,
            changed_by: actor.id,
            changed_by_name: None,
            changed_at: now,
            note: non_blank(request.note),
        };
        application.status = next;
        application.history.push(appended.clone());
        entry = Some(appended);
    }

    if notes.is_some() {
        application.notes = notes;
    }
    application.updated_at = now;

    let outcome = store.record_change(&application, from, entry.as_ref()).await?;
    match outcome {
        ChangeOutcome::Saved => {
            if entry.is_some() {
                info!(
                    "Application {application_id} moved {from} -> {} by {}",
                    application.status, actor.id
                );
            }
            Ok(application)
        }
        ChangeOutcome::StatusChanged(current) => {
            warn!("Application {application_id} moved to {current} by a concurrent request");
            Err(AppError::InvalidTransition {
                from: current,
                to: application.status.label().to_string(),
            })
        }
    }
}

/// Candidate override: forces `Withdrawn` from any non-terminal state,
/// bypassing the transition table.
pub async fn withdraw(
    store: &dyn HiringStore,
    actor: &Actor,
    application_id: Uuid,
) -> Result<Application, AppError> {
    let mut application = load_application(store, application_id).await?;

    if application.candidate_id != actor.id {
        warn!(
            "Actor {} tried to withdraw application {application_id} they do not own",
            actor.id
        );
        return Err(AppError::Forbidden(
            "Not authorized to withdraw this application".to_string(),
        ));
    }

    if application.status.is_terminal() {
        return Err(AppError::InvalidState(application.status));
    }

    let now = Utc::now();
    let entry = HistoryEntry {
        status: ApplicationStatus::Withdrawn,
        changed_by: actor.id,
        changed_by_name: None,
        changed_at: now,
        note: None,
    };
    let from = application.status;
    application.status = ApplicationStatus::Withdrawn;
    application.history.push(entry.clone());
    application.updated_at = now;

    let outcome = store.record_change(&application, from, Some(&entry)).await?;
    match outcome {
        ChangeOutcome::Saved => {
            info!("Application {application_id} withdrawn from {from}");
            Ok(application)
        }
        ChangeOutcome::StatusChanged(current) => {
            warn!("Application {application_id} moved to {current} before withdrawal");
            if current.is_terminal() {
                Err(AppError::InvalidState(current))
            } else {
                Err(AppError::Conflict(format!(
                    "Application {application_id} was updated concurrently, please retry"
                )))
            }
        }
    }
}

/// All applications for a job, with scores healed for legacy records.
pub async fn list_for_job(
    store: &dyn HiringStore,
    actor: &Actor,
    job_id: Uuid,
) -> Result<Vec<JobApplicationView>, AppError> {
    let job = load_job(store, job_id).await?;
    ensure_can_manage(actor, &job)?;

    let applications = store.applications_for_job(job_id).await?;
    Ok(applications
        .into_iter()
        .map(|(application, candidate)| {
            let scores = score_or_recompute(application.scores, &job, &candidate);
            JobApplicationView {
                id: application.id,
                job_id: application.job_id,
                status: application.status,
                notes: application.notes,
                candidate,
                scores,
                history: application.history,
                created_at: application.created_at,
                updated_at: application.updated_at,
            }
        })
        .collect())
}

/// The acting candidate's applications, newest first.
pub async fn list_for_candidate(
    store: &dyn HiringStore,
    actor: &Actor,
) -> Result<Vec<CandidateApplicationView>, AppError> {
    let applications = store.applications_for_candidate(actor.id).await?;
    Ok(applications
        .into_iter()
        .map(|(application, job)| CandidateApplicationView {
            id: application.id,
            status: application.status,
            notes: application.notes,
            job,
            scores: application.scores,
            history: application.history,
            created_at: application.created_at,
            updated_at: application.updated_at,
        })
        .collect())
}
