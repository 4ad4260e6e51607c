use chrono::Utc;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::auth::Actor;
use crate::errors::AppError;
use crate::jobs::skills::extract_skills;
use crate::matching::scorer::normalize_skills;
use crate::models::job::{Job, JobPage, JobQuery, REMOTE_LOCATION};
use crate::store::HiringStore;

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Skills may arrive as a JSON list or a single comma-separated string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SkillsInput {
    List(Vec<String>),
    Delimited(String),
}

impl SkillsInput {
    fn normalize(&self) -> Vec<String> {
        match self {
            SkillsInput::List(skills) => normalize_skills(skills),
            SkillsInput::Delimited(raw) => normalize_skills(&[raw]),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateJobRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub required_skills: Option<SkillsInput>,
    #[serde(default)]
    pub experience_required: Option<f64>,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct JobListParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
    pub company: Option<String>,
    pub posted_by: Option<Uuid>,
}

fn dedup(skills: Vec<String>) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(skills.len());
    for skill in skills {
        if !unique.contains(&skill) {
            unique.push(skill);
        }
    }
    unique
}

fn filter_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Validates and stores a new job owned by `actor`.
pub async fn create_job(
    store: &dyn HiringStore,
    actor: &Actor,
    request: CreateJobRequest,
) -> Result<Job, AppError> {
    let title = request.title.trim();
    let description = request.description.trim();
    let company = request.company.trim();
    if title.is_empty() || description.is_empty() || company.is_empty() {
        return Err(AppError::Validation(
            "Please add title, description and company".to_string(),
        ));
    }

    let experience_required = request.experience_required.unwrap_or(0.0);
    if !experience_required.is_finite() || experience_required < 0.0 {
        return Err(AppError::Validation(
            "experience_required must be a non-negative number".to_string(),
        ));
    }

    // Fall back to keyword extraction when no usable skills were listed.
    let listed = request
        .required_skills
        .as_ref()
        .map(SkillsInput::normalize)
        .unwrap_or_default();
    let required_skills = if listed.is_empty() {
        extract_skills(description)
    } else {
        dedup(listed)
    };

    let location = filter_text(request.location).unwrap_or_else(|| REMOTE_LOCATION.to_string());

    let job = Job {
        id: Uuid::new_v4(),
        title: title.to_string(),
        description: description.to_string(),
        company: company.to_string(),
        required_skills,
        experience_required,
        location,
        posted_by: actor.id,
        created_at: Utc::now(),
    };
    store.insert_job(&job).await?;

    info!(
        "Job {} '{}' posted by {} with skills {:?}",
        job.id, job.title, actor.id, job.required_skills
    );
    Ok(job)
}

/// Newest-first page of jobs matching the filters.
pub async fn list_jobs(store: &dyn HiringStore, params: JobListParams) -> Result<JobPage, AppError> {
    let page = params.page.filter(|p| *p >= 1).unwrap_or(1);
    let limit = params
        .limit
        .filter(|l| *l >= 1)
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .min(MAX_PAGE_SIZE);

    let query = JobQuery {
        search: filter_text(params.search),
        company: filter_text(params.company),
        posted_by: params.posted_by,
        offset: (page - 1).saturating_mul(limit),
        limit,
    };
    let (total, jobs) = store.list_jobs(&query).await?;
    let pages = ((total + limit - 1) / limit).max(1);

    Ok(JobPage {
        total,
        page,
        pages,
        jobs,
    })
}

pub async fn get_job(store: &dyn HiringStore, id: Uuid) -> Result<Job, AppError> {
    store
        .find_job(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {id} not found")))
}
