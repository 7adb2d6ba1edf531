use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::job;
use crate::error::AppError;

/// Request body for posting a job. All fields are required.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateJobRequest {
    #[schema(example = "Backend Engineer")]
    pub title: String,
    #[schema(example = "Build and operate the hiring platform APIs.")]
    pub description: String,
    #[schema(example = json!(["3+ years Rust", "SQL"]))]
    pub requirements: Vec<String>,
    #[schema(example = 90000)]
    pub salary: i64,
    #[schema(example = "Berlin")]
    pub location: String,
    /// One of: full-time, part-time, internship.
    #[schema(example = "full-time")]
    pub job_type: String,
    #[schema(example = "Senior Engineer")]
    pub position: String,
    #[schema(example = "3 years")]
    pub experience: String,
    /// Company the posting belongs to; must be owned by the caller.
    pub company_id: String,
}

pub fn validate_create_job(payload: &CreateJobRequest) -> Result<(), AppError> {
    if payload.title.trim().is_empty()
        || payload.description.trim().is_empty()
        || payload.location.trim().is_empty()
        || payload.position.trim().is_empty()
        || payload.experience.trim().is_empty()
        || payload.company_id.trim().is_empty()
    {
        return Err(AppError::Validation("All fields are required".into()));
    }
    if payload.description.chars().count() > 1000 {
        return Err(AppError::Validation(
            "Description must be at most 1000 characters".into(),
        ));
    }
    if payload.salary <= 0 {
        return Err(AppError::Validation(
            "Salary must be a positive number".into(),
        ));
    }
    if !job::JOB_TYPES.contains(&payload.job_type.as_str()) {
        return Err(AppError::Validation("Invalid job type".into()));
    }
    Ok(())
}

/// PATCH body for updating a job; only provided fields are modified.
#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateJobRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub requirements: Option<Vec<String>>,
    pub salary: Option<i64>,
    pub location: Option<String>,
    pub job_type: Option<String>,
    pub position: Option<String>,
    pub experience: Option<String>,
    /// "open" or "closed"; closing a job stops new applications.
    pub status: Option<String>,
}

pub fn validate_update_job(payload: &UpdateJobRequest) -> Result<(), AppError> {
    if let Some(ref title) = payload.title
        && title.trim().is_empty()
    {
        return Err(AppError::Validation("Title must not be empty".into()));
    }
    if let Some(ref description) = payload.description {
        if description.trim().is_empty() {
            return Err(AppError::Validation("Description must not be empty".into()));
        }
        if description.chars().count() > 1000 {
            return Err(AppError::Validation(
                "Description must be at most 1000 characters".into(),
            ));
        }
    }
    if let Some(salary) = payload.salary
        && salary <= 0
    {
        return Err(AppError::Validation(
            "Salary must be a positive number".into(),
        ));
    }
    if let Some(ref job_type) = payload.job_type
        && !job::JOB_TYPES.contains(&job_type.as_str())
    {
        return Err(AppError::Validation("Invalid job type".into()));
    }
    if let Some(ref status) = payload.status
        && status != job::STATUS_OPEN
        && status != job::STATUS_CLOSED
    {
        return Err(AppError::Validation(
            "Status must be one of: open, closed".into(),
        ));
    }
    Ok(())
}

/// Company fields embedded in public job payloads.
#[derive(Clone, Serialize, utoipa::ToSchema)]
pub struct JobCompanyView {
    #[schema(example = "Acme Corp")]
    pub name: String,
    pub description: Option<String>,
}

/// Job payload for the public endpoints. The posting recruiter is omitted.
#[derive(Serialize, utoipa::ToSchema)]
pub struct PublicJobResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub requirements: Vec<String>,
    pub salary: i64,
    pub location: String,
    pub job_type: String,
    pub position: String,
    pub experience: String,
    pub status: String,
    pub company: Option<JobCompanyView>,
    pub created_at: DateTime<Utc>,
}

impl PublicJobResponse {
    pub fn from_model(job: job::Model, company: Option<JobCompanyView>) -> Self {
        Self {
            id: job.id,
            title: job.title,
            description: job.description,
            requirements: serde_json::from_value(job.requirements).unwrap_or_default(),
            salary: job.salary,
            location: job.location,
            job_type: job.job_type,
            position: job.position,
            experience: job.experience,
            status: job.status,
            company,
            created_at: job.created_at,
        }
    }
}

/// Full job payload for the owning recruiter.
#[derive(Serialize, utoipa::ToSchema)]
pub struct JobResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub requirements: Vec<String>,
    pub salary: i64,
    pub location: String,
    pub job_type: String,
    pub position: String,
    pub experience: String,
    pub status: String,
    pub company_id: Uuid,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<job::Model> for JobResponse {
    fn from(job: job::Model) -> Self {
        Self {
            id: job.id,
            title: job.title,
            description: job.description,
            requirements: serde_json::from_value(job.requirements).unwrap_or_default(),
            salary: job.salary,
            location: job.location,
            job_type: job.job_type,
            position: job.position,
            experience: job.experience,
            status: job.status,
            company_id: job.company_id,
            created_by: job.created_by,
            created_at: job.created_at,
            updated_at: job.updated_at,
        }
    }
}

/// Query parameters for job listings.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct JobListQuery {
    /// Case-insensitive keyword over title, description, job type, location.
    pub keyword: Option<String>,
    /// Page number (1-based). Defaults to 1.
    pub page: Option<u64>,
    /// Items per page. Defaults to 10, capped at 100.
    pub limit: Option<u64>,
    pub min_salary: Option<i64>,
    pub max_salary: Option<i64>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct JobListResponse {
    #[schema(example = "Jobs fetched successfully")]
    pub message: String,
    #[schema(example = 12)]
    pub total: u64,
    pub jobs: Vec<PublicJobResponse>,
    #[schema(example = 2)]
    pub total_pages: u64,
    #[schema(example = 1)]
    pub current_page: u64,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct MyJobListResponse {
    #[schema(example = "Jobs retrieved successfully")]
    pub message: String,
    #[schema(example = 4)]
    pub total: u64,
    pub jobs: Vec<JobResponse>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct SingleJobResponse {
    #[schema(example = "Job retrieved successfully")]
    pub message: String,
    pub job: PublicJobResponse,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct SingleMyJobResponse {
    #[schema(example = "Job retrieved successfully")]
    pub message: String,
    pub job: JobResponse,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_create() -> CreateJobRequest {
        CreateJobRequest {
            title: "Backend Engineer".into(),
            description: "Build APIs".into(),
            requirements: vec!["Rust".into()],
            salary: 90000,
            location: "Berlin".into(),
            job_type: "full-time".into(),
            position: "Senior".into(),
            experience: "3 years".into(),
            company_id: "0193e09e-7d10-7b5e-a6a0-000000000000".into(),
        }
    }

    #[test]
    fn create_accepts_valid_payload() {
        assert!(validate_create_job(&valid_create()).is_ok());
    }

    #[test]
    fn create_rejects_non_positive_salary() {
        let mut payload = valid_create();
        payload.salary = 0;
        assert!(validate_create_job(&payload).is_err());
        payload.salary = -5;
        assert!(validate_create_job(&payload).is_err());
    }

    #[test]
    fn create_rejects_unknown_job_type() {
        let mut payload = valid_create();
        payload.job_type = "gig".into();
        assert!(validate_create_job(&payload).is_err());
    }

    #[test]
    fn create_rejects_overlong_description() {
        let mut payload = valid_create();
        payload.description = "x".repeat(1001);
        assert!(validate_create_job(&payload).is_err());
    }

    #[test]
    fn update_rejects_bad_status() {
        let payload = UpdateJobRequest {
            status: Some("paused".into()),
            ..Default::default()
        };
        assert!(validate_update_job(&payload).is_err());
    }

    #[test]
    fn update_accepts_partial_payload() {
        let payload = UpdateJobRequest {
            status: Some("closed".into()),
            ..Default::default()
        };
        assert!(validate_update_job(&payload).is_ok());
        assert!(validate_update_job(&UpdateJobRequest::default()).is_ok());
    }
}
