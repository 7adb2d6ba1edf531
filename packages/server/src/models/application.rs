use chrono::{DateTime, Utc};
use sea_orm::FromQueryResult;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::application;
use crate::models::job::PublicJobResponse;

/// Response for a successful application submission.
#[derive(Serialize, utoipa::ToSchema)]
pub struct SubmitApplicationResponse {
    #[schema(example = "Application submitted successfully")]
    pub message: String,
    /// Identifier of the created application.
    pub application_id: Uuid,
}

/// One of the student's own applications, joined with the job and its
/// company.
#[derive(Serialize, utoipa::ToSchema)]
pub struct StudentApplicationView {
    pub id: Uuid,
    #[schema(example = "pending")]
    pub status: String,
    pub created_at: DateTime<Utc>,
    /// Absent when the job has since been deleted; the application itself is
    /// kept as an audit trail.
    pub job: Option<PublicJobResponse>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct StudentApplicationListResponse {
    #[schema(example = "Applications retrieved successfully")]
    pub message: String,
    pub applications: Vec<StudentApplicationView>,
}

/// Narrowed applicant payload shown to recruiters. Password and other
/// sensitive fields are excluded by construction.
#[derive(Clone, Serialize, FromQueryResult, utoipa::ToSchema)]
pub struct ApplicantView {
    pub id: Uuid,
    #[schema(example = "Alice Wonder")]
    pub full_name: String,
    #[schema(example = "female")]
    pub gender: String,
    #[schema(example = "alice@example.com")]
    pub email: String,
    #[schema(example = "+1-555-0100")]
    pub phone_number: String,
}

/// Narrowed job payload embedded in recruiter application listings.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ApplicationJobView {
    pub id: Uuid,
    #[schema(example = "Backend Engineer")]
    pub title: String,
    #[schema(example = "Berlin")]
    pub location: String,
    #[schema(example = "full-time")]
    pub job_type: String,
    #[schema(example = "Senior Engineer")]
    pub position: String,
    #[schema(example = "3 years")]
    pub experience: String,
    #[schema(example = "Acme Corp")]
    pub company_name: Option<String>,
}

/// An application to one of the recruiter's jobs.
#[derive(Serialize, utoipa::ToSchema)]
pub struct RecruiterApplicationView {
    pub id: Uuid,
    #[schema(example = "pending")]
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub job: Option<ApplicationJobView>,
    pub applicant: Option<ApplicantView>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct RecruiterApplicationListResponse {
    #[schema(example = "Applications retrieved successfully")]
    pub message: String,
    #[schema(example = 5)]
    pub total: u64,
    pub applications: Vec<RecruiterApplicationView>,
}

/// One applicant row for a single job's applicant listing.
#[derive(Serialize, utoipa::ToSchema)]
pub struct JobApplicantView {
    /// Application ID.
    pub id: Uuid,
    #[schema(example = "pending")]
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub applicant: Option<ApplicantView>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct JobApplicantListResponse {
    #[schema(example = "Applicants retrieved successfully")]
    pub message: String,
    #[schema(example = 2)]
    pub total: u64,
    pub applicants: Vec<JobApplicantView>,
}

/// PATCH body for changing an application's status.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct UpdateStatusRequest {
    /// One of: pending, accepted, rejected, closed.
    #[schema(example = "accepted")]
    pub status: String,
}

/// Bare application payload.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ApplicationResponse {
    pub id: Uuid,
    pub job_id: Uuid,
    pub applicant_id: Uuid,
    #[schema(example = "accepted")]
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<application::Model> for ApplicationResponse {
    fn from(application: application::Model) -> Self {
        Self {
            id: application.id,
            job_id: application.job_id,
            applicant_id: application.applicant_id,
            status: application.status,
            created_at: application.created_at,
            updated_at: application.updated_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct UpdateStatusResponse {
    #[schema(example = "Application status updated successfully")]
    pub message: String,
    pub application: ApplicationResponse,
}
