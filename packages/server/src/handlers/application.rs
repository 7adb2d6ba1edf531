use std::collections::BTreeMap;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use sea_orm::*;
use tracing::instrument;
use uuid::Uuid;

use crate::entity::application::ApplicationStatus;
use crate::entity::{application, company, job, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::{AuthUser, Role};
use crate::extractors::json::AppJson;
use crate::models::application::*;
use crate::models::job::{JobCompanyView, PublicJobResponse};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/apply/{job_id}",
    tag = "Applications",
    operation_id = "applyForJob",
    summary = "Submit an application to a job",
    description = "Creates a pending application for the authenticated student. A student can \
        apply to a given job at most once, and only while the job is open.",
    params(("job_id" = String, Path, description = "Job ID")),
    responses(
        (status = 201, description = "Application created", body = SubmitApplicationResponse),
        (status = 400, description = "Invalid job ID (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID, TOKEN_EXPIRED)", body = ErrorBody),
        (status = 403, description = "Caller is not a student (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Job not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Already applied, or job closed (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id, job_id))]
pub async fn apply_for_job(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_role(Role::Student)?;

    let job_id = parse_id(&job_id, "Invalid job ID")?;
    let created = submit_application(&state.db, auth_user.user_id, job_id).await?;

    Ok((
        StatusCode::CREATED,
        Json(SubmitApplicationResponse {
            message: "Application submitted successfully".into(),
            application_id: created.id,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/my-applications",
    tag = "Applications",
    operation_id = "listMyApplications",
    summary = "List the authenticated student's applications",
    description = "Returns the student's applications, newest first, each joined with its job \
        and the job's company. An empty result is reported as 404, distinct from a query error.",
    responses(
        (status = 200, description = "Applications", body = StudentApplicationListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID, TOKEN_EXPIRED)", body = ErrorBody),
        (status = 403, description = "Caller is not a student (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "No applications found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn list_my_applications(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<StudentApplicationListResponse>, AppError> {
    auth_user.require_role(Role::Student)?;

    let applications = application::Entity::find()
        .filter(application::Column::ApplicantId.eq(auth_user.user_id))
        .order_by_desc(application::Column::CreatedAt)
        .all(&state.db)
        .await?;

    if applications.is_empty() {
        return Err(AppError::NotFound("No applications found".into()));
    }

    let job_ids: Vec<Uuid> = applications.iter().map(|a| a.job_id).collect();
    let jobs: BTreeMap<Uuid, job::Model> = job::Entity::find()
        .filter(job::Column::Id.is_in(job_ids))
        .all(&state.db)
        .await?
        .into_iter()
        .map(|j| (j.id, j))
        .collect();

    let company_ids: Vec<Uuid> = jobs.values().map(|j| j.company_id).collect();
    let companies: BTreeMap<Uuid, company::Model> = company::Entity::find()
        .filter(company::Column::Id.is_in(company_ids))
        .all(&state.db)
        .await?
        .into_iter()
        .map(|c| (c.id, c))
        .collect();

    let views = applications
        .into_iter()
        .map(|app| {
            let job = jobs.get(&app.job_id).cloned().map(|j| {
                let company = companies.get(&j.company_id).map(|c| JobCompanyView {
                    name: c.name.clone(),
                    description: c.description.clone(),
                });
                PublicJobResponse::from_model(j, company)
            });
            StudentApplicationView {
                id: app.id,
                status: app.status,
                created_at: app.created_at,
                job,
            }
        })
        .collect();

    Ok(Json(StudentApplicationListResponse {
        message: "Applications retrieved successfully".into(),
        applications: views,
    }))
}

#[utoipa::path(
    get,
    path = "/my/applications",
    tag = "Applications",
    operation_id = "listApplicationsForMyJobs",
    summary = "List applications to the recruiter's jobs",
    description = "Returns every application to a job owned by the authenticated recruiter, \
        joined with a narrowed job view and a narrowed applicant view. Sensitive applicant \
        fields are never included.",
    responses(
        (status = 200, description = "Applications", body = RecruiterApplicationListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID, TOKEN_EXPIRED)", body = ErrorBody),
        (status = 403, description = "Caller is not a recruiter (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "No jobs, or no applications (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn list_applications_for_my_jobs(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<RecruiterApplicationListResponse>, AppError> {
    auth_user.require_role(Role::Recruiter)?;

    let jobs = job::Entity::find()
        .filter(job::Column::CreatedBy.eq(auth_user.user_id))
        .all(&state.db)
        .await?;

    if jobs.is_empty() {
        return Err(AppError::NotFound("No jobs found for this recruiter".into()));
    }

    let job_ids: Vec<Uuid> = jobs.iter().map(|j| j.id).collect();
    let jobs: BTreeMap<Uuid, job::Model> = jobs.into_iter().map(|j| (j.id, j)).collect();

    let applications = application::Entity::find()
        .filter(application::Column::JobId.is_in(job_ids))
        .order_by_desc(application::Column::CreatedAt)
        .all(&state.db)
        .await?;

    if applications.is_empty() {
        return Err(AppError::NotFound(
            "No applications found for your jobs".into(),
        ));
    }

    let company_ids: Vec<Uuid> = jobs.values().map(|j| j.company_id).collect();
    let company_names: BTreeMap<Uuid, String> = company::Entity::find()
        .filter(company::Column::Id.is_in(company_ids))
        .all(&state.db)
        .await?
        .into_iter()
        .map(|c| (c.id, c.name))
        .collect();

    let applicant_ids: Vec<Uuid> = applications.iter().map(|a| a.applicant_id).collect();
    let applicants = load_applicants(&state.db, applicant_ids).await?;

    let total = applications.len() as u64;
    let views = applications
        .into_iter()
        .map(|app| {
            let job = jobs.get(&app.job_id).map(|j| ApplicationJobView {
                id: j.id,
                title: j.title.clone(),
                location: j.location.clone(),
                job_type: j.job_type.clone(),
                position: j.position.clone(),
                experience: j.experience.clone(),
                company_name: company_names.get(&j.company_id).cloned(),
            });
            RecruiterApplicationView {
                id: app.id,
                status: app.status,
                created_at: app.created_at,
                job,
                applicant: applicants.get(&app.applicant_id).cloned(),
            }
        })
        .collect();

    Ok(Json(RecruiterApplicationListResponse {
        message: "Applications retrieved successfully".into(),
        total,
        applications: views,
    }))
}

#[utoipa::path(
    get,
    path = "/my/applications/{job_id}",
    tag = "Applications",
    operation_id = "listApplicantsForJob",
    summary = "List applicants for one of the recruiter's jobs",
    description = "Returns the applicants for a single job. A job that exists but is owned by \
        another recruiter is reported as 404, deliberately indistinguishable from a missing job.",
    params(("job_id" = String, Path, description = "Job ID")),
    responses(
        (status = 200, description = "Applicants", body = JobApplicantListResponse),
        (status = 400, description = "Invalid job ID (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID, TOKEN_EXPIRED)", body = ErrorBody),
        (status = 403, description = "Caller is not a recruiter (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Job not found or not owned; no applicants (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id, job_id))]
pub async fn list_applicants_for_job(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Json<JobApplicantListResponse>, AppError> {
    auth_user.require_role(Role::Recruiter)?;

    let job_id = parse_id(&job_id, "Invalid job ID")?;
    find_owned_job(&state.db, job_id, auth_user.user_id).await?;

    let applications = application::Entity::find()
        .filter(application::Column::JobId.eq(job_id))
        .order_by_desc(application::Column::CreatedAt)
        .all(&state.db)
        .await?;

    if applications.is_empty() {
        return Err(AppError::NotFound(
            "No applicants found for this job".into(),
        ));
    }

    let applicant_ids: Vec<Uuid> = applications.iter().map(|a| a.applicant_id).collect();
    let applicants = load_applicants(&state.db, applicant_ids).await?;

    let total = applications.len() as u64;
    let views = applications
        .into_iter()
        .map(|app| JobApplicantView {
            id: app.id,
            status: app.status,
            created_at: app.created_at,
            applicant: applicants.get(&app.applicant_id).cloned(),
        })
        .collect();

    Ok(Json(JobApplicantListResponse {
        message: "Applicants retrieved successfully".into(),
        total,
        applicants: views,
    }))
}

#[utoipa::path(
    patch,
    path = "/update-status/{application_id}",
    tag = "Applications",
    operation_id = "updateApplicationStatus",
    summary = "Change an application's status",
    description = "Sets the status of an application. Only the recruiter owning the referenced \
        job may change it. Any status may follow any other; there is no transition graph.",
    params(("application_id" = String, Path, description = "Application ID")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = UpdateStatusResponse),
        (status = 400, description = "Invalid ID or status value (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID, TOKEN_EXPIRED)", body = ErrorBody),
        (status = 403, description = "Not a recruiter, or not the job owner (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Application not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = %auth_user.user_id, application_id))]
pub async fn update_application_status(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(application_id): Path<String>,
    AppJson(payload): AppJson<UpdateStatusRequest>,
) -> Result<Json<UpdateStatusResponse>, AppError> {
    auth_user.require_role(Role::Recruiter)?;

    let status = ApplicationStatus::parse(&payload.status)
        .ok_or_else(|| AppError::Validation("Invalid status value".into()))?;
    let application_id = parse_id(&application_id, "Invalid application ID")?;

    let updated =
        set_application_status(&state.db, auth_user.user_id, application_id, status).await?;

    Ok(Json(UpdateStatusResponse {
        message: "Application status updated successfully".into(),
        application: updated.into(),
    }))
}

fn parse_id(raw: &str, message: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::Validation(message.into()))
}

/// Narrowed applicant lookup; selects only the exposable columns.
async fn load_applicants<C: ConnectionTrait>(
    db: &C,
    applicant_ids: Vec<Uuid>,
) -> Result<BTreeMap<Uuid, ApplicantView>, AppError> {
    let rows = user::Entity::find()
        .filter(user::Column::Id.is_in(applicant_ids))
        .select_only()
        .column(user::Column::Id)
        .column(user::Column::FullName)
        .column(user::Column::Gender)
        .column(user::Column::Email)
        .column(user::Column::PhoneNumber)
        .into_model::<ApplicantView>()
        .all(db)
        .await?;

    Ok(rows.into_iter().map(|a| (a.id, a)).collect())
}

/// Create a pending application for `(applicant, job)`.
///
/// Fails with `NotFound` when the job is missing, `Conflict` on a duplicate
/// application or a closed job. The job's application list is the foreign
/// reference itself, so the creation is a single insert.
pub(crate) async fn submit_application<C: ConnectionTrait>(
    db: &C,
    applicant_id: Uuid,
    job_id: Uuid,
) -> Result<application::Model, AppError> {
    let job = job::Entity::find_by_id(job_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Job not found".into()))?;

    let existing = application::Entity::find()
        .filter(application::Column::ApplicantId.eq(applicant_id))
        .filter(application::Column::JobId.eq(job_id))
        .one(db)
        .await?;
    if existing.is_some() {
        return Err(AppError::Conflict(
            "You have already applied to this job".into(),
        ));
    }

    if job.status == job::STATUS_CLOSED {
        return Err(AppError::Conflict(
            "This job is no longer accepting applications".into(),
        ));
    }

    let now = chrono::Utc::now();
    let new_application = application::ActiveModel {
        id: Set(Uuid::now_v7()),
        job_id: Set(job_id),
        applicant_id: Set(applicant_id),
        status: Set(ApplicationStatus::Pending.as_str().to_string()),
        created_at: Set(now),
        updated_at: Set(now),
    };

    Ok(new_application.insert(db).await?)
}

/// Look up a job scoped to its owner. Ownership failure is reported as
/// `NotFound` so non-owners cannot probe for job existence.
pub(crate) async fn find_owned_job<C: ConnectionTrait>(
    db: &C,
    job_id: Uuid,
    owner_id: Uuid,
) -> Result<job::Model, AppError> {
    job::Entity::find_by_id(job_id)
        .filter(job::Column::CreatedBy.eq(owner_id))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Job not found or unauthorized".into()))
}

/// Set an application's status on behalf of `recruiter_id`.
///
/// The recruiter must own the job the application references; unlike job
/// lookups, a foreign owner here is an explicit `PermissionDenied` since the
/// caller already holds a valid application ID.
pub(crate) async fn set_application_status<C: ConnectionTrait>(
    db: &C,
    recruiter_id: Uuid,
    application_id: Uuid,
    status: ApplicationStatus,
) -> Result<application::Model, AppError> {
    let application = application::Entity::find_by_id(application_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Application not found".into()))?;

    let job = job::Entity::find_by_id(application.job_id)
        .one(db)
        .await?
        .ok_or_else(|| {
            AppError::Internal(format!(
                "application {} references missing job {}",
                application.id, application.job_id
            ))
        })?;

    if job.created_by != recruiter_id {
        return Err(AppError::PermissionDenied);
    }

    let mut active: application::ActiveModel = application.into();
    active.status = Set(status.as_str().to_string());
    active.updated_at = Set(chrono::Utc::now());

    Ok(active.update(db).await?)
}

#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, MockDatabase};

    use super::*;

    fn job_model(id: Uuid, owner: Uuid, status: &str) -> job::Model {
        let now = chrono::Utc::now();
        job::Model {
            id,
            title: "Backend Engineer".into(),
            description: "Build APIs".into(),
            requirements: serde_json::json!(["Rust"]),
            salary: 90000,
            location: "Berlin".into(),
            job_type: "full-time".into(),
            position: "Senior".into(),
            experience: "3 years".into(),
            status: status.into(),
            company_id: Uuid::now_v7(),
            created_by: owner,
            created_at: now,
            updated_at: now,
        }
    }

    fn application_model(job_id: Uuid, applicant_id: Uuid, status: &str) -> application::Model {
        let now = chrono::Utc::now();
        application::Model {
            id: Uuid::now_v7(),
            job_id,
            applicant_id,
            status: status.into(),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn submit_creates_pending_application() {
        let job_id = Uuid::now_v7();
        let student = Uuid::now_v7();
        let job = job_model(job_id, Uuid::now_v7(), job::STATUS_OPEN);
        let inserted = application_model(job_id, student, "pending");

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![job]])
            .append_query_results([Vec::<application::Model>::new()])
            .append_query_results([vec![inserted.clone()]])
            .into_connection();

        let created = submit_application(&db, student, job_id).await.unwrap();
        assert_eq!(created.status, "pending");
        assert_eq!(created.job_id, job_id);
    }

    #[tokio::test]
    async fn submit_missing_job_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<job::Model>::new()])
            .into_connection();

        let result = submit_application(&db, Uuid::now_v7(), Uuid::now_v7()).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn second_submission_for_same_pair_conflicts() {
        let job_id = Uuid::now_v7();
        let student = Uuid::now_v7();
        let job = job_model(job_id, Uuid::now_v7(), job::STATUS_OPEN);
        let existing = application_model(job_id, student, "pending");

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![job]])
            .append_query_results([vec![existing]])
            .into_connection();

        let result = submit_application(&db, student, job_id).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn closed_job_conflicts_regardless_of_history() {
        let job_id = Uuid::now_v7();
        let job = job_model(job_id, Uuid::now_v7(), job::STATUS_CLOSED);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![job]])
            .append_query_results([Vec::<application::Model>::new()])
            .into_connection();

        let result = submit_application(&db, Uuid::now_v7(), job_id).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn owner_can_change_status() {
        let recruiter = Uuid::now_v7();
        let job_id = Uuid::now_v7();
        let job = job_model(job_id, recruiter, job::STATUS_OPEN);
        let app = application_model(job_id, Uuid::now_v7(), "pending");
        let mut updated = app.clone();
        updated.status = "accepted".into();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![app.clone()]])
            .append_query_results([vec![job]])
            .append_query_results([vec![updated]])
            .into_connection();

        let result =
            set_application_status(&db, recruiter, app.id, ApplicationStatus::Accepted)
                .await
                .unwrap();
        assert_eq!(result.status, "accepted");
    }

    #[tokio::test]
    async fn non_owner_cannot_change_status() {
        let job_id = Uuid::now_v7();
        let job = job_model(job_id, Uuid::now_v7(), job::STATUS_OPEN);
        let app = application_model(job_id, Uuid::now_v7(), "pending");

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![app.clone()]])
            .append_query_results([vec![job]])
            .into_connection();

        let intruder = Uuid::now_v7();
        let result =
            set_application_status(&db, intruder, app.id, ApplicationStatus::Accepted).await;
        assert!(matches!(result, Err(AppError::PermissionDenied)));
    }

    #[tokio::test]
    async fn missing_application_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<application::Model>::new()])
            .into_connection();

        let result = set_application_status(
            &db,
            Uuid::now_v7(),
            Uuid::now_v7(),
            ApplicationStatus::Rejected,
        )
        .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn foreign_job_lookup_is_masked_as_not_found() {
        // The job exists but is owned by someone else; the owner-scoped query
        // returns nothing.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<job::Model>::new()])
            .into_connection();

        let result = find_owned_job(&db, Uuid::now_v7(), Uuid::now_v7()).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn owned_job_lookup_succeeds() {
        let recruiter = Uuid::now_v7();
        let job_id = Uuid::now_v7();
        let job = job_model(job_id, recruiter, job::STATUS_OPEN);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![job]])
            .into_connection();

        let found = find_owned_job(&db, job_id, recruiter).await.unwrap();
        assert_eq!(found.id, job_id);
        assert_eq!(found.created_by, recruiter);
    }
}
