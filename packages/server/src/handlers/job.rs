use std::collections::BTreeMap;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{Func, LikeExpr};
use sea_orm::*;
use tracing::instrument;
use uuid::Uuid;

use crate::entity::{company, job};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::{AuthUser, Role};
use crate::extractors::json::AppJson;
use crate::handlers::application::find_owned_job;
use crate::models::job::*;
use crate::models::shared::{MessageResponse, escape_like};
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/jobs/add",
    tag = "Jobs",
    operation_id = "createJob",
    summary = "Post a new job",
    description = "Creates an open job posting. The company must exist and be owned by the \
        authenticated recruiter; a foreign company is reported as 404.",
    request_body = CreateJobRequest,
    responses(
        (status = 201, description = "Job created", body = SingleMyJobResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID, TOKEN_EXPIRED)", body = ErrorBody),
        (status = 403, description = "Caller is not a recruiter (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Company not found or unauthorized (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = %auth_user.user_id, title = %payload.title))]
pub async fn create_job(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateJobRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_role(Role::Recruiter)?;
    validate_create_job(&payload)?;

    let company_id = Uuid::parse_str(payload.company_id.trim())
        .map_err(|_| AppError::Validation("Invalid company ID".into()))?;

    company::Entity::find_by_id(company_id)
        .filter(company::Column::OwnerId.eq(auth_user.user_id))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Company not found or unauthorized".into()))?;

    let now = chrono::Utc::now();
    let new_job = job::ActiveModel {
        id: Set(Uuid::now_v7()),
        title: Set(payload.title.trim().to_string()),
        description: Set(payload.description.trim().to_string()),
        requirements: Set(serde_json::json!(payload.requirements)),
        salary: Set(payload.salary),
        location: Set(payload.location.trim().to_string()),
        job_type: Set(payload.job_type),
        position: Set(payload.position.trim().to_string()),
        experience: Set(payload.experience.trim().to_string()),
        status: Set(job::STATUS_OPEN.to_string()),
        company_id: Set(company_id),
        created_by: Set(auth_user.user_id),
        created_at: Set(now),
        updated_at: Set(now),
    };

    let created = new_job.insert(&state.db).await?;

    Ok((
        StatusCode::CREATED,
        Json(SingleMyJobResponse {
            message: "Job posted successfully".into(),
            job: created.into(),
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/jobs",
    tag = "Jobs",
    operation_id = "listJobs",
    summary = "List open positions",
    description = "Public paginated listing with a case-insensitive keyword over title, \
        description, job type, and location, plus an optional salary range. The posting \
        recruiter is never exposed.",
    params(JobListQuery),
    responses(
        (status = 200, description = "Jobs", body = JobListResponse),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_jobs(
    State(state): State<AppState>,
    Query(query): Query<JobListQuery>,
) -> Result<Json<JobListResponse>, AppError> {
    let page = Ord::max(query.page.unwrap_or(1), 1);
    let per_page = query.limit.unwrap_or(10).clamp(1, 100);

    let select = filtered_jobs(&query, None);

    let total = select
        .clone()
        .paginate(&state.db, per_page)
        .num_items()
        .await?;
    let total_pages = total.div_ceil(per_page);

    let jobs = select
        .order_by_desc(job::Column::CreatedAt)
        .offset(Some((page - 1) * per_page))
        .limit(Some(per_page))
        .all(&state.db)
        .await?;

    let companies = load_company_views(&state.db, &jobs).await?;
    let jobs = jobs
        .into_iter()
        .map(|j| {
            let company = companies.get(&j.company_id).cloned();
            PublicJobResponse::from_model(j, company)
        })
        .collect();

    Ok(Json(JobListResponse {
        message: "Jobs fetched successfully".into(),
        total,
        jobs,
        total_pages,
        current_page: page,
    }))
}

#[utoipa::path(
    get,
    path = "/jobs/{id}",
    tag = "Jobs",
    operation_id = "getJob",
    summary = "Get a job by ID",
    params(("id" = String, Path, description = "Job ID")),
    responses(
        (status = 200, description = "Job", body = SingleJobResponse),
        (status = 400, description = "Invalid job ID (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Job not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SingleJobResponse>, AppError> {
    let job_id = parse_job_id(&id)?;
    let job = job::Entity::find_by_id(job_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Job not found".into()))?;

    let company = company::Entity::find_by_id(job.company_id)
        .one(&state.db)
        .await?
        .map(|c| JobCompanyView {
            name: c.name,
            description: c.description,
        });

    Ok(Json(SingleJobResponse {
        message: "Job retrieved successfully".into(),
        job: PublicJobResponse::from_model(job, company),
    }))
}

#[utoipa::path(
    get,
    path = "/my/jobs",
    tag = "Jobs",
    operation_id = "listMyJobs",
    summary = "List the recruiter's jobs",
    description = "Owner-scoped listing with the same keyword and salary filters as the \
        public endpoint.",
    params(JobListQuery),
    responses(
        (status = 200, description = "Jobs", body = MyJobListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID, TOKEN_EXPIRED)", body = ErrorBody),
        (status = 403, description = "Caller is not a recruiter (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "No jobs found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query), fields(user_id = %auth_user.user_id))]
pub async fn list_my_jobs(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<JobListQuery>,
) -> Result<Json<MyJobListResponse>, AppError> {
    auth_user.require_role(Role::Recruiter)?;

    let page = Ord::max(query.page.unwrap_or(1), 1);
    let per_page = query.limit.unwrap_or(10).clamp(1, 100);

    let jobs = filtered_jobs(&query, Some(auth_user.user_id))
        .order_by_desc(job::Column::CreatedAt)
        .offset(Some((page - 1) * per_page))
        .limit(Some(per_page))
        .all(&state.db)
        .await?;

    if jobs.is_empty() {
        return Err(AppError::NotFound("No jobs found".into()));
    }

    Ok(Json(MyJobListResponse {
        message: "Jobs retrieved successfully".into(),
        total: jobs.len() as u64,
        jobs: jobs.into_iter().map(Into::into).collect(),
    }))
}

#[utoipa::path(
    get,
    path = "/my/jobs/{id}",
    tag = "Jobs",
    operation_id = "getMyJob",
    summary = "Get one of the recruiter's jobs",
    description = "A job owned by another recruiter is reported as 404, indistinguishable from \
        a missing job.",
    params(("id" = String, Path, description = "Job ID")),
    responses(
        (status = 200, description = "Job", body = SingleMyJobResponse),
        (status = 400, description = "Invalid job ID (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID, TOKEN_EXPIRED)", body = ErrorBody),
        (status = 403, description = "Caller is not a recruiter (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Job not found or unauthorized (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id, id))]
pub async fn get_my_job(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SingleMyJobResponse>, AppError> {
    auth_user.require_role(Role::Recruiter)?;

    let job_id = parse_job_id(&id)?;
    let job = find_owned_job(&state.db, job_id, auth_user.user_id).await?;

    Ok(Json(SingleMyJobResponse {
        message: "Job retrieved successfully".into(),
        job: job.into(),
    }))
}

#[utoipa::path(
    patch,
    path = "/jobs/{id}",
    tag = "Jobs",
    operation_id = "updateJob",
    summary = "Update a job",
    description = "Owner-scoped PATCH; only provided fields are modified. Setting `status` to \
        `closed` stops new applications without touching existing ones.",
    params(("id" = String, Path, description = "Job ID")),
    request_body = UpdateJobRequest,
    responses(
        (status = 200, description = "Job updated", body = SingleMyJobResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID, TOKEN_EXPIRED)", body = ErrorBody),
        (status = 403, description = "Caller is not a recruiter (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Job not found or unauthorized (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = %auth_user.user_id, id))]
pub async fn update_job(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<UpdateJobRequest>,
) -> Result<Json<SingleMyJobResponse>, AppError> {
    auth_user.require_role(Role::Recruiter)?;

    let job_id = parse_job_id(&id)?;
    validate_update_job(&payload)?;

    let existing = find_owned_job(&state.db, job_id, auth_user.user_id).await?;

    if payload == UpdateJobRequest::default() {
        return Ok(Json(SingleMyJobResponse {
            message: "Job updated".into(),
            job: existing.into(),
        }));
    }

    let mut active: job::ActiveModel = existing.into();

    if let Some(ref title) = payload.title {
        active.title = Set(title.trim().to_string());
    }
    if let Some(ref description) = payload.description {
        active.description = Set(description.trim().to_string());
    }
    if let Some(requirements) = payload.requirements {
        active.requirements = Set(serde_json::json!(requirements));
    }
    if let Some(salary) = payload.salary {
        active.salary = Set(salary);
    }
    if let Some(ref location) = payload.location {
        active.location = Set(location.trim().to_string());
    }
    if let Some(job_type) = payload.job_type {
        active.job_type = Set(job_type);
    }
    if let Some(ref position) = payload.position {
        active.position = Set(position.trim().to_string());
    }
    if let Some(ref experience) = payload.experience {
        active.experience = Set(experience.trim().to_string());
    }
    if let Some(status) = payload.status {
        active.status = Set(status);
    }
    active.updated_at = Set(chrono::Utc::now());

    let updated = active.update(&state.db).await?;

    Ok(Json(SingleMyJobResponse {
        message: "Job updated".into(),
        job: updated.into(),
    }))
}

#[utoipa::path(
    delete,
    path = "/jobs/{id}",
    tag = "Jobs",
    operation_id = "deleteJob",
    summary = "Delete a job",
    description = "Owner-scoped. Applications to the job are kept as an audit trail; their job \
        reference dangles.",
    params(("id" = String, Path, description = "Job ID")),
    responses(
        (status = 200, description = "Job deleted", body = MessageResponse),
        (status = 400, description = "Invalid job ID (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID, TOKEN_EXPIRED)", body = ErrorBody),
        (status = 403, description = "Caller is not a recruiter (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Job not found or unauthorized (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id, id))]
pub async fn delete_job(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    auth_user.require_role(Role::Recruiter)?;

    let job_id = parse_job_id(&id)?;
    let job = find_owned_job(&state.db, job_id, auth_user.user_id).await?;

    job::Entity::delete_by_id(job.id).exec(&state.db).await?;

    Ok(Json(MessageResponse::new("Job deleted successfully")))
}

fn parse_job_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::Validation("Invalid job ID".into()))
}

/// Build the keyword/salary-filtered job query, optionally owner-scoped.
fn filtered_jobs(query: &JobListQuery, owner: Option<Uuid>) -> Select<job::Entity> {
    let mut select = job::Entity::find();

    if let Some(owner) = owner {
        select = select.filter(job::Column::CreatedBy.eq(owner));
    }

    if let Some(ref keyword) = query.keyword {
        let term = escape_like(keyword.trim());
        if !term.is_empty() {
            let pattern = format!("%{}%", term.to_lowercase());
            let matches = |column: job::Column| {
                Expr::expr(Func::lower(Expr::col(column)))
                    .like(LikeExpr::new(pattern.clone()).escape('\\'))
            };
            select = select.filter(
                Condition::any()
                    .add(matches(job::Column::Title))
                    .add(matches(job::Column::Description))
                    .add(matches(job::Column::JobType))
                    .add(matches(job::Column::Location)),
            );
        }
    }

    if let Some(min_salary) = query.min_salary {
        select = select.filter(job::Column::Salary.gte(min_salary));
    }
    if let Some(max_salary) = query.max_salary {
        select = select.filter(job::Column::Salary.lte(max_salary));
    }

    select
}

async fn load_company_views<C: ConnectionTrait>(
    db: &C,
    jobs: &[job::Model],
) -> Result<BTreeMap<Uuid, JobCompanyView>, AppError> {
    let company_ids: Vec<Uuid> = jobs.iter().map(|j| j.company_id).collect();
    let companies = company::Entity::find()
        .filter(company::Column::Id.is_in(company_ids))
        .all(db)
        .await?;

    Ok(companies
        .into_iter()
        .map(|c| {
            (
                c.id,
                JobCompanyView {
                    name: c.name,
                    description: c.description,
                },
            )
        })
        .collect())
}
