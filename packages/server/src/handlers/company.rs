use axum::Json;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{Func, LikeExpr};
use sea_orm::*;
use tracing::instrument;
use uuid::Uuid;

use crate::assets::naming::{AssetKind, prepare_upload};
use crate::assets::policy::replace_image_asset;
use crate::entity::company;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::{AuthUser, Role};
use crate::extractors::json::AppJson;
use crate::models::company::*;
use crate::models::shared::{MessageResponse, escape_like};
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/register",
    tag = "Companies",
    operation_id = "createCompany",
    summary = "Register a company",
    description = "Creates a company owned by the authenticated recruiter. Company names are \
        unique across the system.",
    request_body = CreateCompanyRequest,
    responses(
        (status = 201, description = "Company created", body = SingleCompanyResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID, TOKEN_EXPIRED)", body = ErrorBody),
        (status = 403, description = "Caller is not a recruiter (PERMISSION_DENIED)", body = ErrorBody),
        (status = 409, description = "Name already registered (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = %auth_user.user_id, name = %payload.name))]
pub async fn create_company(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateCompanyRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_role(Role::Recruiter)?;
    validate_create_company(&payload)?;

    let name = payload.name.trim().to_string();

    let now = chrono::Utc::now();
    let new_company = company::ActiveModel {
        id: Set(Uuid::now_v7()),
        name: Set(name),
        description: Set(None),
        website: Set(None),
        location: Set(None),
        logo_url: Set(None),
        owner_id: Set(auth_user.user_id),
        created_at: Set(now),
        updated_at: Set(now),
    };

    let created = new_company
        .insert(&state.db)
        .await
        .map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                AppError::Conflict("Company already exists".into())
            }
            _ => AppError::from(e),
        })?;

    Ok((
        StatusCode::CREATED,
        Json(SingleCompanyResponse {
            message: "Company registered successfully".into(),
            company: created.into(),
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/companies",
    tag = "Companies",
    operation_id = "listCompanies",
    summary = "List companies",
    description = "Public listing with optional case-insensitive name filter and sorting by \
        name (default), location, or created_at.",
    params(CompanyListQuery),
    responses(
        (status = 200, description = "Companies", body = CompanyListResponse),
        (status = 400, description = "Unknown sort field (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "No companies found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_companies(
    State(state): State<AppState>,
    Query(query): Query<CompanyListQuery>,
) -> Result<Json<CompanyListResponse>, AppError> {
    let mut select = company::Entity::find();

    if let Some(ref name) = query.name {
        let term = escape_like(name.trim());
        if !term.is_empty() {
            select = select.filter(
                Expr::expr(Func::lower(Expr::col(company::Column::Name)))
                    .like(LikeExpr::new(format!("%{}%", term.to_lowercase())).escape('\\')),
            );
        }
    }

    let sort_column = match query.sort_by.as_deref().unwrap_or("name") {
        "name" => company::Column::Name,
        "location" => company::Column::Location,
        "created_at" => company::Column::CreatedAt,
        _ => {
            return Err(AppError::Validation(
                "sort_by must be one of: name, location, created_at".into(),
            ));
        }
    };
    let sort_order = if query.sort_order.as_deref() == Some("desc") {
        Order::Desc
    } else {
        Order::Asc
    };

    let companies = select
        .order_by(sort_column, sort_order)
        .all(&state.db)
        .await?;

    if companies.is_empty() {
        return Err(AppError::NotFound("No companies found".into()));
    }

    Ok(Json(CompanyListResponse {
        message: "Companies retrieved successfully".into(),
        total: companies.len() as u64,
        companies: companies.into_iter().map(Into::into).collect(),
    }))
}

#[utoipa::path(
    get,
    path = "/companies/{id}",
    tag = "Companies",
    operation_id = "getCompany",
    summary = "Get a company by ID",
    params(("id" = String, Path, description = "Company ID")),
    responses(
        (status = 200, description = "Company", body = SingleCompanyResponse),
        (status = 400, description = "Invalid company ID (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Company not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn get_company(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SingleCompanyResponse>, AppError> {
    let company_id = parse_company_id(&id)?;
    let company = find_company(&state.db, company_id).await?;

    Ok(Json(SingleCompanyResponse {
        message: "Company retrieved successfully".into(),
        company: company.into(),
    }))
}

#[utoipa::path(
    get,
    path = "/my/companies",
    tag = "Companies",
    operation_id = "listMyCompanies",
    summary = "List the recruiter's companies",
    responses(
        (status = 200, description = "Companies", body = MyCompanyListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID, TOKEN_EXPIRED)", body = ErrorBody),
        (status = 403, description = "Caller is not a recruiter (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "No companies found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn list_my_companies(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<MyCompanyListResponse>, AppError> {
    auth_user.require_role(Role::Recruiter)?;

    let companies = company::Entity::find()
        .filter(company::Column::OwnerId.eq(auth_user.user_id))
        .all(&state.db)
        .await?;

    if companies.is_empty() {
        return Err(AppError::NotFound("No companies found".into()));
    }

    Ok(Json(MyCompanyListResponse {
        message: "Companies retrieved successfully".into(),
        total: companies.len() as u64,
        companies: companies.into_iter().map(Into::into).collect(),
    }))
}

#[utoipa::path(
    get,
    path = "/my/companies/{id}",
    tag = "Companies",
    operation_id = "getMyCompany",
    summary = "Get one of the recruiter's companies",
    description = "A company owned by another recruiter is reported as 404, indistinguishable \
        from a missing company.",
    params(("id" = String, Path, description = "Company ID")),
    responses(
        (status = 200, description = "Company", body = SingleCompanyResponse),
        (status = 400, description = "Invalid company ID (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID, TOKEN_EXPIRED)", body = ErrorBody),
        (status = 403, description = "Caller is not a recruiter (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Company not found or unauthorized (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id, id))]
pub async fn get_my_company(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SingleCompanyResponse>, AppError> {
    auth_user.require_role(Role::Recruiter)?;

    let company_id = parse_company_id(&id)?;
    let company = company::Entity::find_by_id(company_id)
        .filter(company::Column::OwnerId.eq(auth_user.user_id))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Company not found or unauthorized".into()))?;

    Ok(Json(SingleCompanyResponse {
        message: "Company retrieved successfully".into(),
        company: company.into(),
    }))
}

#[utoipa::path(
    patch,
    path = "/companies/{id}",
    tag = "Companies",
    operation_id = "updateCompany",
    summary = "Update a company",
    description = "Multipart PATCH: any of the text fields `name`, `description`, `website`, \
        `location` plus an optional `logo` file handled by the replacement flow (old logo \
        deleted first; a failed delete aborts and keeps the old logo).",
    params(("id" = String, Path, description = "Company ID")),
    request_body(content_type = "multipart/form-data", description = "Partial company fields and logo"),
    responses(
        (status = 200, description = "Company updated", body = SingleCompanyResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID, TOKEN_EXPIRED)", body = ErrorBody),
        (status = 403, description = "Caller is not a recruiter (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Company not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Name already registered (CONFLICT)", body = ErrorBody),
        (status = 500, description = "Storage failure (STORAGE_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, multipart), fields(user_id = %auth_user.user_id, id))]
pub async fn update_company(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<SingleCompanyResponse>, AppError> {
    auth_user.require_role(Role::Recruiter)?;

    let company_id = parse_company_id(&id)?;
    let company = find_company(&state.db, company_id).await?;

    let mut name: Option<String> = None;
    let mut description: Option<String> = None;
    let mut website: Option<String> = None;
    let mut location: Option<String> = None;
    let mut logo: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
    {
        match field.name() {
            Some("name") => name = Some(read_text(field).await?),
            Some("description") => description = Some(read_text(field).await?),
            Some("website") => website = Some(read_text(field).await?),
            Some("location") => location = Some(read_text(field).await?),
            Some("logo") => {
                let filename = field
                    .file_name()
                    .map(|s| s.to_string())
                    .ok_or_else(|| AppError::Validation("Logo must have a filename".into()))?;
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Upload read error: {e}")))?;
                logo = Some((filename, bytes.to_vec()));
            }
            _ => {} // Ignore unknown fields.
        }
    }

    let mut logo_url: Option<String> = None;
    if let Some((filename, bytes)) = logo {
        let upload = prepare_upload(
            AssetKind::Logo,
            &filename,
            bytes,
            state.config.storage.max_file_size,
            chrono::Local::now().naive_local(),
        )?;
        logo_url =
            Some(replace_image_asset(&*state.assets, company.logo_url.as_deref(), &upload).await?);
    }

    let mut active: company::ActiveModel = company.into();

    if let Some(name) = name.filter(|s| !s.trim().is_empty()) {
        active.name = Set(name.trim().to_string());
    }
    if let Some(description) = description.filter(|s| !s.trim().is_empty()) {
        active.description = Set(Some(description.trim().to_string()));
    }
    if let Some(website) = website.filter(|s| !s.trim().is_empty()) {
        let website = website.trim().to_string();
        validate_website(&website)?;
        active.website = Set(Some(website));
    }
    if let Some(location) = location.filter(|s| !s.trim().is_empty()) {
        active.location = Set(Some(location.trim().to_string()));
    }
    if let Some(url) = logo_url {
        active.logo_url = Set(Some(url));
    }
    active.updated_at = Set(chrono::Utc::now());

    let updated = active.update(&state.db).await.map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::Conflict("Company already exists".into())
        }
        _ => AppError::from(e),
    })?;

    Ok(Json(SingleCompanyResponse {
        message: "Company information updated".into(),
        company: updated.into(),
    }))
}

#[utoipa::path(
    delete,
    path = "/companies/{id}",
    tag = "Companies",
    operation_id = "deleteCompany",
    summary = "Delete a company",
    description = "Job postings referencing the company are kept; their company reference \
        simply dangles, as in a document store.",
    params(("id" = String, Path, description = "Company ID")),
    responses(
        (status = 200, description = "Company deleted", body = MessageResponse),
        (status = 400, description = "Invalid company ID (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID, TOKEN_EXPIRED)", body = ErrorBody),
        (status = 403, description = "Caller is not a recruiter (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Company not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id, id))]
pub async fn delete_company(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    auth_user.require_role(Role::Recruiter)?;

    let company_id = parse_company_id(&id)?;
    let company = find_company(&state.db, company_id).await?;

    company::Entity::delete_by_id(company.id)
        .exec(&state.db)
        .await?;

    Ok(Json(MessageResponse::new("Company deleted successfully")))
}

fn parse_company_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::Validation("Invalid or missing Company ID".into()))
}

async fn find_company<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<company::Model, AppError> {
    company::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Company not found".into()))
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to read field: {e}")))
}
