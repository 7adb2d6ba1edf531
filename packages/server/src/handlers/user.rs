use axum::Json;
use axum::extract::{Path, Query, State};
use sea_orm::*;
use tracing::instrument;
use uuid::Uuid;

use crate::entity::user;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::{AuthUser, Role};
use crate::models::shared::{MessageResponse, Pagination};
use crate::models::user::{AdminUserListQuery, AdminUserListResponse, UserListResponse};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/users",
    tag = "Users",
    operation_id = "listStudents",
    summary = "List student accounts",
    description = "Returns all student users for recruiters to browse. Password hashes are \
        never included.",
    responses(
        (status = 200, description = "Students", body = UserListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID, TOKEN_EXPIRED)", body = ErrorBody),
        (status = 403, description = "Caller is not a recruiter (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn list_students(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<UserListResponse>, AppError> {
    auth_user.require_role(Role::Recruiter)?;

    let students = user::Entity::find()
        .filter(user::Column::Role.eq(Role::Student.as_str()))
        .all(&state.db)
        .await?;

    Ok(Json(UserListResponse {
        total: students.len() as u64,
        users: students.into_iter().map(Into::into).collect(),
    }))
}

#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "Users",
    operation_id = "deleteStudent",
    summary = "Delete a student account",
    description = "Recruiters may delete student accounts, never their own account and never \
        non-students; both failures are reported as 404.",
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deleted", body = MessageResponse),
        (status = 400, description = "Invalid user ID (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID, TOKEN_EXPIRED)", body = ErrorBody),
        (status = 403, description = "Not a recruiter, or self-deletion (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "User not found or not a student (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id, target = %id))]
pub async fn delete_student(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    auth_user.require_role(Role::Recruiter)?;

    let target_id =
        Uuid::parse_str(&id).map_err(|_| AppError::Validation("Invalid user ID".into()))?;
    if target_id == auth_user.user_id {
        return Err(AppError::PermissionDenied);
    }

    let target = user::Entity::find_by_id(target_id)
        .filter(user::Column::Role.eq(Role::Student.as_str()))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found or not a student".into()))?;

    user::Entity::delete_by_id(target.id).exec(&state.db).await?;

    Ok(Json(MessageResponse::new("User deleted successfully")))
}

#[utoipa::path(
    get,
    path = "/admin/users",
    tag = "Users",
    operation_id = "adminListUsers",
    summary = "List all non-admin accounts",
    description = "Paginated listing of every student and recruiter. Admin accounts are \
        excluded from the results.",
    params(AdminUserListQuery),
    responses(
        (status = 200, description = "Users", body = AdminUserListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID, TOKEN_EXPIRED)", body = ErrorBody),
        (status = 403, description = "Caller is not an admin (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query), fields(user_id = %auth_user.user_id))]
pub async fn admin_list_users(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<AdminUserListQuery>,
) -> Result<Json<AdminUserListResponse>, AppError> {
    auth_user.require_role(Role::Admin)?;

    let page = Ord::max(query.page.unwrap_or(1), 1);
    let per_page = query.limit.unwrap_or(10).clamp(1, 100);

    let select = user::Entity::find()
        .filter(user::Column::Role.ne(Role::Admin.as_str()))
        .order_by_asc(user::Column::CreatedAt);

    let total = select
        .clone()
        .paginate(&state.db, per_page)
        .num_items()
        .await?;
    let total_pages = total.div_ceil(per_page);

    let users = select
        .offset(Some((page - 1) * per_page))
        .limit(Some(per_page))
        .all(&state.db)
        .await?;

    Ok(Json(AdminUserListResponse {
        users: users.into_iter().map(Into::into).collect(),
        pagination: Pagination {
            page,
            per_page,
            total,
            total_pages,
        },
    }))
}
