use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use sea_orm::*;
use tracing::instrument;
use uuid::Uuid;

use crate::assets::naming::{AssetKind, prepare_upload};
use crate::assets::policy::{replace_document_asset, replace_image_asset};
use crate::entity::user;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::{AuthUser, Role};
use crate::extractors::json::AppJson;
use crate::models::auth::{
    LoginRequest, LoginResponse, ProfileResponse, RegisterRequest, RegisterResponse,
    validate_login_request, validate_register_request,
};
use crate::models::shared::{MessageResponse, validate_email};
use crate::models::user::UserResponse;
use crate::state::AppState;
use crate::utils::{hash, jwt};

const SESSION_COOKIE: &str = "token";

/// Placeholder avatars assigned at registration, keyed by gender.
fn default_avatar(gender: &str) -> &'static str {
    if gender == "male" {
        "https://api.dicebear.com/9.x/adventurer/svg?seed=Aneka"
    } else {
        "https://api.dicebear.com/9.x/adventurer/svg?seed=Felix"
    }
}

#[utoipa::path(
    post,
    path = "/register",
    tag = "Auth",
    operation_id = "registerUser",
    summary = "Register a new user",
    description = "Creates a user account. The role defaults to student; the avatar is seeded \
        with a gender-keyed placeholder until one is uploaded.",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created", body = RegisterResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 409, description = "Email already registered (EMAIL_TAKEN)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(email = %payload.email))]
pub async fn register(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_register_request(&payload)?;

    let email = payload.email.trim().to_lowercase();
    let role = payload
        .role
        .as_deref()
        .unwrap_or(user::DEFAULT_ROLE)
        .to_string();

    let password_hash = hash::hash_password(&payload.password)
        .map_err(|e| AppError::Internal(format!("Password hash error: {e}")))?;

    let now = chrono::Utc::now();
    let new_user = user::ActiveModel {
        id: Set(Uuid::now_v7()),
        full_name: Set(payload.full_name.trim().to_string()),
        gender: Set(payload.gender.clone()),
        email: Set(email),
        phone_number: Set(payload.phone_number.trim().to_string()),
        password: Set(password_hash),
        role: Set(role),
        bio: Set(None),
        skills: Set(serde_json::json!([])),
        resume_url: Set(None),
        resume_original_name: Set(None),
        profile_photo_url: Set(default_avatar(&payload.gender).to_string()),
        created_at: Set(now),
        updated_at: Set(now),
    };

    let created = new_user.insert(&state.db).await.map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::EmailTaken,
        _ => AppError::from(e),
    })?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User saved successfully".into(),
            user: created.into(),
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/login",
    tag = "Auth",
    operation_id = "loginUser",
    summary = "Log in",
    description = "Verifies credentials and returns a JWT, also set as an httpOnly `token` \
        cookie valid for one day.",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Wrong password (INVALID_CREDENTIALS)", body = ErrorBody),
        (status = 404, description = "Unknown email (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, jar, payload), fields(email = %payload.email))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>), AppError> {
    validate_login_request(&payload)?;

    let email = payload.email.trim().to_lowercase();
    let user = user::Entity::find()
        .filter(user::Column::Email.eq(&email))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    let is_valid = hash::verify_password(&payload.password, &user.password)
        .map_err(|e| AppError::Internal(format!("Password verify error: {e}")))?;
    if !is_valid {
        return Err(AppError::InvalidCredentials);
    }

    let token = jwt::sign(
        user.id,
        &user.email,
        &user.role,
        &user.phone_number,
        &state.config.auth.jwt_secret,
        state.config.auth.token_ttl_secs,
    )
    .map_err(|e| AppError::Internal(format!("JWT sign error: {e}")))?;

    let cookie = Cookie::build((SESSION_COOKIE, token.clone()))
        .path("/")
        .http_only(true)
        .secure(state.config.auth.cookie_secure)
        .same_site(SameSite::Strict)
        .max_age(time::Duration::days(1))
        .build();

    Ok((
        jar.add(cookie),
        Json(LoginResponse {
            message: "User login successfully".into(),
            token,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/logout",
    tag = "Auth",
    operation_id = "logoutUser",
    summary = "Log out",
    description = "Clears the session cookie. Requires a valid session.",
    responses(
        (status = 200, description = "Logged out", body = MessageResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID, TOKEN_EXPIRED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(jar, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn logout(
    auth_user: AuthUser,
    jar: CookieJar,
) -> (CookieJar, Json<MessageResponse>) {
    let removal = Cookie::build((SESSION_COOKIE, "")).path("/").build();
    (
        jar.remove(removal),
        Json(MessageResponse::new("User logged out successfully")),
    )
}

#[utoipa::path(
    get,
    path = "/profile",
    tag = "Auth",
    operation_id = "getProfile",
    summary = "Get the authenticated user's profile",
    responses(
        (status = 200, description = "Profile", body = ProfileResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID, TOKEN_EXPIRED)", body = ErrorBody),
        (status = 404, description = "User no longer exists (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn get_profile(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<ProfileResponse>, AppError> {
    let user = find_user(&state.db, auth_user.user_id).await?;
    Ok(Json(ProfileResponse { user: user.into() }))
}

/// Text fields and files collected from the profile-update form.
#[derive(Default)]
struct ProfileUpdateForm {
    full_name: Option<String>,
    email: Option<String>,
    phone_number: Option<String>,
    bio: Option<String>,
    gender: Option<String>,
    skills: Option<String>,
    avatar: Option<(String, Vec<u8>)>,
    resume: Option<(String, Vec<u8>)>,
}

#[utoipa::path(
    patch,
    path = "/profile/update",
    tag = "Auth",
    operation_id = "updateProfile",
    summary = "Update the authenticated user's profile",
    description = "Multipart PATCH: any of the text fields `full_name`, `email`, \
        `phone_number`, `bio`, `gender`, `skills` (comma-separated or a JSON array) plus \
        optional `avatar` and `resume` files. Replacing a file deletes the previous blob \
        first; a failed delete aborts the replacement and keeps the old file. Resume uploads \
        apply to students only.",
    request_body(content_type = "multipart/form-data", description = "Partial profile fields and files"),
    responses(
        (status = 200, description = "Profile updated", body = ProfileResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID, TOKEN_EXPIRED)", body = ErrorBody),
        (status = 404, description = "User no longer exists (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Email already registered (EMAIL_TAKEN)", body = ErrorBody),
        (status = 500, description = "Storage failure (STORAGE_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, multipart), fields(user_id = %auth_user.user_id))]
pub async fn update_profile(
    auth_user: AuthUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ProfileResponse>, AppError> {
    let form = collect_profile_form(&mut multipart).await?;

    let user = find_user(&state.db, auth_user.user_id).await?;

    let mut avatar_url: Option<String> = None;
    if let Some((filename, bytes)) = form.avatar {
        let upload = prepare_upload(
            AssetKind::Avatar,
            &filename,
            bytes,
            state.config.storage.max_file_size,
            chrono::Local::now().naive_local(),
        )?;
        let current = Some(user.profile_photo_url.as_str()).filter(|u| !u.is_empty());
        avatar_url = Some(replace_image_asset(&*state.assets, current, &upload).await?);
    }

    let mut resume: Option<(String, String)> = None;
    // Resume uploads from non-students are ignored rather than rejected.
    if auth_user.role == Role::Student
        && let Some((filename, bytes)) = form.resume
    {
        let upload = prepare_upload(
            AssetKind::Resume,
            &filename,
            bytes,
            state.config.storage.max_file_size,
            chrono::Local::now().naive_local(),
        )?;
        let url = replace_document_asset(&*state.assets, user.resume_url.as_deref(), &upload)
            .await?;
        resume = Some((url, filename));
    }

    let mut active: user::ActiveModel = user.into();

    if let Some(full_name) = nonempty(form.full_name) {
        active.full_name = Set(full_name.trim().to_string());
    }
    if let Some(email) = nonempty(form.email) {
        let email = email.trim().to_lowercase();
        validate_email(&email)?;
        active.email = Set(email);
    }
    if let Some(phone_number) = nonempty(form.phone_number) {
        active.phone_number = Set(phone_number.trim().to_string());
    }
    if let Some(bio) = nonempty(form.bio) {
        active.bio = Set(Some(bio.trim().to_string()));
    }
    if let Some(gender) = nonempty(form.gender) {
        if !user::GENDERS.contains(&gender.as_str()) {
            return Err(AppError::Validation(
                "Gender must be one of: male, female".into(),
            ));
        }
        active.gender = Set(gender);
    }
    if let Some(skills) = nonempty(form.skills) {
        active.skills = Set(serde_json::json!(parse_skills(&skills)));
    }
    if let Some(url) = avatar_url {
        active.profile_photo_url = Set(url);
    }
    if let Some((url, original_name)) = resume {
        active.resume_url = Set(Some(url));
        active.resume_original_name = Set(Some(original_name));
    }
    active.updated_at = Set(chrono::Utc::now());

    let updated = active.update(&state.db).await.map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::EmailTaken,
        _ => AppError::from(e),
    })?;

    Ok(Json(ProfileResponse {
        user: updated.into(),
    }))
}

async fn collect_profile_form(multipart: &mut Multipart) -> Result<ProfileUpdateForm, AppError> {
    let mut form = ProfileUpdateForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
    {
        match field.name() {
            Some("full_name") => form.full_name = Some(read_text(field).await?),
            Some("email") => form.email = Some(read_text(field).await?),
            Some("phone_number") => form.phone_number = Some(read_text(field).await?),
            Some("bio") => form.bio = Some(read_text(field).await?),
            Some("gender") => form.gender = Some(read_text(field).await?),
            Some("skills") => form.skills = Some(read_text(field).await?),
            Some("avatar") => form.avatar = Some(read_file(field).await?),
            Some("resume") => form.resume = Some(read_file(field).await?),
            _ => {} // Ignore unknown fields.
        }
    }

    Ok(form)
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to read field: {e}")))
}

async fn read_file(
    field: axum::extract::multipart::Field<'_>,
) -> Result<(String, Vec<u8>), AppError> {
    let filename = field
        .file_name()
        .map(|s| s.to_string())
        .ok_or_else(|| AppError::Validation("File field must have a filename".into()))?;
    let bytes = field
        .bytes()
        .await
        .map_err(|e| AppError::Validation(format!("Upload read error: {e}")))?;
    Ok((filename, bytes.to_vec()))
}

fn nonempty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// Accept skills as either a JSON array or a comma-separated string.
fn parse_skills(raw: &str) -> Vec<String> {
    if raw.trim_start().starts_with('[')
        && let Ok(skills) = serde_json::from_str::<Vec<String>>(raw)
    {
        return skills.iter().map(|s| s.trim().to_string()).collect();
    }
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

pub(crate) async fn find_user<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<user::Model, AppError> {
    user::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skills_parse_comma_separated() {
        assert_eq!(
            parse_skills("rust, sql , distributed systems"),
            vec!["rust", "sql", "distributed systems"]
        );
    }

    #[test]
    fn skills_parse_json_array() {
        assert_eq!(
            parse_skills(r#"["rust", " sql "]"#),
            vec!["rust", "sql"]
        );
    }

    #[test]
    fn skills_malformed_json_falls_back_to_comma_split() {
        assert_eq!(parse_skills("[unclosed, sql"), vec!["[unclosed", "sql"]);
    }

    #[test]
    fn skills_drop_empty_entries() {
        assert_eq!(parse_skills("rust,,sql,"), vec!["rust", "sql"]);
    }

    #[test]
    fn default_avatar_is_keyed_by_gender() {
        assert_ne!(default_avatar("male"), default_avatar("female"));
    }
}
