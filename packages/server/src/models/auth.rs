use serde::{Deserialize, Serialize};

use crate::entity::user;
use crate::error::AppError;
use crate::extractors::auth::Role;
use crate::models::shared::validate_email;
use crate::models::user::UserResponse;

/// Request body for user registration.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct RegisterRequest {
    #[schema(example = "Alice Wonder")]
    pub full_name: String,
    #[schema(example = "alice@example.com")]
    pub email: String,
    /// Password (8-128 characters).
    #[schema(example = "s3cure_P@ss!")]
    pub password: String,
    #[schema(example = "+1-555-0100")]
    pub phone_number: String,
    /// Defaults to "student" when omitted.
    #[schema(example = "student")]
    pub role: Option<String>,
    /// "male" or "female".
    #[schema(example = "female")]
    pub gender: String,
}

pub fn validate_register_request(payload: &RegisterRequest) -> Result<(), AppError> {
    if payload.full_name.trim().is_empty()
        || payload.email.trim().is_empty()
        || payload.phone_number.trim().is_empty()
        || payload.gender.trim().is_empty()
    {
        return Err(AppError::Validation(
            "Please fill all the required fields".into(),
        ));
    }
    validate_email(payload.email.trim())?;
    if payload.password.len() < 8 || payload.password.len() > 128 {
        return Err(AppError::Validation(
            "Password must be 8-128 characters".into(),
        ));
    }
    if let Some(ref role) = payload.role
        && Role::parse(role).is_none()
    {
        return Err(AppError::Validation(
            "Role must be one of: student, recruiter, admin".into(),
        ));
    }
    if !user::GENDERS.contains(&payload.gender.as_str()) {
        return Err(AppError::Validation(
            "Gender must be one of: male, female".into(),
        ));
    }
    Ok(())
}

/// Request body for user login.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    #[schema(example = "alice@example.com")]
    pub email: String,
    #[schema(example = "s3cure_P@ss!")]
    pub password: String,
}

pub fn validate_login_request(payload: &LoginRequest) -> Result<(), AppError> {
    if payload.email.trim().is_empty() || payload.password.is_empty() {
        return Err(AppError::Validation(
            "Please provide email and password".into(),
        ));
    }
    Ok(())
}

/// Successful registration response.
#[derive(Serialize, utoipa::ToSchema)]
pub struct RegisterResponse {
    #[schema(example = "User saved successfully")]
    pub message: String,
    pub user: UserResponse,
}

/// Successful login response. The token is also set as an httpOnly cookie.
#[derive(Serialize, utoipa::ToSchema)]
pub struct LoginResponse {
    #[schema(example = "User login successfully")]
    pub message: String,
    /// JWT bearer token, also usable via `Authorization: Bearer`.
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub token: String,
}

/// Current user's profile.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ProfileResponse {
    pub user: UserResponse,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_register() -> RegisterRequest {
        RegisterRequest {
            full_name: "Alice Wonder".into(),
            email: "alice@example.com".into(),
            password: "s3cure_P@ss!".into(),
            phone_number: "+1-555-0100".into(),
            role: None,
            gender: "female".into(),
        }
    }

    #[test]
    fn register_accepts_valid_payload() {
        assert!(validate_register_request(&valid_register()).is_ok());
    }

    #[test]
    fn register_requires_all_fields() {
        let mut payload = valid_register();
        payload.full_name = "   ".into();
        assert!(validate_register_request(&payload).is_err());
    }

    #[test]
    fn register_rejects_short_password() {
        let mut payload = valid_register();
        payload.password = "short".into();
        assert!(validate_register_request(&payload).is_err());
    }

    #[test]
    fn register_rejects_unknown_role_and_gender() {
        let mut payload = valid_register();
        payload.role = Some("wizard".into());
        assert!(validate_register_request(&payload).is_err());

        let mut payload = valid_register();
        payload.gender = "other".into();
        assert!(validate_register_request(&payload).is_err());
    }

    #[test]
    fn login_requires_both_fields() {
        let payload = LoginRequest {
            email: "alice@example.com".into(),
            password: String::new(),
        };
        assert!(validate_login_request(&payload).is_err());
    }
}
