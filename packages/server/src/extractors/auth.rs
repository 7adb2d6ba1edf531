use axum::{extract::FromRequestParts, http::header, http::request::Parts};
use axum_extra::extract::cookie::CookieJar;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;
use crate::utils::jwt;

/// Actor roles. Stored on the user row and carried in JWT claims as the
/// lowercase string form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Student,
    Recruiter,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Recruiter => "recruiter",
            Self::Admin => "admin",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "student" => Some(Self::Student),
            "recruiter" => Some(Self::Recruiter),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

/// Authenticated principal extracted from the `token` cookie or, failing
/// that, the `Authorization: Bearer <token>` header.
///
/// Add this as a handler parameter to require authentication. Role checks
/// happen via `require_role()` in the handler body; ownership checks stay
/// with the operation that loads the entity.
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
    pub phone_number: String,
}

impl AuthUser {
    /// Returns `Ok(())` if the principal has the given role,
    /// `Err(PermissionDenied)` otherwise.
    pub fn require_role(&self, role: Role) -> Result<(), AppError> {
        if self.role == role {
            Ok(())
        } else {
            Err(AppError::PermissionDenied)
        }
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = match jar.get("token") {
            Some(cookie) => cookie.value().to_string(),
            None => parts
                .headers
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.strip_prefix("Bearer "))
                .map(str::to_string)
                .ok_or(AppError::TokenMissing)?,
        };

        let claims =
            jwt::verify(&token, &state.config.auth.jwt_secret).map_err(|e| match e {
                jwt::VerifyError::Expired => AppError::TokenExpired,
                jwt::VerifyError::Invalid => AppError::TokenInvalid,
            })?;

        let role = Role::parse(&claims.role).ok_or(AppError::TokenInvalid)?;

        Ok(AuthUser {
            user_id: claims.sub,
            email: claims.email,
            role,
            phone_number: claims.phone_number,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trip() {
        for role in [Role::Student, Role::Recruiter, Role::Admin] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("superuser"), None);
        assert_eq!(Role::parse("Student"), None);
    }

    #[test]
    fn require_role_checks_exact_role() {
        let user = AuthUser {
            user_id: Uuid::now_v7(),
            email: "r@b.test".into(),
            role: Role::Recruiter,
            phone_number: "1".into(),
        };
        assert!(user.require_role(Role::Recruiter).is_ok());
        assert!(matches!(
            user.require_role(Role::Student),
            Err(AppError::PermissionDenied)
        ));
    }
}
