use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::entity::user;
use crate::models::shared::Pagination;

/// User payload with the password hash stripped.
#[derive(Serialize, utoipa::ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    #[schema(example = "Alice Wonder")]
    pub full_name: String,
    #[schema(example = "female")]
    pub gender: String,
    #[schema(example = "alice@example.com")]
    pub email: String,
    #[schema(example = "+1-555-0100")]
    pub phone_number: String,
    #[schema(example = "student")]
    pub role: String,
    pub bio: Option<String>,
    #[schema(example = json!(["rust", "sql"]))]
    pub skills: Vec<String>,
    pub resume_url: Option<String>,
    pub resume_original_name: Option<String>,
    pub profile_photo_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<user::Model> for UserResponse {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            full_name: user.full_name,
            gender: user.gender,
            email: user.email,
            phone_number: user.phone_number,
            role: user.role,
            bio: user.bio,
            skills: serde_json::from_value(user.skills).unwrap_or_default(),
            resume_url: user.resume_url,
            resume_original_name: user.resume_original_name,
            profile_photo_url: user.profile_photo_url,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Student directory returned to recruiters.
#[derive(Serialize, utoipa::ToSchema)]
pub struct UserListResponse {
    #[schema(example = 2)]
    pub total: u64,
    pub users: Vec<UserResponse>,
}

/// Paginated user listing for admins.
#[derive(Serialize, utoipa::ToSchema)]
pub struct AdminUserListResponse {
    pub users: Vec<UserResponse>,
    pub pagination: Pagination,
}

/// Admin list query parameters.
#[derive(serde::Deserialize, utoipa::IntoParams)]
pub struct AdminUserListQuery {
    /// Page number (1-based). Defaults to 1.
    pub page: Option<u64>,
    /// Items per page. Defaults to 10, capped at 100.
    pub limit: Option<u64>,
}
