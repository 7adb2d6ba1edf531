use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// The role assigned to newly registered users.
pub const DEFAULT_ROLE: &str = "student";

pub const GENDERS: [&str; 2] = ["male", "female"];

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    /// UUIDv7 primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub full_name: String,

    /// "male" or "female"; selects the default avatar at registration.
    pub gender: String,

    /// Lowercased and trimmed before insert.
    #[sea_orm(unique)]
    pub email: String,

    pub phone_number: String,

    /// Argon2 PHC hash. Never serialized into responses (DTOs omit it).
    pub password: String,

    /// One of: student, recruiter, admin.
    pub role: String,

    pub bio: Option<String>,

    /// Skill names stored as a JSON array of strings.
    #[sea_orm(column_type = "JsonBinary")]
    pub skills: Json,

    /// Resume document URL, students only.
    pub resume_url: Option<String>,

    /// Upload filename of the current resume.
    pub resume_original_name: Option<String>,

    /// Avatar URL. Seeded with a placeholder at registration, replaced by
    /// uploads afterwards.
    pub profile_photo_url: String,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
