use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

pub const STATUS_OPEN: &str = "open";
pub const STATUS_CLOSED: &str = "closed";

pub const JOB_TYPES: [&str; 3] = ["full-time", "part-time", "internship"];

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "job")]
pub struct Model {
    /// UUIDv7 primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub title: String,

    /// At most 1000 characters, enforced at the API boundary.
    pub description: String,

    /// Requirement lines stored as a JSON array of strings.
    #[sea_orm(column_type = "JsonBinary")]
    pub requirements: Json,

    /// Must be positive.
    pub salary: i64,

    pub location: String,

    /// One of: full-time, part-time, internship.
    pub job_type: String,

    pub position: String,

    pub experience: String,

    /// "open" accepts applications; "closed" rejects new ones.
    pub status: String,

    /// Company the posting belongs to. Plain reference: companies can be
    /// deleted without cascading into their postings.
    pub company_id: Uuid,

    /// Recruiter who created the posting; gates applicant visibility and
    /// status updates.
    pub created_by: Uuid,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
