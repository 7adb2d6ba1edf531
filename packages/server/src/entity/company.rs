use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "company")]
pub struct Model {
    /// UUIDv7 primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[sea_orm(unique)]
    pub name: String,

    pub description: Option<String>,

    /// http(s) URL, validated at the API boundary.
    pub website: Option<String>,

    pub location: Option<String>,

    /// Company logo URL, managed by the asset replacement flow.
    pub logo_url: Option<String>,

    /// Owning recruiter. Plain reference, not a foreign key: company rows
    /// may outlive their owner and vice versa (document-store heritage).
    pub owner_id: Uuid,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
