use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::company;
use crate::error::AppError;

/// Request body for registering a company.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateCompanyRequest {
    #[schema(example = "Acme Corp")]
    pub name: String,
}

pub fn validate_create_company(payload: &CreateCompanyRequest) -> Result<(), AppError> {
    if payload.name.trim().is_empty() {
        return Err(AppError::Validation("Please provide a company name".into()));
    }
    if payload.name.trim().chars().count() > 256 {
        return Err(AppError::Validation(
            "Company name must be 1-256 characters".into(),
        ));
    }
    Ok(())
}

/// Validate an http(s) website URL.
pub fn validate_website(url: &str) -> Result<(), AppError> {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"));
    match rest {
        Some(host) if !host.is_empty() && !host.chars().any(char::is_whitespace) => Ok(()),
        _ => Err(AppError::Validation("Invalid URL format".into())),
    }
}

/// Company payload including the owner, for the owner-facing endpoints.
#[derive(Serialize, utoipa::ToSchema)]
pub struct CompanyResponse {
    pub id: Uuid,
    #[schema(example = "Acme Corp")]
    pub name: String,
    pub description: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
    pub logo_url: Option<String>,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<company::Model> for CompanyResponse {
    fn from(company: company::Model) -> Self {
        Self {
            id: company.id,
            name: company.name,
            description: company.description,
            website: company.website,
            location: company.location,
            logo_url: company.logo_url,
            owner_id: company.owner_id,
            created_at: company.created_at,
            updated_at: company.updated_at,
        }
    }
}

/// Company payload for the public listing; the owner is omitted.
#[derive(Serialize, utoipa::ToSchema)]
pub struct PublicCompanyResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
    pub logo_url: Option<String>,
}

impl From<company::Model> for PublicCompanyResponse {
    fn from(company: company::Model) -> Self {
        Self {
            id: company.id,
            name: company.name,
            description: company.description,
            website: company.website,
            location: company.location,
            logo_url: company.logo_url,
        }
    }
}

/// Query parameters for the public company listing.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct CompanyListQuery {
    /// Case-insensitive name filter.
    pub name: Option<String>,
    /// One of: name, location, created_at. Defaults to name.
    pub sort_by: Option<String>,
    /// "asc" (default) or "desc".
    pub sort_order: Option<String>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct CompanyListResponse {
    #[schema(example = "Companies retrieved successfully")]
    pub message: String,
    #[schema(example = 3)]
    pub total: u64,
    pub companies: Vec<PublicCompanyResponse>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct MyCompanyListResponse {
    #[schema(example = "Companies retrieved successfully")]
    pub message: String,
    #[schema(example = 1)]
    pub total: u64,
    pub companies: Vec<CompanyResponse>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct SingleCompanyResponse {
    #[schema(example = "Company retrieved successfully")]
    pub message: String,
    pub company: CompanyResponse,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn website_validation() {
        assert!(validate_website("https://acme.example").is_ok());
        assert!(validate_website("http://acme.example/careers").is_ok());
        assert!(validate_website("ftp://acme.example").is_err());
        assert!(validate_website("acme.example").is_err());
        assert!(validate_website("https://").is_err());
        assert!(validate_website("https://with space").is_err());
    }

    #[test]
    fn company_name_required() {
        let payload = CreateCompanyRequest { name: "  ".into() };
        assert!(validate_create_company(&payload).is_err());
    }
}
