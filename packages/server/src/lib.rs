pub mod assets;
pub mod config;
pub mod database;
pub mod entity;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod state;
pub mod utils;

use axum::Json;
use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use tower_http::cors::{Any, CorsLayer};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_axum::router::OpenApiRouter;
use utoipa_scalar::{Scalar, Servable as ScalarServable};
use utoipa_swagger_ui::SwaggerUi;

use crate::config::CorsConfig;
use crate::models::shared::MessageResponse;
use crate::state::AppState;

/// Request body ceiling: the 10 MiB asset limit plus multipart overhead.
const MAX_REQUEST_BODY: usize = 12 * 1024 * 1024;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Job Portal API",
        version = "1.0.0",
        description = "API for the job portal: accounts, companies, job postings, applications"
    ),
    tags(
        (name = "Auth", description = "Authentication and profile management"),
        (name = "Users", description = "User directory and administration"),
        (name = "Companies", description = "Company records and logos"),
        (name = "Jobs", description = "Job posting CRUD"),
        (name = "Applications", description = "Application lifecycle"),
    ),
    modifiers(&SecurityAddon),
)]
struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_default();
        components.add_security_scheme(
            "jwt",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some(
                        "Also accepted as the httpOnly `token` cookie set at login",
                    ))
                    .build(),
            ),
        );
    }
}

/// Build the application router.
pub fn build_router(state: AppState) -> axum::Router {
    let cors = cors_layer(&state.config.server.cors);

    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .nest("/api", routes::api_routes())
        .split_for_parts();

    router
        .route("/", axum::routing::get(root))
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY))
        .layer(cors)
        .with_state(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api.clone()))
        .merge(Scalar::with_url("/scalar", api))
}

async fn root() -> Json<MessageResponse> {
    Json(MessageResponse::new("API running"))
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(std::time::Duration::from_secs(config.max_age));

    if config.allow_origins.iter().any(|origin| origin == "*") {
        layer.allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .allow_origins
            .iter()
            .filter_map(|origin| match origin.parse() {
                Ok(value) => Some(value),
                Err(e) => {
                    tracing::warn!("ignoring invalid CORS origin {origin}: {e}");
                    None
                }
            })
            .collect();
        layer.allow_origin(origins)
    }
}
