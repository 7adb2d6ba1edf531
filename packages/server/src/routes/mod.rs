use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers;
use crate::state::AppState;

pub fn api_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/auth", auth_routes())
        .nest("/company", company_routes())
        .nest("/job", job_routes())
        .nest("/applications", application_routes())
}

fn auth_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::auth::register))
        .routes(routes!(handlers::auth::login))
        .routes(routes!(handlers::auth::logout))
        .routes(routes!(handlers::auth::get_profile))
        .routes(routes!(handlers::auth::update_profile))
        .routes(routes!(handlers::user::list_students))
        .routes(routes!(handlers::user::delete_student))
        .routes(routes!(handlers::user::admin_list_users))
}

fn company_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::company::create_company))
        .routes(routes!(handlers::company::list_companies))
        .routes(routes!(
            handlers::company::get_company,
            handlers::company::update_company,
            handlers::company::delete_company
        ))
        .routes(routes!(handlers::company::list_my_companies))
        .routes(routes!(handlers::company::get_my_company))
}

fn job_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::job::create_job))
        .routes(routes!(handlers::job::list_jobs))
        .routes(routes!(
            handlers::job::get_job,
            handlers::job::update_job,
            handlers::job::delete_job
        ))
        .routes(routes!(handlers::job::list_my_jobs))
        .routes(routes!(handlers::job::get_my_job))
}

fn application_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::application::apply_for_job))
        .routes(routes!(handlers::application::list_my_applications))
        .routes(routes!(handlers::application::list_applications_for_my_jobs))
        .routes(routes!(handlers::application::list_applicants_for_job))
        .routes(routes!(handlers::application::update_application_status))
}
