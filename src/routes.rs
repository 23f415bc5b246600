// src/routes.rs

use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    config::AppState,
    docs::ApiDoc,
    handlers,
    middleware::{auth::auth_guard, roles::require_role},
    models::auth::UserRole,
};

const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

pub fn build_router(app_state: AppState) -> Router {
    // Public
    let auth_routes = Router::new().route("/login", post(handlers::auth::login));

    // Any signed-in user
    let user_routes = Router::new()
        .route("/me", get(handlers::auth::get_me))
        .route("/me/password", put(handlers::auth::change_password))
        .route("/me/two-factor", put(handlers::auth::set_two_factor));

    let admin_routes = Router::new()
        .route(
            "/users",
            post(handlers::admin::create_user).get(handlers::admin::list_users),
        )
        .route(
            "/users/{id}",
            put(handlers::admin::update_user).delete(handlers::admin::delete_user),
        )
        .route("/clients/{id}/assign", post(handlers::admin::assign_advisor))
        .route("/forms/{form_name}", get(handlers::forms::get_form_for_editing))
        .route("/forms/{form_name}/fields", post(handlers::forms::create_field))
        .route(
            "/forms/fields/{id}",
            put(handlers::forms::update_field).delete(handlers::forms::delete_field),
        )
        .route("/forms/fields/{id}/options", post(handlers::forms::create_option))
        .route(
            "/forms/options/{id}",
            put(handlers::forms::update_option).delete(handlers::forms::delete_option),
        )
        .route(
            "/content/{slug}",
            get(handlers::admin::get_content).put(handlers::admin::update_content),
        )
        .layer(axum_middleware::from_fn_with_state(UserRole::Admin, require_role));

    let advisor_routes = Router::new()
        .route(
            "/clients",
            get(handlers::advisor::list_clients).post(handlers::advisor::create_client),
        )
        .route(
            "/clients/{id}",
            get(handlers::advisor::get_client).put(handlers::advisor::update_client),
        )
        .route(
            "/clients/{id}/documents/{document_id}",
            get(handlers::advisor::download_document),
        )
        .route(
            "/clients/{id}/plans",
            get(handlers::advisor::list_plans).post(handlers::advisor::create_plan),
        )
        .route("/appointments", post(handlers::advisor::schedule_appointment))
        .route("/dashboard/next-appointment", get(handlers::advisor::next_appointment))
        .route("/dashboard/stats", get(handlers::advisor::dashboard_stats))
        .route("/tools/income-tax", post(handlers::advisor::income_tax_tool))
        .layer(axum_middleware::from_fn_with_state(UserRole::Advisor, require_role));

    let client_routes = Router::new()
        .route("/profile", get(handlers::client::get_profile))
        .route("/profile/personal", put(handlers::client::update_personal_info))
        .route("/profile/spouse", put(handlers::client::update_spouse))
        .route(
            "/profile/family",
            get(handlers::client::list_family).post(handlers::client::replace_family),
        )
        .route(
            "/profile/income",
            get(handlers::client::list_income).post(handlers::client::replace_income),
        )
        .route(
            "/profile/assets",
            get(handlers::client::list_assets).post(handlers::client::replace_assets),
        )
        .route(
            "/profile/liabilities",
            get(handlers::client::list_liabilities).post(handlers::client::replace_liabilities),
        )
        .route(
            "/profile/questionnaire",
            get(handlers::client::get_questionnaire).put(handlers::client::save_questionnaire),
        )
        .route("/profile/submit", post(handlers::client::submit_onboarding))
        .route("/forms/{form_name}", get(handlers::forms::get_active_form))
        .route("/documents", get(handlers::client::list_documents))
        .route(
            "/documents/upload",
            post(handlers::client::upload_document).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .layer(axum_middleware::from_fn_with_state(UserRole::Client, require_role));

    // Role checks run inside the token check
    let protected_routes = Router::new()
        .nest("/api/users", user_routes)
        .nest("/api/admin", admin_routes)
        .nest("/api/advisor", advisor_routes)
        .nest("/api/client", client_routes)
        .route("/api/notifications", get(handlers::notifications::list_notifications))
        .route("/api/notifications/{id}/read", put(handlers::notifications::mark_read))
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .merge(protected_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(app_state)
}
