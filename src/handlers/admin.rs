// src/handlers/admin.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::{
        admin::{AssignAdvisorPayload, ContentPage, CreateUserPayload, UpdateContentPayload, UpdateUserPayload},
        auth::User,
        MessageResponse,
    },
};

// =============================================================================
//  USERS
// =============================================================================

// POST /api/admin/users
#[utoipa::path(
    post,
    path = "/api/admin/users",
    tag = "Admin",
    request_body = CreateUserPayload,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 400, description = "Invalid data"),
        (status = 409, description = "E-mail already registered")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_user(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateUserPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let user = app_state.admin_service.create_user(payload).await?;

    Ok((StatusCode::CREATED, Json(user)))
}

// GET /api/admin/users
#[utoipa::path(
    get,
    path = "/api/admin/users",
    tag = "Admin",
    responses(
        (status = 200, description = "All users, newest first", body = Vec<User>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_users(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let users = app_state.admin_service.list_users().await?;

    Ok((StatusCode::OK, Json(users)))
}

// PUT /api/admin/users/{id}
#[utoipa::path(
    put,
    path = "/api/admin/users/{id}",
    tag = "Admin",
    request_body = UpdateUserPayload,
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "User updated", body = User),
        (status = 400, description = "No fields to update"),
        (status = 404, description = "User not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_user(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateUserPayload>,
) -> Result<impl IntoResponse, AppError> {
    let user = app_state.admin_service.update_user(id, payload).await?;

    Ok((StatusCode::OK, Json(user)))
}

// DELETE /api/admin/users/{id}
#[utoipa::path(
    delete,
    path = "/api/admin/users/{id}",
    tag = "Admin",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "User and owned records deleted", body = MessageResponse),
        (status = 404, description = "User not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_user(
    State(app_state): State<AppState>,
    AuthenticatedUser(admin): AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    app_state.admin_service.delete_user(&admin, id).await?;

    Ok((StatusCode::OK, Json(MessageResponse::new("User deleted successfully."))))
}

// POST /api/admin/clients/{id}/assign
#[utoipa::path(
    post,
    path = "/api/admin/clients/{id}/assign",
    tag = "Admin",
    request_body = AssignAdvisorPayload,
    params(("id" = i64, Path, description = "Client user id")),
    responses(
        (status = 200, description = "Advisor assigned", body = MessageResponse),
        (status = 400, description = "Target user is not an advisor"),
        (status = 404, description = "Client not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn assign_advisor(
    State(app_state): State<AppState>,
    Path(client_id): Path<i64>,
    Json(payload): Json<AssignAdvisorPayload>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .admin_service
        .assign_advisor(client_id, payload.advisor_user_id)
        .await?;

    Ok((StatusCode::OK, Json(MessageResponse::new("Advisor assigned successfully."))))
}

// =============================================================================
//  CONTENT GOVERNANCE
// =============================================================================

// GET /api/admin/content/{slug}
#[utoipa::path(
    get,
    path = "/api/admin/content/{slug}",
    tag = "Admin",
    params(("slug" = String, Path, description = "Page slug")),
    responses(
        (status = 200, description = "Page content (empty when never saved)", body = ContentPage)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_content(
    State(app_state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let page = app_state.admin_service.content(&slug).await?;

    Ok((StatusCode::OK, Json(page)))
}

// PUT /api/admin/content/{slug}
#[utoipa::path(
    put,
    path = "/api/admin/content/{slug}",
    tag = "Admin",
    request_body = UpdateContentPayload,
    params(("slug" = String, Path, description = "Page slug")),
    responses(
        (status = 200, description = "Page saved", body = ContentPage)
    ),
    security(("api_jwt" = []))
)]
pub async fn update_content(
    State(app_state): State<AppState>,
    AuthenticatedUser(admin): AuthenticatedUser,
    Path(slug): Path<String>,
    Json(payload): Json<UpdateContentPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let page = app_state
        .admin_service
        .update_content(&admin, &slug, &payload.content_html)
        .await?;

    Ok((StatusCode::OK, Json(page)))
}
