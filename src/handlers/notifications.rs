// src/handlers/notifications.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    common::error::AppError, config::AppState, middleware::auth::AuthenticatedUser,
    models::appointments::Notification,
};

// GET /api/notifications
#[utoipa::path(
    get,
    path = "/api/notifications",
    tag = "Notifications",
    responses((status = 200, description = "Caller's notifications, newest first", body = Vec<Notification>)),
    security(("api_jwt" = []))
)]
pub async fn list_notifications(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let notifications = app_state.notification_service.list(user.id).await?;

    Ok((StatusCode::OK, Json(notifications)))
}

// PUT /api/notifications/{id}/read
#[utoipa::path(
    put,
    path = "/api/notifications/{id}/read",
    tag = "Notifications",
    params(("id" = i64, Path, description = "Notification id")),
    responses(
        (status = 200, description = "Marked as read", body = Notification),
        (status = 404, description = "Not one of the caller's notifications")
    ),
    security(("api_jwt" = []))
)]
pub async fn mark_read(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let notification = app_state.notification_service.mark_read(user.id, id).await?;

    Ok((StatusCode::OK, Json(notification)))
}
