// src/handlers/auth.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::{
        auth::{AuthResponse, ChangePasswordPayload, LoginUserPayload, TwoFactorPayload, User},
        MessageResponse,
    },
};

// POST /api/auth/login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginUserPayload,
    responses(
        (status = 200, description = "Signed in", body = AuthResponse),
        (status = 401, description = "Invalid e-mail or password"),
        (status = 403, description = "Account is inactive")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    Json(payload): Json<LoginUserPayload>,
) -> Result<Json<AuthResponse>, AppError> {
    payload.validate()?;

    let response = app_state
        .auth_service
        .login_user(&payload.email, &payload.password)
        .await?;

    Ok(Json(response))
}

// GET /api/users/me
#[utoipa::path(
    get,
    path = "/api/users/me",
    tag = "Users",
    responses(
        (status = 200, description = "Authenticated user", body = User),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_me(AuthenticatedUser(user): AuthenticatedUser) -> Json<User> {
    Json(user)
}

// PUT /api/users/me/password
#[utoipa::path(
    put,
    path = "/api/users/me/password",
    tag = "Users",
    request_body = ChangePasswordPayload,
    responses(
        (status = 200, description = "Password changed", body = MessageResponse),
        (status = 400, description = "Invalid data"),
        (status = 403, description = "Current password is incorrect")
    ),
    security(("api_jwt" = []))
)]
pub async fn change_password(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<ChangePasswordPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    app_state
        .auth_service
        .change_password(&user, &payload.current_password, &payload.new_password)
        .await?;

    Ok((StatusCode::OK, Json(MessageResponse::new("Password changed successfully."))))
}

// PUT /api/users/me/two-factor
#[utoipa::path(
    put,
    path = "/api/users/me/two-factor",
    tag = "Users",
    request_body = TwoFactorPayload,
    responses(
        (status = 200, description = "Two-factor flag stored", body = MessageResponse)
    ),
    security(("api_jwt" = []))
)]
pub async fn set_two_factor(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<TwoFactorPayload>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .auth_service
        .set_two_factor(user.id, payload.enabled)
        .await?;

    let message = if payload.enabled {
        "Two-factor authentication enabled."
    } else {
        "Two-factor authentication disabled."
    };

    Ok((StatusCode::OK, Json(MessageResponse::new(message))))
}
