// src/middleware/roles.rs

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::{common::error::AppError, middleware::auth::AuthenticatedUser, models::auth::UserRole};

/// Lets the request through only when the authenticated user has `role`.
///
/// Mount it inside `auth_guard`:
/// `from_fn_with_state(UserRole::Admin, require_role)`.
pub async fn require_role(
    State(role): State<UserRole>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let AuthenticatedUser(user) = request
        .extensions()
        .get::<AuthenticatedUser>()
        .ok_or(AppError::InvalidToken)?;

    if user.role != role {
        return Err(AppError::Forbidden(format!(
            "This area is restricted to the {} role.",
            role.as_str()
        )));
    }

    Ok(next.run(request).await)
}
