// src/handlers/forms.rs

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
    models::{
        forms::{
            CreateFieldPayload, CreateOptionPayload, FieldNode, FormField, FormOption, UpdateFieldPayload,
            UpdateOptionPayload,
        },
        MessageResponse,
    },
};

// =============================================================================
//  READ (assembled tree)
// =============================================================================

// GET /api/client/forms/{form_name}
#[utoipa::path(
    get,
    path = "/api/client/forms/{form_name}",
    tag = "Forms",
    params(("form_name" = String, Path, description = "Form name, e.g. investor_profile")),
    responses(
        (status = 200, description = "Active fields as a tree", body = Vec<FieldNode>)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_active_form(
    State(app_state): State<AppState>,
    Path(form_name): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let tree = app_state.form_service.assemble(&form_name, false).await?;

    Ok((StatusCode::OK, Json(tree)))
}

// GET /api/admin/forms/{form_name}
#[utoipa::path(
    get,
    path = "/api/admin/forms/{form_name}",
    tag = "Forms",
    params(("form_name" = String, Path, description = "Form name")),
    responses(
        (status = 200, description = "All fields, inactive included, as a tree", body = Vec<FieldNode>)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_form_for_editing(
    State(app_state): State<AppState>,
    Path(form_name): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let tree = app_state.form_service.assemble(&form_name, true).await?;

    Ok((StatusCode::OK, Json(tree)))
}

// =============================================================================
//  FIELDS
// =============================================================================

// POST /api/admin/forms/{form_name}/fields
#[utoipa::path(
    post,
    path = "/api/admin/forms/{form_name}/fields",
    tag = "Forms",
    request_body = CreateFieldPayload,
    params(("form_name" = String, Path, description = "Form name")),
    responses(
        (status = 201, description = "Field created", body = FormField),
        (status = 400, description = "Invalid data"),
        (status = 404, description = "Parent field not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_field(
    State(app_state): State<AppState>,
    Path(form_name): Path<String>,
    Json(payload): Json<CreateFieldPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let field = app_state.form_service.create_field(&form_name, payload).await?;

    Ok((StatusCode::CREATED, Json(field)))
}

// PUT /api/admin/forms/fields/{id}
#[utoipa::path(
    put,
    path = "/api/admin/forms/fields/{id}",
    tag = "Forms",
    request_body = UpdateFieldPayload,
    params(("id" = i64, Path, description = "Field id")),
    responses(
        (status = 200, description = "Field updated", body = FormField),
        (status = 400, description = "No fields to update"),
        (status = 404, description = "Field not found"),
        (status = 409, description = "Parent would create a cycle")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_field(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateFieldPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let field = app_state.form_service.update_field(id, payload).await?;

    Ok((StatusCode::OK, Json(field)))
}

// DELETE /api/admin/forms/fields/{id}
#[utoipa::path(
    delete,
    path = "/api/admin/forms/fields/{id}",
    tag = "Forms",
    params(("id" = i64, Path, description = "Field id")),
    responses(
        (status = 200, description = "Field, sub-fields and options deleted", body = MessageResponse),
        (status = 404, description = "Field not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_field(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    app_state.form_service.delete_field(id).await?;

    Ok((StatusCode::OK, Json(MessageResponse::new("Field deleted successfully."))))
}

// =============================================================================
//  OPTIONS
// =============================================================================

// POST /api/admin/forms/fields/{id}/options
#[utoipa::path(
    post,
    path = "/api/admin/forms/fields/{id}/options",
    tag = "Forms",
    request_body = CreateOptionPayload,
    params(("id" = i64, Path, description = "Field id")),
    responses(
        (status = 201, description = "Option created", body = FormOption),
        (status = 404, description = "Field not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_option(
    State(app_state): State<AppState>,
    Path(field_id): Path<i64>,
    Json(payload): Json<CreateOptionPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let option = app_state.form_service.create_option(field_id, payload).await?;

    Ok((StatusCode::CREATED, Json(option)))
}

// PUT /api/admin/forms/options/{id}
#[utoipa::path(
    put,
    path = "/api/admin/forms/options/{id}",
    tag = "Forms",
    request_body = UpdateOptionPayload,
    params(("id" = i64, Path, description = "Option id")),
    responses(
        (status = 200, description = "Option updated", body = FormOption),
        (status = 404, description = "Option not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_option(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateOptionPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let option = app_state.form_service.update_option(id, payload).await?;

    Ok((StatusCode::OK, Json(option)))
}

// DELETE /api/admin/forms/options/{id}
#[utoipa::path(
    delete,
    path = "/api/admin/forms/options/{id}",
    tag = "Forms",
    params(("id" = i64, Path, description = "Option id")),
    responses(
        (status = 200, description = "Option deleted", body = MessageResponse),
        (status = 404, description = "Option not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_option(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    app_state.form_service.delete_option(id).await?;

    Ok((StatusCode::OK, Json(MessageResponse::new("Option deleted successfully."))))
}
