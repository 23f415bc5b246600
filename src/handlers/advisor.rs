// src/handlers/advisor.rs

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::{
        appointments::{Appointment, NextAppointment, ScheduleAppointmentPayload},
        clients::{ClientListEntry, CreateClientPayload, CreatedClient, UpdateClientPayload},
        dashboard::DashboardStats,
        plans::{CreatePlanPayload, FinancialPlan},
        profile::ClientSummary,
        tools::{IncomeTaxPayload, IncomeTaxReport},
    },
    services::income_tax::income_tax_report,
};

// GET /api/advisor/clients
#[utoipa::path(
    get,
    path = "/api/advisor/clients",
    tag = "Advisor",
    responses(
        (status = 200, description = "Clients assigned to the caller", body = Vec<ClientListEntry>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_clients(
    State(app_state): State<AppState>,
    AuthenticatedUser(advisor): AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let clients = app_state.advisor_service.list_clients(advisor.id).await?;

    Ok((StatusCode::OK, Json(clients)))
}

// POST /api/advisor/clients
#[utoipa::path(
    post,
    path = "/api/advisor/clients",
    tag = "Advisor",
    request_body = CreateClientPayload,
    responses(
        (status = 201, description = "Client created and assigned to the caller", body = CreatedClient),
        (status = 400, description = "Invalid data"),
        (status = 409, description = "E-mail already registered")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_client(
    State(app_state): State<AppState>,
    AuthenticatedUser(advisor): AuthenticatedUser,
    Json(payload): Json<CreateClientPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let client = app_state.advisor_service.create_client(&advisor, payload).await?;

    Ok((StatusCode::CREATED, Json(client)))
}

// GET /api/advisor/clients/{id}
#[utoipa::path(
    get,
    path = "/api/advisor/clients/{id}",
    tag = "Advisor",
    params(("id" = i64, Path, description = "Client user id")),
    responses(
        (status = 200, description = "Full client file", body = ClientSummary),
        (status = 404, description = "Client not found or not assigned to the caller")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_client(
    State(app_state): State<AppState>,
    AuthenticatedUser(advisor): AuthenticatedUser,
    Path(client_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let summary = app_state.advisor_service.client_summary(advisor.id, client_id).await?;

    Ok((StatusCode::OK, Json(summary)))
}

// PUT /api/advisor/clients/{id}
#[utoipa::path(
    put,
    path = "/api/advisor/clients/{id}",
    tag = "Advisor",
    request_body = UpdateClientPayload,
    params(("id" = i64, Path, description = "Client user id")),
    responses(
        (status = 200, description = "Client updated", body = CreatedClient),
        (status = 404, description = "Client not found or not assigned to the caller")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_client(
    State(app_state): State<AppState>,
    AuthenticatedUser(advisor): AuthenticatedUser,
    Path(client_id): Path<i64>,
    Json(payload): Json<UpdateClientPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let client = app_state
        .advisor_service
        .update_client(advisor.id, client_id, payload)
        .await?;

    Ok((StatusCode::OK, Json(client)))
}

// POST /api/advisor/appointments
#[utoipa::path(
    post,
    path = "/api/advisor/appointments",
    tag = "Advisor",
    request_body = ScheduleAppointmentPayload,
    responses(
        (status = 201, description = "Appointment scheduled and client notified", body = Appointment),
        (status = 400, description = "Invalid data or time range"),
        (status = 403, description = "Client not assigned to the caller")
    ),
    security(("api_jwt" = []))
)]
pub async fn schedule_appointment(
    State(app_state): State<AppState>,
    AuthenticatedUser(advisor): AuthenticatedUser,
    Json(payload): Json<ScheduleAppointmentPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let appointment = app_state.appointment_service.schedule(&advisor, payload).await?;

    Ok((StatusCode::CREATED, Json(appointment)))
}

// GET /api/advisor/dashboard/next-appointment
#[utoipa::path(
    get,
    path = "/api/advisor/dashboard/next-appointment",
    tag = "Advisor",
    responses(
        (status = 200, description = "Next upcoming appointment (null when none)", body = NextAppointment)
    ),
    security(("api_jwt" = []))
)]
pub async fn next_appointment(
    State(app_state): State<AppState>,
    AuthenticatedUser(advisor): AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let next = app_state.advisor_service.next_appointment(advisor.id).await?;

    Ok((StatusCode::OK, Json(next)))
}

// GET /api/advisor/dashboard/stats
#[utoipa::path(
    get,
    path = "/api/advisor/dashboard/stats",
    tag = "Advisor",
    responses(
        (status = 200, description = "Client counts by tier and onboarding status, this week's appointments per day, meetings today", body = DashboardStats)
    ),
    security(("api_jwt" = []))
)]
pub async fn dashboard_stats(
    State(app_state): State<AppState>,
    AuthenticatedUser(advisor): AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let stats = app_state.advisor_service.dashboard_stats(advisor.id, Utc::now()).await?;

    Ok((StatusCode::OK, Json(stats)))
}

// POST /api/advisor/tools/income-tax
#[utoipa::path(
    post,
    path = "/api/advisor/tools/income-tax",
    tag = "Advisor",
    request_body = IncomeTaxPayload,
    responses(
        (status = 200, description = "Federal income tax estimate", body = IncomeTaxReport),
        (status = 400, description = "Negative amounts")
    ),
    security(("api_jwt" = []))
)]
pub async fn income_tax_tool(
    AuthenticatedUser(_advisor): AuthenticatedUser,
    Json(payload): Json<IncomeTaxPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    Ok((StatusCode::OK, Json(income_tax_report(payload))))
}

// GET /api/advisor/clients/{id}/plans
#[utoipa::path(
    get,
    path = "/api/advisor/clients/{id}/plans",
    tag = "Advisor",
    params(("id" = i64, Path, description = "Client user id")),
    responses(
        (status = 200, description = "The client's plans, newest first", body = Vec<FinancialPlan>),
        (status = 404, description = "Client not assigned to the caller")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_plans(
    State(app_state): State<AppState>,
    AuthenticatedUser(advisor): AuthenticatedUser,
    Path(client_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let plans = app_state.advisor_service.list_plans(advisor.id, client_id).await?;

    Ok((StatusCode::OK, Json(plans)))
}

// POST /api/advisor/clients/{id}/plans
#[utoipa::path(
    post,
    path = "/api/advisor/clients/{id}/plans",
    tag = "Advisor",
    params(("id" = i64, Path, description = "Client user id")),
    request_body = CreatePlanPayload,
    responses(
        (status = 201, description = "Plan saved as a draft", body = FinancialPlan),
        (status = 400, description = "Missing name or plan data"),
        (status = 403, description = "Client not assigned to the caller")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_plan(
    State(app_state): State<AppState>,
    AuthenticatedUser(advisor): AuthenticatedUser,
    Path(client_id): Path<i64>,
    Json(payload): Json<CreatePlanPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let plan = app_state.advisor_service.create_plan(advisor.id, client_id, payload).await?;

    Ok((StatusCode::CREATED, Json(plan)))
}

// GET /api/advisor/clients/{id}/documents/{document_id}
#[utoipa::path(
    get,
    path = "/api/advisor/clients/{id}/documents/{document_id}",
    tag = "Advisor",
    params(
        ("id" = i64, Path, description = "Client user id"),
        ("document_id" = i64, Path, description = "Document id")
    ),
    responses(
        (status = 200, description = "Stored file", content_type = "application/octet-stream"),
        (status = 403, description = "Client not assigned to the caller"),
        (status = 404, description = "Document not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn download_document(
    State(app_state): State<AppState>,
    AuthenticatedUser(advisor): AuthenticatedUser,
    Path((client_id, document_id)): Path<(i64, i64)>,
) -> Result<impl IntoResponse, AppError> {
    let document = app_state
        .advisor_service
        .client_document(advisor.id, client_id, document_id)
        .await?;
    let bytes = app_state.document_service.read(&document).await?;

    // Header values must stay visible ASCII
    let file_name: String = document
        .document_name
        .chars()
        .filter(|c| (c.is_ascii_graphic() || *c == ' ') && *c != '"')
        .collect();
    let disposition = format!("attachment; filename=\"{file_name}\"");

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/octet-stream".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    ))
}
