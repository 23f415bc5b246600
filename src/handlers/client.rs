// src/handlers/client.rs

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::Value;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::{
        documents::Document,
        profile::{
            Asset, AssetInput, ClientSummary, FamilyMember, FamilyMemberInput, IncomeSource, IncomeSourceInput,
            Liability, LiabilityInput, QuestionnaireAnswer, QuestionnaireAnswerInput, Spouse, SpousePayload,
            UpdatePersonalInfoPayload,
        },
        MessageResponse,
    },
};

// =============================================================================
//  PROFILE
// =============================================================================

// GET /api/client/profile
#[utoipa::path(
    get,
    path = "/api/client/profile",
    tag = "Client",
    responses(
        (status = 200, description = "Everything stored about the caller", body = ClientSummary)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_profile(
    State(app_state): State<AppState>,
    AuthenticatedUser(client): AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let summary = app_state.client_service.summary(client.id).await?;

    Ok((StatusCode::OK, Json(summary)))
}

// PUT /api/client/profile/personal
#[utoipa::path(
    put,
    path = "/api/client/profile/personal",
    tag = "Client",
    request_body = UpdatePersonalInfoPayload,
    responses(
        (status = 200, description = "Profile updated", body = MessageResponse),
        (status = 400, description = "No fields to update or invalid data"),
        (status = 404, description = "No profile for the caller")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_personal_info(
    State(app_state): State<AppState>,
    AuthenticatedUser(client): AuthenticatedUser,
    Json(payload): Json<UpdatePersonalInfoPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    app_state.client_service.update_personal_info(client.id, payload).await?;

    Ok((StatusCode::OK, Json(MessageResponse::new("Personal information updated successfully."))))
}

// PUT /api/client/profile/spouse
#[utoipa::path(
    put,
    path = "/api/client/profile/spouse",
    tag = "Client",
    request_body = SpousePayload,
    responses(
        (status = 200, description = "Spouse saved; omitted fields keep their value", body = Spouse),
        (status = 400, description = "No fields to update or invalid data")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_spouse(
    State(app_state): State<AppState>,
    AuthenticatedUser(client): AuthenticatedUser,
    Json(payload): Json<SpousePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let spouse = app_state.client_service.update_spouse(client.id, payload).await?;

    Ok((StatusCode::OK, Json(spouse)))
}

// =============================================================================
//  REPLACE-ALL COLLECTIONS
// =============================================================================

// GET /api/client/profile/family
#[utoipa::path(
    get,
    path = "/api/client/profile/family",
    tag = "Client",
    responses((status = 200, description = "Family members in insertion order", body = Vec<FamilyMember>)),
    security(("api_jwt" = []))
)]
pub async fn list_family(
    State(app_state): State<AppState>,
    AuthenticatedUser(client): AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let rows = app_state.record_service.list::<FamilyMemberInput>(client.id).await?;

    Ok((StatusCode::OK, Json(rows)))
}

// POST /api/client/profile/family
#[utoipa::path(
    post,
    path = "/api/client/profile/family",
    tag = "Client",
    request_body(content = Object, description = "`{ \"family_members\": [FamilyMemberInput] }`; `[]` clears the list"),
    responses(
        (status = 200, description = "Family members replaced", body = MessageResponse),
        (status = 400, description = "Missing, non-list or invalid `family_members`")
    ),
    security(("api_jwt" = []))
)]
pub async fn replace_family(
    State(app_state): State<AppState>,
    AuthenticatedUser(client): AuthenticatedUser,
    Json(payload): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .record_service
        .replace_from_payload::<FamilyMemberInput>(client.id, &payload, "family_members")
        .await?;

    Ok((StatusCode::OK, Json(MessageResponse::new("Family information updated successfully."))))
}

// GET /api/client/profile/income
#[utoipa::path(
    get,
    path = "/api/client/profile/income",
    tag = "Client",
    responses((status = 200, description = "Income sources in insertion order", body = Vec<IncomeSource>)),
    security(("api_jwt" = []))
)]
pub async fn list_income(
    State(app_state): State<AppState>,
    AuthenticatedUser(client): AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let rows = app_state.record_service.list::<IncomeSourceInput>(client.id).await?;

    Ok((StatusCode::OK, Json(rows)))
}

// POST /api/client/profile/income
#[utoipa::path(
    post,
    path = "/api/client/profile/income",
    tag = "Client",
    request_body(content = Object, description = "`{ \"income_sources\": [IncomeSourceInput] }`; `[]` clears the list"),
    responses(
        (status = 200, description = "Income sources replaced", body = MessageResponse),
        (status = 400, description = "Missing, non-list or invalid `income_sources`")
    ),
    security(("api_jwt" = []))
)]
pub async fn replace_income(
    State(app_state): State<AppState>,
    AuthenticatedUser(client): AuthenticatedUser,
    Json(payload): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .record_service
        .replace_from_payload::<IncomeSourceInput>(client.id, &payload, "income_sources")
        .await?;

    Ok((StatusCode::OK, Json(MessageResponse::new("Income sources updated successfully."))))
}

// GET /api/client/profile/assets
#[utoipa::path(
    get,
    path = "/api/client/profile/assets",
    tag = "Client",
    responses((status = 200, description = "Assets in insertion order", body = Vec<Asset>)),
    security(("api_jwt" = []))
)]
pub async fn list_assets(
    State(app_state): State<AppState>,
    AuthenticatedUser(client): AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let rows = app_state.record_service.list::<AssetInput>(client.id).await?;

    Ok((StatusCode::OK, Json(rows)))
}

// POST /api/client/profile/assets
#[utoipa::path(
    post,
    path = "/api/client/profile/assets",
    tag = "Client",
    request_body(content = Object, description = "`{ \"assets\": [AssetInput] }`; `[]` clears the list"),
    responses(
        (status = 200, description = "Assets replaced", body = MessageResponse),
        (status = 400, description = "Missing, non-list or invalid `assets`")
    ),
    security(("api_jwt" = []))
)]
pub async fn replace_assets(
    State(app_state): State<AppState>,
    AuthenticatedUser(client): AuthenticatedUser,
    Json(payload): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .record_service
        .replace_from_payload::<AssetInput>(client.id, &payload, "assets")
        .await?;

    Ok((StatusCode::OK, Json(MessageResponse::new("Assets updated successfully."))))
}

// GET /api/client/profile/liabilities
#[utoipa::path(
    get,
    path = "/api/client/profile/liabilities",
    tag = "Client",
    responses((status = 200, description = "Liabilities in insertion order", body = Vec<Liability>)),
    security(("api_jwt" = []))
)]
pub async fn list_liabilities(
    State(app_state): State<AppState>,
    AuthenticatedUser(client): AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let rows = app_state.record_service.list::<LiabilityInput>(client.id).await?;

    Ok((StatusCode::OK, Json(rows)))
}

// POST /api/client/profile/liabilities
#[utoipa::path(
    post,
    path = "/api/client/profile/liabilities",
    tag = "Client",
    request_body(content = Object, description = "`{ \"liabilities\": [LiabilityInput] }`; `[]` clears the list"),
    responses(
        (status = 200, description = "Liabilities replaced", body = MessageResponse),
        (status = 400, description = "Missing, non-list or invalid `liabilities`")
    ),
    security(("api_jwt" = []))
)]
pub async fn replace_liabilities(
    State(app_state): State<AppState>,
    AuthenticatedUser(client): AuthenticatedUser,
    Json(payload): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .record_service
        .replace_from_payload::<LiabilityInput>(client.id, &payload, "liabilities")
        .await?;

    Ok((StatusCode::OK, Json(MessageResponse::new("Liabilities updated successfully."))))
}

// =============================================================================
//  QUESTIONNAIRE & ONBOARDING
// =============================================================================

// GET /api/client/profile/questionnaire
#[utoipa::path(
    get,
    path = "/api/client/profile/questionnaire",
    tag = "Client",
    responses((status = 200, description = "Stored answers with their questions", body = Vec<QuestionnaireAnswer>)),
    security(("api_jwt" = []))
)]
pub async fn get_questionnaire(
    State(app_state): State<AppState>,
    AuthenticatedUser(client): AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let answers = app_state.client_service.questionnaire(client.id).await?;

    Ok((StatusCode::OK, Json(answers)))
}

// PUT /api/client/profile/questionnaire
#[utoipa::path(
    put,
    path = "/api/client/profile/questionnaire",
    tag = "Client",
    request_body(content = Object, description = "`{ \"answers\": [QuestionnaireAnswerInput] }`; unlisted answers are kept"),
    responses(
        (status = 200, description = "Answers merged", body = MessageResponse),
        (status = 400, description = "Missing, non-list or invalid `answers`"),
        (status = 404, description = "Unknown form field")
    ),
    security(("api_jwt" = []))
)]
pub async fn save_questionnaire(
    State(app_state): State<AppState>,
    AuthenticatedUser(client): AuthenticatedUser,
    Json(payload): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .record_service
        .merge_from_payload::<QuestionnaireAnswerInput>(client.id, &payload, "answers")
        .await?;

    Ok((StatusCode::OK, Json(MessageResponse::new("Questionnaire saved successfully."))))
}

// POST /api/client/profile/submit
#[utoipa::path(
    post,
    path = "/api/client/profile/submit",
    tag = "Client",
    responses(
        (status = 200, description = "Onboarding completed; advisor notified", body = MessageResponse),
        (status = 404, description = "No profile for the caller")
    ),
    security(("api_jwt" = []))
)]
pub async fn submit_onboarding(
    State(app_state): State<AppState>,
    AuthenticatedUser(client): AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    app_state.client_service.submit_onboarding(&client).await?;

    Ok((StatusCode::OK, Json(MessageResponse::new("Onboarding submitted successfully."))))
}

// =============================================================================
//  DOCUMENTS
// =============================================================================

// GET /api/client/documents
#[utoipa::path(
    get,
    path = "/api/client/documents",
    tag = "Client",
    responses((status = 200, description = "Caller's documents, newest first", body = Vec<Document>)),
    security(("api_jwt" = []))
)]
pub async fn list_documents(
    State(app_state): State<AppState>,
    AuthenticatedUser(client): AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let documents = app_state.document_service.list(client.id).await?;

    Ok((StatusCode::OK, Json(documents)))
}

// Only used to describe the multipart body in the API docs
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct UploadDocumentForm {
    #[schema(value_type = String, format = Binary)]
    file: Vec<u8>,
    document_name: Option<String>,
}

// POST /api/client/documents/upload
#[utoipa::path(
    post,
    path = "/api/client/documents/upload",
    tag = "Client",
    request_body(content = UploadDocumentForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Document stored", body = Document),
        (status = 400, description = "Missing or empty `file` part")
    ),
    security(("api_jwt" = []))
)]
pub async fn upload_document(
    State(app_state): State<AppState>,
    AuthenticatedUser(client): AuthenticatedUser,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut file = None;
    let mut document_name = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidPayload(e.body_text()))?
    {
        let part = field.name().map(str::to_owned);
        match part.as_deref() {
            Some("file") => {
                let original_name = field.file_name().unwrap_or("upload").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::InvalidPayload(e.body_text()))?;
                file = Some((original_name, bytes));
            }
            Some("document_name") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::InvalidPayload(e.body_text()))?;
                document_name = Some(text);
            }
            _ => {}
        }
    }

    let (original_name, bytes) =
        file.ok_or_else(|| AppError::InvalidPayload("A 'file' part is required.".to_string()))?;

    let document = app_state
        .document_service
        .store(client.id, &original_name, document_name.as_deref(), &bytes)
        .await?;

    Ok((StatusCode::CREATED, Json(document)))
}
