// src/models/clients.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

// Row of the advisor's client list
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct ClientListEntry {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_active: bool,
    pub onboarding_status: String,
    pub tier: Option<String>,
    pub advisor_name: String,
    pub next_appointment: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateClientPayload {
    #[validate(email(message = "invalid_email"))]
    #[schema(example = "client@example.com")]
    pub email: String,

    #[validate(length(min = 1, max = 100, message = "required"))]
    pub first_name: String,

    #[validate(length(min = 1, max = 100, message = "required"))]
    pub last_name: String,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct CreatedClient {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_active: bool,
    pub tier: Option<String>,
    pub onboarding_status: String,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateClientPayload {
    #[validate(length(min = 1, max = 50))]
    #[schema(example = "Gold")]
    pub tier: Option<String>,
    pub is_active: Option<bool>,
}
