// src/models/documents.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Document {
    pub id: i64,
    pub client_user_id: i64,
    pub document_name: String,
    #[serde(skip_serializing)]
    #[schema(ignore)]
    pub file_path: String,
    pub uploaded_at: DateTime<Utc>,
}
