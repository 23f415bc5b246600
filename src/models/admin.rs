// src/models/admin.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::models::auth::UserRole;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUserPayload {
    #[validate(email(message = "invalid_email"))]
    #[schema(example = "new.advisor@example.com")]
    pub email: String,

    #[validate(length(min = 8, message = "The password must have at least 8 characters."))]
    pub password: String,

    pub role: UserRole,

    #[validate(length(min = 1, max = 100, message = "required"))]
    pub first_name: String,

    #[validate(length(min = 1, max = 100, message = "required"))]
    pub last_name: String,

    #[validate(length(max = 50))]
    pub phone_number: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateUserPayload {
    pub role: Option<UserRole>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AssignAdvisorPayload {
    #[schema(example = 7)]
    pub advisor_user_id: i64,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct ContentPage {
    pub page_slug: String,
    pub content_html: String,
    pub last_updated_by: Option<i64>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateContentPayload {
    #[validate(length(max = 1000000))]
    pub content_html: String,
}
