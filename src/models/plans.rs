// src/models/plans.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

pub const PLAN_STATUS_DRAFT: &str = "Draft";

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct FinancialPlan {
    pub id: i64,
    pub client_user_id: i64,
    pub advisor_user_id: Option<i64>,
    pub plan_name: String,
    #[schema(value_type = Object)]
    pub plan_data: Value,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreatePlanPayload {
    #[validate(length(min = 1, max = 255, message = "required"))]
    #[schema(example = "2025 tax projection")]
    pub plan_name: String,

    // Usually a tool result, stored as given
    #[serde(alias = "plan_data_json")]
    #[validate(custom(function = "structured_document"))]
    #[schema(value_type = Object)]
    pub plan_data: Value,
}

fn structured_document(value: &Value) -> Result<(), ValidationError> {
    let non_empty = match value {
        Value::Object(map) => !map.is_empty(),
        Value::Array(items) => !items.is_empty(),
        _ => false,
    };

    if non_empty {
        Ok(())
    } else {
        let mut err = ValidationError::new("required");
        err.message = Some("plan_data must be a non-empty object or list.".into());
        Err(err)
    }
}
