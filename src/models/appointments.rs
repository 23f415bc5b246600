// src/models/appointments.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Appointment {
    pub id: i64,
    pub advisor_user_id: i64,
    pub client_user_id: i64,
    pub title: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub notes: Option<String>,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct NextAppointment {
    pub id: i64,
    pub title: String,
    pub start_time: DateTime<Utc>,
    pub client_name: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_time_range", skip_on_field_errors = false))]
pub struct ScheduleAppointmentPayload {
    #[schema(example = 42)]
    pub client_user_id: i64,

    #[validate(length(min = 1, max = 255, message = "required"))]
    #[schema(example = "Annual review")]
    pub title: String,

    // ISO 8601; a trailing `Z` is accepted
    #[schema(example = "2025-03-01T14:00:00Z")]
    pub start_time: DateTime<Utc>,

    #[schema(example = "2025-03-01T15:00:00Z")]
    pub end_time: DateTime<Utc>,

    #[validate(length(max = 5000))]
    pub notes: Option<String>,
}

fn validate_time_range(payload: &ScheduleAppointmentPayload) -> Result<(), ValidationError> {
    if payload.end_time <= payload.start_time {
        let mut err = ValidationError::new("invalid_time_range");
        err.message = Some("end_time must be after start_time.".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Notification {
    pub id: i64,
    pub recipient_user_id: i64,
    pub message: String,
    pub link_url: Option<String>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn end_before_start_is_invalid() {
        let payload: ScheduleAppointmentPayload = serde_json::from_str(
            r#"{"client_user_id":1,"title":"Review",
                "start_time":"2025-03-01T15:00:00Z","end_time":"2025-03-01T14:00:00Z"}"#,
        )
        .unwrap();
        let errors = payload.validate().unwrap_err();
        assert!(errors.errors().contains_key("__all__"));
    }

    #[test]
    fn offsets_are_normalized_to_utc() {
        let payload: ScheduleAppointmentPayload = serde_json::from_str(
            r#"{"client_user_id":1,"title":"Review",
                "start_time":"2025-03-01T10:00:00-04:00","end_time":"2025-03-01T15:00:00Z"}"#,
        )
        .unwrap();
        assert!(payload.validate().is_ok());
        assert_eq!(payload.start_time.to_rfc3339(), "2025-03-01T14:00:00+00:00");
    }
}
