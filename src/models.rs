pub mod admin;
pub mod appointments;
pub mod auth;
pub mod clients;
pub mod dashboard;
pub mod documents;
pub mod forms;
pub mod plans;
pub mod profile;
pub mod tools;

use serde::Serialize;
use utoipa::ToSchema;

/// `{ "message": ... }` body returned by write endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}
