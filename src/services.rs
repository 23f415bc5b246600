pub mod admin_service;
pub mod advisor_service;
pub mod appointment_service;
pub mod auth;
pub mod client_service;
pub mod document_service;
pub mod form_service;
pub mod income_tax;
pub mod mailer;
pub mod notification_service;
pub mod record_service;
