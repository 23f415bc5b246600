pub mod user_repo;
pub use user_repo::UserRepository;
pub mod client_repo;
pub use client_repo::ClientRepository;
pub mod record_repo;
pub use record_repo::{KeyedRecord, OwnedRecord, RecordRepository};
pub mod form_repo;
pub use form_repo::FormRepository;
pub mod appointment_repo;
pub use appointment_repo::AppointmentRepository;
pub mod notification_repo;
pub use notification_repo::NotificationRepository;
pub mod document_repo;
pub use document_repo::DocumentRepository;
pub mod content_repo;
pub use content_repo::ContentRepository;
pub mod plan_repo;
pub use plan_repo::PlanRepository;
