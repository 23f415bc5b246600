pub mod admin;
pub mod advisor;
pub mod auth;
pub mod client;
pub mod forms;
pub mod notifications;
