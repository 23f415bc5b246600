// src/services/notification_service.rs

use crate::{common::error::AppError, db::NotificationRepository, models::appointments::Notification};

#[derive(Clone)]
pub struct NotificationService {
    repo: NotificationRepository,
}

impl NotificationService {
    pub fn new(repo: NotificationRepository) -> Self {
        Self { repo }
    }

    pub async fn list(&self, user_id: i64) -> Result<Vec<Notification>, AppError> {
        self.repo.list_for_recipient(user_id).await
    }

    pub async fn mark_read(&self, user_id: i64, id: i64) -> Result<Notification, AppError> {
        self.repo
            .mark_read(id, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Notification not found.".to_string()))
    }
}
