// src/db/notification_repo.rs

use sqlx::{Executor, PgPool, Postgres};

use crate::{
    common::{db_utils::missing_reference, error::AppError},
    models::appointments::Notification,
};

#[derive(Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        recipient_user_id: i64,
        message: &str,
        link_url: Option<&str>,
    ) -> Result<Notification, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notifications (recipient_user_id, message, link_url)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(recipient_user_id)
        .bind(message)
        .bind(link_url)
        .fetch_one(executor)
        .await
        .map_err(|e| missing_reference(e, "Recipient"))
    }

    // Newest first
    pub async fn list_for_recipient(&self, recipient_user_id: i64) -> Result<Vec<Notification>, AppError> {
        let notifications = sqlx::query_as::<_, Notification>(
            r#"
            SELECT * FROM notifications
            WHERE recipient_user_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(recipient_user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(notifications)
    }

    /// Scoped to the recipient so nobody can flip someone else's notification.
    pub async fn mark_read(&self, id: i64, recipient_user_id: i64) -> Result<Option<Notification>, AppError> {
        let notification = sqlx::query_as::<_, Notification>(
            r#"
            UPDATE notifications SET is_read = TRUE
            WHERE id = $1 AND recipient_user_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(recipient_user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(notification)
    }
}
