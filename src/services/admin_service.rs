// src/services/admin_service.rs

use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::{ClientRepository, ContentRepository, UserRepository},
    models::{
        admin::{ContentPage, CreateUserPayload, UpdateUserPayload},
        auth::{User, UserRole},
    },
    services::{advisor_service::ONBOARDING_IN_PROGRESS, auth::hash_password},
};

#[derive(Clone)]
pub struct AdminService {
    pool: PgPool,
    user_repo: UserRepository,
    client_repo: ClientRepository,
    content_repo: ContentRepository,
}

impl AdminService {
    pub fn new(
        pool: PgPool,
        user_repo: UserRepository,
        client_repo: ClientRepository,
        content_repo: ContentRepository,
    ) -> Self {
        Self {
            pool,
            user_repo,
            client_repo,
            content_repo,
        }
    }

    // =========================================================================
    //  USERS
    // =========================================================================

    /// Client accounts get their empty profile in the same transaction.
    pub async fn create_user(&self, payload: CreateUserPayload) -> Result<User, AppError> {
        let password_hash = hash_password(&payload.password).await?;

        let mut tx = self.pool.begin().await?;

        let user = self
            .user_repo
            .create_user(
                &mut *tx,
                &payload.email,
                &password_hash,
                payload.role,
                &payload.first_name,
                &payload.last_name,
                payload.phone_number.as_deref(),
            )
            .await?;

        if user.role == UserRole::Client {
            self.client_repo
                .create_profile(&mut *tx, user.id, ONBOARDING_IN_PROGRESS)
                .await?;
        }

        tx.commit().await?;

        tracing::info!(user_id = user.id, role = user.role.as_str(), "User created");
        Ok(user)
    }

    pub async fn list_users(&self) -> Result<Vec<User>, AppError> {
        self.user_repo.list_users().await
    }

    pub async fn update_user(&self, id: i64, changes: UpdateUserPayload) -> Result<User, AppError> {
        if changes.role.is_none() && changes.is_active.is_none() {
            return Err(AppError::InvalidPayload("No fields to update.".to_string()));
        }

        self.user_repo
            .update_role_and_status(id, changes.role, changes.is_active)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found.".to_string()))
    }

    pub async fn delete_user(&self, admin: &User, id: i64) -> Result<(), AppError> {
        if admin.id == id {
            return Err(AppError::InvalidPayload("You cannot delete your own account.".to_string()));
        }

        match self.user_repo.delete_user(id).await? {
            0 => Err(AppError::NotFound("User not found.".to_string())),
            _ => {
                tracing::info!(user_id = id, deleted_by = admin.id, "User deleted");
                Ok(())
            }
        }
    }

    /// Replaces whatever advisor the client had before.
    pub async fn assign_advisor(&self, client_id: i64, advisor_id: i64) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let client = self.user_repo.find_by_id(&mut *tx, client_id).await?;
        if !matches!(client, Some(ref u) if u.role == UserRole::Client) {
            return Err(AppError::NotFound("Client not found.".to_string()));
        }

        let advisor = self.user_repo.find_by_id(&mut *tx, advisor_id).await?;
        if !matches!(advisor, Some(ref u) if u.role == UserRole::Advisor) {
            return Err(AppError::InvalidPayload("The selected user is not an advisor.".to_string()));
        }

        self.client_repo.remove_assignment(&mut *tx, client_id).await?;
        self.client_repo
            .insert_assignment(&mut *tx, advisor_id, client_id)
            .await?;

        tx.commit().await?;

        tracing::info!(client_id, advisor_id, "Advisor assigned");
        Ok(())
    }

    // =========================================================================
    //  CONTENT GOVERNANCE
    // =========================================================================

    // Unknown pages read as empty
    pub async fn content(&self, page_slug: &str) -> Result<ContentPage, AppError> {
        let page = self.content_repo.find(page_slug).await?;

        Ok(page.unwrap_or_else(|| ContentPage {
            page_slug: page_slug.to_string(),
            content_html: String::new(),
            last_updated_by: None,
            updated_at: None,
        }))
    }

    pub async fn update_content(&self, admin: &User, page_slug: &str, content_html: &str) -> Result<ContentPage, AppError> {
        self.content_repo.upsert(page_slug, content_html, admin.id).await
    }
}
