use sqlx::{Executor, PgPool, Postgres};

use crate::{
    common::{db_utils::classify_db_error, error::AppError},
    models::auth::{User, UserRole},
};

// Responsible for every interaction with the `users` table
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE lower(email) = lower($1)")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: i64) -> Result<Option<User>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(user)
    }

    pub async fn list_users(&self) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY created_at DESC, id DESC")
            .fetch_all(&self.pool)
            .await?;

        Ok(users)
    }

    pub async fn create_user<'e, E>(
        &self,
        executor: E,
        email: &str,
        password_hash: &str,
        role: UserRole,
        first_name: &str,
        last_name: &str,
        phone_number: Option<&str>,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash, role, first_name, last_name, phone_number)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .bind(role)
        .bind(first_name)
        .bind(last_name)
        .bind(phone_number)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            classify_db_error(
                e,
                || "A user with this e-mail already exists.".to_string(),
                || "Referenced record not found.".to_string(),
            )
        })
    }

    /// `None` fields are left untouched.
    pub async fn update_role_and_status(
        &self,
        id: i64,
        role: Option<UserRole>,
        is_active: Option<bool>,
    ) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET role = COALESCE($2, role),
                is_active = COALESCE($3, is_active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(role)
        .bind(is_active)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn set_active<'e, E>(&self, executor: E, id: i64, is_active: bool) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("UPDATE users SET is_active = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(is_active)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }

    pub async fn update_password(&self, id: i64, password_hash: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn set_two_factor(&self, id: i64, enabled: bool) -> Result<(), AppError> {
        sqlx::query("UPDATE users SET is_2fa_enabled = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(enabled)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    // Owned rows go with it (ON DELETE CASCADE)
    pub async fn delete_user(&self, id: i64) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
