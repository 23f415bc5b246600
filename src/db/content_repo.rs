// src/db/content_repo.rs

use sqlx::PgPool;

use crate::{common::error::AppError, models::admin::ContentPage};

#[derive(Clone)]
pub struct ContentRepository {
    pool: PgPool,
}

impl ContentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find(&self, page_slug: &str) -> Result<Option<ContentPage>, AppError> {
        let page = sqlx::query_as::<_, ContentPage>("SELECT * FROM content_governance WHERE page_slug = $1")
            .bind(page_slug)
            .fetch_optional(&self.pool)
            .await?;

        Ok(page)
    }

    pub async fn upsert(&self, page_slug: &str, content_html: &str, updated_by: i64) -> Result<ContentPage, AppError> {
        let page = sqlx::query_as::<_, ContentPage>(
            r#"
            INSERT INTO content_governance (page_slug, content_html, last_updated_by, updated_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (page_slug)
            DO UPDATE SET
                content_html = EXCLUDED.content_html,
                last_updated_by = EXCLUDED.last_updated_by,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(page_slug)
        .bind(content_html)
        .bind(updated_by)
        .fetch_one(&self.pool)
        .await?;

        Ok(page)
    }
}
