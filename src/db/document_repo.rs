// src/db/document_repo.rs

use sqlx::{Executor, PgPool, Postgres};

use crate::{
    common::{db_utils::missing_reference, error::AppError},
    models::documents::Document,
};

#[derive(Clone)]
pub struct DocumentRepository {
    pool: PgPool,
}

impl DocumentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn create(
        &self,
        client_user_id: i64,
        document_name: &str,
        file_path: &str,
    ) -> Result<Document, AppError> {
        sqlx::query_as::<_, Document>(
            r#"
            INSERT INTO documents (client_user_id, document_name, file_path)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(client_user_id)
        .bind(document_name)
        .bind(file_path)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| missing_reference(e, "Client"))
    }

    pub async fn list_for_client<'e, E>(&self, executor: E, client_user_id: i64) -> Result<Vec<Document>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let documents = sqlx::query_as::<_, Document>(
            "SELECT * FROM documents WHERE client_user_id = $1 ORDER BY uploaded_at DESC, id DESC",
        )
        .bind(client_user_id)
        .fetch_all(executor)
        .await?;

        Ok(documents)
    }

    pub async fn find_for_client(&self, id: i64, client_user_id: i64) -> Result<Option<Document>, AppError> {
        let document = sqlx::query_as::<_, Document>(
            "SELECT * FROM documents WHERE id = $1 AND client_user_id = $2",
        )
        .bind(id)
        .bind(client_user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(document)
    }
}
