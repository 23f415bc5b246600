// src/db/form_repo.rs

use sqlx::{Executor, PgConnection, PgPool, Postgres, QueryBuilder};

use crate::{
    common::{db_utils::missing_reference, error::AppError},
    models::forms::{FieldType, FormField, FormOption, UpdateFieldPayload, UpdateOptionPayload},
};

const FIELD_COLUMNS: &str = r#"
    id, form_name, field_label AS label, field_type, field_order,
    parent_field_id AS parent_id, is_active
"#;

const OPTION_COLUMNS: &str = r#"
    id, field_id, option_label AS label, option_value AS value,
    details_field_label AS details_label, option_order
"#;

#[derive(Clone)]
pub struct FormRepository {
    pool: PgPool,
}

impl FormRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    // =========================================================================
    //  READS (tree assembly input)
    // =========================================================================

    /// Fields of a form in display order.
    pub async fn list_fields<'e, E>(
        &self,
        executor: E,
        form_name: &str,
        include_inactive: bool,
    ) -> Result<Vec<FormField>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {FIELD_COLUMNS} FROM form_fields \
             WHERE form_name = $1 AND ($2 OR is_active = TRUE) \
             ORDER BY field_order ASC, id ASC"
        );

        let fields = sqlx::query_as::<_, FormField>(&sql)
            .bind(form_name)
            .bind(include_inactive)
            .fetch_all(executor)
            .await?;

        Ok(fields)
    }

    /// Options belonging to any of `field_ids`, in display order.
    pub async fn list_options<'e, E>(
        &self,
        executor: E,
        field_ids: &[i64],
    ) -> Result<Vec<FormOption>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {OPTION_COLUMNS} FROM form_options \
             WHERE field_id = ANY($1) \
             ORDER BY option_order ASC, id ASC"
        );

        let options = sqlx::query_as::<_, FormOption>(&sql)
            .bind(field_ids)
            .fetch_all(executor)
            .await?;

        Ok(options)
    }

    pub async fn find_field<'e, E>(&self, executor: E, id: i64) -> Result<Option<FormField>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {FIELD_COLUMNS} FROM form_fields WHERE id = $1");

        let field = sqlx::query_as::<_, FormField>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(field)
    }

    /// Serializes structural changes to one form until the transaction ends.
    pub async fn lock_form(&self, conn: &mut PgConnection, form_name: &str) -> Result<(), AppError> {
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
            .bind(form_name)
            .execute(&mut *conn)
            .await?;

        Ok(())
    }

    /// True when `candidate` is `field_id` itself or one of its descendants.
    pub async fn is_descendant_or_self(
        &self,
        conn: &mut PgConnection,
        field_id: i64,
        candidate: i64,
    ) -> Result<bool, AppError> {
        let found: bool = sqlx::query_scalar(
            r#"
            WITH RECURSIVE subtree AS (
                SELECT id FROM form_fields WHERE id = $1
                UNION
                SELECT f.id FROM form_fields f
                JOIN subtree s ON f.parent_field_id = s.id
            )
            SELECT EXISTS (SELECT 1 FROM subtree WHERE id = $2)
            "#,
        )
        .bind(field_id)
        .bind(candidate)
        .fetch_one(&mut *conn)
        .await?;

        Ok(found)
    }

    // =========================================================================
    //  FIELD WRITES
    // =========================================================================

    pub async fn create_field<'e, E>(
        &self,
        executor: E,
        form_name: &str,
        label: &str,
        field_type: FieldType,
        field_order: i32,
        parent_id: Option<i64>,
        is_active: bool,
    ) -> Result<FormField, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "INSERT INTO form_fields \
                 (form_name, field_label, field_type, field_order, parent_field_id, is_active) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {FIELD_COLUMNS}"
        );

        sqlx::query_as::<_, FormField>(&sql)
            .bind(form_name)
            .bind(label)
            .bind(field_type)
            .bind(field_order)
            .bind(parent_id)
            .bind(is_active)
            .fetch_one(executor)
            .await
            .map_err(|e| missing_reference(e, "Parent field"))
    }

    /// Writes only the columns present in `changes`; `None` when the id is unknown.
    pub async fn update_field<'e, E>(
        &self,
        executor: E,
        id: i64,
        changes: &UpdateFieldPayload,
    ) -> Result<Option<FormField>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE form_fields SET ");
        let mut set = qb.separated(", ");

        if let Some(label) = &changes.label {
            set.push("field_label = ").push_bind_unseparated(label.clone());
        }
        if let Some(field_type) = changes.field_type {
            set.push("field_type = ").push_bind_unseparated(field_type);
        }
        if let Some(order) = changes.order {
            set.push("field_order = ").push_bind_unseparated(order);
        }
        if let Some(is_active) = changes.is_active {
            set.push("is_active = ").push_bind_unseparated(is_active);
        }
        if let Some(parent_id) = changes.parent_id {
            set.push("parent_field_id = ").push_bind_unseparated(parent_id);
        }

        qb.push(" WHERE id = ").push_bind(id);
        qb.push(format!(" RETURNING {FIELD_COLUMNS}"));

        qb.build_query_as::<FormField>()
            .fetch_optional(executor)
            .await
            .map_err(|e| missing_reference(e, "Parent field"))
    }

    pub async fn delete_field<'e, E>(&self, executor: E, id: i64) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM form_fields WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }

    // =========================================================================
    //  OPTION WRITES
    // =========================================================================

    pub async fn create_option<'e, E>(
        &self,
        executor: E,
        field_id: i64,
        label: &str,
        value: &str,
        details_label: Option<&str>,
        option_order: i32,
    ) -> Result<FormOption, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "INSERT INTO form_options \
                 (field_id, option_label, option_value, details_field_label, option_order) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {OPTION_COLUMNS}"
        );

        sqlx::query_as::<_, FormOption>(&sql)
            .bind(field_id)
            .bind(label)
            .bind(value)
            .bind(details_label)
            .bind(option_order)
            .fetch_one(executor)
            .await
            .map_err(|e| missing_reference(e, "Form field"))
    }

    pub async fn update_option<'e, E>(
        &self,
        executor: E,
        id: i64,
        changes: &UpdateOptionPayload,
    ) -> Result<Option<FormOption>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE form_options SET ");
        let mut set = qb.separated(", ");

        if let Some(label) = &changes.label {
            set.push("option_label = ").push_bind_unseparated(label.clone());
        }
        if let Some(value) = &changes.value {
            set.push("option_value = ").push_bind_unseparated(value.clone());
        }
        if let Some(details_label) = &changes.details_label {
            set.push("details_field_label = ")
                .push_bind_unseparated(details_label.clone());
        }
        if let Some(order) = changes.order {
            set.push("option_order = ").push_bind_unseparated(order);
        }

        qb.push(" WHERE id = ").push_bind(id);
        qb.push(format!(" RETURNING {OPTION_COLUMNS}"));

        let option = qb
            .build_query_as::<FormOption>()
            .fetch_optional(executor)
            .await?;

        Ok(option)
    }

    pub async fn delete_option<'e, E>(&self, executor: E, id: i64) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM form_options WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }
}
