// src/db/plan_repo.rs

use serde_json::Value;
use sqlx::{Executor, PgPool, Postgres};

use crate::{
    common::{db_utils::missing_reference, error::AppError},
    models::plans::FinancialPlan,
};

const PLAN_COLUMNS: &str =
    "id, client_user_id, advisor_user_id, plan_name, plan_data, status, created_at";

#[derive(Clone)]
pub struct PlanRepository {
    pool: PgPool,
}

impl PlanRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        client_user_id: i64,
        advisor_user_id: i64,
        plan_name: &str,
        plan_data: &Value,
        status: &str,
    ) -> Result<FinancialPlan, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "INSERT INTO financial_plans (client_user_id, advisor_user_id, plan_name, plan_data, status) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {PLAN_COLUMNS}"
        );

        sqlx::query_as::<_, FinancialPlan>(&sql)
            .bind(client_user_id)
            .bind(advisor_user_id)
            .bind(plan_name)
            .bind(plan_data)
            .bind(status)
            .fetch_one(executor)
            .await
            .map_err(|e| missing_reference(e, "Client"))
    }

    /// Newest first.
    pub async fn list_for_client(&self, client_user_id: i64) -> Result<Vec<FinancialPlan>, AppError> {
        let sql = format!(
            "SELECT {PLAN_COLUMNS} FROM financial_plans \
             WHERE client_user_id = $1 \
             ORDER BY created_at DESC, id DESC"
        );

        let plans = sqlx::query_as::<_, FinancialPlan>(&sql)
            .bind(client_user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(plans)
    }
}
