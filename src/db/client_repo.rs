// src/db/client_repo.rs

use sqlx::{Executor, PgPool, Postgres, QueryBuilder};

use crate::{
    common::{db_utils::missing_reference, error::AppError},
    models::{
        clients::{ClientListEntry, CreatedClient},
        dashboard::{OnboardingStatusCount, TierCount},
        profile::{PersonalInfo, QuestionnaireAnswer, Spouse, SpousePayload, UpdatePersonalInfoPayload},
    },
};

#[derive(Clone)]
pub struct ClientRepository {
    pool: PgPool,
}

impl ClientRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  PROFILE
    // =========================================================================

    pub async fn create_profile<'e, E>(
        &self,
        executor: E,
        client_user_id: i64,
        onboarding_status: &str,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("INSERT INTO client_profiles (client_user_id, onboarding_status) VALUES ($1, $2)")
            .bind(client_user_id)
            .bind(onboarding_status)
            .execute(executor)
            .await
            .map_err(|e| missing_reference(e, "Client"))?;

        Ok(())
    }

    pub async fn find_personal_info<'e, E>(
        &self,
        executor: E,
        client_user_id: i64,
    ) -> Result<Option<PersonalInfo>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let info = sqlx::query_as::<_, PersonalInfo>(
            r#"
            SELECT u.first_name, u.last_name, u.email, u.phone_number, cp.*
            FROM users u
            JOIN client_profiles cp ON cp.client_user_id = u.id
            WHERE u.id = $1
            "#,
        )
        .bind(client_user_id)
        .fetch_optional(executor)
        .await?;

        Ok(info)
    }

    /// Partial update restricted to the profile's own columns.
    ///
    /// Returns the number of rows touched (0 when the profile does not exist).
    pub async fn update_personal_info(
        &self,
        client_user_id: i64,
        changes: &UpdatePersonalInfoPayload,
    ) -> Result<u64, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE client_profiles SET ");
        let mut set = qb.separated(", ");

        if let Some(v) = changes.date_of_birth {
            set.push("date_of_birth = ").push_bind_unseparated(v);
        }
        let text_columns: [(&str, &Option<String>); 10] = [
            ("marital_status", &changes.marital_status),
            ("preferred_contact_method", &changes.preferred_contact_method),
            ("address_line_1", &changes.address_line_1),
            ("address_line_2", &changes.address_line_2),
            ("city", &changes.city),
            ("state", &changes.state),
            ("country", &changes.country),
            ("zip_code", &changes.zip_code),
            ("occupation", &changes.occupation),
            ("employer_name", &changes.employer_name),
        ];
        for (column, value) in text_columns {
            if let Some(v) = value {
                set.push(column)
                    .push_unseparated(" = ")
                    .push_bind_unseparated(v.clone());
            }
        }
        set.push("updated_at = NOW()");

        qb.push(" WHERE client_user_id = ").push_bind(client_user_id);

        let result = qb.build().execute(&self.pool).await?;

        Ok(result.rows_affected())
    }

    pub async fn set_onboarding_status<'e, E>(
        &self,
        executor: E,
        client_user_id: i64,
        status: &str,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            "UPDATE client_profiles SET onboarding_status = $2, updated_at = NOW() WHERE client_user_id = $1",
        )
        .bind(client_user_id)
        .bind(status)
        .execute(executor)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn set_tier<'e, E>(&self, executor: E, client_user_id: i64, tier: &str) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            "UPDATE client_profiles SET tier = $2, updated_at = NOW() WHERE client_user_id = $1",
        )
        .bind(client_user_id)
        .bind(tier)
        .execute(executor)
        .await?;

        Ok(result.rows_affected())
    }

    // =========================================================================
    //  SPOUSE (single row, upsert)
    // =========================================================================

    pub async fn find_spouse<'e, E>(&self, executor: E, client_user_id: i64) -> Result<Option<Spouse>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let spouse = sqlx::query_as::<_, Spouse>("SELECT * FROM spouses WHERE client_user_id = $1")
            .bind(client_user_id)
            .fetch_optional(executor)
            .await?;

        Ok(spouse)
    }

    /// Absent fields keep their stored value.
    pub async fn upsert_spouse(&self, client_user_id: i64, input: &SpousePayload) -> Result<Spouse, AppError> {
        sqlx::query_as::<_, Spouse>(
            r#"
            INSERT INTO spouses (
                client_user_id, first_name, last_name, date_of_birth,
                email, phone_number, occupation, employer_name
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (client_user_id)
            DO UPDATE SET
                first_name = COALESCE(EXCLUDED.first_name, spouses.first_name),
                last_name = COALESCE(EXCLUDED.last_name, spouses.last_name),
                date_of_birth = COALESCE(EXCLUDED.date_of_birth, spouses.date_of_birth),
                email = COALESCE(EXCLUDED.email, spouses.email),
                phone_number = COALESCE(EXCLUDED.phone_number, spouses.phone_number),
                occupation = COALESCE(EXCLUDED.occupation, spouses.occupation),
                employer_name = COALESCE(EXCLUDED.employer_name, spouses.employer_name)
            RETURNING *
            "#,
        )
        .bind(client_user_id)
        .bind(input.first_name.as_deref())
        .bind(input.last_name.as_deref())
        .bind(input.date_of_birth)
        .bind(input.email.as_deref())
        .bind(input.phone_number.as_deref())
        .bind(input.occupation.as_deref())
        .bind(input.employer_name.as_deref())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| missing_reference(e, "Client"))
    }

    // =========================================================================
    //  QUESTIONNAIRE (labelled view)
    // =========================================================================

    pub async fn list_answers<'e, E>(
        &self,
        executor: E,
        client_user_id: i64,
    ) -> Result<Vec<QuestionnaireAnswer>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let answers = sqlx::query_as::<_, QuestionnaireAnswer>(
            r#"
            SELECT cqa.form_field_id, ff.field_label AS question, cqa.answer, cqa.updated_at
            FROM client_questionnaire_answers cqa
            JOIN form_fields ff ON ff.id = cqa.form_field_id
            WHERE cqa.client_user_id = $1
            ORDER BY ff.form_name, ff.field_order, ff.id
            "#,
        )
        .bind(client_user_id)
        .fetch_all(executor)
        .await?;

        Ok(answers)
    }

    // =========================================================================
    //  ADVISOR <-> CLIENT
    // =========================================================================

    pub async fn find_advisor_of<'e, E>(&self, executor: E, client_user_id: i64) -> Result<Option<i64>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let advisor_id = sqlx::query_scalar::<_, i64>(
            "SELECT advisor_user_id FROM advisor_client_map WHERE client_user_id = $1",
        )
        .bind(client_user_id)
        .fetch_optional(executor)
        .await?;

        Ok(advisor_id)
    }

    pub async fn is_assigned<'e, E>(&self, executor: E, advisor_user_id: i64, client_user_id: i64) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let assigned: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM advisor_client_map
                WHERE advisor_user_id = $1 AND client_user_id = $2
            )
            "#,
        )
        .bind(advisor_user_id)
        .bind(client_user_id)
        .fetch_one(executor)
        .await?;

        Ok(assigned)
    }

    pub async fn remove_assignment<'e, E>(&self, executor: E, client_user_id: i64) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM advisor_client_map WHERE client_user_id = $1")
            .bind(client_user_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }

    pub async fn insert_assignment<'e, E>(
        &self,
        executor: E,
        advisor_user_id: i64,
        client_user_id: i64,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("INSERT INTO advisor_client_map (advisor_user_id, client_user_id) VALUES ($1, $2)")
            .bind(advisor_user_id)
            .bind(client_user_id)
            .execute(executor)
            .await
            .map_err(|e| missing_reference(e, "User"))?;

        Ok(())
    }

    pub async fn list_for_advisor(&self, advisor_user_id: i64) -> Result<Vec<ClientListEntry>, AppError> {
        let clients = sqlx::query_as::<_, ClientListEntry>(
            r#"
            SELECT
                c.id, c.email, c.first_name, c.last_name, c.is_active,
                cp.onboarding_status, cp.tier,
                a.first_name || ' ' || a.last_name AS advisor_name,
                (
                    SELECT MIN(app.start_time) FROM appointments app
                    WHERE app.client_user_id = c.id AND app.start_time >= NOW()
                ) AS next_appointment
            FROM advisor_client_map acm
            JOIN users c ON c.id = acm.client_user_id
            JOIN client_profiles cp ON cp.client_user_id = c.id
            JOIN users a ON a.id = acm.advisor_user_id
            WHERE acm.advisor_user_id = $1
            ORDER BY c.last_name, c.first_name, c.id
            "#,
        )
        .bind(advisor_user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(clients)
    }

    pub async fn count_by_tier<'e, E>(&self, executor: E, advisor_user_id: i64) -> Result<Vec<TierCount>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let counts = sqlx::query_as::<_, TierCount>(
            r#"
            SELECT cp.tier, COUNT(*) AS count
            FROM client_profiles cp
            JOIN advisor_client_map acm ON acm.client_user_id = cp.client_user_id
            WHERE acm.advisor_user_id = $1
            GROUP BY cp.tier
            ORDER BY cp.tier NULLS LAST
            "#,
        )
        .bind(advisor_user_id)
        .fetch_all(executor)
        .await?;

        Ok(counts)
    }

    pub async fn count_by_onboarding_status<'e, E>(
        &self,
        executor: E,
        advisor_user_id: i64,
    ) -> Result<Vec<OnboardingStatusCount>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let counts = sqlx::query_as::<_, OnboardingStatusCount>(
            r#"
            SELECT cp.onboarding_status, COUNT(*) AS count
            FROM client_profiles cp
            JOIN advisor_client_map acm ON acm.client_user_id = cp.client_user_id
            WHERE acm.advisor_user_id = $1
            GROUP BY cp.onboarding_status
            ORDER BY cp.onboarding_status
            "#,
        )
        .bind(advisor_user_id)
        .fetch_all(executor)
        .await?;

        Ok(counts)
    }

    pub async fn find_created_client<'e, E>(&self, executor: E, client_user_id: i64) -> Result<CreatedClient, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let client = sqlx::query_as::<_, CreatedClient>(
            r#"
            SELECT u.id, u.email, u.first_name, u.last_name, u.is_active, cp.tier, cp.onboarding_status
            FROM users u
            JOIN client_profiles cp ON cp.client_user_id = u.id
            WHERE u.id = $1
            "#,
        )
        .bind(client_user_id)
        .fetch_one(executor)
        .await?;

        Ok(client)
    }
}
