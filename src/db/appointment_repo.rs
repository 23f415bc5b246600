// src/db/appointment_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{Executor, PgPool, Postgres};

use crate::{
    common::{db_utils::missing_reference, error::AppError},
    models::appointments::{Appointment, NextAppointment},
};

#[derive(Clone)]
pub struct AppointmentRepository {
    pool: PgPool,
}

impl AppointmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        advisor_user_id: i64,
        client_user_id: i64,
        title: &str,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        notes: Option<&str>,
    ) -> Result<Appointment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Appointment>(
            r#"
            INSERT INTO appointments (advisor_user_id, client_user_id, title, start_time, end_time, notes)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, advisor_user_id, client_user_id, title, start_time, end_time, notes, status
            "#,
        )
        .bind(advisor_user_id)
        .bind(client_user_id)
        .bind(title)
        .bind(start_time)
        .bind(end_time)
        .bind(notes)
        .fetch_one(executor)
        .await
        .map_err(|e| missing_reference(e, "Client"))
    }

    pub async fn list_for_client<'e, E>(&self, executor: E, client_user_id: i64) -> Result<Vec<Appointment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let appointments = sqlx::query_as::<_, Appointment>(
            r#"
            SELECT id, advisor_user_id, client_user_id, title, start_time, end_time, notes, status
            FROM appointments
            WHERE client_user_id = $1
            ORDER BY start_time DESC
            "#,
        )
        .bind(client_user_id)
        .fetch_all(executor)
        .await?;

        Ok(appointments)
    }

    /// Appointments starting in `[from, to)`, keyed by ISO weekday (1 = Monday, UTC).
    pub async fn count_per_weekday<'e, E>(
        &self,
        executor: E,
        advisor_user_id: i64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<(i32, i64)>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let counts = sqlx::query_as::<_, (i32, i64)>(
            r#"
            SELECT EXTRACT(ISODOW FROM start_time AT TIME ZONE 'UTC')::INT AS weekday, COUNT(*) AS count
            FROM appointments
            WHERE advisor_user_id = $1 AND start_time >= $2 AND start_time < $3
            GROUP BY weekday
            "#,
        )
        .bind(advisor_user_id)
        .bind(from)
        .bind(to)
        .fetch_all(executor)
        .await?;

        Ok(counts)
    }

    pub async fn count_between<'e, E>(
        &self,
        executor: E,
        advisor_user_id: i64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM appointments \
             WHERE advisor_user_id = $1 AND start_time >= $2 AND start_time < $3",
        )
        .bind(advisor_user_id)
        .bind(from)
        .bind(to)
        .fetch_one(executor)
        .await?;

        Ok(count)
    }

    /// Earliest appointment of the advisor starting at or after `now`.
    pub async fn next_for_advisor(
        &self,
        advisor_user_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Option<NextAppointment>, AppError> {
        let next = sqlx::query_as::<_, NextAppointment>(
            r#"
            SELECT a.id, a.title, a.start_time, u.first_name || ' ' || u.last_name AS client_name
            FROM appointments a
            JOIN users u ON u.id = a.client_user_id
            WHERE a.advisor_user_id = $1 AND a.start_time >= $2
            ORDER BY a.start_time ASC, a.id ASC
            LIMIT 1
            "#,
        )
        .bind(advisor_user_id)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        Ok(next)
    }
}
