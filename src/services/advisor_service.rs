// src/services/advisor_service.rs

use std::sync::Arc;

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{AppointmentRepository, ClientRepository, DocumentRepository, PlanRepository, UserRepository},
    models::{
        appointments::NextAppointment,
        auth::{User, UserRole},
        clients::{ClientListEntry, CreateClientPayload, CreatedClient, UpdateClientPayload},
        dashboard::{DashboardStats, WeekdayCount},
        documents::Document,
        plans::{CreatePlanPayload, FinancialPlan, PLAN_STATUS_DRAFT},
        profile::ClientSummary,
    },
    services::{
        auth::hash_password,
        client_service::ClientService,
        mailer::{welcome_mail, Mailer},
    },
};

pub const ONBOARDING_IN_PROGRESS: &str = "In-Progress";

#[derive(Clone)]
pub struct AdvisorService {
    pool: PgPool,
    user_repo: UserRepository,
    client_repo: ClientRepository,
    appointment_repo: AppointmentRepository,
    document_repo: DocumentRepository,
    plan_repo: PlanRepository,
    client_service: ClientService,
    mailer: Arc<dyn Mailer>,
}

impl AdvisorService {
    pub fn new(
        pool: PgPool,
        user_repo: UserRepository,
        client_repo: ClientRepository,
        appointment_repo: AppointmentRepository,
        document_repo: DocumentRepository,
        plan_repo: PlanRepository,
        client_service: ClientService,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            pool,
            user_repo,
            client_repo,
            appointment_repo,
            document_repo,
            plan_repo,
            client_service,
            mailer,
        }
    }

    pub async fn list_clients(&self, advisor_id: i64) -> Result<Vec<ClientListEntry>, AppError> {
        self.client_repo.list_for_advisor(advisor_id).await
    }

    /// Creates the client's login, empty profile and assignment in one
    /// transaction, then mails the temporary password.
    pub async fn create_client(&self, advisor: &User, payload: CreateClientPayload) -> Result<CreatedClient, AppError> {
        let temporary_password = Uuid::new_v4().simple().to_string();
        let password_hash = hash_password(&temporary_password).await?;

        let mut tx = self.pool.begin().await?;

        let user = self
            .user_repo
            .create_user(
                &mut *tx,
                &payload.email,
                &password_hash,
                UserRole::Client,
                &payload.first_name,
                &payload.last_name,
                None,
            )
            .await?;

        self.client_repo
            .create_profile(&mut *tx, user.id, ONBOARDING_IN_PROGRESS)
            .await?;
        self.client_repo
            .insert_assignment(&mut *tx, advisor.id, user.id)
            .await?;

        let created = self.client_repo.find_created_client(&mut *tx, user.id).await?;

        tx.commit().await?;

        tracing::info!(advisor_id = advisor.id, client_id = user.id, "Client created");

        let mail = welcome_mail(&user.email, &user.first_name, &temporary_password);
        if let Err(e) = self.mailer.send(mail).await {
            tracing::warn!(client_id = user.id, error = %e, "Welcome e-mail could not be sent");
        }

        Ok(created)
    }

    /// Clients outside the advisor's book are reported as missing.
    pub async fn client_summary(&self, advisor_id: i64, client_id: i64) -> Result<ClientSummary, AppError> {
        if !self.client_repo.is_assigned(&self.pool, advisor_id, client_id).await? {
            return Err(AppError::NotFound("Client not found.".to_string()));
        }

        self.client_service.summary(client_id).await
    }

    pub async fn update_client(
        &self,
        advisor_id: i64,
        client_id: i64,
        changes: UpdateClientPayload,
    ) -> Result<CreatedClient, AppError> {
        if changes.tier.is_none() && changes.is_active.is_none() {
            return Err(AppError::InvalidPayload("No fields to update.".to_string()));
        }

        let mut tx = self.pool.begin().await?;

        if !self.client_repo.is_assigned(&mut *tx, advisor_id, client_id).await? {
            return Err(AppError::NotFound("Client not found.".to_string()));
        }

        if let Some(tier) = &changes.tier {
            self.client_repo.set_tier(&mut *tx, client_id, tier).await?;
        }
        if let Some(is_active) = changes.is_active {
            self.user_repo.set_active(&mut *tx, client_id, is_active).await?;
        }

        let client = self.client_repo.find_created_client(&mut *tx, client_id).await?;

        tx.commit().await?;

        Ok(client)
    }

    pub async fn next_appointment(&self, advisor_id: i64) -> Result<Option<NextAppointment>, AppError> {
        self.appointment_repo.next_for_advisor(advisor_id, Utc::now()).await
    }

    /// Book figures for the advisor's dashboard, as of `now`.
    pub async fn dashboard_stats(&self, advisor_id: i64, now: DateTime<Utc>) -> Result<DashboardStats, AppError> {
        let mut conn = self.pool.acquire().await?;

        let today = now.date_naive();
        let (week_start, week_end) = week_window(today);

        let clients_by_tier = self.client_repo.count_by_tier(&mut *conn, advisor_id).await?;
        let clients_by_onboarding_status = self
            .client_repo
            .count_by_onboarding_status(&mut *conn, advisor_id)
            .await?;
        let per_weekday = self
            .appointment_repo
            .count_per_weekday(&mut *conn, advisor_id, week_start, week_end)
            .await?;
        let meetings_today = self
            .appointment_repo
            .count_between(&mut *conn, advisor_id, start_of(today), start_of(next_day(today)))
            .await?;

        Ok(DashboardStats {
            clients_by_tier,
            clients_by_onboarding_status,
            appointments_weekly: weekday_series(&per_weekday),
            meetings_today,
        })
    }

    /// Saves a draft plan for one of the advisor's clients.
    pub async fn create_plan(
        &self,
        advisor_id: i64,
        client_id: i64,
        payload: CreatePlanPayload,
    ) -> Result<FinancialPlan, AppError> {
        let mut tx = self.pool.begin().await?;

        if !self.client_repo.is_assigned(&mut *tx, advisor_id, client_id).await? {
            return Err(AppError::Forbidden("You are not assigned to this client.".to_string()));
        }

        let plan = self
            .plan_repo
            .create(
                &mut *tx,
                client_id,
                advisor_id,
                &payload.plan_name,
                &payload.plan_data,
                PLAN_STATUS_DRAFT,
            )
            .await?;

        tx.commit().await?;

        tracing::info!(advisor_id, client_id, plan_id = plan.id, "Financial plan saved");
        Ok(plan)
    }

    pub async fn list_plans(&self, advisor_id: i64, client_id: i64) -> Result<Vec<FinancialPlan>, AppError> {
        if !self.client_repo.is_assigned(&self.pool, advisor_id, client_id).await? {
            return Err(AppError::NotFound("Client not found.".to_string()));
        }

        self.plan_repo.list_for_client(client_id).await
    }

    pub async fn client_document(
        &self,
        advisor_id: i64,
        client_id: i64,
        document_id: i64,
    ) -> Result<Document, AppError> {
        if !self.client_repo.is_assigned(&self.pool, advisor_id, client_id).await? {
            return Err(AppError::Forbidden("You are not assigned to this client.".to_string()));
        }

        self.document_repo
            .find_for_client(document_id, client_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Document not found.".to_string()))
    }
}

const WEEKDAY_NAMES: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

fn start_of(day: NaiveDate) -> DateTime<Utc> {
    day.and_time(NaiveTime::MIN).and_utc()
}

fn next_day(day: NaiveDate) -> NaiveDate {
    day.checked_add_days(Days::new(1)).unwrap_or(day)
}

/// Monday 00:00 of `today`'s week up to the following Monday, in UTC.
fn week_window(today: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let back = u64::from(today.weekday().num_days_from_monday());
    let monday = today.checked_sub_days(Days::new(back)).unwrap_or(today);
    let next_monday = monday.checked_add_days(Days::new(7)).unwrap_or(monday);

    (start_of(monday), start_of(next_monday))
}

// One entry per weekday, Monday first; days without appointments count zero
fn weekday_series(per_weekday: &[(i32, i64)]) -> Vec<WeekdayCount> {
    WEEKDAY_NAMES
        .iter()
        .zip(1..)
        .map(|(name, iso_day)| WeekdayCount {
            day: name.to_string(),
            count: per_weekday
                .iter()
                .find(|(day, _)| *day == iso_day)
                .map_or(0, |(_, count)| *count),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn week_runs_monday_to_monday() {
        // A Thursday
        let (start, end) = week_window(NaiveDate::from_ymd_opt(2025, 3, 6).unwrap());
        assert_eq!(start, Utc.with_ymd_and_hms(2025, 3, 3, 0, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2025, 3, 10, 0, 0, 0).unwrap());

        // Monday and Sunday stay in their own week
        let (start, _) = week_window(NaiveDate::from_ymd_opt(2025, 3, 3).unwrap());
        assert_eq!(start, Utc.with_ymd_and_hms(2025, 3, 3, 0, 0, 0).unwrap());
        let (start, _) = week_window(NaiveDate::from_ymd_opt(2025, 3, 9).unwrap());
        assert_eq!(start, Utc.with_ymd_and_hms(2025, 3, 3, 0, 0, 0).unwrap());
    }

    #[test]
    fn weekday_series_fills_missing_days() {
        let series = weekday_series(&[(3, 2), (1, 4), (7, 1)]);

        let days: Vec<&str> = series.iter().map(|d| d.day.as_str()).collect();
        let counts: Vec<i64> = series.iter().map(|d| d.count).collect();
        assert_eq!(days, WEEKDAY_NAMES);
        assert_eq!(counts, vec![4, 0, 2, 0, 0, 0, 1]);
    }
}
