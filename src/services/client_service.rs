// src/services/client_service.rs

use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::{AppointmentRepository, ClientRepository, DocumentRepository, NotificationRepository, RecordRepository},
    models::{
        auth::User,
        profile::{
            AssetInput, ClientSummary, FamilyMemberInput, Financials, IncomeSourceInput, LiabilityInput,
            QuestionnaireAnswer, Spouse, SpousePayload, UpdatePersonalInfoPayload,
        },
    },
};

pub const ONBOARDING_COMPLETED: &str = "Completed";

#[derive(Clone)]
pub struct ClientService {
    pool: PgPool,
    client_repo: ClientRepository,
    record_repo: RecordRepository,
    appointment_repo: AppointmentRepository,
    document_repo: DocumentRepository,
    notification_repo: NotificationRepository,
}

impl ClientService {
    pub fn new(
        pool: PgPool,
        client_repo: ClientRepository,
        record_repo: RecordRepository,
        appointment_repo: AppointmentRepository,
        document_repo: DocumentRepository,
        notification_repo: NotificationRepository,
    ) -> Self {
        Self {
            pool,
            client_repo,
            record_repo,
            appointment_repo,
            document_repo,
            notification_repo,
        }
    }

    /// Everything stored about one client, read on a single connection.
    pub async fn summary(&self, client_user_id: i64) -> Result<ClientSummary, AppError> {
        let mut conn = self.pool.acquire().await?;

        let personal_info = self.client_repo.find_personal_info(&mut *conn, client_user_id).await?;
        let spouse_info = self.client_repo.find_spouse(&mut *conn, client_user_id).await?;
        let family_info = self
            .record_repo
            .list_for_owner::<FamilyMemberInput, _>(&mut *conn, client_user_id)
            .await?;
        let investor_profile = self.client_repo.list_answers(&mut *conn, client_user_id).await?;

        let income = self
            .record_repo
            .list_for_owner::<IncomeSourceInput, _>(&mut *conn, client_user_id)
            .await?;
        let assets = self
            .record_repo
            .list_for_owner::<AssetInput, _>(&mut *conn, client_user_id)
            .await?;
        let liabilities = self
            .record_repo
            .list_for_owner::<LiabilityInput, _>(&mut *conn, client_user_id)
            .await?;

        let documents = self.document_repo.list_for_client(&mut *conn, client_user_id).await?;
        let appointments = self.appointment_repo.list_for_client(&mut *conn, client_user_id).await?;

        Ok(ClientSummary {
            personal_info,
            spouse_info,
            family_info,
            investor_profile,
            financials: Financials {
                income,
                assets,
                liabilities,
            },
            documents,
            appointments,
        })
    }

    pub async fn update_personal_info(
        &self,
        client_user_id: i64,
        changes: UpdatePersonalInfoPayload,
    ) -> Result<(), AppError> {
        if changes.is_empty() {
            return Err(AppError::InvalidPayload("No fields to update.".to_string()));
        }

        match self.client_repo.update_personal_info(client_user_id, &changes).await? {
            0 => Err(AppError::NotFound("Client profile not found.".to_string())),
            _ => Ok(()),
        }
    }

    pub async fn update_spouse(&self, client_user_id: i64, payload: SpousePayload) -> Result<Spouse, AppError> {
        if payload.is_empty() {
            return Err(AppError::InvalidPayload("No fields to update.".to_string()));
        }

        self.client_repo.upsert_spouse(client_user_id, &payload).await
    }

    pub async fn questionnaire(&self, client_user_id: i64) -> Result<Vec<QuestionnaireAnswer>, AppError> {
        self.client_repo.list_answers(&self.pool, client_user_id).await
    }

    /// Marks onboarding complete and tells the assigned advisor, atomically.
    pub async fn submit_onboarding(&self, client: &User) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let updated = self
            .client_repo
            .set_onboarding_status(&mut *tx, client.id, ONBOARDING_COMPLETED)
            .await?;
        if updated == 0 {
            return Err(AppError::NotFound("Client profile not found.".to_string()));
        }

        if let Some(advisor_id) = self.client_repo.find_advisor_of(&mut *tx, client.id).await? {
            let message = format!("{} has completed onboarding.", client.full_name());
            let link = format!("/advisor/clients/{}", client.id);
            self.notification_repo
                .create(&mut *tx, advisor_id, &message, Some(&link))
                .await?;
        }

        tx.commit().await?;

        tracing::info!(client_id = client.id, "Onboarding submitted");
        Ok(())
    }
}
