// src/services/appointment_service.rs

use std::sync::Arc;

use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::{AppointmentRepository, ClientRepository, NotificationRepository, UserRepository},
    models::{
        appointments::{Appointment, ScheduleAppointmentPayload},
        auth::User,
    },
    services::mailer::{appointment_mail, Mailer},
};

#[derive(Clone)]
pub struct AppointmentService {
    pool: PgPool,
    user_repo: UserRepository,
    client_repo: ClientRepository,
    appointment_repo: AppointmentRepository,
    notification_repo: NotificationRepository,
    mailer: Arc<dyn Mailer>,
}

impl AppointmentService {
    pub fn new(
        pool: PgPool,
        user_repo: UserRepository,
        client_repo: ClientRepository,
        appointment_repo: AppointmentRepository,
        notification_repo: NotificationRepository,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            pool,
            user_repo,
            client_repo,
            appointment_repo,
            notification_repo,
            mailer,
        }
    }

    /// The appointment and the client's notification commit together; the
    /// e-mail goes out afterwards and its failure is only logged.
    pub async fn schedule(&self, advisor: &User, payload: ScheduleAppointmentPayload) -> Result<Appointment, AppError> {
        let client_id = payload.client_user_id;

        let mut tx = self.pool.begin().await?;

        if !self.client_repo.is_assigned(&mut *tx, advisor.id, client_id).await? {
            return Err(AppError::Forbidden("You are not assigned to this client.".to_string()));
        }

        let client = self
            .user_repo
            .find_by_id(&mut *tx, client_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Client not found.".to_string()))?;

        let appointment = self
            .appointment_repo
            .create(
                &mut *tx,
                advisor.id,
                client_id,
                &payload.title,
                payload.start_time,
                payload.end_time,
                payload.notes.as_deref(),
            )
            .await?;

        let message = format!(
            "{} scheduled \"{}\" for {}.",
            advisor.full_name(),
            appointment.title,
            appointment.start_time.format("%Y-%m-%d %H:%M UTC")
        );
        self.notification_repo
            .create(&mut *tx, client_id, &message, Some("/client/appointments"))
            .await?;

        tx.commit().await?;

        tracing::info!(
            appointment_id = appointment.id,
            advisor_id = advisor.id,
            client_id,
            "Appointment scheduled"
        );

        let mail = appointment_mail(
            &client.email,
            &client.first_name,
            &advisor.full_name(),
            &appointment.title,
            appointment.start_time,
        );
        if let Err(e) = self.mailer.send(mail).await {
            tracing::warn!(appointment_id = appointment.id, error = %e, "Appointment e-mail could not be sent");
        }

        Ok(appointment)
    }
}
