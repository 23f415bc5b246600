// src/config.rs

use std::{env, path::PathBuf, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::{
        AppointmentRepository, ClientRepository, ContentRepository, DocumentRepository, FormRepository,
        NotificationRepository, PlanRepository, RecordRepository, UserRepository,
    },
    services::{
        admin_service::AdminService,
        advisor_service::AdvisorService,
        appointment_service::AppointmentService,
        auth::AuthService,
        client_service::ClientService,
        document_service::DocumentService,
        form_service::FormService,
        mailer::{LogMailer, Mailer},
        notification_service::NotificationService,
        record_service::RecordService,
    },
};

/// Settings read from the environment (and `.env`, when present).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub db_max_connections: u32,
    pub db_acquire_timeout: Duration,
    pub token_ttl: chrono::Duration,
    pub upload_dir: PathBuf,
    pub mail_from: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET must be set")?;

        Ok(Self {
            database_url,
            jwt_secret,
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            db_max_connections: parse_or("DB_MAX_CONNECTIONS", 5)?,
            db_acquire_timeout: Duration::from_secs(parse_or("DB_ACQUIRE_TIMEOUT_SECS", 3)?),
            token_ttl: chrono::Duration::hours(parse_or("TOKEN_TTL_HOURS", 168)?),
            upload_dir: env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./uploads")),
            mail_from: env::var("MAIL_FROM").unwrap_or_else(|_| "no-reply@localhost".to_string()),
        })
    }
}

fn parse_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw.parse().with_context(|| format!("{key} has an invalid value: {raw}")),
        Err(_) => Ok(default),
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub auth_service: AuthService,
    pub form_service: FormService,
    pub record_service: RecordService,
    pub client_service: ClientService,
    pub advisor_service: AdvisorService,
    pub appointment_service: AppointmentService,
    pub admin_service: AdminService,
    pub notification_service: NotificationService,
    pub document_service: DocumentService,
}

impl AppState {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        let db_pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(config.db_acquire_timeout)
            .connect(&config.database_url)
            .await
            .context("Could not connect to the database")?;

        tracing::info!("Database connection established");

        let mailer: Arc<dyn Mailer> = Arc::new(LogMailer::new(config.mail_from.clone()));

        Ok(Self::with_pool(db_pool, config, mailer))
    }

    /// Assembles the dependency graph over an existing pool.
    pub fn with_pool(db_pool: PgPool, config: &Config, mailer: Arc<dyn Mailer>) -> Self {
        let user_repo = UserRepository::new(db_pool.clone());
        let client_repo = ClientRepository::new(db_pool.clone());
        let record_repo = RecordRepository::new(db_pool.clone());
        let form_repo = FormRepository::new(db_pool.clone());
        let appointment_repo = AppointmentRepository::new(db_pool.clone());
        let notification_repo = NotificationRepository::new(db_pool.clone());
        let document_repo = DocumentRepository::new(db_pool.clone());
        let content_repo = ContentRepository::new(db_pool.clone());
        let plan_repo = PlanRepository::new(db_pool.clone());

        let auth_service = AuthService::new(user_repo.clone(), config.jwt_secret.clone(), config.token_ttl);
        let form_service = FormService::new(form_repo);
        let record_service = RecordService::new(record_repo.clone());
        let client_service = ClientService::new(
            db_pool.clone(),
            client_repo.clone(),
            record_repo,
            appointment_repo.clone(),
            document_repo.clone(),
            notification_repo.clone(),
        );
        let advisor_service = AdvisorService::new(
            db_pool.clone(),
            user_repo.clone(),
            client_repo.clone(),
            appointment_repo.clone(),
            document_repo.clone(),
            plan_repo,
            client_service.clone(),
            mailer.clone(),
        );
        let appointment_service = AppointmentService::new(
            db_pool.clone(),
            user_repo.clone(),
            client_repo.clone(),
            appointment_repo,
            notification_repo.clone(),
            mailer,
        );
        let admin_service = AdminService::new(db_pool.clone(), user_repo, client_repo, content_repo);
        let notification_service = NotificationService::new(notification_repo);
        let document_service = DocumentService::new(document_repo, config.upload_dir.clone());

        Self {
            db_pool,
            auth_service,
            form_service,
            record_service,
            client_service,
            advisor_service,
            appointment_service,
            admin_service,
            notification_service,
            document_service,
        }
    }
}
