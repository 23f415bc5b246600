// src/services/mailer.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::common::error::AppError;

#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Outbound e-mail. Implementations must be cheap to share across requests.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: OutgoingMail) -> Result<(), AppError>;
}

/// Writes every message to the log instead of delivering it.
pub struct LogMailer {
    from: String,
}

impl LogMailer {
    pub fn new(from: impl Into<String>) -> Self {
        Self { from: from.into() }
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, mail: OutgoingMail) -> Result<(), AppError> {
        tracing::info!(
            from = %self.from,
            to = %mail.to,
            subject = %mail.subject,
            "Outgoing e-mail"
        );
        tracing::debug!(body = %mail.body);
        Ok(())
    }
}

// --- TEMPLATES ---

pub fn welcome_mail(to: &str, first_name: &str, temporary_password: &str) -> OutgoingMail {
    OutgoingMail {
        to: to.to_string(),
        subject: "Welcome to your client portal".to_string(),
        body: format!(
            "Hello {first_name},\n\n\
             Your advisor has created an account for you.\n\
             Sign in with this e-mail address and the temporary password below, \
             then change it from your profile page.\n\n\
             Temporary password: {temporary_password}\n"
        ),
    }
}

pub fn appointment_mail(
    to: &str,
    client_first_name: &str,
    advisor_name: &str,
    title: &str,
    start_time: DateTime<Utc>,
) -> OutgoingMail {
    OutgoingMail {
        to: to.to_string(),
        subject: format!("Appointment scheduled: {title}"),
        body: format!(
            "Hello {client_first_name},\n\n\
             {advisor_name} scheduled \"{title}\" with you on {}.\n",
            start_time.format("%Y-%m-%d %H:%M UTC")
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn welcome_mail_carries_the_temporary_password() {
        let mail = welcome_mail("ana@example.com", "Ana", "tmp-123");

        assert_eq!(mail.to, "ana@example.com");
        assert!(mail.body.contains("tmp-123"));
        assert!(mail.body.starts_with("Hello Ana,"));
    }

    #[test]
    fn appointment_mail_formats_start_in_utc() {
        let start = Utc.with_ymd_and_hms(2025, 3, 1, 14, 0, 0).unwrap();
        let mail = appointment_mail("ana@example.com", "Ana", "Carl Advisor", "Annual review", start);

        assert_eq!(mail.subject, "Appointment scheduled: Annual review");
        assert!(mail.body.contains("2025-03-01 14:00 UTC"));
    }

    #[tokio::test]
    async fn log_mailer_never_fails() {
        let mailer = LogMailer::new("no-reply@localhost");

        assert!(mailer.send(welcome_mail("a@b.c", "A", "x")).await.is_ok());
    }
}
