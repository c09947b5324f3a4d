//! Outbound email delivery.
//!
//! The handler talks to a [`Mailer`] so the transport can be swapped:
//! - [`SesMailer`]: Amazon SES v2 `SendEmail` over HTTPS
//! - [`LogMailer`]: logs the email instead of sending it

pub mod ses;
pub mod sigv4;

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tracing::info;

use crate::error::MailError;

pub use ses::SesMailer;

/// A composed notification ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    /// Sender address, optionally with a display name
    pub from: String,
    /// Recipient addresses
    pub to: Vec<String>,
    /// Subject line
    pub subject: String,
    /// Plain text body
    pub text: String,
    /// HTML body
    pub html: String,
}

/// Email sending backend.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Send a single email, returning the provider's message id.
    ///
    /// Exactly one attempt is made.
    async fn send(&self, email: &Email) -> Result<String, MailError>;
}

/// Mailer that only logs what it would send.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: &Email) -> Result<String, MailError> {
        let mut hasher = Sha256::new();
        hasher.update(email.subject.as_bytes());
        hasher.update(email.text.as_bytes());
        let message_id = format!("log-{}", &hex::encode(hasher.finalize())[..16]);

        info!(
            message_id = %message_id,
            from = %email.from,
            to = ?email.to,
            subject = %email.subject,
            text = %email.text,
            "log_mailer_email"
        );

        Ok(message_id)
    }
}
