//! Error types shared across the relay.

use axum::http::StatusCode;
use thiserror::Error;

/// Invalid or missing startup configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("required environment variable {0} is not set")]
    Missing(&'static str),

    #[error("environment variable {name} has invalid value {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// The signature could not be computed at all.
///
/// A mismatch is not an error; see [`crate::web::signature::verify_tally_signature`].
#[derive(Debug, Error)]
#[error("failed to initialise HMAC: {0}")]
pub struct SignatureError(pub String);

/// Failure to hand an email to the sending service.
#[derive(Debug, Error)]
pub enum MailError {
    #[error("invalid mail endpoint {0:?}")]
    Endpoint(String),

    #[error("failed to encode request: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("failed to sign request: {0}")]
    Signing(String),

    #[error("mail request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("mail service rejected request with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Terminal outcome of a webhook request other than success.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("invalid or missing signature")]
    Unauthorized,

    #[error(transparent)]
    Signature(#[from] SignatureError),

    #[error("invalid webhook payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error(transparent)]
    Mail(#[from] MailError),
}

impl RelayError {
    /// Status code returned to the webhook caller.
    pub fn status_code(&self) -> StatusCode {
        match self {
            RelayError::Unauthorized => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
