//! Webhook endpoint handlers.
//!
//! The Tally handler runs the whole request inline:
//! 1. Verify the `tally-signature` header against the raw body
//! 2. Parse the submission and compose the notification
//! 3. Send it and wait for the result
//!
//! Responses carry no body; the status code is the only signal.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::error::RelayError;
use crate::mail::Mailer;
use crate::notify::{compose_notification, TallyWebhook};
use crate::web::signature::{verify_tally_signature, SIGNATURE_HEADER};
use crate::Config;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    pub fn new(config: Config, mailer: Arc<dyn Mailer>) -> Self {
        Self {
            config: Arc::new(config),
            mailer,
        }
    }
}

// =============================================================================
// Health Check
// =============================================================================

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

// =============================================================================
// Tally Webhook
// =============================================================================

/// Tally webhook endpoint.
///
/// Returns 200 once the email is accepted, 401 for a bad or missing
/// signature, and 500 for anything else.
pub async fn tally_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());

    info!(
        body_length = body.len(),
        has_signature = signature.is_some(),
        "tally_webhook_received"
    );

    match relay_submission(&state, signature, &body).await {
        Ok(message_id) => {
            info!(message_id = %message_id, "tally_email_sent");
            StatusCode::OK
        }
        Err(RelayError::Unauthorized) => {
            warn!("tally_signature_invalid");
            StatusCode::UNAUTHORIZED
        }
        Err(e) => {
            error!(error = %e, "tally_webhook_failed");
            e.status_code()
        }
    }
}

/// Verify, compose and send one submission.
async fn relay_submission(
    state: &AppState,
    signature: Option<&str>,
    body: &[u8],
) -> Result<String, RelayError> {
    if !verify_tally_signature(&state.config.signing_secret, body, signature)? {
        return Err(RelayError::Unauthorized);
    }

    let webhook = TallyWebhook::from_slice(body)?;

    info!(
        event_id = webhook.event_id.as_deref().unwrap_or(""),
        event_type = webhook.event_type.as_deref().unwrap_or(""),
        submission_id = webhook.data.submission_id.as_deref().unwrap_or(""),
        field_count = webhook.data.fields.len(),
        "tally_payload_parsed"
    );

    let email = compose_notification(&state.config, &webhook);

    Ok(state.mailer.send(&email).await?)
}
