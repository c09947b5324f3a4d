//! Web server module for the inbound Tally webhook.
//!
//! Routes:
//! - `POST /send` and `POST /webhooks/tally`: verified submission relay
//! - `GET /health`: liveness probe

pub mod handlers;
pub mod signature;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub use handlers::{health, tally_webhook, AppState, HealthResponse};
pub use signature::{compute_signature, verify_tally_signature, SIGNATURE_HEADER};

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/send", post(tally_webhook))
        .route("/webhooks/tally", post(tally_webhook))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
