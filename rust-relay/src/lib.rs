//! Tally Relay - verified form submission notifications.
//!
//! Receives Tally form webhooks, checks their HMAC signature and forwards the
//! submitted answers as an email through Amazon SES.
//!
//! ## Flow
//!
//! ```text
//! Tally → POST /send → verify signature → compose email → SES → status code
//! ```

pub mod config;
pub mod error;
pub mod mail;
pub mod notify;
pub mod web;

// Re-export commonly used types
pub use config::{Config, MailBackend};
pub use error::{ConfigError, MailError, RelayError, SignatureError};
pub use mail::{Email, LogMailer, Mailer, SesMailer};
pub use notify::{compose_notification, TallyWebhook};
pub use web::{router, AppState};
