//! Configuration module for environment variable parsing.
//!
//! All configuration is read once at startup and validated before the server
//! binds. The resulting [`Config`] is immutable and shared through `AppState`.

use std::env;
use std::time::Duration;

use tracing::warn;

use crate::error::ConfigError;

/// Default AWS region for SES.
pub const DEFAULT_REGION: &str = "eu-north-1";

/// Default sender shown on notification emails.
pub const DEFAULT_FROM_ADDRESS: &str = "Feedback notification <feedback@polrivero.com>";

/// Default subject line for notification emails.
pub const DEFAULT_SUBJECT: &str = "New Feedback";

/// Default link to the form's submission dashboard.
pub const DEFAULT_DASHBOARD_URL: &str = "https://tally.so/forms/nGLBXQ/submissions";

/// Which mail backend the server dispatches through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailBackend {
    /// Amazon SES v2 `SendEmail`
    Ses,
    /// Log the composed email and report success
    Log,
}

/// AWS credentials used to sign SES requests.
#[derive(Clone)]
pub struct AwsCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl std::fmt::Debug for AwsCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("session_token", &self.session_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Application configuration loaded from environment variables.
#[derive(Clone)]
pub struct Config {
    /// Port for the web server to listen on
    pub port: u16,

    /// Shared secret for `tally-signature` verification
    pub signing_secret: String,

    /// Selected mail backend
    pub mail_backend: MailBackend,

    /// SES signing credentials (absent only for the log backend)
    pub aws_credentials: Option<AwsCredentials>,

    /// AWS region hosting the SES endpoint
    pub aws_region: String,

    /// SES endpoint base URL
    pub ses_endpoint: String,

    /// Timeout applied to the outbound SES request
    pub ses_request_timeout: Duration,

    /// Sender address, optionally with a display name
    pub from_address: String,

    /// Notification recipients, validated and non-empty
    pub to_addresses: Vec<String>,

    /// Subject line for notifications
    pub email_subject: String,

    /// Dashboard link included in the email preamble
    pub dashboard_url: String,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field("signing_secret", &"<redacted>")
            .field("mail_backend", &self.mail_backend)
            .field("aws_credentials", &self.aws_credentials)
            .field("aws_region", &self.aws_region)
            .field("ses_endpoint", &self.ses_endpoint)
            .field("ses_request_timeout", &self.ses_request_timeout)
            .field("from_address", &self.from_address)
            .field("to_addresses", &self.to_addresses)
            .field("email_subject", &self.email_subject)
            .field("dashboard_url", &self.dashboard_url)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Empty values are treated the same as unset ones.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let signing_secret =
            get("TALLY_SIGNING_SECRET").ok_or(ConfigError::Missing("TALLY_SIGNING_SECRET"))?;

        let mail_backend = match get("MAIL_BACKEND").as_deref().map(str::trim) {
            None | Some("ses") => MailBackend::Ses,
            Some("log") => MailBackend::Log,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "MAIL_BACKEND",
                    value: other.to_string(),
                })
            }
        };

        let aws_credentials = match (get("AWS_ACCESS_KEY_ID"), get("AWS_SECRET_ACCESS_KEY")) {
            (Some(access_key_id), Some(secret_access_key)) => Some(AwsCredentials {
                access_key_id,
                secret_access_key,
                session_token: get("AWS_SESSION_TOKEN"),
            }),
            (None, _) if mail_backend == MailBackend::Ses => {
                return Err(ConfigError::Missing("AWS_ACCESS_KEY_ID"))
            }
            (_, None) if mail_backend == MailBackend::Ses => {
                return Err(ConfigError::Missing("AWS_SECRET_ACCESS_KEY"))
            }
            _ => None,
        };

        let aws_region = get("AWS_REGION").unwrap_or_else(|| DEFAULT_REGION.to_string());

        let ses_endpoint = get("SES_ENDPOINT")
            .map(|v| v.trim_end_matches('/').to_string())
            .unwrap_or_else(|| format!("https://email.{}.amazonaws.com", aws_region));

        let to_addresses = parse_recipients(
            &get("TO_ADDRESSES_COMMA_SEPARATED")
                .ok_or(ConfigError::Missing("TO_ADDRESSES_COMMA_SEPARATED"))?,
        )?;

        Ok(Config {
            port: parse_or("PORT", get("PORT"), 8080),
            signing_secret,
            mail_backend,
            aws_credentials,
            aws_region,
            ses_endpoint,
            ses_request_timeout: Duration::from_millis(parse_or(
                "SES_REQUEST_TIMEOUT_MS",
                get("SES_REQUEST_TIMEOUT_MS"),
                10_000,
            )),
            from_address: get("FROM_ADDRESS")
                .unwrap_or_else(|| DEFAULT_FROM_ADDRESS.to_string()),
            to_addresses,
            email_subject: get("EMAIL_SUBJECT").unwrap_or_else(|| DEFAULT_SUBJECT.to_string()),
            dashboard_url: get("DASHBOARD_URL")
                .unwrap_or_else(|| DEFAULT_DASHBOARD_URL.to_string()),
        })
    }
}

/// Parse a numeric variable, falling back to `default` when unset or invalid.
fn parse_or<T: std::str::FromStr>(name: &str, raw: Option<String>, default: T) -> T {
    match raw {
        None => default,
        Some(v) => v.trim().parse().unwrap_or_else(|_| {
            warn!(env_var = name, value = %v, "Invalid numeric value, using default");
            default
        }),
    }
}

/// Parse a comma-separated list of strings.
fn parse_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Split and validate the recipient list.
///
/// Blank entries (including a trailing comma) are dropped; anything left
/// must look like an address.
fn parse_recipients(raw: &str) -> Result<Vec<String>, ConfigError> {
    let recipients = parse_csv(raw);

    if recipients.is_empty() {
        return Err(ConfigError::Invalid {
            name: "TO_ADDRESSES_COMMA_SEPARATED",
            value: raw.to_string(),
        });
    }

    if let Some(bad) = recipients.iter().find(|r| !looks_like_address(r)) {
        return Err(ConfigError::Invalid {
            name: "TO_ADDRESSES_COMMA_SEPARATED",
            value: bad.clone(),
        });
    }

    Ok(recipients)
}

fn looks_like_address(addr: &str) -> bool {
    match addr.rsplit_once('@') {
        Some((local, domain)) => !local.trim().is_empty() && !domain.trim().is_empty(),
        None => false,
    }
}
