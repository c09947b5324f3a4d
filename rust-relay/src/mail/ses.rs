//! Amazon SES v2 mailer.
//!
//! Sends through `POST /v2/email/outbound-emails`, signed with SigV4.
//! Reference: https://docs.aws.amazon.com/ses/latest/APIReference-V2/API_SendEmail.html

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use url::Url;

use super::sigv4::{self, SigningRequest};
use super::{Email, Mailer};
use crate::config::{AwsCredentials, Config};
use crate::error::MailError;

const SEND_EMAIL_PATH: &str = "/v2/email/outbound-emails";
const SERVICE: &str = "ses";
const CHARSET: &str = "UTF-8";
const CONTENT_TYPE: &str = "application/json";

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct SendEmailRequest<'a> {
    from_email_address: &'a str,
    destination: Destination<'a>,
    content: EmailContent<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct Destination<'a> {
    to_addresses: &'a [String],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct EmailContent<'a> {
    simple: Message<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct Message<'a> {
    subject: Content<'a>,
    body: Body<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct Body<'a> {
    text: Content<'a>,
    html: Content<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct Content<'a> {
    data: &'a str,
    charset: &'static str,
}

impl<'a> Content<'a> {
    fn utf8(data: &'a str) -> Self {
        Self {
            data,
            charset: CHARSET,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SendEmailResponse {
    #[serde(default)]
    message_id: Option<String>,
}

// =============================================================================
// Mailer
// =============================================================================

/// SES mailer holding a pooled HTTP client and signing credentials.
#[derive(Debug, Clone)]
pub struct SesMailer {
    client: Client,
    url: Url,
    host: String,
    region: String,
    credentials: AwsCredentials,
}

impl SesMailer {
    /// Create a mailer from the loaded configuration.
    pub fn from_config(config: &Config) -> Result<Self, MailError> {
        let credentials = config
            .aws_credentials
            .clone()
            .ok_or_else(|| MailError::Signing("AWS credentials are not configured".to_string()))?;

        let client = Client::builder()
            .timeout(config.ses_request_timeout)
            .build()?;

        Self::new(client, &config.ses_endpoint, &config.aws_region, credentials)
    }

    /// Create a mailer for an explicit endpoint base URL.
    pub fn new(
        client: Client,
        endpoint: &str,
        region: &str,
        credentials: AwsCredentials,
    ) -> Result<Self, MailError> {
        let base = endpoint.trim_end_matches('/');
        let url = Url::parse(&format!("{}{}", base, SEND_EMAIL_PATH))
            .map_err(|_| MailError::Endpoint(endpoint.to_string()))?;

        let host = match (url.host_str(), url.port()) {
            (Some(host), Some(port)) => format!("{}:{}", host, port),
            (Some(host), None) => host.to_string(),
            (None, _) => return Err(MailError::Endpoint(endpoint.to_string())),
        };

        Ok(Self {
            client,
            url,
            host,
            region: region.to_string(),
            credentials,
        })
    }

    fn encode(email: &Email) -> Result<Vec<u8>, MailError> {
        let request = SendEmailRequest {
            from_email_address: &email.from,
            destination: Destination {
                to_addresses: &email.to,
            },
            content: EmailContent {
                simple: Message {
                    subject: Content::utf8(&email.subject),
                    body: Body {
                        text: Content::utf8(&email.text),
                        html: Content::utf8(&email.html),
                    },
                },
            },
        };

        Ok(serde_json::to_vec(&request)?)
    }
}

#[async_trait]
impl Mailer for SesMailer {
    async fn send(&self, email: &Email) -> Result<String, MailError> {
        let body = Self::encode(email)?;

        let signed = sigv4::sign(
            &SigningRequest {
                method: "POST",
                host: &self.host,
                path: self.url.path(),
                content_type: CONTENT_TYPE,
                body: &body,
                region: &self.region,
                service: SERVICE,
            },
            &self.credentials,
            Utc::now(),
        )?;

        info!(
            url = %self.url,
            recipients = email.to.len(),
            body_length = body.len(),
            "ses_send_starting"
        );

        let mut request = self
            .client
            .post(self.url.clone())
            .header(header::CONTENT_TYPE, CONTENT_TYPE)
            .header(header::AUTHORIZATION, signed.authorization)
            .header("x-amz-date", signed.amz_date)
            .header("x-amz-content-sha256", signed.content_sha256);

        if let Some(token) = signed.security_token {
            request = request.header("x-amz-security-token", token);
        }

        let response = request.body(body).send().await.map_err(|e| {
            if e.is_timeout() {
                error!(url = %self.url, error = %e, "ses_send_timeout");
            } else {
                error!(url = %self.url, error = %e, "ses_send_transport_error");
            }
            MailError::Transport(e)
        })?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            error!(
                status_code = status.as_u16(),
                body = %text,
                "ses_send_rejected"
            );
            return Err(MailError::Rejected {
                status: status.as_u16(),
                body: text,
            });
        }

        let message_id = serde_json::from_str::<SendEmailResponse>(&text)
            .ok()
            .and_then(|r| r.message_id)
            .unwrap_or_default();

        info!(
            message_id = %message_id,
            status_code = status.as_u16(),
            "ses_send_complete"
        );

        Ok(message_id)
    }
}
