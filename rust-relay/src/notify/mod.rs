//! Notification composition.
//!
//! Turns a verified Tally submission into the email handed to the mailer.
//!
//! ```text
//! TallyWebhook → compose_notification() → Email
//! ```

pub mod format;
pub mod payload;

use tracing::info;

use crate::config::Config;
use crate::mail::Email;

pub use format::html_escape;
pub use payload::{Field, SubmissionData, TallyWebhook};

/// Build the notification email for a submission.
pub fn compose_notification(config: &Config, webhook: &TallyWebhook) -> Email {
    let fields = &webhook.data.fields;

    let text = format::text_preamble(&config.dashboard_url) + &format::fields_text(fields);
    let html = format::html_preamble(&config.dashboard_url) + &format::fields_html(fields);

    info!(
        event_id = webhook.event_id.as_deref().unwrap_or(""),
        form_name = webhook.data.form_name.as_deref().unwrap_or(""),
        field_count = fields.len(),
        text_length = text.len(),
        html_length = html.len(),
        "notification_composed"
    );

    Email {
        from: config.from_address.clone(),
        to: config.to_addresses.clone(),
        subject: config.email_subject.clone(),
        text,
        html,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn test_config() -> Config {
        Config::from_lookup(|name| match name {
            "TALLY_SIGNING_SECRET" => Some("s3cret".to_string()),
            "MAIL_BACKEND" => Some("log".to_string()),
            "TO_ADDRESSES_COMMA_SEPARATED" => Some("a@example.com,b@example.com".to_string()),
            _ => None,
        })
        .unwrap()
    }

    #[test]
    fn test_compose_single_field() {
        let webhook =
            TallyWebhook::from_slice(br#"{"data":{"fields":[{"label":"Name","value":"Ana"}]}}"#)
                .unwrap();

        let email = compose_notification(&test_config(), &webhook);

        assert_eq!(email.subject, "New Feedback");
        assert_eq!(email.from, "Feedback notification <feedback@polrivero.com>");
        assert_eq!(email.to, vec!["a@example.com", "b@example.com"]);
        assert!(email.text.ends_with("Name: Ana"));
        assert!(email
            .text
            .starts_with("You received new feedback. Go to dashboard: https://tally.so/forms/nGLBXQ/submissions.\n\n"));
        assert!(email.html.contains("<p><strong>Name:</strong><br>Ana</p>"));
    }

    #[test]
    fn test_compose_preserves_field_count_and_order() {
        let webhook = TallyWebhook::from_slice(
            br#"{"data":{"fields":[
                {"label":"A","value":"1"},
                {"label":"B","value":"2"},
                {"label":"C","value":"3"}
            ]}}"#,
        )
        .unwrap();

        let email = compose_notification(&test_config(), &webhook);

        let lines: Vec<&str> = email
            .text
            .split("\n\n")
            .nth(1)
            .unwrap()
            .lines()
            .collect();
        assert_eq!(lines, vec!["A: 1", "B: 2", "C: 3"]);

        let fragments: Vec<&str> = email.html.matches("<p><strong>").collect();
        assert_eq!(fragments.len(), 3);
        let a = email.html.find("<strong>A:</strong>").unwrap();
        let b = email.html.find("<strong>B:</strong>").unwrap();
        let c = email.html.find("<strong>C:</strong>").unwrap();
        assert!(a < b && b < c);
    }
}
