//! Tally webhook payload types.
//!
//! Only `data.fields` drives the notification; the remaining envelope fields
//! are optional and only used for logging.

use serde::Deserialize;
use serde_json::Value;

/// Tally webhook envelope.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TallyWebhook {
    #[serde(default)]
    pub event_id: Option<String>,
    #[serde(default)]
    pub event_type: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    pub data: SubmissionData,
}

/// Form submission contents.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionData {
    #[serde(default)]
    pub submission_id: Option<String>,
    #[serde(default)]
    pub form_id: Option<String>,
    #[serde(default)]
    pub form_name: Option<String>,
    pub fields: Vec<Field>,
}

/// A single answered question.
#[derive(Debug, Clone, Deserialize)]
pub struct Field {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub value: Value,
}

impl Field {
    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or("")
    }

    /// Render the answer as display text.
    ///
    /// Choice questions arrive as arrays, numeric ones as numbers and
    /// unanswered ones as `null`.
    pub fn value_text(&self) -> String {
        render_value(&self.value)
    }
}

fn render_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(render_value)
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

impl TallyWebhook {
    /// Parse the raw request body.
    pub fn from_slice(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_minimal() {
        let webhook =
            TallyWebhook::from_slice(br#"{"data":{"fields":[{"label":"Name","value":"Ana"}]}}"#)
                .unwrap();

        assert_eq!(webhook.data.fields.len(), 1);
        assert_eq!(webhook.data.fields[0].label(), "Name");
        assert_eq!(webhook.data.fields[0].value_text(), "Ana");
        assert!(webhook.event_id.is_none());
    }

    #[test]
    fn test_parse_full_envelope() {
        let body = json!({
            "eventId": "a4cb511e-d513-4fa5-baee-b815d718dfd1",
            "eventType": "FORM_RESPONSE",
            "createdAt": "2023-06-28T15:00:21.889Z",
            "data": {
                "responseId": "2wgx4n",
                "submissionId": "2wgx4n",
                "formId": "VwbNEw",
                "formName": "Feedback",
                "fields": [
                    {"key": "question_3EKz4n", "label": "Email", "type": "INPUT_EMAIL", "value": "ana@example.com"}
                ]
            }
        });

        let webhook = TallyWebhook::from_slice(body.to_string().as_bytes()).unwrap();

        assert_eq!(webhook.event_type.as_deref(), Some("FORM_RESPONSE"));
        assert_eq!(webhook.data.form_name.as_deref(), Some("Feedback"));
        assert_eq!(webhook.data.submission_id.as_deref(), Some("2wgx4n"));
        assert_eq!(webhook.data.fields[0].value_text(), "ana@example.com");
    }

    #[test]
    fn test_value_rendering() {
        let field = |value: Value| Field {
            label: Some("Q".to_string()),
            value,
        };

        assert_eq!(field(Value::Null).value_text(), "");
        assert_eq!(field(json!(5)).value_text(), "5");
        assert_eq!(field(json!(true)).value_text(), "true");
        assert_eq!(field(json!(["Red", "Blue"])).value_text(), "Red, Blue");
        assert_eq!(field(json!({"a": 1})).value_text(), r#"{"a":1}"#);
    }

    #[test]
    fn test_missing_label() {
        let webhook = TallyWebhook::from_slice(br#"{"data":{"fields":[{"value":"x"}]}}"#).unwrap();
        assert_eq!(webhook.data.fields[0].label(), "");
    }

    #[test]
    fn test_missing_fields_rejected() {
        assert!(TallyWebhook::from_slice(br#"{"data":{}}"#).is_err());
        assert!(TallyWebhook::from_slice(b"not json").is_err());
    }
}
