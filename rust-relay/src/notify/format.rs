//! Plain-text and HTML rendering of submission fields.

use super::payload::Field;

/// Preamble of the plain-text body.
pub fn text_preamble(dashboard_url: &str) -> String {
    format!(
        "You received new feedback. Go to dashboard: {}.\n\n",
        dashboard_url
    )
}

/// Preamble of the HTML body.
pub fn html_preamble(dashboard_url: &str) -> String {
    format!(
        "<p>You received new feedback. <a href=\"{}\">Go to dashboard</a></p>",
        html_escape(dashboard_url)
    )
}

/// One `label: value` line per field, newline-joined.
pub fn fields_text(fields: &[Field]) -> String {
    fields
        .iter()
        .map(|f| format!("{}: {}", f.label(), f.value_text()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// One `<p>` fragment per field with label and value escaped.
pub fn fields_html(fields: &[Field]) -> String {
    fields
        .iter()
        .map(|f| {
            format!(
                "<p><strong>{}:</strong><br>{}</p>",
                html_escape(f.label()),
                html_escape(&f.value_text()).replace('\n', "<br>")
            )
        })
        .collect()
}

/// Simple HTML escaping for text content.
pub fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
