//! Popup content for report markers.

use std::fmt::Write as _;

use serde::Serialize;

/// Content shown when a marker is selected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Popup {
    /// Heading, usually the report type.
    pub title: String,
    /// Where the activity was seen.
    pub location: Option<String>,
    /// User-entered time text.
    pub time_seen: Option<String>,
    /// Relative age label such as `"5 mins ago"`.
    pub relative_age: String,
    /// Distance from the user.
    pub distance: Option<String>,
    /// Free-text notes.
    pub notes: Option<String>,
}

impl Popup {
    /// A popup with only a heading.
    #[must_use]
    pub fn titled(title: &str) -> Self {
        Self {
            title: title.to_string(),
            location: None,
            time_seen: None,
            relative_age: String::new(),
            distance: None,
            notes: None,
        }
    }

    /// Renders the popup as an HTML fragment. All user-supplied text is
    /// escaped.
    #[must_use]
    pub fn to_html(&self) -> String {
        let mut html = String::from("<div class=\"popup\">");
        write!(html, "<h3>🚨 {}</h3>", escape_html(&self.title)).unwrap();

        if let Some(location) = &self.location {
            write!(
                html,
                "<p><strong>📍 Location:</strong> {}</p>",
                escape_html(location)
            )
            .unwrap();
        }
        if let Some(time_seen) = &self.time_seen {
            write!(
                html,
                "<p><strong>🕒 Time:</strong> {}</p>",
                escape_html(time_seen)
            )
            .unwrap();
        }
        if !self.relative_age.is_empty() {
            write!(html, "<p class=\"age\">{}</p>", self.relative_age).unwrap();
        }
        if let Some(distance) = &self.distance {
            write!(html, "<p class=\"distance\">{distance}</p>").unwrap();
        }
        if let Some(notes) = &self.notes {
            write!(
                html,
                "<p class=\"notes\"><strong>Notes:</strong> {}</p>",
                escape_html(notes)
            )
            .unwrap();
        }

        html.push_str("</div>");
        html
    }
}

/// Escapes the five HTML-significant characters.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
