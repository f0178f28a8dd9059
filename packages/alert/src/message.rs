//! Alert text.

use chrono::{DateTime, Utc};
use safety_map_geography_models::Coordinate;
use serde::Deserialize;

use crate::contacts::EmergencyContact;

/// Name the alerts are sent under.
pub const APP_NAME: &str = "Comunidad Segura";

/// Subject line of alert emails.
pub const EMAIL_SUBJECT: &str = "🚨 EMERGENCY ALERT - Immediate Assistance Needed";

/// What the user is broadcasting.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertRequest {
    /// Who is sending the alert.
    pub sender_name: String,
    /// Where the sender is, when location sharing allows it.
    #[serde(default)]
    pub location: Option<Coordinate>,
    /// When the alert was raised.
    #[serde(default = "Utc::now")]
    pub sent_at: DateTime<Utc>,
}

impl AlertRequest {
    /// Creates a request stamped with the current time.
    #[must_use]
    pub fn new(sender_name: impl Into<String>, location: Option<Coordinate>) -> Self {
        Self {
            sender_name: sender_name.into(),
            location,
            sent_at: Utc::now(),
        }
    }

    /// Returns a map link for the sender's position.
    #[must_use]
    pub fn map_link(&self) -> Option<String> {
        self.location
            .filter(Coordinate::is_valid)
            .map(|c| format!("https://maps.google.com/?q={},{}", c.lat, c.lng))
    }

    fn location_line(&self) -> String {
        self.map_link().map_or_else(
            || "Location: not available.".to_string(),
            |link| format!("Location: {link}"),
        )
    }

    /// Text message body.
    #[must_use]
    pub fn sms_body(&self) -> String {
        format!(
            "🚨 Emergency alert from {APP_NAME}.\n\nSent by: {}\n{}\nStay safe.",
            self.sender_name,
            self.location_line()
        )
    }

    /// Email body addressed to `contact`.
    #[must_use]
    pub fn email_body(&self, contact: &EmergencyContact) -> String {
        let mut body = format!(
            "EMERGENCY ALERT\n\n\
             Your emergency contact has activated an emergency alert and may need immediate assistance.\n\n\
             Contact Details:\n\
             - Name: {}\n\
             - Phone: {}\n\
             - Time: {}\n",
            contact.name,
            contact.phone,
            self.sent_at.format("%Y-%m-%d %H:%M UTC"),
        );

        if let Some(link) = self.map_link() {
            body.push_str("- Location: ");
            body.push_str(&link);
            body.push('\n');
        }

        body.push_str(
            "\nPlease contact them immediately or call emergency services if needed.\n\n\
             This is an automated emergency notification from ",
        );
        body.push_str(APP_NAME);
        body.push('.');
        body
    }
}
