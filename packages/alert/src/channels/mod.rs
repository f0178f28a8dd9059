//! Delivery channels.
//!
//! Each channel is built from environment credentials. A channel whose
//! credentials are missing is left out, so an alert still goes out over
//! whatever is configured.

pub mod emailjs;
pub mod twilio;

use async_trait::async_trait;
use serde::Serialize;
use strum_macros::{AsRefStr, Display};

use crate::AlertError;
use crate::contacts::EmergencyContact;
use crate::message::AlertRequest;

/// How an alert reaches a contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ChannelKind {
    /// Text message to the contact's phone
    Sms,
    /// Email to the contact's address
    Email,
}

impl ChannelKind {
    /// Returns `true` if `contact` has the details this kind needs.
    #[must_use]
    pub fn reaches(self, contact: &EmergencyContact) -> bool {
        match self {
            Self::Sms => contact.has_phone(),
            Self::Email => contact.email_address().is_some(),
        }
    }
}

/// Sends an alert to one contact.
#[async_trait]
pub trait AlertChannel: Send + Sync {
    /// Which kind of delivery this channel performs.
    fn kind(&self) -> ChannelKind;

    /// Delivers `request` to `contact`.
    ///
    /// # Errors
    ///
    /// Returns [`AlertError`] if the provider rejects or cannot be
    /// reached.
    async fn send(
        &self,
        contact: &EmergencyContact,
        request: &AlertRequest,
    ) -> Result<(), AlertError>;
}

/// Builds every channel whose credentials are present in the environment.
#[must_use]
pub fn channels_from_env() -> Vec<Box<dyn AlertChannel>> {
    let mut channels: Vec<Box<dyn AlertChannel>> = Vec::new();

    match twilio::TwilioSms::from_env() {
        Ok(channel) => channels.push(Box::new(channel)),
        Err(e) => log::warn!("SMS alerts disabled: {e}"),
    }

    match emailjs::EmailJs::from_env() {
        Ok(channel) => channels.push(Box::new(channel)),
        Err(e) => log::warn!("Email alerts disabled: {e}"),
    }

    channels
}

/// Reads a required environment variable.
pub(crate) fn require_env(name: &str) -> Result<String, AlertError> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AlertError::Config {
            message: format!("{name} environment variable not set"),
        })
}
