#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Emergency alerts to the user's trusted contacts.
//!
//! An alert is fanned out over every configured [`AlertChannel`] to every
//! contact that channel can reach. Deliveries run concurrently and one
//! failing delivery never stops the others.

pub mod channels;
pub mod contacts;
pub mod message;

use futures::future::join_all;
use serde::Serialize;
use thiserror::Error;

pub use channels::{AlertChannel, ChannelKind, channels_from_env};
pub use contacts::{EmergencyContact, MAX_CONTACTS, normalize_contacts};
pub use message::AlertRequest;

/// Errors from sending alerts.
#[derive(Debug, Error)]
pub enum AlertError {
    /// HTTP request to a delivery provider failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider rejected the message.
    #[error("Provider error: {message}")]
    Provider {
        /// Error message from the provider.
        message: String,
    },

    /// A channel is missing credentials.
    #[error("Configuration error: {message}")]
    Config {
        /// What is missing.
        message: String,
    },

    /// The user has no usable emergency contacts.
    #[error("No emergency contacts configured")]
    NoContacts,
}

/// Outcome of [`dispatch_alert`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertSummary {
    /// Number of usable contacts.
    pub total_contacts: usize,
    /// Text messages delivered.
    pub sms_sent: usize,
    /// Emails delivered.
    pub emails_sent: usize,
    /// Deliveries that failed.
    pub failures: usize,
    /// Contacts with a phone number, for the user to call directly.
    pub phone_contacts: Vec<EmergencyContact>,
}

/// Sends `request` to every contact over every channel that can reach
/// them.
///
/// # Errors
///
/// Returns [`AlertError::NoContacts`] if no contact is usable. Delivery
/// failures are logged and counted in [`AlertSummary::failures`].
pub async fn dispatch_alert(
    contacts: Vec<EmergencyContact>,
    request: &AlertRequest,
    channels: &[Box<dyn AlertChannel>],
) -> Result<AlertSummary, AlertError> {
    let contacts = normalize_contacts(contacts);
    if contacts.is_empty() {
        return Err(AlertError::NoContacts);
    }

    if channels.is_empty() {
        log::warn!("No alert channels configured; nothing will be delivered");
    }

    let reachable = &contacts;
    let deliveries = channels.iter().flat_map(move |channel| {
        let kind = channel.kind();
        reachable
            .iter()
            .filter(move |contact| kind.reaches(contact))
            .map(move |contact| async move {
                let result = channel.send(contact, request).await;
                if let Err(e) = &result {
                    log::error!("Failed to send {kind} alert to {}: {e}", contact.name);
                } else {
                    log::info!("Sent {kind} alert to {}", contact.name);
                }
                (kind, result.is_ok())
            })
    });

    let mut summary = AlertSummary {
        total_contacts: contacts.len(),
        phone_contacts: contacts.iter().filter(|c| c.has_phone()).cloned().collect(),
        ..AlertSummary::default()
    };

    for (kind, delivered) in join_all(deliveries).await {
        match (kind, delivered) {
            (ChannelKind::Sms, true) => summary.sms_sent += 1,
            (ChannelKind::Email, true) => summary.emails_sent += 1,
            (_, false) => summary.failures += 1,
        }
    }

    log::info!(
        "Emergency alert: {} contacts, {} sms, {} emails, {} failures",
        summary.total_contacts,
        summary.sms_sent,
        summary.emails_sent,
        summary.failures
    );

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    struct FakeChannel {
        kind: ChannelKind,
        fail_for: Option<&'static str>,
        sent: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl AlertChannel for FakeChannel {
        fn kind(&self) -> ChannelKind {
            self.kind
        }

        async fn send(
            &self,
            contact: &EmergencyContact,
            _request: &AlertRequest,
        ) -> Result<(), AlertError> {
            if self.fail_for == Some(contact.name.as_str()) {
                return Err(AlertError::Provider {
                    message: "rejected".to_string(),
                });
            }
            self.sent.lock().unwrap().push(contact.name.clone());
            Ok(())
        }
    }

    fn contact(name: &str, phone: &str, email: Option<&str>) -> EmergencyContact {
        EmergencyContact {
            name: name.to_string(),
            phone: phone.to_string(),
            email: email.map(String::from),
            relationship: String::new(),
        }
    }

    fn channel(
        kind: ChannelKind,
        fail_for: Option<&'static str>,
    ) -> (Box<dyn AlertChannel>, Arc<Mutex<Vec<String>>>) {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let channel = FakeChannel {
            kind,
            fail_for,
            sent: Arc::clone(&sent),
        };
        (Box::new(channel), sent)
    }

    #[tokio::test]
    async fn no_contacts_is_an_error() {
        let request = AlertRequest::new("Maria", None);
        let result = dispatch_alert(vec![contact("", "", None)], &request, &[]).await;
        assert!(matches!(result, Err(AlertError::NoContacts)));
    }

    #[tokio::test]
    async fn routes_by_available_details() {
        let (sms, sms_sent) = channel(ChannelKind::Sms, None);
        let (email, email_sent) = channel(ChannelKind::Email, None);
        let contacts = vec![
            contact("Ana", "555-0100", Some("ana@example.com")),
            contact("Luis", "", Some("luis@example.com")),
            contact("Eva", "555-0102", None),
        ];

        let summary = dispatch_alert(
            contacts,
            &AlertRequest::new("Maria", None),
            &[sms, email],
        )
        .await
        .unwrap();

        assert_eq!(summary.total_contacts, 3);
        assert_eq!(summary.sms_sent, 2);
        assert_eq!(summary.emails_sent, 2);
        assert_eq!(summary.failures, 0);

        let phone_names: Vec<&str> = summary
            .phone_contacts
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(phone_names, ["Ana", "Eva"]);

        assert_eq!(*sms_sent.lock().unwrap(), ["Ana", "Eva"]);
        assert_eq!(*email_sent.lock().unwrap(), ["Ana", "Luis"]);
    }

    #[tokio::test]
    async fn one_failure_does_not_stop_the_rest() {
        let (sms, sms_sent) = channel(ChannelKind::Sms, Some("Ana"));
        let contacts = vec![
            contact("Ana", "555-0100", None),
            contact("Eva", "555-0102", None),
        ];

        let summary = dispatch_alert(contacts, &AlertRequest::new("Maria", None), &[sms])
            .await
            .unwrap();

        assert_eq!(summary.sms_sent, 1);
        assert_eq!(summary.failures, 1);
        assert_eq!(*sms_sent.lock().unwrap(), ["Eva"]);
    }

    #[tokio::test]
    async fn no_channels_still_reports_phone_contacts() {
        let summary = dispatch_alert(
            vec![contact("Ana", "555-0100", None)],
            &AlertRequest::new("Maria", None),
            &[],
        )
        .await
        .unwrap();

        assert_eq!(summary.sms_sent, 0);
        assert_eq!(summary.phone_contacts.len(), 1);
    }
}
