//! Email through the EmailJS REST API.

use async_trait::async_trait;
use serde::Serialize;

use super::{AlertChannel, ChannelKind, require_env};
use crate::AlertError;
use crate::contacts::EmergencyContact;
use crate::message::{APP_NAME, AlertRequest, EMAIL_SUBJECT};

const DEFAULT_SEND_URL: &str = "https://api.emailjs.com/api/v1.0/email/send";

/// EmailJS sender.
pub struct EmailJs {
    service_id: String,
    template_id: String,
    public_key: String,
    send_url: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct SendRequest<'a> {
    service_id: &'a str,
    template_id: &'a str,
    user_id: &'a str,
    template_params: TemplateParams<'a>,
}

#[derive(Debug, Serialize)]
struct TemplateParams<'a> {
    to_name: &'a str,
    to_email: &'a str,
    from_name: &'a str,
    subject: &'a str,
    message: String,
}

impl EmailJs {
    /// Creates a sender for the given EmailJS service and template.
    #[must_use]
    pub fn new(service_id: String, template_id: String, public_key: String) -> Self {
        Self {
            service_id,
            template_id,
            public_key,
            send_url: DEFAULT_SEND_URL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Reads `EMAILJS_SERVICE_ID`, `EMAILJS_TEMPLATE_ID`, and
    /// `EMAILJS_PUBLIC_KEY`.
    ///
    /// # Errors
    ///
    /// Returns [`AlertError::Config`] if any of them is unset.
    pub fn from_env() -> Result<Self, AlertError> {
        Ok(Self::new(
            require_env("EMAILJS_SERVICE_ID")?,
            require_env("EMAILJS_TEMPLATE_ID")?,
            require_env("EMAILJS_PUBLIC_KEY")?,
        ))
    }

    /// Points the sender at a different send endpoint.
    #[must_use]
    pub fn with_send_url(mut self, send_url: impl Into<String>) -> Self {
        self.send_url = send_url.into();
        self
    }
}

fn template_params<'a>(
    contact: &'a EmergencyContact,
    to_email: &'a str,
    request: &AlertRequest,
) -> TemplateParams<'a> {
    TemplateParams {
        to_name: &contact.name,
        to_email,
        from_name: APP_NAME,
        subject: EMAIL_SUBJECT,
        message: request.email_body(contact),
    }
}

#[async_trait]
impl AlertChannel for EmailJs {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Email
    }

    async fn send(
        &self,
        contact: &EmergencyContact,
        request: &AlertRequest,
    ) -> Result<(), AlertError> {
        let to_email = contact.email_address().ok_or_else(|| AlertError::Provider {
            message: format!("{} has no email address", contact.name),
        })?;

        let payload = SendRequest {
            service_id: &self.service_id,
            template_id: &self.template_id,
            user_id: &self.public_key,
            template_params: template_params(contact, to_email, request),
        };

        let resp = self
            .client
            .post(&self.send_url)
            .json(&payload)
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }

        let text = resp.text().await?;
        Err(AlertError::Provider {
            message: format!("EmailJS returned {status}: {text}"),
        })
    }
}
