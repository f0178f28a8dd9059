//! SMS through the Twilio Messages API.

use async_trait::async_trait;
use serde::Deserialize;

use super::{AlertChannel, ChannelKind, require_env};
use crate::AlertError;
use crate::contacts::EmergencyContact;
use crate::message::AlertRequest;

const DEFAULT_API_BASE: &str = "https://api.twilio.com";

/// Twilio SMS sender.
pub struct TwilioSms {
    account_sid: String,
    auth_token: String,
    from_phone: String,
    api_base: String,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct TwilioError {
    message: String,
}

impl TwilioSms {
    /// Creates a sender for the given account.
    #[must_use]
    pub fn new(account_sid: String, auth_token: String, from_phone: String) -> Self {
        Self {
            account_sid,
            auth_token,
            from_phone,
            api_base: DEFAULT_API_BASE.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Reads `TWILIO_SID`, `TWILIO_AUTH`, and `TWILIO_PHONE`.
    ///
    /// # Errors
    ///
    /// Returns [`AlertError::Config`] if any of them is unset.
    pub fn from_env() -> Result<Self, AlertError> {
        Ok(Self::new(
            require_env("TWILIO_SID")?,
            require_env("TWILIO_AUTH")?,
            require_env("TWILIO_PHONE")?,
        ))
    }

    /// Points the sender at a different API host.
    #[must_use]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.api_base.trim_end_matches('/'),
            self.account_sid
        )
    }
}

#[async_trait]
impl AlertChannel for TwilioSms {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Sms
    }

    async fn send(
        &self,
        contact: &EmergencyContact,
        request: &AlertRequest,
    ) -> Result<(), AlertError> {
        let body = request.sms_body();
        let resp = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[
                ("To", contact.phone.trim()),
                ("From", self.from_phone.as_str()),
                ("Body", body.as_str()),
            ])
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }

        let text = resp.text().await?;
        let message = serde_json::from_str::<TwilioError>(&text)
            .map_or_else(|_| format!("Twilio returned {status}"), |e| e.message);

        Err(AlertError::Provider { message })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_url_includes_account() {
        let sms = TwilioSms::new("AC123".into(), "t".into(), "+15550000".into())
            .with_api_base("http://localhost:8080/");
        assert_eq!(
            sms.messages_url(),
            "http://localhost:8080/2010-04-01/Accounts/AC123/Messages.json"
        );
        assert_eq!(sms.kind(), ChannelKind::Sms);
    }
}
