//! Emergency contacts.

use serde::{Deserialize, Serialize};

/// Most contacts a user can keep.
pub const MAX_CONTACTS: usize = 3;

/// Someone to notify when the user triggers an emergency alert.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmergencyContact {
    /// Display name.
    pub name: String,
    /// Phone number for SMS. May be empty.
    pub phone: String,
    /// Email address, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Free-text relationship to the user (e.g. "sister").
    pub relationship: String,
}

impl EmergencyContact {
    /// Returns `true` if the contact can receive an SMS.
    #[must_use]
    pub fn has_phone(&self) -> bool {
        !self.phone.trim().is_empty()
    }

    /// Returns the trimmed email address, if one is set.
    #[must_use]
    pub fn email_address(&self) -> Option<&str> {
        self.email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
    }

    /// A contact is usable when it has a name and at least one way to
    /// reach them.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.name.trim().is_empty() && (self.has_phone() || self.email_address().is_some())
    }

    fn trimmed(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            phone: self.phone.trim().to_string(),
            email: self
                .email
                .map(|e| e.trim().to_string())
                .filter(|e| !e.is_empty()),
            relationship: self.relationship.trim().to_string(),
        }
    }
}

/// Trims every field, drops unusable contacts, and keeps at most
/// [`MAX_CONTACTS`].
#[must_use]
pub fn normalize_contacts(contacts: Vec<EmergencyContact>) -> Vec<EmergencyContact> {
    let before = contacts.len();
    let normalized: Vec<EmergencyContact> = contacts
        .into_iter()
        .map(EmergencyContact::trimmed)
        .filter(EmergencyContact::is_valid)
        .take(MAX_CONTACTS)
        .collect();

    if normalized.len() != before {
        log::debug!(
            "Kept {} of {before} emergency contacts",
            normalized.len()
        );
    }

    normalized
}
