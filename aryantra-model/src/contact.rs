#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A contact form submission as typed by a visitor.
///
/// Every field is required by the form contract. Enforcement belongs to the
/// form itself; the relay forwards whatever it receives.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ContactFormPayload {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
}

impl ContactFormPayload {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
            message: message.into(),
        }
    }

    /// True when no required field is blank.
    pub fn is_complete(&self) -> bool {
        [&self.name, &self.email, &self.phone, &self.message]
            .iter()
            .all(|field| !field.trim().is_empty())
    }

    /// Names of the required fields that are still blank.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.name.trim().is_empty() {
            missing.push("name");
        }
        if self.email.trim().is_empty() {
            missing.push("email");
        }
        if self.phone.trim().is_empty() {
            missing.push("phone");
        }
        if self.message.trim().is_empty() {
            missing.push("message");
        }
        missing
    }

    /// Reset every field to empty.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
