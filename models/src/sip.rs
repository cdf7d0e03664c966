//! SIP account settings.

use crate::{ErrorLocation, ModelError, RedactedSecret};

use std::panic::Location;

use serde::Deserialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SipSettings {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: RedactedSecret,
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub proxy: String,
}

impl SipSettings {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<RedactedSecret>,
        domain: impl Into<String>,
        proxy: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into().trim().to_string(),
            password: password.into(),
            domain: domain.into().trim().to_string(),
            proxy: proxy.into().trim().to_string(),
        }
    }

    /// Registration needs username, password and domain; proxy is optional.
    #[track_caller]
    pub fn validate(&self) -> Result<(), ModelError> {
        let missing = [
            ("username", self.username.is_empty()),
            ("password", self.password.is_empty()),
            ("domain", self.domain.is_empty()),
        ]
        .into_iter()
        .filter_map(|(field, empty)| empty.then_some(field))
        .collect::<Vec<_>>();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ModelError::Validation {
                message: format!("Missing required SIP fields: {}", missing.join(", ")),
                location: ErrorLocation::from(Location::caller()),
            })
        }
    }
}
