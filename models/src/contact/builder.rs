use crate::error::model_error::ModelError;
use crate::{Contact, ErrorLocation};

use std::panic::Location;

/// Builder for creating validated Contact instances.
///
/// Mirrors the contact form: name and number are required, email is
/// optional and an empty email is treated as absent.
#[derive(Debug, Default)]
pub struct ContactBuilder {
    id: Option<String>,
    name: Option<String>,
    number: Option<String>,
    email: Option<String>,
}

impl ContactBuilder {
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_number(mut self, number: impl Into<String>) -> Self {
        self.number = Some(number.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Build the Contact with validation.
    #[track_caller]
    pub fn build(self) -> Result<Contact, ModelError> {
        let name = self
            .name
            .map(|name| name.trim().to_string())
            .ok_or_else(|| ModelError::Validation {
                message: String::from("Contact name is required"),
                location: ErrorLocation::from(Location::caller()),
            })?;

        if name.is_empty() {
            return Err(ModelError::Validation {
                message: String::from("Contact name cannot be empty"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let number = self
            .number
            .map(|number| number.trim().to_string())
            .ok_or_else(|| ModelError::Validation {
                message: String::from("Contact number is required"),
                location: ErrorLocation::from(Location::caller()),
            })?;

        if number.is_empty() {
            return Err(ModelError::Validation {
                message: String::from("Contact number cannot be empty"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let email = self
            .email
            .map(|email| email.trim().to_string())
            .filter(|email| !email.is_empty());

        if let Some(ref email) = email
            && !email.contains('@')
        {
            return Err(ModelError::Validation {
                message: format!("Invalid email address: {email}"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        Ok(Contact {
            id: self.id.filter(|id| !id.is_empty()),
            name,
            number,
            email,
        })
    }
}
