//! Form validation performed before any request is sent

use serde::Serialize;

use crate::error::{Error, Result};
use crate::invariants::assert_plate_normalized;
use crate::models::{NewFine, Role};

pub const MIN_PLATE_LEN: usize = 3;
pub const MAX_PLATE_LEN: usize = 15;

/// Trim and upper-case a plate as typed
pub fn normalize_plate(input: &str) -> String {
    input.trim().to_uppercase()
}

/// Normalize and check a plate entered for a fine lookup
pub fn validate_plate(input: &str) -> Result<String> {
    let plate = normalize_plate(input);

    if plate.is_empty() {
        return Err(Error::Validation(
            "Please enter a license plate number".into(),
        ));
    }

    let len = plate.chars().count();
    if !(MIN_PLATE_LEN..=MAX_PLATE_LEN).contains(&len) {
        return Err(Error::Validation(format!(
            "Please enter a valid license plate number ({}-{} characters)",
            MIN_PLATE_LEN, MAX_PLATE_LEN
        )));
    }

    assert_plate_normalized(&plate);
    Ok(plate)
}

/// Issue-fine form as entered by an authority
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IssueFineForm {
    pub license_plate: String,
    pub violation_type: String,
    pub amount: String,
    pub description: String,
}

impl IssueFineForm {
    /// Build the request body, rejecting empty fields and non-positive amounts
    pub fn validate(&self) -> Result<NewFine> {
        let plate = normalize_plate(&self.license_plate);
        let violation_type = self.violation_type.trim();
        let amount = self.amount.trim().parse::<f64>().ok();

        match amount {
            Some(amount)
                if !plate.is_empty()
                    && !violation_type.is_empty()
                    && amount.is_finite()
                    && amount > 0.0 =>
            {
                Ok(NewFine {
                    license_plate_number: plate,
                    violation_type: violation_type.to_string(),
                    amount,
                    description: self.description.trim().to_string(),
                })
            }
            _ => Err(Error::Validation(
                "Please fill in all required fields with valid values.".into(),
            )),
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Sign-up form as entered
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegistrationForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub full_name: String,
    pub role: String,
}

/// Registration request body
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub role: Role,
}

impl RegistrationForm {
    pub fn validate(&self) -> Result<Registration> {
        if self.password != self.confirm_password {
            return Err(Error::Validation("Passwords do not match!".into()));
        }

        let missing = [
            &self.username,
            &self.email,
            &self.password,
            &self.full_name,
            &self.role,
        ]
        .iter()
        .any(|field| field.is_empty());
        if missing {
            return Err(Error::Validation("Please fill in all fields".into()));
        }

        Ok(Registration {
            username: self.username.clone(),
            email: self.email.clone(),
            password: self.password.clone(),
            full_name: self.full_name.clone(),
            role: self.role.parse()?,
        })
    }
}
