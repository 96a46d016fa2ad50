//! Shipping details collected before settlement.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

fn zip_regex() -> &'static Regex {
    static ZIP_REGEX: OnceLock<Regex> = OnceLock::new();
    ZIP_REGEX.get_or_init(|| Regex::new(r"^[0-9]{5}(-[0-9]{4})?$").expect("zip pattern compiles"))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingDetails {
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
}

/// Field name (camelCase, as submitted) to message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ShippingErrors {
    pub fields: BTreeMap<&'static str, &'static str>,
}

impl fmt::Display for ShippingErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.fields.keys().copied().collect();
        write!(f, "invalid shipping details: {}", names.join(", "))
    }
}

impl std::error::Error for ShippingErrors {}

impl ShippingErrors {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&'static str> {
        self.fields.get(field).copied()
    }
}

impl ShippingDetails {
    /// Check every field and report all failures at once.
    pub fn validate(&self) -> Result<(), ShippingErrors> {
        let mut errors = ShippingErrors::default();

        let required = [
            ("firstName", &self.first_name, "First name is required"),
            ("lastName", &self.last_name, "Last name is required"),
            ("address", &self.address, "Address is required"),
            ("city", &self.city, "City is required"),
            ("state", &self.state, "State is required"),
            ("zipCode", &self.zip_code, "ZIP code is required"),
        ];
        for (field, value, message) in required {
            if value.trim().is_empty() {
                errors.fields.insert(field, message);
            }
        }

        if !self.zip_code.trim().is_empty() && !zip_regex().is_match(&self.zip_code) {
            errors.fields.insert("zipCode", "Invalid ZIP code format");
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
pub(crate) fn sample_shipping() -> ShippingDetails {
    ShippingDetails {
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        address: "12 St James's Square".to_string(),
        city: "Beverly Hills".to_string(),
        state: "CA".to_string(),
        zip_code: "90210".to_string(),
    }
}
