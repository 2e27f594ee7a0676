//! Shipping details collected on the information step.

use crate::CommerceError;
use serde::{Deserialize, Serialize};

/// Placeholder value of the city selector before a choice is made.
pub const NO_CITY: &str = "None";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ShippingInfo {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    /// City or district, one of the names the delivery API lists.
    pub city: String,
    pub phone: String,
    #[serde(default)]
    pub note: String,
}

impl ShippingInfo {
    pub fn customer_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
    }

    pub fn has_city(&self) -> bool {
        let city = self.city.trim();
        !city.is_empty() && city != NO_CITY
    }

    /// Check required fields; the first failure is returned.
    pub fn validate(&self) -> Result<(), CommerceError> {
        self.errors().into_iter().next().map_or(Ok(()), Err)
    }

    /// Every failing field, for rendering next to the form.
    pub fn errors(&self) -> Vec<CommerceError> {
        let mut errors = Vec::new();
        let required = [
            ("email", &self.email),
            ("first_name", &self.first_name),
            ("last_name", &self.last_name),
            ("address", &self.address),
            ("phone", &self.phone),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                errors.push(CommerceError::validation(field, "This field is required"));
            }
        }
        if !self.email.trim().is_empty() && !is_valid_email(&self.email) {
            errors.push(CommerceError::validation("email", "Enter a valid email address"));
        }
        if !self.has_city() {
            errors.push(CommerceError::validation("city", "Select a city or district"));
        }
        errors
    }
}

/// Loose shape check: one `@`, something before it, a dot after it.
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.split('.').count() >= 2
                && domain.split('.').all(|part| !part.is_empty())
                && !email.contains(char::is_whitespace)
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_shape() {
        assert!(is_valid_email("a@b.co"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("@b.co"));
        assert!(!is_valid_email("a@@b.co"));
        assert!(!is_valid_email("a b@c.co"));
    }

    #[test]
    fn test_default_city_is_rejected() {
        let info = ShippingInfo {
            email: "a@b.co".to_string(),
            first_name: "Ram".to_string(),
            last_name: "Thapa".to_string(),
            address: "Lakeside".to_string(),
            city: NO_CITY.to_string(),
            phone: "9811111111".to_string(),
            note: String::new(),
        };
        let errors = info.errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0], CommerceError::validation("city", "Select a city or district"));
    }

    #[test]
    fn test_missing_fields_are_listed() {
        let info = ShippingInfo::default();
        // five required text fields plus the city
        assert_eq!(info.errors().len(), 6);
        assert!(info.validate().is_err());
    }

    #[test]
    fn test_customer_name() {
        let info = ShippingInfo {
            first_name: " Ram ".to_string(),
            last_name: "Thapa".to_string(),
            ..Default::default()
        };
        assert_eq!(info.customer_name(), "Ram Thapa");
    }
}
