//! Delivery charge quotes.

use crate::checkout::NO_CITY;
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// Response of the delivery charge calculator.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DeliveryQuote {
    pub delivery_charge: Money,
}

impl DeliveryQuote {
    /// Quote used before a city is chosen.
    pub fn none() -> Self {
        Self {
            delivery_charge: Money::ZERO,
        }
    }
}

/// Whether a quote should be requested for this city at all.
pub fn needs_quote(city: &str) -> bool {
    let city = city.trim();
    !city.is_empty() && city != NO_CITY
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_deserialize() {
        let q: DeliveryQuote = serde_json::from_str(r#"{"delivery_charge": "150.00"}"#).unwrap();
        assert_eq!(q.delivery_charge, Money::from_rupees(150));
    }

    #[test]
    fn test_needs_quote() {
        assert!(!needs_quote("None"));
        assert!(!needs_quote(" "));
        assert!(needs_quote("Pokhara"));
    }
}
