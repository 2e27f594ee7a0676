//! Promo codes and checkout totals.

use crate::error::CommerceError;
use crate::ids::PromoCodeId;
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// The promo code object returned by a successful validation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PromoCode {
    pub id: PromoCodeId,
    pub code: String,
    /// Decimal string such as `"10.00"`.
    pub discount_percentage: String,
}

/// Response of the promo validation endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PromoValidation {
    pub valid: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub promo_code: Option<PromoCode>,
}

impl PromoValidation {
    /// Turn the response into an applied promo, or the message to show.
    pub fn into_applied(self) -> Result<AppliedPromo, String> {
        match (self.valid, self.promo_code) {
            (true, Some(promo)) => AppliedPromo::try_from(promo).map_err(|e| e.to_string()),
            (_, _) => Err(self
                .message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| "Invalid promo code".to_string())),
        }
    }
}

/// A promo accepted by the backend and held in the checkout draft.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppliedPromo {
    pub id: PromoCodeId,
    pub code: String,
    pub discount_percentage: f64,
}

impl AppliedPromo {
    pub fn discount_on(&self, subtotal: Money) -> Money {
        subtotal.percentage(self.discount_percentage)
    }

    /// "10% off", without trailing zeros.
    pub fn label(&self) -> String {
        format!("{}% off", self.discount_percentage)
    }
}

impl TryFrom<PromoCode> for AppliedPromo {
    type Error = CommerceError;

    fn try_from(promo: PromoCode) -> Result<Self, Self::Error> {
        let pct: f64 = promo
            .discount_percentage
            .trim()
            .parse()
            .map_err(|_| CommerceError::InvalidAmount(promo.discount_percentage.clone()))?;
        if !(0.0..=100.0).contains(&pct) {
            return Err(CommerceError::InvalidAmount(promo.discount_percentage));
        }
        Ok(Self {
            id: promo.id,
            code: promo.code,
            discount_percentage: pct,
        })
    }
}

/// Order summary figures.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CheckoutTotals {
    pub subtotal: Money,
    pub delivery_charge: Money,
    pub discount: Money,
    pub total: Money,
}

impl CheckoutTotals {
    /// `total = subtotal + delivery - subtotal * pct / 100`.
    ///
    /// The discount applies to the subtotal only, never to delivery.
    pub fn compute(
        subtotal: Money,
        delivery_charge: Money,
        promo: Option<&AppliedPromo>,
    ) -> Result<Self, CommerceError> {
        let discount = promo.map(|p| p.discount_on(subtotal)).unwrap_or(Money::ZERO);
        let total = subtotal
            .try_add(&delivery_charge)?
            .try_subtract(&discount)?;
        Ok(Self {
            subtotal,
            delivery_charge,
            discount,
            total,
        })
    }

    /// Shipping label: "FREE" when there is no charge.
    pub fn shipping_label(&self) -> String {
        if self.delivery_charge.is_zero() {
            "FREE".to_string()
        } else {
            self.delivery_charge.display()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn promo(pct: &str) -> PromoCode {
        PromoCode {
            id: PromoCodeId::new(3),
            code: "DASHAIN".to_string(),
            discount_percentage: pct.to_string(),
        }
    }

    #[test]
    fn test_totals_without_promo() {
        let t = CheckoutTotals::compute(Money::from_rupees(2000), Money::from_rupees(150), None)
            .unwrap();
        assert_eq!(t.discount, Money::ZERO);
        assert_eq!(t.total, Money::from_rupees(2150));
    }

    #[test]
    fn test_totals_with_promo_discounts_subtotal_only() {
        let applied = AppliedPromo::try_from(promo("10.00")).unwrap();
        let t = CheckoutTotals::compute(
            Money::from_rupees(2000),
            Money::from_rupees(150),
            Some(&applied),
        )
        .unwrap();
        assert_eq!(t.discount, Money::from_rupees(200));
        assert_eq!(t.total, Money::from_rupees(1950));
    }

    #[test]
    fn test_shipping_label() {
        let t = CheckoutTotals::compute(Money::from_rupees(100), Money::ZERO, None).unwrap();
        assert_eq!(t.shipping_label(), "FREE");
        let t = CheckoutTotals::compute(Money::from_rupees(100), Money::from_rupees(100), None)
            .unwrap();
        assert_eq!(t.shipping_label(), "Rs. 100.00");
    }

    #[test]
    fn test_validation_response() {
        let ok = PromoValidation {
            valid: true,
            message: None,
            promo_code: Some(promo("15")),
        };
        let applied = ok.into_applied().unwrap();
        assert_eq!(applied.discount_percentage, 15.0);
        assert_eq!(applied.label(), "15% off");

        let rejected = PromoValidation {
            valid: false,
            message: Some("Promo code has expired".to_string()),
            promo_code: None,
        };
        assert_eq!(rejected.into_applied().unwrap_err(), "Promo code has expired");

        let silent = PromoValidation {
            valid: false,
            message: None,
            promo_code: None,
        };
        assert_eq!(silent.into_applied().unwrap_err(), "Invalid promo code");
    }

    #[test]
    fn test_out_of_range_percentage_rejected() {
        assert!(AppliedPromo::try_from(promo("150")).is_err());
        assert!(AppliedPromo::try_from(promo("ten")).is_err());
    }
}
