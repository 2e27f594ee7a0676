//! Checkout flow state machine.
//!
//! Checkout opens on the information step (the cart step is the cart page
//! itself) and moves to payment once shipping details validate. The draft is
//! stored in the session between requests.

use crate::checkout::{AppliedPromo, ShippingInfo};
use crate::CommerceError;
use serde::{Deserialize, Serialize};

/// Steps in the checkout flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStep {
    /// Cart review.
    Cart,
    /// Shipping information.
    #[default]
    Information,
    /// Payment method and order review.
    Payment,
    /// Order placed.
    Confirmation,
}

impl CheckoutStep {
    pub const ALL: [CheckoutStep; 4] = [
        CheckoutStep::Cart,
        CheckoutStep::Information,
        CheckoutStep::Payment,
        CheckoutStep::Confirmation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutStep::Cart => "cart",
            CheckoutStep::Information => "information",
            CheckoutStep::Payment => "payment",
            CheckoutStep::Confirmation => "confirmation",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "cart" => Some(CheckoutStep::Cart),
            "information" => Some(CheckoutStep::Information),
            "payment" => Some(CheckoutStep::Payment),
            "confirmation" => Some(CheckoutStep::Confirmation),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            CheckoutStep::Cart => "Cart",
            CheckoutStep::Information => "Information",
            CheckoutStep::Payment => "Payment",
            CheckoutStep::Confirmation => "Confirmation",
        }
    }

    /// Get the step number (1-indexed).
    pub fn number(&self) -> u8 {
        match self {
            CheckoutStep::Cart => 1,
            CheckoutStep::Information => 2,
            CheckoutStep::Payment => 3,
            CheckoutStep::Confirmation => 4,
        }
    }

    /// Width of the progress bar, in percent.
    pub fn progress_percent(&self) -> u8 {
        let last = CheckoutStep::ALL.len() as u8 - 1;
        (self.number() - 1) * 100 / last
    }

    /// Page heading for the step.
    pub fn heading(&self) -> &'static str {
        match self {
            CheckoutStep::Payment => "Payment & Review",
            _ => "Shipping Information",
        }
    }
}

/// Checkout state carried across requests.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CheckoutDraft {
    pub step: CheckoutStep,
    #[serde(default)]
    pub shipping: Option<ShippingInfo>,
    #[serde(default)]
    pub promo: Option<AppliedPromo>,
}

impl CheckoutDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record validated shipping details and move to payment.
    pub fn submit_information(&mut self, info: ShippingInfo) -> Result<CheckoutStep, CommerceError> {
        if self.step != CheckoutStep::Information && self.step != CheckoutStep::Payment {
            return Err(CommerceError::InvalidCheckoutTransition {
                from: self.step.as_str().to_string(),
                to: CheckoutStep::Payment.as_str().to_string(),
            });
        }
        info.validate()?;
        self.shipping = Some(info);
        self.step = CheckoutStep::Payment;
        Ok(self.step)
    }

    /// Return to the information step to edit shipping details.
    pub fn edit_information(&mut self) {
        if self.step == CheckoutStep::Payment {
            self.step = CheckoutStep::Information;
        }
    }

    /// Shipping details, required to place the order.
    pub fn ready_shipping(&self) -> Result<&ShippingInfo, CommerceError> {
        match (&self.step, &self.shipping) {
            (CheckoutStep::Payment, Some(info)) => Ok(info),
            _ => Err(CommerceError::InvalidCheckoutTransition {
                from: self.step.as_str().to_string(),
                to: CheckoutStep::Confirmation.as_str().to_string(),
            }),
        }
    }

    pub fn apply_promo(&mut self, promo: AppliedPromo) {
        self.promo = Some(promo);
    }

    pub fn remove_promo(&mut self) -> bool {
        self.promo.take().is_some()
    }
}
