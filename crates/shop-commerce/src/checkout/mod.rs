//! Checkout module.
//!
//! Shipping details, promo codes, totals and the order payload.

mod delivery;
mod flow;
mod order;
mod promo;
mod shipping;

pub use delivery::{needs_quote, DeliveryQuote};
pub use flow::{CheckoutDraft, CheckoutStep};
pub use order::{
    payment_display, Order, OrderItem, OrderOptionValue, OrderProduct, OrderRequest,
    OrderRequestItem, OrderVariant, PaymentType,
};
pub use promo::{AppliedPromo, CheckoutTotals, PromoCode, PromoValidation};
pub use shipping::{is_valid_email, ShippingInfo, NO_CITY};
