//! Storefront domain types and logic.
//!
//! The backend owns pricing, stock, promo validation and delivery charges.
//! This crate holds the shapes it returns plus the logic the storefront runs
//! locally:
//!
//! - **Catalog**: Products, variants, option selection, categories
//! - **Cart**: The session cart, keyed by product and variant
//! - **Checkout**: Shipping details, promo codes, totals, order payloads
//! - **Listing**: Filters, sorting, price ranges, pagination
//! - **Content**: Blog posts, FAQs, testimonials, contact messages
//!
//! # Example
//!
//! ```rust
//! use shop_commerce::prelude::*;
//!
//! let mut cart = Cart::new();
//! let frame = CartProduct {
//!     id: ProductId::new(1),
//!     name: "Aviator".to_string(),
//!     slug: "aviator".to_string(),
//!     price: Money::from_rupees(2500),
//!     thumbnail_image: None,
//!     weight: Some("150g".to_string()),
//! };
//! cart.add(frame.clone(), 1, None).unwrap();
//! cart.add(frame, 1, None).unwrap();
//!
//! assert_eq!(cart.item_count(), 2);
//! assert_eq!(cart.total_price().unwrap().display(), "Rs. 5000.00");
//! ```

pub mod error;
pub mod ids;
pub mod money;

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod content;
pub mod listing;

pub use error::CommerceError;
pub use ids::*;
pub use money::{Currency, Money};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::CommerceError;
    pub use crate::ids::*;
    pub use crate::money::{Currency, Money};

    // Catalog
    pub use crate::catalog::{
        Category, CategoryRef, OptionSelection, Product, ProductImage, ProductOption,
        ProductVariant, SubCategory,
    };

    // Cart
    pub use crate::cart::{Cart, CartItem, CartProduct, CartVariant, MAX_QUANTITY_PER_ITEM};

    // Checkout
    pub use crate::checkout::{
        AppliedPromo, CheckoutDraft, CheckoutStep, CheckoutTotals, DeliveryQuote, Order,
        OrderRequest, PaymentType, PromoValidation, ShippingInfo,
    };

    // Listing
    pub use crate::listing::{PageLink, Paginated, Pagination, PriceRange, ProductFilters, SortOption};

    // Content
    pub use crate::content::{BlogPost, ContactForm, ContactMessage, Faq, Testimonial};
}
