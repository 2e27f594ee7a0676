//! Product catalog module.
//!
//! Contains the product, variant and category shapes the catalog API returns.

mod category;
mod product;

pub use category::{Category, CategoryRef, SubCategory};
pub use product::{
    parse_weight, OptionSelection, OptionValue, Product, ProductImage, ProductOption,
    ProductVariant,
};
