//! Listing module.
//!
//! Filters, sorting, price ranges and pagination for catalog pages.

mod filter;
mod pagination;

pub use filter::{PriceRange, ProductFilters, SortOption, MAX_PRICE, MIN_PRICE, PRICE_STEPS};
pub use pagination::{PageLink, Paginated, Pagination};
