//! Core abstractions for the storefront.
//!
//! This crate provides the fundamental types:
//! - `RequestContext` - Typed request parameters, cookies and form fields
//! - `Router` - Method and path pattern dispatch
//! - `StoreConfig` - Storefront configuration
//! - `PageError` - Handler errors with HTTP status mapping
//! - `TimingContext` - Request lifecycle tracking

mod config;
mod context;
mod error;
mod lifecycle;
mod route;

pub use config::*;
pub use context::*;
pub use error::*;
pub use lifecycle::*;
pub use route::*;
