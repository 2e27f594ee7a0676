//! Observability for the storefront.
//!
//! This crate provides:
//! - `StructuredLogger` - Structured logging with request context
//! - `MetricsCollector` - Per-request timing, section and backend call metrics

mod logging;
mod metrics;

pub use logging::*;
pub use metrics::*;

// Re-export RequestId and TimingContext from shop-core for convenience
pub use shop_core::{RequestId, TimingContext};
