//! Client for the commerce backend.
//!
//! Requests go through an [`HttpTransport`], which is Spin's outbound HTTP
//! inside the component and [`MockTransport`] in tests. [`StoreApi`] wraps
//! one method around each backend endpoint and records every call with its
//! [`DependencyTag`] so the page can log it.

mod api;
mod client;
mod dependency;
mod error;
mod request;
mod response;
mod transport;

pub use api::{CallRecord, StoreApi};
pub use client::{ClientRequest, FetchClient};
pub use dependency::DependencyTag;
pub use error::FetchError;
pub use request::HttpRequest;
pub use response::Response;
#[cfg(target_arch = "wasm32")]
pub use transport::SpinTransport;
pub use transport::{HttpTransport, MockTransport};

pub use shop_core::Method;

pub mod prelude {
    pub use crate::{DependencyTag, FetchClient, FetchError, HttpTransport, StoreApi};
}
