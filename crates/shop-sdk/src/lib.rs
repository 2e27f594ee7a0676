//! Storefront platform SDK.
//!
//! Re-exports the shop crates so a workload depends on one crate:
//!
//! ```ignore
//! use shop_sdk::prelude::*;
//!
//! let logger = StructuredLogger::new(ctx.request_id.clone()).with_route(&ctx.path);
//! let api = StoreApi::connect(SpinTransport, &config.api_base_url)?;
//!
//! sink.send_shell(&shell.render_opening()).await?;
//! let faqs = api.faqs().await;
//! let section = Section::new("faqs").with_fallback(FAQ_FALLBACK).resolve(faqs.map(render_faqs));
//! sink.send_output(&section).await?;
//! ```

pub use shop_cache;
pub use shop_commerce;
pub use shop_core;
pub use shop_data;
pub use shop_observability;
pub use shop_streaming;

/// Prelude for convenient imports.
///
/// The cache and data crates each carry their own `prelude`, so their items
/// are listed rather than glob-imported.
pub mod prelude {
    pub use shop_cache::{
        Cache, CacheError, CachePolicy, CacheScope, KvStore, MemoryStore, Session, SessionData,
        SessionId,
    };
    #[cfg(target_arch = "wasm32")]
    pub use shop_cache::SpinKvStore;
    pub use shop_commerce::prelude::*;
    pub use shop_core::*;
    #[cfg(target_arch = "wasm32")]
    pub use shop_data::SpinTransport;
    pub use shop_data::{
        CallRecord, ClientRequest, DependencyTag, FetchClient, FetchError, HttpRequest,
        HttpTransport, MockTransport, Response, StoreApi,
    };
    pub use shop_observability::*;
    pub use shop_streaming::*;
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    #[test]
    fn test_prelude_reaches_every_crate() {
        let sessions: Session<Vec<String>, _> = Session::new(MemoryStore::new(), 60);
        let id = SessionId::generate();
        sessions.set(&id, &vec!["aviator".to_string()]).unwrap();
        assert!(sessions.exists(&id).unwrap());

        let api = StoreApi::connect(MockTransport::new(), "http://api.test/api/v1").unwrap();
        assert!(api.take_calls().is_empty());
        assert_eq!(DependencyTag::Orders.name(), "orders");
        assert_eq!(Money::from_rupees(15).to_string(), "Rs. 15.00");
        assert_eq!(escape_html("<b>"), "&lt;b&gt;");
    }
}
