//! Key-value storage for the storefront.
//!
//! Sessions (cart, checkout draft, applied promo) are JSON documents in
//! Spin's key-value store, addressed by the `sid` cookie.
//!
//! # Example
//!
//! ```rust
//! use shop_cache::{MemoryStore, Session, SessionId};
//!
//! let sessions = Session::<Vec<String>, _>::new(MemoryStore::new(), 3600);
//! let id = SessionId::generate();
//!
//! let items = sessions.update(&id, |items| items.push("aviator".to_string())).unwrap();
//! assert_eq!(items.len(), 1);
//! assert_eq!(sessions.get(&id).unwrap(), Some(vec!["aviator".to_string()]));
//! ```

mod error;
mod kv;
mod policy;
mod session;

pub use error::CacheError;
pub use kv::{Cache, KvStore, MemoryStore};
#[cfg(target_arch = "wasm32")]
pub use kv::SpinKvStore;
pub use policy::{CachePolicy, CacheScope};
pub use session::{Session, SessionData, SessionId};

pub mod prelude {
    pub use crate::{Cache, CacheError, CachePolicy, KvStore, Session, SessionId};
}
