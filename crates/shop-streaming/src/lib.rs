//! Streaming primitives for shell-first SSR.
//!
//! - `StreamingSink` - ordered shell then sections over any byte sink
//! - `Shell` / `HeadContent` - document skeleton and `<head>`
//! - `PageMeta` - per-page title, description and sharing image
//! - `Section` - named page part with an optional fallback

mod escape;
mod meta;
mod section;
mod shell;
mod sink;

pub use escape::*;
pub use meta::*;
pub use section::*;
pub use shell::*;
pub use sink::*;
