//! Catalog store implementations.
//!
//! [`http::HttpCatalog`] is the production client for the remote JSON
//! store. [`memory::MemoryCatalog`] is an in-process reference store that
//! models the server's authoritative behavior (version bumps, conflict
//! detection, search, variable substitution); tests and the demo binary's
//! offline mode run against it.

pub mod http;
pub mod memory;

pub use http::HttpCatalog;
pub use memory::MemoryCatalog;
