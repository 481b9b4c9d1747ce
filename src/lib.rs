//! Stash
//!
//! Backend-agnostic key-value cache with TTLs (in-memory or Redis) and a
//! cookie session manager built on top of it.

pub mod cache;
pub mod cli;
pub mod config;
pub mod context;
pub mod logger;
pub mod session;

pub use cache::{Cache, CacheError, CacheExt, CacheManager};
pub use context::Context;
pub use session::{SessionCookie, SessionError, SessionManager};

pub fn pkg_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
