//! Command handlers for CLI operations

pub mod cache;

pub use cache::CacheCommandHandler;
