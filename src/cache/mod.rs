//! Cache module - Moka-backed caching behind a small registry.
//!
//! Warden deliberately keeps durable moderation state uncached: tenant
//! configuration and warning counters are re-read from the store on every
//! event so that settings changes take effect immediately. The only thing
//! worth caching is the admin-status lookup, which is a Telegram API round
//! trip rather than store state.
//!
//! The registry pattern keeps cache creation in one place:
//! - `CacheRegistry` - central registry holding all named caches
//! - `TypedCache` - a typed wrapper over a Moka sync cache

mod config;
mod registry;
mod typed;

pub use config::CacheConfig;
pub use registry::CacheRegistry;
pub use typed::TypedCache;
