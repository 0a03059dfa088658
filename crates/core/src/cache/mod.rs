//! In-memory caches with per-entry expiry.
//!
//! Nothing here is persisted; entries live for the process lifetime at most.

pub mod expiring;

pub use expiring::ExpiringMap;
