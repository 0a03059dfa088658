//! Core types and shared functionality for gifstash.
//!
//! This crate provides:
//! - Content-addressed gif store with a JSON snapshot index
//! - Expiring in-memory map for short-lived pins
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod store;

pub use cache::ExpiringMap;
pub use config::{AppConfig, ConfigError};
pub use error::Error;
pub use store::{DiskStore, Entry, Index};
