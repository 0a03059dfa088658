//! Client code for gifstash.
//!
//! This crate provides the HTTP fetch pipeline used to download gifs before
//! they are handed to the store.

pub mod fetch;

pub use fetch::{FetchClient, FetchConfig, FetchResponse, Fetcher};
