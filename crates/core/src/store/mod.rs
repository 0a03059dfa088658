//! Content-addressed gif store.
//!
//! - Identifiers are the SHA-256 of the source URL text
//! - Blobs are laid out under the root as `host/path`
//! - The index is one JSON snapshot rewritten on every mutation
//! - Orphaned blobs can be listed and pruned on demand

pub mod disk;
pub mod hash;
pub mod index;
pub mod reconcile;

pub use disk::DiskStore;
pub use hash::compute_identifier;
pub use index::{Entry, Index, location_for};
