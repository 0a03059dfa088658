//! MCP tool implementations.
//!
//! This module contains all tools exposed by the gifstash server.

pub mod delete;
pub mod get;
pub mod image;
pub mod list;
pub mod prune;
pub mod random;
pub mod submit;

pub use delete::{GifDeleteParams, delete_impl};
pub use get::{GifGetParams, get_impl};
pub use list::list_impl;
pub use prune::prune_impl;
pub use random::random_impl;
pub use submit::{GifSubmitParams, submit_impl};

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use bytes::Bytes;
    use gifstash_client::Fetcher;
    use gifstash_core::{DiskStore, Error};
    use rmcp::model::CallToolResult;
    use tempfile::TempDir;

    /// Fetcher that serves fixed bytes and counts calls.
    pub struct StubFetcher {
        pub bytes: &'static [u8],
        pub calls: AtomicUsize,
    }

    impl StubFetcher {
        pub fn new(bytes: &'static [u8]) -> Self {
            Self { bytes, calls: AtomicUsize::new(0) }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Fetcher for StubFetcher {
        async fn fetch_bytes(&self, _source_url: &str) -> Result<Bytes, Error> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Bytes::from_static(self.bytes))
        }
    }

    /// Fetcher that always fails like an unreachable host.
    pub struct FailingFetcher;

    #[async_trait]
    impl Fetcher for FailingFetcher {
        async fn fetch_bytes(&self, source_url: &str) -> Result<Bytes, Error> {
            Err(Error::HttpError(format!("network error: {source_url} unreachable")))
        }
    }

    pub async fn open_store() -> (TempDir, DiskStore) {
        let dir = TempDir::new().unwrap();
        let store = DiskStore::open(dir.path()).await.unwrap();
        (dir, store)
    }

    /// Parse the JSON text of the first content block.
    pub fn text_json<T: serde::de::DeserializeOwned>(result: &CallToolResult) -> T {
        let content_val = serde_json::to_value(&result.content[0]).unwrap();
        let text = content_val
            .get("text")
            .and_then(|v| v.as_str())
            .expect("Expected text field in content");
        serde_json::from_str(text).unwrap()
    }

    /// Decode the base64 image data of the first content block.
    pub fn image_bytes(result: &CallToolResult) -> Vec<u8> {
        use base64::Engine as _;

        let content_val = serde_json::to_value(&result.content[0]).unwrap();
        let data = content_val
            .get("data")
            .and_then(|v| v.as_str())
            .expect("Expected data field in content");
        base64::engine::general_purpose::STANDARD.decode(data).unwrap()
    }
}
