//! gif_list tool implementation.
//!
//! Lists every stored gif.

use gifstash_core::{DiskStore, Error, Index};
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Output from the gif_list tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GifListOutput {
    /// Number of stored gifs.
    pub count: usize,
    /// Stored gifs keyed by identifier.
    pub gifs: Index,
}

/// Implementation of the gif_list tool.
pub async fn list_impl(store: &DiskStore) -> Result<CallToolResult, McpError> {
    let index = store.list_all().await;
    let output = GifListOutput { count: index.len(), gifs: Index::clone(&index) };

    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::{open_store, text_json};

    #[tokio::test]
    async fn test_list_empty() {
        let (_dir, store) = open_store().await;
        let output: GifListOutput = text_json(&list_impl(&store).await.unwrap());

        assert_eq!(output.count, 0);
        assert!(output.gifs.is_empty());
    }

    #[tokio::test]
    async fn test_list_entries() {
        let (_dir, store) = open_store().await;
        let id = store.store(b"a", "http://x.test/a.gif").await.unwrap();
        store.store(b"b", "http://y.test/b.gif").await.unwrap();

        let output: GifListOutput = text_json(&list_impl(&store).await.unwrap());

        assert_eq!(output.count, 2);
        assert_eq!(output.gifs[&id].location, "x.test/a.gif");
        assert_eq!(output.gifs[&id].source_url, "http://x.test/a.gif");
    }
}
