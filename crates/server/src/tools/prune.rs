//! gif_prune tool implementation.
//!
//! Deletes blobs that no index entry points at.

use gifstash_core::{DiskStore, Error};
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Output from the gif_prune tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GifPruneOutput {
    /// Number of blobs deleted.
    pub removed: usize,
    /// Deleted blob paths relative to the store root.
    pub paths: Vec<String>,
}

/// Implementation of the gif_prune tool.
pub async fn prune_impl(store: &DiskStore) -> Result<CallToolResult, McpError> {
    let paths = store.prune_orphans().await?;

    let output = GifPruneOutput { removed: paths.len(), paths };
    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::{open_store, text_json};

    #[tokio::test]
    async fn test_prune_after_delete() {
        let (dir, store) = open_store().await;
        let kept = store.store(b"a", "http://x.test/a.gif").await.unwrap();
        store.store(b"b", "http://x.test/b.gif").await.unwrap();
        store.delete("http://x.test/b.gif").await.unwrap();

        let output: GifPruneOutput = text_json(&prune_impl(&store).await.unwrap());

        assert_eq!(output.removed, 1);
        assert_eq!(output.paths, vec!["x.test/b.gif".to_string()]);
        assert!(!dir.path().join("x.test/b.gif").exists());
        assert_eq!(store.get(&kept).await.unwrap(), b"a");
    }

    #[tokio::test]
    async fn test_prune_nothing() {
        let (_dir, store) = open_store().await;
        let output: GifPruneOutput = text_json(&prune_impl(&store).await.unwrap());
        assert_eq!(output.removed, 0);
    }
}
