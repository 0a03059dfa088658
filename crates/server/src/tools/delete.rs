//! gif_delete tool implementation.
//!
//! Removes gifs from the index by source URL. Blobs stay on disk until pruned.

use gifstash_core::{DiskStore, Error};
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the gif_delete tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GifDeleteParams {
    /// The source URL the gif was submitted with.
    pub url: String,
}

/// Output from the gif_delete tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GifDeleteOutput {
    /// The URL that was matched.
    pub url: String,
    /// Number of index entries removed.
    pub removed: usize,
}

/// Implementation of the gif_delete tool.
pub async fn delete_impl(store: &DiskStore, params: GifDeleteParams) -> Result<CallToolResult, McpError> {
    let url = params.url.trim();
    if url.is_empty() {
        return Err(Error::InvalidInput("url cannot be empty".into()).into());
    }

    let removed = store.delete(url).await?;

    let output = GifDeleteOutput { url: url.to_string(), removed };
    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}
