//! gif_get tool implementation.
//!
//! Returns a stored gif by identifier.

use gifstash_core::{DiskStore, Error};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::image::image_result;

/// Parameters for the gif_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GifGetParams {
    /// The identifier returned by gif_submit.
    pub id: String,
}

/// Implementation of the gif_get tool.
pub async fn get_impl(store: &DiskStore, params: GifGetParams) -> Result<CallToolResult, McpError> {
    let entry = store
        .lookup(&params.id)
        .await
        .ok_or_else(|| Error::NotFound(params.id.clone()))?;
    let bytes = store.get(&params.id).await?;

    Ok(image_result(&entry, &bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::{image_bytes, open_store};
    use gifstash_core::store::compute_identifier;

    #[tokio::test]
    async fn test_get_impl_missing() {
        let (_dir, store) = open_store().await;
        let params = GifGetParams { id: compute_identifier("http://x.test/never.gif") };

        let result = get_impl(&store, params).await;
        assert_eq!(result.unwrap_err().code.0, -32001);
    }

    #[tokio::test]
    async fn test_get_impl_found() {
        let (_dir, store) = open_store().await;
        let id = store.store(b"GIF89a", "http://x.test/a.gif").await.unwrap();

        let result = get_impl(&store, GifGetParams { id }).await.unwrap();
        assert_eq!(image_bytes(&result), b"GIF89a");
    }

    #[tokio::test]
    async fn test_get_impl_after_delete() {
        let (_dir, store) = open_store().await;
        let id = store.store(b"GIF89a", "http://x.test/a.gif").await.unwrap();
        store.delete("http://x.test/a.gif").await.unwrap();

        let result = get_impl(&store, GifGetParams { id }).await;
        assert_eq!(result.unwrap_err().code.0, -32001);
    }
}
