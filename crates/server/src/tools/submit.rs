//! gif_submit tool implementation.
//!
//! Fetches a gif once and stores it under the identifier derived from its URL.

use chrono::Utc;
use gifstash_client::Fetcher;
use gifstash_core::{
    DiskStore, Error,
    store::{compute_identifier, location_for},
};
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the gif_submit tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GifSubmitParams {
    /// The URL of the gif to fetch and keep.
    pub url: String,
}

/// Output from the gif_submit tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GifSubmitOutput {
    /// Identifier to retrieve the gif with.
    pub id: String,
    /// Blob path under the store root.
    pub location: String,
    /// The submitted URL.
    pub url: String,
    /// Number of bytes stored.
    pub bytes: usize,
    /// ISO8601 timestamp of when the gif was stored.
    pub stored_at: String,
}

/// Implementation of the gif_submit tool.
///
/// Duplicate and unusable URLs are rejected before anything is downloaded.
pub async fn submit_impl(
    store: &DiskStore, fetcher: &dyn Fetcher, params: GifSubmitParams,
) -> Result<CallToolResult, McpError> {
    let url = params.url.trim();
    if url.is_empty() {
        return Err(Error::InvalidInput("url cannot be empty".into()).into());
    }

    let location = location_for(url)?;
    let id = compute_identifier(url);
    if store.lookup(&id).await.is_some() {
        return Err(Error::AlreadyExists(id).into());
    }
    if let Some(owner) = store.location_owner(&location).await {
        return Err(Error::LocationTaken { location, owner }.into());
    }

    let bytes = fetcher.fetch_bytes(url).await.inspect_err(|e| log_failure(url, e))?;
    let id = store.store(&bytes, url).await.inspect_err(|e| log_failure(url, e))?;

    let output = GifSubmitOutput {
        id,
        location,
        url: url.to_string(),
        bytes: bytes.len(),
        stored_at: Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
    };
    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}

fn log_failure(url: &str, err: &Error) {
    match err {
        Error::AlreadyExists(_) | Error::LocationTaken { .. } => tracing::debug!(url, error = %err, "gif not stored"),
        _ if err.is_fetch_error() => tracing::warn!(url, error = %err, "failed to download gif"),
        _ => tracing::error!(url, error = %err, "failed to store gif"),
    }
}
