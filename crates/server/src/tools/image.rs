//! Image content helpers shared by the read tools.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use gifstash_core::Entry;
use rmcp::model::{CallToolResult, Content};

/// Mime type for a stored blob, from the extension of its location.
///
/// Anything unrecognised is served as a gif.
pub fn mime_for(location: &str) -> &'static str {
    let file_name = location.rsplit('/').next().unwrap_or(location);
    let extension = file_name.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        _ => "image/gif",
    }
}

/// Tool result carrying the blob as base64 image content.
pub fn image_result(entry: &Entry, bytes: &[u8]) -> CallToolResult {
    let data = STANDARD.encode(bytes);
    CallToolResult::success(vec![Content::image(data, mime_for(&entry.location))])
}
