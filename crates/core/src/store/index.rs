//! Index entries, blob locations and the snapshot file.
//!
//! The snapshot is the whole index as one JSON object keyed by identifier:
//!
//! ```json
//! { "<id>": { "loc": "x.test/a.gif", "url": "http://x.test/a.gif" } }
//! ```
//!
//! It is rewritten in full on every mutation. The new document goes to a
//! temp file first and is renamed over the old one.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use url::Url;

use crate::Error;

/// Snapshot file name under the store root.
pub const SNAPSHOT_FILE: &str = "index.json";

/// Temp file the snapshot is written to before the rename.
pub const SNAPSHOT_TEMP_FILE: &str = "index.json.tmp";

/// A stored gif: where its bytes live and where they came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct Entry {
    /// Blob path relative to the store root, `/`-separated.
    #[serde(rename = "loc")]
    pub location: String,

    /// The URL the bytes were fetched from.
    #[serde(rename = "url")]
    pub source_url: String,
}

/// Identifier to entry mapping.
pub type Index = BTreeMap<String, Entry>;

/// Derive the blob location for a source URL.
///
/// Mirrors the remote structure: `host[:port]/path/segments`. Query and
/// fragment are ignored. Empty interior segments are collapsed.
pub fn location_for(source_url: &str) -> Result<String, Error> {
    let url = Url::parse(source_url).map_err(|e| Error::InvalidUrl(format!("{source_url}: {e}")))?;

    let host = url
        .host_str()
        .filter(|h| !h.is_empty())
        .ok_or_else(|| Error::InvalidUrl(format!("{source_url}: missing host")))?;

    // the snapshot lives at the root, a host directory must not shadow it
    if host == SNAPSHOT_FILE || host == SNAPSHOT_TEMP_FILE {
        return Err(Error::InvalidUrl(format!("{source_url}: reserved host name")));
    }

    let mut location = match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    };

    let segments: Vec<&str> = url.path_segments().map(|s| s.collect()).unwrap_or_default();
    if segments.last().is_none_or(|last| last.is_empty()) {
        return Err(Error::InvalidUrl(format!("{source_url}: no file name in path")));
    }

    for segment in segments.into_iter().filter(|s| !s.is_empty()) {
        if segment == "." || segment == ".." {
            return Err(Error::InvalidUrl(format!("{source_url}: relative path segment")));
        }
        location.push('/');
        location.push_str(segment);
    }

    Ok(location)
}

/// Read and decode the snapshot under `root`.
///
/// A `null` document decodes as an empty index.
pub async fn read_snapshot(root: &Path) -> Result<Index, Error> {
    let path = root.join(SNAPSHOT_FILE);
    let bytes = fs::read(&path).await.map_err(Error::io("read", &path))?;
    let index: Option<Index> = serde_json::from_slice(&bytes)?;
    Ok(index.unwrap_or_default())
}

/// Encode `index` and replace the snapshot under `root`.
pub async fn write_snapshot(root: &Path, index: &Index) -> Result<(), Error> {
    let bytes = serde_json::to_vec(index)?;
    let temp_path = root.join(SNAPSHOT_TEMP_FILE);
    let path = root.join(SNAPSHOT_FILE);

    let mut file = fs::File::create(&temp_path)
        .await
        .map_err(Error::io("create", &temp_path))?;
    file.write_all(&bytes).await.map_err(Error::io("write", &temp_path))?;
    file.sync_all().await.map_err(Error::io("sync", &temp_path))?;
    drop(file);

    fs::rename(&temp_path, &path).await.map_err(Error::io("rename", &path))?;

    tracing::debug!(entries = index.len(), bytes = bytes.len(), "wrote index snapshot");
    Ok(())
}
