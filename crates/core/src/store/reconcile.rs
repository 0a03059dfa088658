//! Orphaned blob detection.
//!
//! Blobs become orphaned when an entry is deleted (deletion is index-only) or
//! when a snapshot write fails after the blob was written. Nothing here runs
//! automatically; callers decide when to scan or prune.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tokio::fs;

use super::disk::DiskStore;
use super::index::{Index, SNAPSHOT_FILE, SNAPSHOT_TEMP_FILE};
use crate::Error;

impl DiskStore {
    /// Blob paths under the root that no index entry points at.
    ///
    /// Paths are relative to the root and `/`-separated, sorted.
    pub async fn orphans(&self) -> Result<Vec<String>, Error> {
        let _guard = self.write_lock.lock().await;
        let index = self.list_all().await;
        find_orphans(self.root(), &index).await
    }

    /// Delete every orphaned blob, returning the removed paths.
    pub async fn prune_orphans(&self) -> Result<Vec<String>, Error> {
        let _guard = self.write_lock.lock().await;
        let index = self.list_all().await;
        let orphans = find_orphans(self.root(), &index).await?;

        for location in &orphans {
            let path = self.root().join(location);
            fs::remove_file(&path).await.map_err(Error::io("remove_file", &path))?;
        }

        if !orphans.is_empty() {
            tracing::info!(removed = orphans.len(), "pruned orphaned blobs");
        }
        Ok(orphans)
    }
}

async fn find_orphans(root: &Path, index: &Index) -> Result<Vec<String>, Error> {
    let indexed: HashSet<&str> = index.values().map(|entry| entry.location.as_str()).collect();
    let mut orphans = Vec::new();
    let mut pending: Vec<PathBuf> = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let mut entries = fs::read_dir(&dir).await.map_err(Error::io("read_dir", &dir))?;

        while let Some(entry) = entries.next_entry().await.map_err(Error::io("read_dir", &dir))? {
            let path = entry.path();
            let file_type = entry.file_type().await.map_err(Error::io("stat", &path))?;

            if file_type.is_dir() {
                pending.push(path);
                continue;
            }
            if !file_type.is_file() {
                continue;
            }

            let location = relative_location(root, &path);
            if location == SNAPSHOT_FILE || location == SNAPSHOT_TEMP_FILE {
                continue;
            }
            if !indexed.contains(location.as_str()) {
                orphans.push(location);
            }
        }
    }

    orphans.sort();
    Ok(orphans)
}

fn relative_location(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
