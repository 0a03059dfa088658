//! On-disk gif store.
//!
//! Blobs live under the store root at paths mirroring their source URL; the
//! index is held in memory as an immutable `Arc<Index>` and persisted to the
//! snapshot file on every mutation.
//!
//! Mutations are serialized by `write_lock`, which is held across the
//! duplicate check, the blob write, the snapshot write and the publish of the
//! new index. Readers only clone the current `Arc`, so they never wait on a
//! mutation in progress and never see a half-applied one.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::fs;
use tokio::sync::{Mutex, RwLock};

use super::hash::compute_identifier;
use super::index::{Entry, Index, SNAPSHOT_FILE, location_for, read_snapshot, write_snapshot};
use crate::Error;

/// Content-addressed gif store backed by a directory.
#[derive(Debug)]
pub struct DiskStore {
    root: PathBuf,
    index: RwLock<Arc<Index>>,
    pub(super) write_lock: Mutex<()>,
}

impl DiskStore {
    /// Open the store rooted at `root`.
    ///
    /// Creates the root directory and an empty snapshot if they don't exist,
    /// then loads the index. Any failure is reported as `Error::InitFailed`.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, Error> {
        let root = root.into();
        let index = load_or_create(&root)
            .await
            .map_err(|e| Error::InitFailed(format!("{}: {e}", root.display())))?;

        tracing::info!(root = %root.display(), entries = index.len(), "opened gif store");

        Ok(Self { root, index: RwLock::new(Arc::new(index)), write_lock: Mutex::new(()) })
    }

    /// Root directory of the store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Store `bytes` fetched from `source_url`, returning its identifier.
    ///
    /// Fails with `Error::AlreadyExists` without touching disk if the URL is
    /// already indexed, and with `Error::LocationTaken` if a different URL
    /// already maps to the same blob path. If the blob is written but the snapshot write fails,
    /// the blob is left in place and the index is unchanged.
    pub async fn store(&self, bytes: &[u8], source_url: &str) -> Result<String, Error> {
        let id = compute_identifier(source_url);

        let _guard = self.write_lock.lock().await;
        let current = self.list_all().await;

        if current.contains_key(&id) {
            tracing::debug!(%id, source_url, "gif already stored");
            return Err(Error::AlreadyExists(id));
        }

        let location = location_for(source_url)?;
        if let Some(owner) = owner_of(&current, &location) {
            tracing::debug!(%id, %location, %owner, "blob location already taken");
            return Err(Error::LocationTaken { location, owner });
        }

        let blob_path = self.root.join(&location);

        if let Some(parent) = blob_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(Error::io("create_dir_all", parent))?;
        }
        fs::write(&blob_path, bytes).await.map_err(Error::io("write", &blob_path))?;

        let mut next = Index::clone(&current);
        next.insert(id.clone(), Entry { location: location.clone(), source_url: source_url.to_string() });
        self.commit(next).await?;

        tracing::info!(%id, %location, bytes = bytes.len(), "stored gif");
        Ok(id)
    }

    /// Read the bytes stored under `id`.
    pub async fn get(&self, id: &str) -> Result<Vec<u8>, Error> {
        let entry = self.lookup(id).await.ok_or_else(|| Error::NotFound(id.to_string()))?;
        let path = self.root.join(&entry.location);
        fs::read(&path).await.map_err(Error::io("read", &path))
    }

    /// Index entry for `id`, without reading the blob.
    pub async fn lookup(&self, id: &str) -> Option<Entry> {
        self.list_all().await.get(id).cloned()
    }

    /// Remove every entry whose source URL equals `source_url`.
    ///
    /// Returns how many entries were removed. Blobs stay on disk. Removing
    /// nothing skips the snapshot write.
    pub async fn delete(&self, source_url: &str) -> Result<usize, Error> {
        let _guard = self.write_lock.lock().await;
        let current = self.list_all().await;

        let next: Index = current
            .iter()
            .filter(|(_, entry)| entry.source_url != source_url)
            .map(|(id, entry)| (id.clone(), entry.clone()))
            .collect();

        let removed = current.len() - next.len();
        if removed == 0 {
            tracing::debug!(source_url, "delete matched no entries");
            return Ok(0);
        }

        self.commit(next).await?;

        tracing::info!(source_url, removed, "deleted gif");
        Ok(removed)
    }

    /// The current index.
    ///
    /// The returned value is immutable; later mutations publish a new index
    /// rather than changing this one.
    pub async fn list_all(&self) -> Arc<Index> {
        Arc::clone(&*self.index.read().await)
    }

    /// Identifier of the indexed gif whose blob lives at `location`, if any.
    pub async fn location_owner(&self, location: &str) -> Option<String> {
        owner_of(&*self.list_all().await, location)
    }

    /// Number of indexed gifs.
    pub async fn len(&self) -> usize {
        self.list_all().await.len()
    }

    /// Whether the index is empty.
    pub async fn is_empty(&self) -> bool {
        self.list_all().await.is_empty()
    }

    /// Persist `next` and make it the current index.
    ///
    /// Callers must hold `write_lock`.
    async fn commit(&self, next: Index) -> Result<(), Error> {
        write_snapshot(&self.root, &next).await?;
        *self.index.write().await = Arc::new(next);
        Ok(())
    }
}

fn owner_of(index: &Index, location: &str) -> Option<String> {
    index
        .iter()
        .find(|(_, entry)| entry.location == location)
        .map(|(id, _)| id.clone())
}

async fn load_or_create(root: &Path) -> Result<Index, Error> {
    fs::create_dir_all(root).await.map_err(Error::io("create_dir_all", root))?;

    let snapshot_path = root.join(SNAPSHOT_FILE);
    let exists = fs::try_exists(&snapshot_path)
        .await
        .map_err(Error::io("stat", &snapshot_path))?;

    if !exists {
        tracing::info!(path = %snapshot_path.display(), "creating empty index snapshot");
        write_snapshot(root, &Index::new()).await?;
    }

    read_snapshot(root).await
}
