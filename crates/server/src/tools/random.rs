//! gif_random tool implementation.
//!
//! Picks a stored gif at random and pins the choice, so repeated calls inside
//! the pin window return the same gif without rescanning the index.

use std::time::Duration;

use gifstash_core::{DiskStore, Error, ExpiringMap};
use rand::seq::IteratorRandom;
use rmcp::{ErrorData as McpError, model::CallToolResult};

use super::image::image_result;

/// Key the current random pick is pinned under.
pub const RANDOM_PIN_KEY: &str = "gif-key";

/// Identifier of the pinned gif, choosing and pinning a new one if needed.
///
/// A pin whose gif has since been deleted is replaced.
pub async fn pick_random(
    store: &DiskStore, pins: &ExpiringMap<String, String>, pin_ttl: Duration,
) -> Result<String, Error> {
    let index = store.list_all().await;

    if let Some(id) = pins.get(RANDOM_PIN_KEY).await
        && index.contains_key(&id)
    {
        return Ok(id);
    }

    let id = index
        .keys()
        .choose(&mut rand::thread_rng())
        .cloned()
        .ok_or_else(|| Error::NotFound("no gifs stored yet".into()))?;

    tracing::debug!(%id, ttl_secs = pin_ttl.as_secs(), "pinned random gif");
    pins.put(RANDOM_PIN_KEY.to_string(), id.clone(), pin_ttl).await;

    Ok(id)
}

/// Implementation of the gif_random tool.
pub async fn random_impl(
    store: &DiskStore, pins: &ExpiringMap<String, String>, pin_ttl: Duration,
) -> Result<CallToolResult, McpError> {
    let id = pick_random(store, pins, pin_ttl).await?;
    let entry = store.lookup(&id).await.ok_or_else(|| Error::NotFound(id.clone()))?;
    let bytes = store.get(&id).await?;

    Ok(image_result(&entry, &bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::{image_bytes, open_store};

    const PIN: Duration = Duration::from_secs(300);

    #[tokio::test]
    async fn test_random_empty_store() {
        let (_dir, store) = open_store().await;
        let pins = ExpiringMap::new();

        let result = random_impl(&store, &pins, PIN).await;
        assert_eq!(result.unwrap_err().code.0, -32001);
        assert!(pins.is_empty().await);
    }

    #[tokio::test]
    async fn test_random_single_gif() {
        let (_dir, store) = open_store().await;
        store.store(b"GIF89a", "http://x.test/a.gif").await.unwrap();
        let pins = ExpiringMap::new();

        let result = random_impl(&store, &pins, PIN).await.unwrap();
        assert_eq!(image_bytes(&result), b"GIF89a");
    }

    #[tokio::test]
    async fn test_random_pick_is_pinned() {
        let (_dir, store) = open_store().await;
        for i in 0..20 {
            store.store(b"gif", &format!("http://x.test/{i}.gif")).await.unwrap();
        }
        let pins = ExpiringMap::new();

        let first = pick_random(&store, &pins, PIN).await.unwrap();
        for _ in 0..10 {
            assert_eq!(pick_random(&store, &pins, PIN).await.unwrap(), first);
        }
        assert_eq!(pins.get(RANDOM_PIN_KEY).await, Some(first));
    }

    #[tokio::test]
    async fn test_random_repins_after_delete() {
        let (_dir, store) = open_store().await;
        let a = store.store(b"a", "http://x.test/a.gif").await.unwrap();
        let pins = ExpiringMap::new();
        assert_eq!(pick_random(&store, &pins, PIN).await.unwrap(), a);

        store.delete("http://x.test/a.gif").await.unwrap();
        let b = store.store(b"b", "http://x.test/b.gif").await.unwrap();

        assert_eq!(pick_random(&store, &pins, PIN).await.unwrap(), b);
    }

    #[tokio::test]
    async fn test_random_repins_after_expiry() {
        let (_dir, store) = open_store().await;
        store.store(b"a", "http://x.test/a.gif").await.unwrap();
        let pins = ExpiringMap::new();

        pick_random(&store, &pins, Duration::from_millis(20)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(pins.get(RANDOM_PIN_KEY).await, None);

        pick_random(&store, &pins, PIN).await.unwrap();
        assert!(pins.get(RANDOM_PIN_KEY).await.is_some());
    }
}
