//! Publication targets for rendered artifacts.
//!
//! A [`Publisher`] is a keyed blob store with an existence probe. Keys
//! are logical names (a slug, or the index key); backends decide how a
//! key maps to storage. Publishing the same key twice overwrites, which
//! is what makes reconciliation repair idempotent.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;

use counterclaim_shared::{CounterclaimError, Result};

/// Capability interface for the publication target.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Whether an artifact exists under this key.
    async fn exists(&self, key: &str) -> Result<bool>;

    /// Store an artifact under this key, overwriting any previous one.
    async fn put(&self, key: &str, content: &[u8]) -> Result<()>;
}

/// [`Publisher`] that writes artifacts to a local directory as
/// `<key>.html` files.
pub struct FilePublisher {
    output_dir: PathBuf,
}

impl FilePublisher {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.output_dir.join(format!("{key}.html"))
    }
}

#[async_trait]
impl Publisher for FilePublisher {
    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(tokio::fs::try_exists(self.path_for(key))
            .await
            .unwrap_or(false))
    }

    async fn put(&self, key: &str, content: &[u8]) -> Result<()> {
        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|e| CounterclaimError::io(&self.output_dir, e))?;

        let path = self.path_for(key);
        tokio::fs::write(&path, content)
            .await
            .map_err(|e| CounterclaimError::io(&path, e))?;
        tracing::debug!(?path, bytes = content.len(), "published artifact");
        Ok(())
    }
}

/// In-memory [`Publisher`] for tests and dry runs.
#[derive(Default)]
pub struct MemoryPublisher {
    artifacts: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of an artifact's bytes, if published.
    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.artifacts.lock().unwrap().get(key).cloned()
    }

    /// Remove an artifact, simulating external loss.
    pub fn remove(&self, key: &str) {
        self.artifacts.lock().unwrap().remove(key);
    }

    /// Number of stored artifacts.
    pub fn len(&self) -> usize {
        self.artifacts.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.lock().unwrap().is_empty()
    }
}

#[async_trait]
impl Publisher for MemoryPublisher {
    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.artifacts.lock().unwrap().contains_key(key))
    }

    async fn put(&self, key: &str, content: &[u8]) -> Result<()> {
        self.artifacts
            .lock()
            .unwrap()
            .insert(key.to_string(), content.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn temp_output_dir() -> PathBuf {
        std::env::temp_dir().join(format!("cc_publish_{}", Uuid::now_v7()))
    }

    #[tokio::test]
    async fn file_publisher_writes_and_probes() {
        let dir = temp_output_dir();
        let publisher = FilePublisher::new(&dir);

        assert!(!publisher.exists("some-slug").await.unwrap());
        publisher.put("some-slug", b"<html></html>").await.unwrap();
        assert!(publisher.exists("some-slug").await.unwrap());

        let on_disk = tokio::fs::read(dir.join("some-slug.html")).await.unwrap();
        assert_eq!(on_disk, b"<html></html>");
    }

    #[tokio::test]
    async fn file_publisher_overwrites() {
        let dir = temp_output_dir();
        let publisher = FilePublisher::new(&dir);

        publisher.put("latest", b"v1").await.unwrap();
        publisher.put("latest", b"v2").await.unwrap();
        let on_disk = tokio::fs::read(dir.join("latest.html")).await.unwrap();
        assert_eq!(on_disk, b"v2");
    }

    #[tokio::test]
    async fn memory_publisher_roundtrip() {
        let publisher = MemoryPublisher::new();
        assert!(!publisher.exists("k").await.unwrap());

        publisher.put("k", b"body").await.unwrap();
        assert!(publisher.exists("k").await.unwrap());
        assert_eq!(publisher.get("k").unwrap(), b"body");

        publisher.remove("k");
        assert!(!publisher.exists("k").await.unwrap());
    }
}
