//! Audio store implementations.

use super::key::CacheKey;
use crate::synthesis::SynthesisError;
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

#[async_trait]
pub trait AudioStore: Send + Sync {
    async fn get(&self, key: &CacheKey) -> Result<Option<Bytes>, SynthesisError>;
    async fn put(&self, key: &CacheKey, audio: &[u8]) -> Result<(), SynthesisError>;
    fn name(&self) -> &'static str;
}

/// One file per key: `{dir}/{key}.{extension}`.
///
/// Writes go to a temporary sibling first and are renamed into place, so an
/// interrupted write never leaves a truncated entry under the real name.
pub struct FileStore {
    dir: PathBuf,
    extension: String,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            extension: extension.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &CacheKey) -> PathBuf {
        self.dir.join(format!("{}.{}", key, self.extension))
    }
}

fn io_error(action: &str, path: &Path, e: std::io::Error) -> SynthesisError {
    SynthesisError::Cache(format!("{} {}: {}", action, path.display(), e))
}

#[async_trait]
impl AudioStore for FileStore {
    async fn get(&self, key: &CacheKey) -> Result<Option<Bytes>, SynthesisError> {
        let path = self.path_for(key);
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(Some(Bytes::from(data))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error("failed to read", &path, e)),
        }
    }

    async fn put(&self, key: &CacheKey, audio: &[u8]) -> Result<(), SynthesisError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| io_error("failed to create", &self.dir, e))?;
        let path = self.path_for(key);
        let tmp = self
            .dir
            .join(format!(".{}.{}.{}.tmp", key, self.extension, std::process::id()));
        tokio::fs::write(&tmp, audio)
            .await
            .map_err(|e| io_error("failed to write", &tmp, e))?;
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(io_error("failed to move into", &path, e));
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "file"
    }
}

#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<CacheKey, Bytes>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned() -> SynthesisError {
    SynthesisError::Cache("memory store lock poisoned".into())
}

#[async_trait]
impl AudioStore for MemoryStore {
    async fn get(&self, key: &CacheKey) -> Result<Option<Bytes>, SynthesisError> {
        let entries = self.entries.read().map_err(|_| poisoned())?;
        Ok(entries.get(key).cloned())
    }

    async fn put(&self, key: &CacheKey, audio: &[u8]) -> Result<(), SynthesisError> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        entries.insert(key.clone(), Bytes::copy_from_slice(audio));
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
