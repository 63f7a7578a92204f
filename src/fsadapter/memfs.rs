//! In-memory backend for unit tests.

use crate::error::DfsError;
use crate::fsadapter::client::{DfsBackend, Endpoint, FileInfo};
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::Mutex;

/// Path -> bytes map; always reachable.
#[derive(Default)]
pub struct InMemoryBackend {
    files: Mutex<HashMap<String, Bytes>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, path: &str, data: impl Into<Bytes>) {
        self.files
            .lock()
            .unwrap()
            .insert(path.to_string(), data.into());
    }
}

#[async_trait]
impl DfsBackend for InMemoryBackend {
    async fn handshake(&self, _endpoint: &Endpoint) -> Result<(), DfsError> {
        Ok(())
    }

    async fn lookup(&self, path: &str) -> Result<FileInfo, DfsError> {
        let files = self.files.lock().unwrap();
        let data = files
            .get(path)
            .ok_or_else(|| DfsError::NotFound(path.to_string()))?;
        Ok(FileInfo {
            path: path.to_string(),
            len: data.len() as u64,
        })
    }

    async fn read_at(&self, file: &FileInfo, offset: u64, len: usize) -> Result<Bytes, DfsError> {
        let files = self.files.lock().unwrap();
        let data = files
            .get(&file.path)
            .ok_or_else(|| DfsError::NotFound(file.path.clone()))?;
        let start = (offset as usize).min(data.len());
        let end = (start + len).min(data.len());
        Ok(data.slice(start..end))
    }
}
