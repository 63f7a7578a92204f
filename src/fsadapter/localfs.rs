//! Local directory backend, used to mock a remote filesystem (implements `DfsBackend`).

use crate::error::DfsError;
use crate::fsadapter::client::{DfsBackend, Endpoint, FileInfo};
use async_trait::async_trait;
use bytes::Bytes;
use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

pub struct LocalFsBackend {
    root: PathBuf,
}

impl LocalFsBackend {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn path_for(&self, path: &str) -> PathBuf {
        self.root.join(path.trim_start_matches('/'))
    }

    fn map_io(err: std::io::Error, path: &str) -> DfsError {
        match err.kind() {
            std::io::ErrorKind::NotFound => DfsError::NotFound(path.to_string()),
            std::io::ErrorKind::PermissionDenied => DfsError::PermissionDenied(path.to_string()),
            _ => DfsError::Io(err),
        }
    }
}

#[async_trait]
impl DfsBackend for LocalFsBackend {
    async fn handshake(&self, endpoint: &Endpoint) -> Result<(), DfsError> {
        // The mock treats its root directory as the "remote" service.
        match fs::metadata(&self.root).await {
            Ok(meta) if meta.is_dir() => Ok(()),
            Ok(_) => Err(DfsError::Unreachable {
                endpoint: endpoint.to_string(),
                reason: format!("{} is not a directory", self.root.display()),
            }),
            Err(e) => Err(DfsError::Unreachable {
                endpoint: endpoint.to_string(),
                reason: e.to_string(),
            }),
        }
    }

    async fn lookup(&self, path: &str) -> Result<FileInfo, DfsError> {
        let meta = fs::metadata(self.path_for(path))
            .await
            .map_err(|e| Self::map_io(e, path))?;
        if !meta.is_file() {
            return Err(DfsError::NotAFile(path.to_string()));
        }
        Ok(FileInfo {
            path: path.to_string(),
            len: meta.len(),
        })
    }

    async fn read_at(&self, file: &FileInfo, offset: u64, len: usize) -> Result<Bytes, DfsError> {
        let mut f = fs::File::open(self.path_for(&file.path))
            .await
            .map_err(|e| Self::map_io(e, &file.path))?;
        f.seek(SeekFrom::Start(offset)).await?;
        let mut buf = vec![0u8; len];
        let mut filled = 0usize;
        while filled < len {
            let n = f.read(&mut buf[filled..]).await?;
            if n == 0 {
                break; // file shrank since lookup
            }
            filled += n;
        }
        buf.truncate(filled);
        Ok(Bytes::from(buf))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_localfs_lookup_and_read() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("data.bin"), vec![9u8; 1024]).unwrap();
        let backend = LocalFsBackend::new(tmp.path());

        let ep = Endpoint {
            host: "localhost".into(),
            port: 0,
        };
        backend.handshake(&ep).await.unwrap();

        let info = backend.lookup("/data.bin").await.unwrap();
        assert_eq!(info.len, 1024);

        let out = backend.read_at(&info, 512, 256).await.unwrap();
        assert_eq!(out.len(), 256);
        assert!(out.iter().all(|&b| b == 9));
    }

    #[tokio::test]
    async fn test_localfs_missing_path_and_dir() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir(tmp.path().join("sub")).unwrap();
        let backend = LocalFsBackend::new(tmp.path());

        assert!(matches!(
            backend.lookup("/nope").await,
            Err(DfsError::NotFound(_))
        ));
        assert!(matches!(
            backend.lookup("/sub").await,
            Err(DfsError::NotAFile(_))
        ));
    }

    #[tokio::test]
    async fn test_localfs_handshake_unreachable_root() {
        let tmp = tempfile::tempdir().unwrap();
        let backend = LocalFsBackend::new(tmp.path().join("gone"));
        let ep = Endpoint {
            host: "localhost".into(),
            port: 0,
        };
        assert!(matches!(
            backend.handshake(&ep).await,
            Err(DfsError::Unreachable { .. })
        ));
    }
}
