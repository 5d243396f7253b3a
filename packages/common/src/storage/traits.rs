use std::io::Cursor;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};

use super::error::StorageError;
use super::key::StorageKey;

/// Type alias for a boxed async reader.
pub type BoxReader<'a> = Box<dyn AsyncRead + Unpin + Send + 'a>;

/// A file that has been written to the upload directory.
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub key: StorageKey,
    /// Number of bytes written.
    pub size: u64,
}

/// An open handle on a stored file.
pub struct OpenedFile {
    pub reader: BoxReader<'static>,
    pub size: u64,
}

/// Storage for uploaded files under randomized names.
#[async_trait]
pub trait UploadStore: Send + Sync {
    /// Store bytes under a fresh key derived from `original_name`.
    async fn put(&self, original_name: &str, data: &[u8]) -> Result<StoredFile, StorageError> {
        let reader: BoxReader<'_> = Box::new(Cursor::new(data.to_vec()));
        self.put_stream(original_name, reader).await
    }

    /// Store data from an async reader under a fresh key derived from `original_name`.
    async fn put_stream(
        &self,
        original_name: &str,
        reader: BoxReader<'_>,
    ) -> Result<StoredFile, StorageError>;

    /// Open a stored file by its path relative to the upload directory.
    async fn open(&self, path: &str) -> Result<OpenedFile, StorageError>;

    /// Read all bytes of a stored file.
    async fn read(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        let mut opened = self.open(path).await?;
        let mut buf = Vec::new();
        opened.reader.read_to_end(&mut buf).await?;
        Ok(buf)
    }

    /// Check whether a regular file exists at `path`.
    async fn exists(&self, path: &str) -> Result<bool, StorageError>;

    /// Delete a stored file.
    ///
    /// Returns `true` if the file was deleted, `false` if it did not exist.
    async fn delete(&self, path: &str) -> Result<bool, StorageError>;
}
