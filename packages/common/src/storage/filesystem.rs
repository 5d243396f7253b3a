use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufReader};
use tracing::debug;

use super::error::StorageError;
use super::key::{StorageKey, validate_relative_path};
use super::traits::{BoxReader, OpenedFile, StoredFile, UploadStore};

/// Filesystem-backed upload store.
///
/// Files land flat in `{base_path}/{key}`. Writes go to `{base_path}/.tmp`
/// first and are renamed into place once complete, so a partially received
/// upload is never visible under its final name.
pub struct FilesystemUploadStore {
    /// Canonical form of the upload directory.
    base_path: PathBuf,
    max_size: u64,
}

impl FilesystemUploadStore {
    /// Create a new filesystem upload store, creating the directory if needed.
    pub async fn new(base_path: impl AsRef<Path>, max_size: u64) -> Result<Self, StorageError> {
        let base_path = base_path.as_ref();
        fs::create_dir_all(base_path).await?;
        let base_path = fs::canonicalize(base_path).await?;
        fs::create_dir_all(base_path.join(".tmp")).await?;
        Ok(Self {
            base_path,
            max_size,
        })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Path for a temporary file during writes.
    fn temp_path(&self) -> PathBuf {
        self.base_path
            .join(".tmp")
            .join(uuid::Uuid::new_v4().to_string())
    }

    /// Resolve a client-supplied relative path to an existing regular file
    /// inside the upload directory.
    async fn resolve(&self, path: &str) -> Result<PathBuf, StorageError> {
        let relative = validate_relative_path(path)?;
        let joined = self.base_path.join(relative);

        let resolved = match fs::canonicalize(&joined).await {
            Ok(p) => p,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StorageError::NotFound(path.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        // Symlinks may still point outside the root.
        if !resolved.starts_with(&self.base_path) {
            return Err(StorageError::InvalidPath(format!(
                "'{path}' escapes the upload directory"
            )));
        }

        if resolved.starts_with(self.base_path.join(".tmp")) {
            return Err(StorageError::NotFound(path.to_string()));
        }

        let meta = fs::metadata(&resolved).await?;
        if !meta.is_file() {
            return Err(StorageError::NotFound(path.to_string()));
        }

        Ok(resolved)
    }
}

#[async_trait]
impl UploadStore for FilesystemUploadStore {
    async fn put_stream(
        &self,
        original_name: &str,
        mut reader: BoxReader<'_>,
    ) -> Result<StoredFile, StorageError> {
        let temp_path = self.temp_path();
        let mut total_bytes: u64 = 0;

        let mut buf = vec![0u8; 64 * 1024]; // 64KB read buffer
        let mut temp_file = fs::File::create(&temp_path).await?;

        let copied: Result<(), StorageError> = async {
            loop {
                let n = reader.read(&mut buf).await?;
                if n == 0 {
                    break;
                }

                total_bytes += n as u64;
                if total_bytes > self.max_size {
                    return Err(StorageError::SizeLimitExceeded {
                        actual: total_bytes,
                        limit: self.max_size,
                    });
                }

                temp_file.write_all(&buf[..n]).await?;
            }
            temp_file.flush().await?;
            Ok(())
        }
        .await;
        drop(temp_file);

        if let Err(e) = copied {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e);
        }

        let key = StorageKey::generate(original_name);
        let final_path = self.base_path.join(key.as_str());

        if let Err(e) = fs::rename(&temp_path, &final_path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        debug!(key = %key, size = total_bytes, "Stored upload");

        Ok(StoredFile {
            key,
            size: total_bytes,
        })
    }

    async fn open(&self, path: &str) -> Result<OpenedFile, StorageError> {
        let resolved = self.resolve(path).await?;
        let file = match fs::File::open(&resolved).await {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StorageError::NotFound(path.to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        let size = file.metadata().await?.len();
        Ok(OpenedFile {
            reader: Box::new(BufReader::new(file)),
            size,
        })
    }

    async fn exists(&self, path: &str) -> Result<bool, StorageError> {
        match self.resolve(path).await {
            Ok(_) => Ok(true),
            Err(StorageError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn delete(&self, path: &str) -> Result<bool, StorageError> {
        let resolved = match self.resolve(path).await {
            Ok(p) => p,
            Err(StorageError::NotFound(_)) => return Ok(false),
            Err(e) => return Err(e),
        };
        match fs::remove_file(&resolved).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
