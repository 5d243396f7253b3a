use std::fmt;
use std::path::Path;

use super::error::StorageError;

/// Number of random bytes in a generated storage name.
const RANDOM_NAME_BYTES: usize = 16;

/// Longest extension carried over, in bytes. Keeps the whole name under the
/// usual 255-byte filesystem limit.
const MAX_EXTENSION_LEN: usize = 200;

/// Randomized on-disk name of an uploaded file.
///
/// Layout: `{32 lowercase hex chars}{.ext}` where `.ext` is the original
/// file's extension verbatim. It is left out when the name has none or when
/// it could not be used as a URL path segment.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct StorageKey(String);

impl StorageKey {
    /// Generate a fresh key preserving the extension of `original_name`.
    pub fn generate(original_name: &str) -> Self {
        let raw: [u8; RANDOM_NAME_BYTES] = rand::random();
        let mut name = hex::encode(raw);
        if let Some(ext) = extension_of(original_name) {
            name.push('.');
            name.push_str(ext);
        }
        Self(name)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StorageKey({})", self.0)
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn extension_of(name: &str) -> Option<&str> {
    let ext = Path::new(name).extension()?.to_str()?;
    if ext.is_empty() || ext.len() > MAX_EXTENSION_LEN || ext.chars().any(breaks_url_segment) {
        return None;
    }
    Some(ext)
}

fn breaks_url_segment(c: char) -> bool {
    c.is_control() || c.is_whitespace() || matches!(c, '/' | '\\' | '%' | '?' | '#')
}

/// Validates a client-supplied path relative to the upload directory.
///
/// Nested segments (`a/b/c.png`) are allowed; absolute paths, backslashes,
/// NUL bytes, empty segments and `.`/`..` segments are not.
pub fn validate_relative_path(path: &str) -> Result<&str, StorageError> {
    if path.is_empty() {
        return Err(StorageError::InvalidPath("path is empty".into()));
    }
    if path.contains('\0') {
        return Err(StorageError::InvalidPath("path contains a NUL byte".into()));
    }
    if path.contains('\\') {
        return Err(StorageError::InvalidPath("path contains a backslash".into()));
    }
    if path.starts_with('/') {
        return Err(StorageError::InvalidPath("path is absolute".into()));
    }
    for segment in path.split('/') {
        match segment {
            "" => return Err(StorageError::InvalidPath("path has an empty segment".into())),
            "." | ".." => {
                return Err(StorageError::InvalidPath(
                    "path must not contain '.' or '..' segments".into(),
                ));
            }
            _ => {}
        }
    }
    Ok(path)
}
