mod error;
mod key;
mod traits;

pub mod filesystem;

pub use error::StorageError;
pub use key::{StorageKey, validate_relative_path};
pub use traits::{BoxReader, OpenedFile, StoredFile, UploadStore};
