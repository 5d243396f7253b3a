use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use common::FileRecord;
use common::storage::StorageError;
use sea_orm::DbErr;

pub const MSG_UPLOADED: &str = "File uploaded successfully";
pub const MSG_ALREADY_EXISTS: &str = "File already exists";
pub const MSG_UPLOAD_FAILED: &str = "Error uploading file";
pub const MSG_MISSING_FILE: &str = "No file uploaded";
pub const MSG_TOO_LARGE: &str = "File too large";
pub const MSG_NOT_FOUND: &str = "File not found";
pub const MSG_INTERNAL: &str = "Internal server error";

/// Errors of the plain-text endpoints (`/upload`, `/download`).
///
/// Bodies are fixed messages the chat widget and upload form rely on; the
/// underlying cause is only logged.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The multipart body has no `file` part, or the part has no filename.
    #[error("no file part in upload")]
    MissingFile,

    #[error("invalid filename: {0}")]
    InvalidFilename(&'static str),

    /// The multipart body could not be parsed.
    #[error("malformed upload: {0}")]
    InvalidUpload(String),

    #[error("upload exceeds {limit} bytes")]
    FileTooLarge { limit: u64 },

    #[error("file not found")]
    FileNotFound,

    #[error("record lookup failed: {0}")]
    StorageLookup(#[source] DbErr),

    #[error("record insert failed: {0}")]
    StorageInsert(#[source] DbErr),

    #[error("upload storage failed: {0}")]
    Storage(#[source] StorageError),

    #[error("{0}")]
    Internal(String),
}

impl AppError {
    fn status_and_body(self) -> (StatusCode, String) {
        match self {
            AppError::MissingFile => (StatusCode::BAD_REQUEST, MSG_MISSING_FILE.into()),
            AppError::InvalidFilename(msg) => (StatusCode::BAD_REQUEST, msg.into()),
            AppError::InvalidUpload(msg) => {
                tracing::warn!("Rejected malformed upload: {}", msg);
                (StatusCode::BAD_REQUEST, MSG_UPLOAD_FAILED.into())
            }
            AppError::FileTooLarge { .. } => (StatusCode::PAYLOAD_TOO_LARGE, MSG_TOO_LARGE.into()),
            AppError::FileNotFound => (StatusCode::NOT_FOUND, MSG_NOT_FOUND.into()),
            err @ (AppError::StorageLookup(_)
            | AppError::StorageInsert(_)
            | AppError::Storage(_)) => {
                tracing::error!("Upload failed: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    MSG_UPLOAD_FAILED.into(),
                )
            }
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                (StatusCode::INTERNAL_SERVER_ERROR, MSG_INTERNAL.into())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (
            status,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            body,
        )
            .into_response()
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(_) => AppError::FileNotFound,
            StorageError::InvalidPath(detail) => {
                tracing::warn!("Rejected storage path: {detail}");
                AppError::FileNotFound
            }
            StorageError::SizeLimitExceeded { limit, .. } => AppError::FileTooLarge { limit },
            other => AppError::Storage(other),
        }
    }
}

/// Errors of the JSON search endpoint. Every variant renders an empty list.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("missing search query")]
    MissingQuery,

    #[error("record lookup failed: {0}")]
    StorageLookup(#[from] DbErr),
}

impl IntoResponse for SearchError {
    fn into_response(self) -> Response {
        let status = match &self {
            SearchError::MissingQuery => StatusCode::BAD_REQUEST,
            SearchError::StorageLookup(err) => {
                tracing::error!("File search failed: {}", err);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(Vec::<FileRecord>::new())).into_response()
    }
}
