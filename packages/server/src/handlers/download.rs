use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::Response;
use common::storage::StorageError;
use tokio_util::io::ReaderStream;
use tracing::instrument;

use crate::error::AppError;
use crate::state::AppState;
use crate::utils::filename::attachment_disposition;

#[utoipa::path(
    get,
    path = "/download/{file}",
    tag = "Files",
    operation_id = "downloadFile",
    summary = "Download a stored file",
    description = "Streams a file from the upload directory as an attachment. `file` may span \
        several path segments; paths escaping the upload directory are reported as not found.",
    params(("file" = String, Path, description = "Path relative to the upload directory")),
    responses(
        (status = 200, description = "File content", content_type = "application/octet-stream"),
        (status = 404, description = "File not found", body = String),
    ),
)]
#[instrument(skip(state))]
pub async fn download_file(
    State(state): State<AppState>,
    Path(file): Path<String>,
) -> Result<Response, AppError> {
    let opened = state.store.open(&file).await.map_err(|e| match e {
        StorageError::NotFound(_) => AppError::FileNotFound,
        StorageError::InvalidPath(detail) => {
            tracing::warn!("Rejected download path: {detail}");
            AppError::FileNotFound
        }
        other => AppError::Internal(format!("Failed to open '{file}': {other}")),
    })?;

    let content_type = mime_guess::from_path(&file).first_or_octet_stream();
    let body = Body::from_stream(ReaderStream::new(opened.reader));

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type.as_ref())
        .header(header::CONTENT_LENGTH, opened.size.to_string())
        .header(header::CONTENT_DISPOSITION, attachment_disposition(&file))
        .body(body)
        .map_err(|e| AppError::Internal(format!("Failed to build response: {e}")))
}
