use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::Utc;
use common::storage::{BoxReader, StorageError, StoredFile, UploadStore};
use futures::TryStreamExt;
use sea_orm::*;
use tokio_util::io::StreamReader;
use tracing::instrument;

use crate::entity::file_record;
use crate::error::{AppError, MSG_ALREADY_EXISTS, MSG_UPLOADED};
use crate::state::AppState;
use crate::utils::filename::validate_flat_filename;

pub fn upload_body_limit(limit: usize) -> DefaultBodyLimit {
    DefaultBodyLimit::max(limit)
}

/// Whether an upload produced a new record.
#[derive(Debug, PartialEq, Eq)]
enum UploadOutcome {
    Created,
    Duplicate,
}

#[utoipa::path(
    post,
    path = "/upload",
    tag = "Files",
    operation_id = "uploadFile",
    summary = "Upload a file",
    description = "Stores the `file` multipart field under a randomized name and records its \
        original filename. A second upload with the same original filename is discarded.",
    request_body(content_type = "multipart/form-data", description = "Form with a `file` field"),
    responses(
        (status = 201, description = "Stored", body = String),
        (status = 200, description = "A file with this name already exists", body = String),
        (status = 400, description = "No file part, or an invalid filename", body = String),
        (status = 413, description = "File exceeds the size limit", body = String),
        (status = 500, description = "Storage failure", body = String),
    ),
)]
#[instrument(skip(state, multipart), fields(filename))]
pub async fn upload_file(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, AppError> {
    let mut multipart = multipart.map_err(|e| {
        tracing::debug!("Upload without multipart body: {}", e.body_text());
        AppError::MissingFile
    })?;

    let (filename, stored) = receive_file(&mut multipart, &*state.store)
        .await?
        .ok_or(AppError::MissingFile)?;
    tracing::Span::current().record("filename", filename.as_str());

    match register_upload(&state.db, &filename, &stored).await {
        Ok(UploadOutcome::Created) => {
            tracing::info!(path = %stored.key, size = stored.size, "File uploaded");
            Ok((StatusCode::CREATED, MSG_UPLOADED))
        }
        Ok(UploadOutcome::Duplicate) => {
            discard(&*state.store, &stored).await;
            Ok((StatusCode::OK, MSG_ALREADY_EXISTS))
        }
        Err(e) => {
            discard(&*state.store, &stored).await;
            Err(e)
        }
    }
}

/// Write the first `file` part to the store.
///
/// Returns `None` if the form has no `file` part.
async fn receive_file(
    multipart: &mut Multipart,
    store: &dyn UploadStore,
) -> Result<Option<(String, StoredFile)>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidUpload(e.body_text()))?
    {
        if field.name() != Some("file") {
            continue; // Ignore unknown fields.
        }

        let filename = field
            .file_name()
            .map(str::to_owned)
            .ok_or(AppError::MissingFile)?;
        let filename = validate_flat_filename(&filename)
            .map_err(|e| AppError::InvalidFilename(e.message()))?
            .to_string();

        let reader: BoxReader<'_> = Box::new(Box::pin(StreamReader::new(
            field.map_err(std::io::Error::other),
        )));
        let stored = store
            .put_stream(&filename, reader)
            .await
            .map_err(classify_write_error)?;

        return Ok(Some((filename, stored)));
    }

    Ok(None)
}

/// A broken multipart stream is the client's fault, not a disk failure.
fn classify_write_error(err: StorageError) -> AppError {
    if let StorageError::Io(io) = &err
        && let Some(inner) = io.get_ref()
        && inner.is::<MultipartError>()
    {
        return AppError::InvalidUpload(inner.to_string());
    }
    AppError::from(err)
}

/// Record a stored file unless a record with the same original filename exists.
///
/// The look-up is a fast path; the unique index on `filename` settles
/// concurrent uploads of the same new name.
async fn register_upload<C: ConnectionTrait>(
    db: &C,
    filename: &str,
    stored: &StoredFile,
) -> Result<UploadOutcome, AppError> {
    let existing = file_record::Entity::find()
        .filter(file_record::Column::Filename.eq(filename))
        .one(db)
        .await
        .map_err(AppError::StorageLookup)?;

    if existing.is_some() {
        return Ok(UploadOutcome::Duplicate);
    }

    let record = file_record::ActiveModel {
        filename: Set(filename.to_string()),
        path: Set(stored.key.to_string()),
        size: Set(i64::try_from(stored.size).unwrap_or(i64::MAX)),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    match record.insert(db).await {
        Ok(_) => Ok(UploadOutcome::Created),
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            tracing::debug!("Upload race: unique constraint caught on insert");
            Ok(UploadOutcome::Duplicate)
        }
        Err(e) => Err(AppError::StorageInsert(e)),
    }
}

async fn discard(store: &dyn UploadStore, stored: &StoredFile) {
    if let Err(e) = store.delete(stored.key.as_str()).await {
        tracing::warn!(path = %stored.key, error = %e, "Failed to remove discarded upload");
    }
}
