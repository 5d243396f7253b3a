use serde::{Deserialize, Serialize};

/// Metadata of one uploaded file as exchanged over the wire.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct FileRecord {
    /// Original filename as sent by the uploader.
    #[schema(example = "report.pdf")]
    pub filename: String,
    /// Storage key relative to the upload directory. Append to `/download/` to fetch.
    #[schema(example = "9f86d081884c7d659a2feaa0c55ad015.pdf")]
    pub path: String,
}
