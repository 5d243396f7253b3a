use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "file_record")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Original upload filename. At most one record per name.
    #[sea_orm(unique)]
    pub filename: String,

    /// Storage key relative to the upload directory.
    pub path: String,

    /// Size of the stored file in bytes.
    pub size: i64,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for common::FileRecord {
    fn from(model: Model) -> Self {
        Self {
            filename: model.filename,
            path: model.path,
        }
    }
}
