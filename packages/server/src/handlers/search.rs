use axum::Json;
use axum::extract::{Query, State};
use common::FileRecord;
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{Func, LikeExpr};
use sea_orm::*;
use tracing::instrument;

use crate::entity::file_record;
use crate::error::SearchError;
use crate::models::file::SearchQuery;
use crate::state::AppState;
use crate::utils::pattern::{SearchPattern, escape_like};

/// Page size when scanning records for a regex match.
const SCAN_BATCH: u64 = 500;

#[utoipa::path(
    get,
    path = "/fileSearch",
    tag = "Files",
    operation_id = "searchFiles",
    summary = "Find a file by name",
    description = "Matches `q` case-insensitively against original filenames and returns the \
        first matching record (oldest upload first) as a one-element list, or an empty list.",
    params(SearchQuery),
    responses(
        (status = 200, description = "Zero or one matching record", body = Vec<FileRecord>),
        (status = 400, description = "Missing `q`; body is `[]`", body = Vec<FileRecord>),
        (status = 500, description = "Storage failure; body is `[]`", body = Vec<FileRecord>),
    ),
)]
#[instrument(skip(state))]
pub async fn search_files(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<FileRecord>>, SearchError> {
    let text = query.text().ok_or(SearchError::MissingQuery)?;

    let Some(pattern) = SearchPattern::parse(text) else {
        return Ok(Json(Vec::new()));
    };

    let found = find_first_match(&state.db, &pattern).await?;

    Ok(Json(found.into_iter().map(FileRecord::from).collect()))
}

/// Return the oldest record whose filename matches `pattern`.
pub async fn find_first_match<C: ConnectionTrait>(
    db: &C,
    pattern: &SearchPattern,
) -> Result<Option<file_record::Model>, DbErr> {
    match pattern {
        SearchPattern::Literal(needle) => {
            file_record::Entity::find()
                .filter(
                    Expr::expr(Func::lower(Expr::col(file_record::Column::Filename))).like(
                        LikeExpr::new(format!("%{}%", escape_like(needle))).escape('\\'),
                    ),
                )
                .order_by_asc(file_record::Column::Id)
                .one(db)
                .await
        }
        SearchPattern::Regex(_) => {
            let mut pages = file_record::Entity::find()
                .order_by_asc(file_record::Column::Id)
                .paginate(db, SCAN_BATCH);

            while let Some(batch) = pages.fetch_and_next().await? {
                if let Some(hit) = batch.into_iter().find(|m| pattern.is_match(&m.filename)) {
                    return Ok(Some(hit));
                }
            }
            Ok(None)
        }
    }
}
