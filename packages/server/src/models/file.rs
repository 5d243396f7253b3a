use serde::Deserialize;

/// Query parameters for `GET /fileSearch`.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct SearchQuery {
    /// Case-insensitive regular expression matched against original filenames.
    /// Invalid expressions are matched literally.
    #[param(example = "report")]
    pub q: Option<String>,
}

impl SearchQuery {
    /// The query text, or `None` when absent or empty.
    pub fn text(&self) -> Option<&str> {
        self.q.as_deref().filter(|q| !q.is_empty())
    }
}
