use regex::{Regex, RegexBuilder};

/// Compiled-size cap for user-supplied patterns.
const REGEX_SIZE_LIMIT: usize = 1 << 20;

/// A filename search query.
#[derive(Debug, Clone)]
pub enum SearchPattern {
    /// ASCII text without regex metacharacters, lowercased. Answered with SQL `LIKE`.
    Literal(String),
    /// Case-insensitive regular expression, tested against each filename.
    Regex(Regex),
}

impl SearchPattern {
    /// Interpret `query` as a case-insensitive regular expression.
    ///
    /// Queries that are not valid regexes are matched literally. Returns `None`
    /// only for queries too large to compile even when escaped.
    pub fn parse(query: &str) -> Option<Self> {
        if query.is_ascii() && regex::escape(query) == query {
            return Some(SearchPattern::Literal(query.to_ascii_lowercase()));
        }

        match build_case_insensitive(query) {
            Ok(re) => Some(SearchPattern::Regex(re)),
            Err(e) => {
                tracing::debug!(query, error = %e, "Query is not a valid regex, matching literally");
                if query.is_ascii() {
                    Some(SearchPattern::Literal(query.to_ascii_lowercase()))
                } else {
                    build_case_insensitive(&regex::escape(query))
                        .ok()
                        .map(SearchPattern::Regex)
                }
            }
        }
    }

    /// Test a filename against this pattern.
    pub fn is_match(&self, filename: &str) -> bool {
        match self {
            SearchPattern::Literal(needle) => filename.to_ascii_lowercase().contains(needle.as_str()),
            SearchPattern::Regex(re) => re.is_match(filename),
        }
    }
}

fn build_case_insensitive(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .size_limit(REGEX_SIZE_LIMIT)
        .build()
}

/// Escape LIKE wildcard characters in a search string.
pub fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
