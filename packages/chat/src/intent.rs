use std::sync::LazyLock;

use regex::Regex;

/// What a chat message asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Greeting,
    Search,
    Farewell,
    Unrecognized,
}

/// Keyword vocabulary in priority order. The first keyword contained in a
/// message decides its intent.
///
/// Matching is plain substring containment, so short keywords also fire
/// inside longer words ("hi" in "this", "are" in "share").
pub const RULES: &[(&str, Intent)] = &[
    ("hello", Intent::Greeting),
    ("hi", Intent::Greeting),
    ("hey", Intent::Greeting),
    ("greetings", Intent::Greeting),
    ("how", Intent::Greeting),
    ("are", Intent::Greeting),
    ("you", Intent::Greeting),
    ("search", Intent::Search),
    ("for", Intent::Search),
    ("get", Intent::Search),
    ("find", Intent::Search),
    ("file", Intent::Search),
    ("give", Intent::Search),
    ("me", Intent::Search),
    ("download", Intent::Search),
    ("this", Intent::Search),
    ("bye", Intent::Farewell),
    ("thanks", Intent::Farewell),
];

pub const GREETING_REPLY: &str = "Hello there! How can I assist you today?";
pub const FAREWELL_REPLY: &str = "It was nice helping you.\nGoodBye! Have a nice day.";
pub const UNRECOGNIZED_REPLY: &str = "I'm sorry, I didn't understand that.";
pub const SEARCH_FAILED_REPLY: &str = "Sorry, an error occurred while searching for files.";

static VOCABULARY: LazyLock<Regex> = LazyLock::new(|| {
    let alternation = RULES
        .iter()
        .map(|(keyword, _)| regex::escape(keyword))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)\b({alternation})\b")).expect("vocabulary pattern is valid")
});

/// Classify a message by case-insensitive keyword containment.
pub fn classify(message: &str) -> Intent {
    let lower = message.to_lowercase();
    RULES
        .iter()
        .find(|(keyword, _)| lower.contains(keyword))
        .map(|(_, intent)| *intent)
        .unwrap_or(Intent::Unrecognized)
}

/// Remove every vocabulary keyword standing as a whole word in `message` and
/// collapse the remaining whitespace.
pub fn residual_query(message: &str) -> String {
    VOCABULARY
        .replace_all(message, " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

impl Intent {
    /// Canned reply for intents answered without a search.
    pub fn reply(self) -> Option<&'static str> {
        match self {
            Intent::Greeting => Some(GREETING_REPLY),
            Intent::Farewell => Some(FAREWELL_REPLY),
            Intent::Unrecognized => Some(UNRECOGNIZED_REPLY),
            Intent::Search => None,
        }
    }
}

pub fn no_results_reply(query: &str) -> String {
    format!("Sorry, no results found for '{query}'.")
}

pub fn found_reply(count: usize, query: &str) -> String {
    format!("Found {count} result(s) for '{query}' & downloading...")
}
