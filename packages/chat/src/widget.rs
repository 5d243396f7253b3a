use common::FileRecord;

use crate::client::ClientError;
use crate::intent::{self, Intent, SEARCH_FAILED_REPLY};

/// Visibility of the chat popup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetState {
    Closed,
    Open,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Author {
    User,
    Bot,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub author: Author,
    pub text: String,
}

/// What the caller has to do after a submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// Nothing was added to the transcript.
    Ignored,
    /// A canned reply was added.
    Replied(Intent),
    /// A search for the residual query should be started.
    Search(String),
}

/// Chat popup: open/closed state plus the message transcript.
#[derive(Debug)]
pub struct ChatWidget {
    state: WidgetState,
    transcript: Vec<Message>,
}

impl Default for ChatWidget {
    fn default() -> Self {
        Self::new(WidgetState::Closed)
    }
}

impl ChatWidget {
    pub fn new(state: WidgetState) -> Self {
        Self {
            state,
            transcript: Vec::new(),
        }
    }

    pub fn open(&mut self) {
        self.state = WidgetState::Open;
    }

    pub fn close(&mut self) {
        self.state = WidgetState::Closed;
    }

    pub fn state(&self) -> WidgetState {
        self.state
    }

    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    /// Handle a line typed into the popup.
    ///
    /// Input is ignored while the popup is closed or when it is blank.
    pub fn submit(&mut self, input: &str) -> Submission {
        let message = input.trim();
        if self.state == WidgetState::Closed || message.is_empty() {
            return Submission::Ignored;
        }

        self.push(Author::User, message.to_string());

        let intent = intent::classify(message);
        match intent.reply() {
            Some(reply) => {
                self.push(Author::Bot, reply.to_string());
                Submission::Replied(intent)
            }
            None => Submission::Search(intent::residual_query(message)),
        }
    }

    /// Report a finished search. Returns the records to download.
    pub fn search_finished(
        &mut self,
        query: &str,
        result: Result<Vec<FileRecord>, ClientError>,
    ) -> Vec<FileRecord> {
        match result {
            Ok(records) if records.is_empty() => {
                self.push(Author::Bot, intent::no_results_reply(query));
                records
            }
            Ok(records) => {
                self.push(Author::Bot, intent::found_reply(records.len(), query));
                records
            }
            Err(e) => {
                tracing::warn!(query, error = %e, "File search failed");
                self.push(Author::Bot, SEARCH_FAILED_REPLY.to_string());
                Vec::new()
            }
        }
    }

    fn push(&mut self, author: Author, text: String) {
        self.transcript.push(Message { author, text });
    }
}
