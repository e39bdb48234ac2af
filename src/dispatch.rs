//! Command dispatch: sends one user command to the backend and classifies
//! the outcome for rendering.

use crate::api::{AssistantBackend, HistoryEntry};

/// Shown for transport failures, non-2xx statuses and unusable bodies.
pub const FAILURE_TEXT: &str = "Failed to process command. Please try again.";

/// Trims `raw`; blank input is not a command.
pub fn normalize_command(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Answer {
        text: String,
        /// Replacement history, when the backend sent one.
        history: Option<Vec<HistoryEntry>>,
    },
    /// The backend understood the request but refused it.
    Rejected(String),
    Failed,
}

impl Reply {
    /// Text of the assistant-origin chat message for this reply.
    pub fn message_text(&self) -> String {
        match self {
            Reply::Answer { text, .. } => text.clone(),
            Reply::Rejected(error) => format!("Error: {}", error),
            Reply::Failed => FAILURE_TEXT.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Reply::Answer { .. })
    }
}

/// Issues `command` once and classifies the result. Never retries.
pub async fn dispatch(backend: &dyn AssistantBackend, command: &str) -> Reply {
    tracing::info!("Processing command: {}", command);

    match backend.process_command(command).await {
        Ok(body) => {
            if let Some(error) = body.error {
                tracing::warn!("Backend rejected command: {}", error);
                Reply::Rejected(error)
            } else if let Some(text) = body.response {
                Reply::Answer {
                    text,
                    history: body.history,
                }
            } else {
                tracing::error!("Backend reply had neither `response` nor `error`");
                Reply::Failed
            }
        }
        Err(e) => {
            tracing::error!("Error processing command: {}", e);
            Reply::Failed
        }
    }
}

/// Delivers exactly one [`Reply`] for a request. If the owner is dropped
/// before [`complete`](Self::complete) runs, [`Reply::Failed`] is delivered
/// instead, so the request's placeholder is always cleared.
pub struct ReplyGuard<F: FnOnce(Reply)> {
    deliver: Option<F>,
}

impl<F: FnOnce(Reply)> ReplyGuard<F> {
    pub fn new(deliver: F) -> Self {
        Self {
            deliver: Some(deliver),
        }
    }

    pub fn complete(mut self, reply: Reply) {
        if let Some(deliver) = self.deliver.take() {
            deliver(reply);
        }
    }
}

impl<F: FnOnce(Reply)> Drop for ReplyGuard<F> {
    fn drop(&mut self) {
        if let Some(deliver) = self.deliver.take() {
            tracing::warn!("Command task ended without a reply");
            deliver(Reply::Failed);
        }
    }
}

/// Decides which replies get rendered.
///
/// By default replies render in arrival order, whatever order the requests
/// went out in. With `discard_stale` set, a reply whose request is older
/// than the newest reply already rendered is dropped.
#[derive(Debug, Clone, Default)]
pub struct ReplyOrdering {
    discard_stale: bool,
    next_id: u64,
    newest_rendered: Option<u64>,
}

impl ReplyOrdering {
    pub fn new(discard_stale: bool) -> Self {
        Self {
            discard_stale,
            ..Self::default()
        }
    }

    /// Allocates a strictly increasing request id.
    pub fn next_request(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Returns whether the reply to `request_id` should be rendered.
    pub fn accept(&mut self, request_id: u64) -> bool {
        if self.discard_stale && self.newest_rendered.is_some_and(|newest| request_id < newest) {
            return false;
        }
        self.newest_rendered = Some(self.newest_rendered.map_or(request_id, |n| n.max(request_id)));
        true
    }
}
