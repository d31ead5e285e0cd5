use futures::future::LocalBoxFuture;
use serde::{Deserialize, Serialize};

use crate::error::BackendResult;
use crate::message::ChatMessage;

/// Relative path chat requests are posted to.
pub const DEFAULT_CHAT_ENDPOINT: &str = "/chat";

/// Body of one `POST` to the chat endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatRequest {
    pub query: String,
    pub thread_id: String,
    pub history: Vec<ChatMessage>,
}

/// Reply body. Backends may attach the intent they classified the query as.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChatReply {
    pub response: String,
    #[serde(default)]
    pub category: Option<String>,
}

impl ChatReply {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            category: None,
        }
    }
}

/// Transport for one request/response cycle.
///
/// Futures are local: browser `fetch` handles are not `Send`, and the widget
/// runs on a single thread anyway.
pub trait ChatBackend {
    fn send(&self, request: ChatRequest) -> LocalBoxFuture<'_, BackendResult<ChatReply>>;
}
