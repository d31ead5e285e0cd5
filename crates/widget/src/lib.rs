#![deny(unsafe_code)]

//! Chat widget controller.
//!
//! The widget renders messages, keeps a bounded local history and forwards
//! user input to a chat endpoint. Storage, display, transport and markdown
//! rendering are injected, so the same controller runs in a browser page and
//! in a terminal.

pub mod backend;
pub mod config;
pub mod error;
pub mod history;
pub mod markdown;
/// Chat messages and the request lifecycle state.
pub mod message;
pub mod session;
pub mod view;
pub mod widget;

pub use backend::{ChatBackend, ChatReply, ChatRequest, DEFAULT_CHAT_ENDPOINT};
pub use config::{DEFAULT_FALLBACK_MESSAGE, DomSelectors, WidgetConfig};
pub use error::{
    BackendError, BackendResult, SessionError, SessionResult, StoreError, StoreResult,
};
pub use history::{ChatHistory, DEFAULT_HISTORY_LIMIT, MAX_HISTORY_LIMIT};
pub use markdown::{CommonMarkRenderer, MarkdownRenderer, SafeMarkup, TerminalRenderer};
pub use message::{
    ChatMessage, MessageBody, RenderedMessage, RequestState, RequestTransition,
    RequestTransitionRejection, Role,
};
pub use session::{
    DEFAULT_SESSION_KEY, KeyValueStore, MemoryStore, SessionId, initialize_session,
};
pub use view::ChatView;
pub use widget::ChatWidget;
