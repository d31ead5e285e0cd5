use std::fmt;
use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

use crate::markdown::SafeMarkup;

/// Chat speaker role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// One immutable history entry, in the shape the chat endpoint expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Display payload handed to a view.
///
/// User text stays `Text` and must be inserted literally. Only a markdown
/// renderer can produce `Markup`, so nothing user-typed reaches a markup sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageBody {
    Text(String),
    Markup(SafeMarkup),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    pub role: Role,
    pub body: MessageBody,
}

/// Whether the widget is waiting on the chat endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestState {
    #[default]
    Idle,
    Awaiting { in_flight: NonZeroUsize },
}

/// State transition input for the request lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestTransition {
    Send,
    Settle,
}

/// Rejection reason for illegal request transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestTransitionRejection {
    NoRequestInFlight,
}

pub type RequestTransitionResult = Result<RequestState, RequestTransitionRejection>;

impl RequestState {
    pub fn is_awaiting(&self) -> bool {
        matches!(self, Self::Awaiting { .. })
    }

    pub fn in_flight(&self) -> usize {
        match self {
            Self::Idle => 0,
            Self::Awaiting { in_flight } => in_flight.get(),
        }
    }

    /// Applies one transition deterministically.
    ///
    /// `Send` always succeeds and stacks on top of requests already in flight.
    /// `Settle` must match an outstanding request.
    pub fn apply(self, transition: RequestTransition) -> RequestTransitionResult {
        match transition {
            RequestTransition::Send => Ok(self.apply_send()),
            RequestTransition::Settle => self.apply_settle(),
        }
    }

    fn apply_send(self) -> Self {
        match self {
            Self::Idle => Self::Awaiting {
                in_flight: NonZeroUsize::MIN,
            },
            Self::Awaiting { in_flight } => Self::Awaiting {
                in_flight: in_flight.saturating_add(1),
            },
        }
    }

    fn apply_settle(self) -> RequestTransitionResult {
        match self {
            Self::Idle => Err(RequestTransitionRejection::NoRequestInFlight),
            Self::Awaiting { in_flight } => Ok(NonZeroUsize::new(in_flight.get() - 1)
                .map_or(Self::Idle, |in_flight| Self::Awaiting { in_flight })),
        }
    }
}
