use std::cell::{Cell, RefCell};

use crate::backend::{ChatBackend, ChatRequest};
use crate::config::WidgetConfig;
use crate::error::SessionResult;
use crate::history::ChatHistory;
use crate::markdown::MarkdownRenderer;
use crate::message::{
    ChatMessage, MessageBody, RenderedMessage, RequestState, RequestTransition, Role,
};
use crate::session::{KeyValueStore, SessionId, initialize_session};
use crate::view::ChatView;

/// Controller between user input, local history and the chat endpoint.
///
/// All mutable state sits behind `Cell`/`RefCell` and no borrow is held across
/// the network await, so several `send_message` futures may be in flight on
/// the same thread. Replies render in the order they resolve.
pub struct ChatWidget<V, B, M> {
    config: WidgetConfig,
    session_id: SessionId,
    view: V,
    backend: B,
    renderer: M,
    history: RefCell<ChatHistory>,
    request_state: Cell<RequestState>,
    welcome_visible: Cell<bool>,
}

impl<V, B, M> ChatWidget<V, B, M>
where
    V: ChatView,
    B: ChatBackend,
    M: MarkdownRenderer,
{
    /// Builds the widget, loading or creating the session id from `store`.
    pub fn new(
        config: WidgetConfig,
        store: &impl KeyValueStore,
        view: V,
        backend: B,
        renderer: M,
    ) -> SessionResult<Self> {
        let config = config.normalized();
        let session_id = initialize_session(store, &config.session_key)?;
        let history = ChatHistory::with_limit(config.history_limit);

        Ok(Self {
            config,
            session_id,
            view,
            backend,
            renderer,
            history: RefCell::new(history),
            request_state: Cell::new(RequestState::Idle),
            welcome_visible: Cell::new(true),
        })
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn history(&self) -> Vec<ChatMessage> {
        self.history.borrow().to_vec()
    }

    pub fn request_state(&self) -> RequestState {
        self.request_state.get()
    }

    /// Appends one message to the view.
    ///
    /// Assistant text goes through the markdown renderer; user text is passed
    /// on untouched as plain text.
    pub fn render_message(&self, text: &str, role: Role) {
        if self.welcome_visible.replace(false) {
            self.view.hide_welcome();
        }

        let body = match role {
            Role::User => MessageBody::Text(text.to_string()),
            Role::Assistant => MessageBody::Markup(self.renderer.render(text)),
        };

        self.view.append_message(&RenderedMessage { role, body });
        self.view.scroll_to_end();
    }

    pub fn record_history(&self, role: Role, content: &str) {
        self.history.borrow_mut().record(role, content);
    }

    /// Sends one user message and renders whatever comes back.
    ///
    /// Blank input is ignored. Transport, status and decode failures all end
    /// in the configured fallback reply; nothing is returned to the caller.
    pub async fn send_message(&self, text: &str) {
        if text.trim().is_empty() {
            return;
        }

        if !self.config.allow_overlapping_sends && self.request_state.get().is_awaiting() {
            tracing::debug!(
                in_flight = self.request_state.get().in_flight(),
                "dropping send while a reply is pending"
            );
            return;
        }

        self.record_history(Role::User, text);
        self.render_message(text, Role::User);
        self.view.clear_input();

        self.transition(RequestTransition::Send);
        self.view.set_typing(true);
        self.view.scroll_to_end();

        let request = ChatRequest {
            query: text.to_string(),
            thread_id: self.session_id.to_string(),
            history: self.history(),
        };
        tracing::debug!(
            thread_id = %self.session_id,
            history_len = request.history.len(),
            "sending chat request"
        );

        let reply = match self.backend.send(request).await {
            Ok(reply) => {
                if let Some(category) = reply.category.as_deref() {
                    tracing::debug!(category, "chat reply classified");
                }
                reply.response
            }
            Err(error) => {
                tracing::warn!(%error, "chat request failed, showing fallback reply");
                self.config.fallback_message.clone()
            }
        };

        self.transition(RequestTransition::Settle);
        // Any settled request hides the indicator, even with others pending.
        self.view.set_typing(false);

        self.record_history(Role::Assistant, &reply);
        self.render_message(&reply, Role::Assistant);
    }

    /// Sends a canned prompt exactly as if the user had typed it.
    pub async fn send_suggestion(&self, text: &str) {
        self.send_message(text).await;
    }

    fn transition(&self, transition: RequestTransition) -> RequestState {
        let current = self.request_state.get();
        match current.apply(transition) {
            Ok(next) => {
                self.request_state.set(next);
                next
            }
            Err(rejection) => {
                tracing::warn!(?rejection, ?transition, "ignored request state transition");
                current
            }
        }
    }
}
