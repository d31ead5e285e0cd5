use serde::{Deserialize, Serialize};

use crate::backend::DEFAULT_CHAT_ENDPOINT;
use crate::history::{DEFAULT_HISTORY_LIMIT, MAX_HISTORY_LIMIT};
use crate::session::DEFAULT_SESSION_KEY;

pub const DEFAULT_FALLBACK_MESSAGE: &str = "Sorry, I'm having trouble connecting to the server.";

/// Element lookups used by browser hosts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomSelectors {
    #[serde(default = "default_messages_id")]
    pub messages_id: String,
    #[serde(default = "default_chat_window_id")]
    pub chat_window_id: String,
    #[serde(default = "default_input_id")]
    pub input_id: String,
    #[serde(default = "default_send_button_id")]
    pub send_button_id: String,
    #[serde(default = "default_typing_indicator_id")]
    pub typing_indicator_id: String,
    #[serde(default = "default_welcome_selector")]
    pub welcome_selector: String,
    #[serde(default = "default_hidden_class")]
    pub hidden_class: String,
}

impl Default for DomSelectors {
    fn default() -> Self {
        Self {
            messages_id: default_messages_id(),
            chat_window_id: default_chat_window_id(),
            input_id: default_input_id(),
            send_button_id: default_send_button_id(),
            typing_indicator_id: default_typing_indicator_id(),
            welcome_selector: default_welcome_selector(),
            hidden_class: default_hidden_class(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_session_key")]
    pub session_key: String,
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
    #[serde(default = "default_fallback_message")]
    pub fallback_message: String,
    #[serde(default = "default_allow_overlapping_sends")]
    pub allow_overlapping_sends: bool,
    #[serde(default)]
    pub selectors: DomSelectors,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            session_key: default_session_key(),
            history_limit: default_history_limit(),
            fallback_message: default_fallback_message(),
            allow_overlapping_sends: default_allow_overlapping_sends(),
            selectors: DomSelectors::default(),
        }
    }
}

impl WidgetConfig {
    /// Trims string fields and restores defaults for values that can't work.
    pub fn normalized(mut self) -> Self {
        self.endpoint = self.endpoint.trim().to_string();
        if self.endpoint.is_empty() {
            self.endpoint = default_endpoint();
        }

        self.session_key = self.session_key.trim().to_string();
        if self.session_key.is_empty() {
            self.session_key = default_session_key();
        }

        if self.fallback_message.trim().is_empty() {
            self.fallback_message = default_fallback_message();
        }

        self.history_limit = self.history_limit.clamp(1, MAX_HISTORY_LIMIT);
        self
    }
}

fn default_endpoint() -> String {
    DEFAULT_CHAT_ENDPOINT.to_string()
}

fn default_session_key() -> String {
    DEFAULT_SESSION_KEY.to_string()
}

fn default_history_limit() -> usize {
    DEFAULT_HISTORY_LIMIT
}

fn default_fallback_message() -> String {
    DEFAULT_FALLBACK_MESSAGE.to_string()
}

fn default_allow_overlapping_sends() -> bool {
    true
}

fn default_messages_id() -> String {
    "messages".to_string()
}

fn default_chat_window_id() -> String {
    "chat-window".to_string()
}

fn default_input_id() -> String {
    "user-input".to_string()
}

fn default_send_button_id() -> String {
    "send-btn".to_string()
}

fn default_typing_indicator_id() -> String {
    "typing-indicator".to_string()
}

fn default_welcome_selector() -> String {
    ".welcome-message".to_string()
}

fn default_hidden_class() -> String {
    "hidden".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_yields_defaults() {
        let config: WidgetConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, WidgetConfig::default());
        assert_eq!(config.endpoint, "/chat");
        assert_eq!(config.session_key, "chat_thread_id");
        assert_eq!(config.history_limit, 10);
        assert!(config.allow_overlapping_sends);
    }

    #[test]
    fn partial_selectors_keep_other_defaults() {
        let config: WidgetConfig =
            serde_json::from_str(r#"{"selectors":{"input_id":"prompt"}}"#).unwrap();
        assert_eq!(config.selectors.input_id, "prompt");
        assert_eq!(config.selectors.messages_id, "messages");
    }

    #[test]
    fn normalized_repairs_blank_values() {
        let config = WidgetConfig {
            endpoint: "  ".to_string(),
            session_key: String::new(),
            history_limit: 0,
            fallback_message: "\n".to_string(),
            ..WidgetConfig::default()
        }
        .normalized();

        assert_eq!(config.endpoint, DEFAULT_CHAT_ENDPOINT);
        assert_eq!(config.session_key, DEFAULT_SESSION_KEY);
        assert_eq!(config.history_limit, 1);
        assert_eq!(config.fallback_message, DEFAULT_FALLBACK_MESSAGE);
    }

    #[test]
    fn huge_history_limit_is_capped() {
        let config: WidgetConfig =
            serde_json::from_str(r#"{"history_limit":1000000000000000}"#).unwrap();
        assert_eq!(config.normalized().history_limit, MAX_HISTORY_LIMIT);
    }
}
