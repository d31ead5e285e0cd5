use chatdock::{ChatView, DomSelectors, MessageBody, RenderedMessage, Role};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlElement, HtmlInputElement};

use crate::describe_js_error;

/// Page elements the widget writes into. The page owns the markup; this only
/// holds handles looked up once at mount time.
pub struct DomChatView {
    document: Document,
    messages: Element,
    chat_window: Element,
    input: HtmlInputElement,
    typing_indicator: Element,
    welcome: Option<Element>,
    hidden_class: String,
}

impl DomChatView {
    /// Looks up every element named in `selectors`. Only the welcome
    /// placeholder is optional.
    pub fn mount(document: &Document, selectors: &DomSelectors) -> Result<Self, JsValue> {
        let input = require_element(document, &selectors.input_id)?
            .dyn_into::<HtmlInputElement>()
            .map_err(|_| {
                JsValue::from_str(&format!(
                    "#{} is not an <input> element",
                    selectors.input_id
                ))
            })?;

        Ok(Self {
            document: document.clone(),
            messages: require_element(document, &selectors.messages_id)?,
            chat_window: require_element(document, &selectors.chat_window_id)?,
            input,
            typing_indicator: require_element(document, &selectors.typing_indicator_id)?,
            welcome: document.query_selector(&selectors.welcome_selector)?,
            hidden_class: selectors.hidden_class.clone(),
        })
    }

    pub fn input(&self) -> &HtmlInputElement {
        &self.input
    }

    pub fn input_value(&self) -> String {
        self.input.value()
    }

    fn build_message_element(&self, message: &RenderedMessage) -> Result<Element, JsValue> {
        let container = self.document.create_element("div")?;
        container.set_class_name(&format!("message {}-message", css_role(message.role)));

        let text: HtmlElement = self
            .document
            .create_element("span")?
            .dyn_into()
            .map_err(JsValue::from)?;
        match &message.body {
            // innerText keeps the user's line breaks without parsing markup.
            MessageBody::Text(content) => text.set_inner_text(content),
            MessageBody::Markup(markup) => text.set_inner_html(markup.as_str()),
        }

        container.append_child(&text)?;
        Ok(container)
    }

    fn set_hidden(&self, element: &Element, hidden: bool) {
        let classes = element.class_list();
        let result = if hidden {
            classes.add_1(&self.hidden_class)
        } else {
            classes.remove_1(&self.hidden_class)
        };

        if let Err(error) = result {
            tracing::warn!(error = %describe_js_error(&error), "failed to toggle hidden class");
        }
    }
}

impl ChatView for DomChatView {
    fn hide_welcome(&self) {
        if let Some(welcome) = &self.welcome {
            self.set_hidden(welcome, true);
        }
    }

    fn append_message(&self, message: &RenderedMessage) {
        let appended = self
            .build_message_element(message)
            .and_then(|element| self.messages.append_child(&element));

        if let Err(error) = appended {
            tracing::warn!(
                role = %message.role,
                error = %describe_js_error(&error),
                "failed to append chat message"
            );
        }
    }

    fn clear_input(&self) {
        self.input.set_value("");
    }

    fn set_typing(&self, visible: bool) {
        self.set_hidden(&self.typing_indicator, !visible);
    }

    fn scroll_to_end(&self) {
        self.chat_window
            .set_scroll_top(self.chat_window.scroll_height());
    }
}

/// Class name stem the stock stylesheet uses for each speaker.
pub fn css_role(role: Role) -> &'static str {
    match role {
        Role::User => "user",
        Role::Assistant => "bot",
    }
}

fn require_element(document: &Document, id: &str) -> Result<Element, JsValue> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("missing element #{id}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assistant_bubbles_use_bot_class() {
        assert_eq!(css_role(Role::User), "user");
        assert_eq!(css_role(Role::Assistant), "bot");
    }
}
