//! Browser host for the chat widget.
//!
//! Wires the controller to `localStorage`, the page's DOM and `fetch`, and
//! exports `mount` plus `sendSuggestion` to page script.

use std::cell::RefCell;
use std::rc::Rc;

use chatdock::{ChatWidget, CommonMarkRenderer, MemoryStore, WidgetConfig};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Element, Event, HtmlInputElement, KeyboardEvent};

pub mod dom;
pub mod fetch;
pub mod storage;

pub use dom::DomChatView;
pub use fetch::FetchBackend;
pub use storage::LocalStorageStore;

type BrowserWidget = ChatWidget<DomChatView, FetchBackend, CommonMarkRenderer>;

thread_local! {
    static MOUNTED: RefCell<Option<Mounted>> = const { RefCell::new(None) };
}

/// The widget page script talks to, plus the listeners feeding it.
struct Mounted {
    widget: Rc<BrowserWidget>,
    _listeners: Listeners,
}

/// Page listeners owned by one mount. Dropping them detaches them.
struct Listeners {
    button: Element,
    input: HtmlInputElement,
    on_click: Closure<dyn FnMut(Event)>,
    on_keypress: Closure<dyn FnMut(KeyboardEvent)>,
}

impl Drop for Listeners {
    fn drop(&mut self) {
        let detached = self
            .button
            .remove_event_listener_with_callback("click", self.on_click.as_ref().unchecked_ref())
            .and_then(|()| {
                self.input.remove_event_listener_with_callback(
                    "keypress",
                    self.on_keypress.as_ref().unchecked_ref(),
                )
            });

        if let Err(error) = detached {
            tracing::warn!(error = %describe_js_error(&error), "failed to detach chat listeners");
        }
    }
}

/// Initialize WASM module
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
    log::info!("chatdock web module initialized");
}

/// Handle to a mounted widget.
#[wasm_bindgen]
pub struct ChatWidgetHandle {
    widget: Rc<BrowserWidget>,
}

#[wasm_bindgen]
impl ChatWidgetHandle {
    #[wasm_bindgen(js_name = sendMessage)]
    pub fn send_message(&self, text: String) {
        spawn_send(Rc::clone(&self.widget), text);
    }

    #[wasm_bindgen(js_name = sendSuggestion)]
    pub fn send_suggestion(&self, text: String) {
        spawn_suggestion(Rc::clone(&self.widget), text);
    }

    #[wasm_bindgen(getter, js_name = sessionId)]
    pub fn session_id(&self) -> String {
        self.widget.session_id().to_string()
    }

    /// Current history as an array of `{ role, content }` objects.
    pub fn history(&self) -> Result<JsValue, JsValue> {
        Ok(serde_wasm_bindgen::to_value(&self.widget.history())?)
    }
}

/// Mounts the widget onto the current page.
///
/// `config` is an optional plain object; missing fields take their defaults.
/// Mounting again detaches the previous widget's listeners and replaces the
/// widget that `sendSuggestion` talks to.
#[wasm_bindgen]
pub fn mount(config: JsValue) -> Result<ChatWidgetHandle, JsValue> {
    let config: WidgetConfig = if config.is_undefined() || config.is_null() {
        WidgetConfig::default()
    } else {
        serde_wasm_bindgen::from_value(config)?
    };

    let document = web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| JsValue::from_str("no document to mount the chat widget on"))?;

    let view = DomChatView::mount(&document, &config.selectors)?;
    let backend = FetchBackend::new(config.endpoint.clone());
    let renderer = CommonMarkRenderer::default();

    let widget = match LocalStorageStore::open() {
        Ok(store) => ChatWidget::new(config, &store, view, backend, renderer),
        Err(error) => {
            tracing::warn!(%error, "localStorage unavailable, session id will not persist");
            ChatWidget::new(config, &MemoryStore::default(), view, backend, renderer)
        }
    }
    .map_err(|error| JsValue::from_str(&error.to_string()))?;

    let widget = Rc::new(widget);
    let previous = MOUNTED.with(|mounted| mounted.borrow_mut().take());
    drop(previous);

    let listeners = wire_listeners(&document, &widget)?;
    MOUNTED.with(|mounted| {
        *mounted.borrow_mut() = Some(Mounted {
            widget: Rc::clone(&widget),
            _listeners: listeners,
        })
    });

    log::info!("chat widget mounted for {}", widget.session_id());
    Ok(ChatWidgetHandle { widget })
}

/// Page-level shortcut for suggestion chips: `onclick="sendSuggestion('...')"`.
#[wasm_bindgen(js_name = sendSuggestion)]
pub fn send_suggestion(text: String) -> Result<(), JsValue> {
    let widget = MOUNTED
        .with(|mounted| {
            mounted
                .borrow()
                .as_ref()
                .map(|mounted| Rc::clone(&mounted.widget))
        })
        .ok_or_else(|| JsValue::from_str("chat widget is not mounted"))?;
    spawn_suggestion(widget, text);
    Ok(())
}

fn wire_listeners(document: &Document, widget: &Rc<BrowserWidget>) -> Result<Listeners, JsValue> {
    let button_id = &widget.config().selectors.send_button_id;
    let button = document
        .get_element_by_id(button_id)
        .ok_or_else(|| JsValue::from_str(&format!("missing element #{button_id}")))?;
    let input = widget.view().input().clone();

    let on_click = {
        let widget = Rc::clone(widget);
        Closure::<dyn FnMut(Event)>::new(move |_event: Event| {
            let text = widget.view().input_value();
            spawn_send(Rc::clone(&widget), text);
        })
    };
    let on_keypress = {
        let widget = Rc::clone(widget);
        Closure::<dyn FnMut(KeyboardEvent)>::new(move |event: KeyboardEvent| {
            if event.key() == "Enter" {
                let text = widget.view().input_value();
                spawn_send(Rc::clone(&widget), text);
            }
        })
    };

    button.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())?;
    let listeners = Listeners {
        button,
        input,
        on_click,
        on_keypress,
    };
    listeners.input.add_event_listener_with_callback(
        "keypress",
        listeners.on_keypress.as_ref().unchecked_ref(),
    )?;

    Ok(listeners)
}

fn spawn_send(widget: Rc<BrowserWidget>, text: String) {
    spawn_local(async move {
        widget.send_message(&text).await;
    });
}

fn spawn_suggestion(widget: Rc<BrowserWidget>, text: String) {
    spawn_local(async move {
        widget.send_suggestion(&text).await;
    });
}

pub(crate) fn describe_js_error(error: &JsValue) -> String {
    error.as_string().unwrap_or_else(|| format!("{error:?}"))
}
