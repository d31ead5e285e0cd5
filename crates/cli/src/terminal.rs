use std::cell::{Cell, Ref, RefCell};
use std::io::Write;

use chatdock::{ChatView, MessageBody, RenderedMessage, Role};

const DIM: &str = "\x1b[2m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";
const CLEAR_LINE: &str = "\r\x1b[2K";

/// Line-oriented chat surface over any writer, usually stdout.
pub struct TerminalView<W: Write> {
    out: RefCell<W>,
    typing_visible: Cell<bool>,
    // Last line typed at the prompt; the terminal has already shown it.
    echoed: RefCell<Option<String>>,
}

impl<W: Write> TerminalView<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: RefCell::new(out),
            typing_visible: Cell::new(false),
            echoed: RefCell::new(None),
        }
    }

    pub fn output(&self) -> Ref<'_, W> {
        self.out.borrow()
    }

    pub fn show_welcome(&self, text: &str) {
        self.write(&format!("{DIM}{text}{RESET}\n"));
    }

    pub fn prompt(&self) {
        self.write(&format!("{BOLD}you ›{RESET} "));
    }

    /// Remembers the line the user just typed so it isn't printed twice.
    pub fn note_echoed(&self, line: &str) {
        *self.echoed.borrow_mut() = Some(line.to_string());
    }

    fn write(&self, text: &str) {
        let mut out = self.out.borrow_mut();
        if let Err(error) = out.write_all(text.as_bytes()).and_then(|()| out.flush()) {
            tracing::warn!(%error, "failed to write to terminal");
        }
    }
}

impl<W: Write> ChatView for TerminalView<W> {
    fn hide_welcome(&self) {
        self.write(&format!("{DIM}────────{RESET}\n"));
    }

    fn append_message(&self, message: &RenderedMessage) {
        match &message.body {
            MessageBody::Text(content) => {
                if self.echoed.borrow_mut().take().as_deref() == Some(content.as_str()) {
                    return;
                }
                let content: String = content
                    .chars()
                    .filter(|character| !character.is_control() || *character == '\n')
                    .collect();
                self.write(&format!("{BOLD}{} ›{RESET} {content}\n", label(message.role)))
            }
            MessageBody::Markup(markup) => {
                self.write(&format!("{BOLD}{} ›{RESET} {markup}\n", label(message.role)))
            }
        }
    }

    // The line editor consumed the input already.
    fn clear_input(&self) {}

    fn set_typing(&self, visible: bool) {
        if self.typing_visible.replace(visible) == visible {
            return;
        }

        if visible {
            self.write(&format!("{DIM}assistant is typing…{RESET}"));
        } else {
            self.write(CLEAR_LINE);
        }
    }

    fn scroll_to_end(&self) {
        if let Err(error) = self.out.borrow_mut().flush() {
            tracing::warn!(%error, "failed to flush terminal");
        }
    }
}

fn label(role: Role) -> &'static str {
    match role {
        Role::User => "you",
        Role::Assistant => "assistant",
    }
}

#[cfg(test)]
mod tests {
    use chatdock::{MarkdownRenderer, TerminalRenderer};

    use super::*;

    fn rendered(view: &TerminalView<Vec<u8>>) -> String {
        String::from_utf8(view.output().clone()).unwrap()
    }

    #[test]
    fn assistant_markup_is_written_with_label() {
        let view = TerminalView::new(Vec::new());

        view.append_message(&RenderedMessage {
            role: Role::Assistant,
            body: MessageBody::Markup(TerminalRenderer.render("**Hi** there")),
        });

        let output = rendered(&view);
        assert!(output.contains("assistant ›"));
        assert!(output.contains("\x1b[1mHi\x1b[0m there"));
        assert!(!output.contains("**"));
    }

    #[test]
    fn user_echo_is_not_repeated() {
        let view = TerminalView::new(Vec::new());

        view.note_echoed("<b>x</b>");
        view.append_message(&RenderedMessage {
            role: Role::User,
            body: MessageBody::Text("<b>x</b>".to_string()),
        });

        assert!(rendered(&view).is_empty());
    }

    #[test]
    fn suggestion_text_is_shown_as_user_turn() {
        let view = TerminalView::new(Vec::new());

        view.note_echoed("/suggest What are your hours?");
        view.append_message(&RenderedMessage {
            role: Role::User,
            body: MessageBody::Text("What are your hours?".to_string()),
        });

        let output = rendered(&view);
        assert!(output.contains("you ›"));
        assert!(output.contains("What are your hours?\n"));
    }

    #[test]
    fn typing_line_is_cleared_once() {
        let view = TerminalView::new(Vec::new());

        view.set_typing(true);
        view.set_typing(true);
        view.set_typing(false);
        view.set_typing(false);

        let output = rendered(&view);
        assert_eq!(output.matches("typing").count(), 1);
        assert_eq!(output.matches(CLEAR_LINE).count(), 1);
    }
}
