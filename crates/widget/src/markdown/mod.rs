//! Markdown to display-markup conversion.
//!
//! Assistant replies arrive as markdown and are rendered through a
//! [`MarkdownRenderer`]. The output type, [`SafeMarkup`], can only be built
//! inside this module tree, which is what lets a view insert it as markup.

mod html;
mod terminal;

use std::fmt;

pub use html::CommonMarkRenderer;
pub use terminal::TerminalRenderer;

/// Markup produced by a renderer that has neutralized injected HTML.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafeMarkup(String);

impl SafeMarkup {
    pub(crate) fn new(markup: String) -> Self {
        Self(markup)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for SafeMarkup {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

pub trait MarkdownRenderer {
    fn render(&self, markdown: &str) -> SafeMarkup;
}

const UNSAFE_URL_SCHEMES: [&str; 3] = ["javascript:", "vbscript:", "data:"];

/// True when a link or image destination could execute script when followed.
pub(crate) fn is_unsafe_destination(destination: &str) -> bool {
    let normalized: String = destination
        .chars()
        .filter(|character| !character.is_whitespace() && !character.is_control())
        .flat_map(char::to_lowercase)
        .collect();

    UNSAFE_URL_SCHEMES
        .iter()
        .any(|scheme| normalized.starts_with(scheme))
}
