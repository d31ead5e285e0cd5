use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};

use super::{MarkdownRenderer, SafeMarkup, is_unsafe_destination};

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const ITALIC: &str = "\x1b[3m";
const UNDERLINE: &str = "\x1b[4m";
const STRIKE: &str = "\x1b[9m";
const CODE: &str = "\x1b[36m";
const DIM: &str = "\x1b[2m";

/// Markdown to ANSI-styled terminal text.
///
/// Control characters inside the source are dropped, so a reply can't smuggle
/// its own escape sequences onto the terminal.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalRenderer;

impl MarkdownRenderer for TerminalRenderer {
    fn render(&self, markdown: &str) -> SafeMarkup {
        let options = Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS;
        let mut writer = AnsiWriter::default();
        for event in Parser::new_ext(markdown, options) {
            writer.event(event);
        }
        SafeMarkup::new(writer.finish())
    }
}

#[derive(Default)]
struct AnsiWriter {
    output: String,
    // Active styles, re-applied after every reset so nesting survives.
    styles: Vec<&'static str>,
    list_stack: Vec<Option<u64>>,
    pending_link: Option<String>,
}

impl AnsiWriter {
    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) | Event::Html(text) | Event::InlineHtml(text) => {
                self.push_clean(&text)
            }
            Event::Code(code) => {
                self.push_style(CODE);
                self.push_clean(&code);
                self.pop_style();
            }
            Event::SoftBreak => self.output.push(' '),
            Event::HardBreak => self.output.push('\n'),
            Event::Rule => {
                self.block_gap();
                self.output.push_str(DIM);
                self.output.push_str("────────");
                self.output.push_str(RESET);
                self.output.push('\n');
            }
            Event::TaskListMarker(done) => {
                self.output.push_str(if done { "[x] " } else { "[ ] " })
            }
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => self.block_gap(),
            Tag::Heading { level, .. } => {
                self.block_gap();
                self.push_style(BOLD);
                if level == HeadingLevel::H1 {
                    self.push_style(UNDERLINE);
                }
            }
            Tag::CodeBlock(_) => {
                self.block_gap();
                self.push_style(CODE);
            }
            Tag::List(start) => {
                if self.list_stack.is_empty() {
                    self.block_gap();
                }
                self.list_stack.push(start);
            }
            Tag::Item => {
                if !self.output.is_empty() && !self.output.ends_with('\n') {
                    self.output.push('\n');
                }
                let depth = self.list_stack.len().saturating_sub(1);
                self.output.push_str(&"  ".repeat(depth));
                match self.list_stack.last_mut() {
                    Some(Some(number)) => {
                        self.output.push_str(&format!("{number}. "));
                        *number += 1;
                    }
                    _ => self.output.push_str("• "),
                }
            }
            Tag::Emphasis => self.push_style(ITALIC),
            Tag::Strong => self.push_style(BOLD),
            Tag::Strikethrough => self.push_style(STRIKE),
            Tag::Link { dest_url, .. } => {
                self.push_style(UNDERLINE);
                if !is_unsafe_destination(&dest_url) {
                    self.pending_link = Some(dest_url.to_string());
                }
            }
            Tag::BlockQuote(_) => {
                self.block_gap();
                self.push_style(DIM);
            }
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => self.output.push('\n'),
            TagEnd::Heading(level) => {
                if level == HeadingLevel::H1 {
                    self.pop_style();
                }
                self.pop_style();
                self.output.push('\n');
            }
            TagEnd::CodeBlock => {
                self.pop_style();
                if !self.output.ends_with('\n') {
                    self.output.push('\n');
                }
            }
            TagEnd::List(_) => {
                self.list_stack.pop();
                if !self.output.ends_with('\n') {
                    self.output.push('\n');
                }
            }
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough | TagEnd::BlockQuote(_) => {
                self.pop_style()
            }
            TagEnd::Link => {
                self.pop_style();
                if let Some(destination) = self.pending_link.take() {
                    self.output.push_str(" (");
                    self.push_clean(&destination);
                    self.output.push(')');
                }
            }
            _ => {}
        }
    }

    fn push_style(&mut self, style: &'static str) {
        self.styles.push(style);
        self.output.push_str(style);
    }

    fn pop_style(&mut self) {
        self.styles.pop();
        self.output.push_str(RESET);
        for style in &self.styles {
            self.output.push_str(style);
        }
    }

    fn push_clean(&mut self, text: &str) {
        self.output.extend(
            text.chars()
                .filter(|character| !character.is_control() || matches!(character, '\n' | '\t')),
        );
    }

    fn block_gap(&mut self) {
        if self.output.is_empty() || !self.list_stack.is_empty() {
            return;
        }
        if !self.output.ends_with("\n\n") {
            if !self.output.ends_with('\n') {
                self.output.push('\n');
            }
            self.output.push('\n');
        }
    }

    fn finish(mut self) -> String {
        while self.output.ends_with('\n') {
            self.output.pop();
        }
        if !self.styles.is_empty() {
            self.output.push_str(RESET);
        }
        self.output
    }
}
