use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, html};

use super::{MarkdownRenderer, SafeMarkup, is_unsafe_destination};

/// CommonMark to HTML, with raw HTML demoted to escaped text.
#[derive(Debug, Clone, Copy)]
pub struct CommonMarkRenderer {
    options: Options,
}

impl Default for CommonMarkRenderer {
    fn default() -> Self {
        Self {
            options: Options::ENABLE_TABLES
                | Options::ENABLE_STRIKETHROUGH
                | Options::ENABLE_TASKLISTS,
        }
    }
}

impl MarkdownRenderer for CommonMarkRenderer {
    fn render(&self, markdown: &str) -> SafeMarkup {
        let parser = Parser::new_ext(markdown, self.options).map(neutralize);
        let mut markup = String::with_capacity(markdown.len() + markdown.len() / 2);
        html::push_html(&mut markup, parser);
        SafeMarkup::new(markup)
    }
}

fn neutralize(event: Event<'_>) -> Event<'_> {
    match event {
        // `push_html` escapes text events, so raw HTML shows up as literal source.
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) if is_unsafe_destination(&dest_url) => Event::Start(Tag::Link {
            link_type,
            dest_url: CowStr::Borrowed("#"),
            title,
            id,
        }),
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) if is_unsafe_destination(&dest_url) => Event::Start(Tag::Image {
            link_type,
            dest_url: CowStr::Borrowed("#"),
            title,
            id,
        }),
        other => other,
    }
}
