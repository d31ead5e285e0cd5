use crate::message::RenderedMessage;

/// Display surface the widget drives.
///
/// Methods take `&self`: hosts own their UI handles and the widget only
/// pokes at them, the way page script pokes at DOM nodes it didn't create.
pub trait ChatView {
    fn hide_welcome(&self);
    fn append_message(&self, message: &RenderedMessage);
    fn clear_input(&self);
    fn set_typing(&self, visible: bool);
    fn scroll_to_end(&self);
}
