/// One line of input at the chat prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Quit,
    /// Send a canned suggestion as if the user typed it.
    Suggest(String),
    Send(String),
    /// Whitespace only, or a bare `/suggest`.
    Empty,
}

impl ReplCommand {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();

        match trimmed {
            "" => Self::Empty,
            "/quit" | "/exit" => Self::Quit,
            _ => match trimmed.strip_prefix("/suggest") {
                Some(rest) if rest.is_empty() || rest.starts_with(char::is_whitespace) => {
                    let suggestion = rest.trim();
                    if suggestion.is_empty() {
                        Self::Empty
                    } else {
                        Self::Suggest(suggestion.to_string())
                    }
                }
                _ => Self::Send(line.to_string()),
            },
        }
    }
}

pub const HELP: &str = "Type a message and press Enter. `/suggest <text>` sends a suggestion, `/quit` exits.";
