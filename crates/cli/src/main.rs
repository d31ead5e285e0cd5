mod config;
mod http;
mod repl;
mod state;
mod terminal;

use std::io::Stdout;
use std::path::PathBuf;
use std::process::ExitCode;

use chatdock::{ChatWidget, SessionError, TerminalRenderer};
use clap::Parser;
use snafu::{ResultExt, Snafu};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use crate::config::{CliConfig, ConfigError};
use crate::http::HttpBackend;
use crate::repl::{HELP, ReplCommand};
use crate::state::StateFile;
use crate::terminal::TerminalView;

type TerminalWidget = ChatWidget<TerminalView<Stdout>, HttpBackend, TerminalRenderer>;

/// Talk to a chat endpoint from the terminal.
#[derive(Debug, Parser)]
#[command(name = "chatdock", version, about)]
struct Cli {
    /// JSON config file; defaults to the per-user config directory.
    #[arg(long, short)]
    config: Option<PathBuf>,
    /// Origin the chat endpoint is resolved against.
    #[arg(long)]
    base_url: Option<String>,
    /// Chat endpoint path or absolute URL.
    #[arg(long)]
    endpoint: Option<String>,
}

#[derive(Debug, Snafu)]
enum StartupError {
    #[snafu(display("failed to load configuration: {source}"))]
    Config { source: ConfigError },
    #[snafu(display("failed to build HTTP client on `{stage}`: {source}"))]
    HttpClient {
        stage: &'static str,
        source: reqwest::Error,
    },
    #[snafu(display("failed to start chat session: {source}"))]
    Session { source: SessionError },
    #[snafu(display("failed to read from stdin on `{stage}`: {source}"))]
    Stdin {
        stage: &'static str,
        source: std::io::Error,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!(%error, "chatdock exited with an error");
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), StartupError> {
    let config = CliConfig::load(cli.config.as_deref())
        .context(ConfigSnafu)?
        .with_overrides(cli.base_url, cli.endpoint);

    let chat_url = config.chat_url();
    let store = StateFile::new(config.state_path());
    let backend = HttpBackend::new(chat_url).context(HttpClientSnafu {
        stage: "build-http-client",
    })?;
    tracing::info!(url = backend.url(), state = ?store.path(), "starting terminal chat");

    let view = TerminalView::new(std::io::stdout());
    view.show_welcome(HELP);

    let widget: TerminalWidget =
        ChatWidget::new(config.widget, &store, view, backend, TerminalRenderer)
            .context(SessionSnafu)?;
    tracing::debug!(session_id = %widget.session_id(), "session ready");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        widget.view().prompt();

        let Some(line) = lines.next_line().await.context(StdinSnafu {
            stage: "read-prompt-line",
        })?
        else {
            break;
        };

        widget.view().note_echoed(&line);
        match ReplCommand::parse(&line) {
            ReplCommand::Quit => break,
            ReplCommand::Empty => {}
            ReplCommand::Suggest(text) => widget.send_suggestion(&text).await,
            ReplCommand::Send(text) => widget.send_message(&text).await,
        }
    }

    Ok(())
}
