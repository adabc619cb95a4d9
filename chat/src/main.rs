use std::io::{self, IsTerminal};
use std::time::Duration;

use chat::net::relay::{ClientError, RelayClient};
use chat::render::TerminalRenderer;
use chat::session::{ChatSession, SendOutcome};
use chat::state::conversation::{Conversation, SendError};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("relay client setup failed: {0}")]
    Client(#[from] ClientError),
    #[error("reading input failed: {0}")]
    Input(#[from] io::Error),
}

#[derive(Parser, Debug)]
#[command(name = "support-chat", about = "Chat with the customer support relay")]
struct Cli {
    #[arg(long, env = "SUPPORT_CHAT_RELAY_URL", default_value = "http://127.0.0.1:3000/api/chat")]
    relay_url: String,

    #[arg(
        long,
        default_value = "Hi! I'm the Headstarter Support Agent, how can I assist you today?"
    )]
    greeting: String,

    /// Disable ANSI colors even when stdout is a terminal.
    #[arg(long)]
    no_color: bool,

    /// Seconds to wait for the TCP connection to the relay.
    #[arg(long, default_value_t = 10)]
    timeout_secs: u64,
}

/// `RUST_LOG` when it parses, otherwise warnings only. Logs share the
/// terminal with the conversation.
fn log_filter(rust_log: Option<String>) -> EnvFilter {
    rust_log
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new("warn"))
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let filter = log_filter(std::env::var("RUST_LOG").ok());
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();

    let cli = Cli::parse();
    let relay = RelayClient::new(&cli.relay_url, Duration::from_secs(cli.timeout_secs))?;
    let color = !cli.no_color && io::stdout().is_terminal();
    let renderer = TerminalRenderer::new(io::stdout(), color);

    let mut session = ChatSession::new(Conversation::with_greeting(cli.greeting), relay, renderer);
    session.redraw();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => {
                // The pending stdin read sits on a blocking thread that would
                // hold up runtime shutdown.
                println!();
                std::process::exit(0);
            }
        };
        let Some(line) = line else { break };

        session.set_input(line);
        let result = tokio::select! {
            result = session.send() => Some(result),
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(result) = result else {
            session.cancel();
            eprintln!("(reply cancelled)");
            continue;
        };
        match result {
            Ok(SendOutcome::Completed { .. }) => {}
            Ok(SendOutcome::Interrupted { reason }) => eprintln!("(reply interrupted: {reason})"),
            Err(SendError::EmptyInput) => eprintln!("(type a message and press enter)"),
            Err(SendError::Busy) => eprintln!("(still waiting for the previous reply)"),
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
