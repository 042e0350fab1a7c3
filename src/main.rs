use clap::{Parser, Subcommand};
use std::io::{BufRead, Write};
use std::net::SocketAddr;
use tracing_subscriber::{fmt, EnvFilter};

mod chat;
mod error;
mod gateway;
mod server;
mod session;
mod settings;

use chat::Conversation;
use gateway::HttpAssistantGateway;
use settings::{
    resolve_effective_settings, ConversationSettings, GlobalDefaults, RequestOverrides,
};

#[derive(Debug, Parser)]
#[command(name = "bufetec_assistant")]
#[command(about = "Headless chat service for the BufeTec legal-aid assistant", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Expose the conversation API over HTTP.
    Serve {
        #[arg(long, default_value = "127.0.0.1:7171")]
        listen: String,
    },
    /// Chat with the assistant from the terminal.
    Chat {
        #[arg(long)]
        base_url: Option<String>,
        #[arg(long)]
        assistant_id: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Serve { listen } => {
            let addr: SocketAddr = listen.parse()?;
            let state = server::AppState::new(GlobalDefaults::from_env());
            server::serve(addr, state).await?;
        }
        Commands::Chat { base_url, assistant_id } => {
            let effective = resolve_effective_settings(
                &GlobalDefaults::from_env(),
                &ConversationSettings::default(),
                &RequestOverrides { base_url, assistant_id },
            );
            let gateway = HttpAssistantGateway::new(effective.base_url, effective.assistant_id);
            let mut conversation = Conversation::new(gateway);
            conversation.start().await?;
            repl(&mut conversation).await?;
        }
    }
    Ok(())
}

/// Reads one line per turn; nothing is read while a reply is pending, so
/// input stays blocked for exactly the duration of a turn.
async fn repl(
    conversation: &mut Conversation<HttpAssistantGateway>,
) -> anyhow::Result<()> {
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    loop {
        write!(stdout, "> ")?;
        stdout.flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        match conversation.send(text).await {
            Ok(reply) => {
                println!("{}", reply.text);
                for citation in &reply.citations {
                    println!("  [{}] {}", citation.file_name, citation.url);
                }
            }
            Err(err) => eprintln!("turn failed: {}", err),
        }
    }
    Ok(())
}
