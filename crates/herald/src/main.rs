//! Herald CLI - daily Markdown digest delivery.
//!
//! Provides commands for:
//! - `run`: Generate, publish, broadcast and persist today's digest
//! - `publish`: Publish one Markdown file as a hosted document
//! - `send`: Broadcast one Markdown file to a chat
//! - `chats`: List the chats the application has joined

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{ChatsArgs, PublishArgs, RunArgs, SendArgs};
use output::Output;

/// Herald - daily Markdown digest delivery.
#[derive(Parser)]
#[command(name = "herald", version, about)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline: generate, publish, broadcast, persist.
    Run(RunArgs),
    /// Publish a Markdown file as a hosted document.
    Publish(PublishArgs),
    /// Send a Markdown file to a chat.
    Send(SendArgs),
    /// List chats the application has joined, as JSON.
    Chats(ChatsArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Run(args) => args.execute(),
        Commands::Publish(args) => args.execute(),
        Commands::Send(args) => args.execute(),
        Commands::Chats(args) => args.execute(),
    };

    if let Err(err) = result {
        output.failure(&err);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_verbose_flag() {
        let cli = Cli::try_parse_from(["herald", "run", "--dry-run", "-v"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Run(_)));
    }

    #[test]
    fn test_send_chat_id_conflicts_with_chat_name() {
        let result =
            Cli::try_parse_from(["herald", "send", "--chat-id", "oc_1", "--chat-name", "Team"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_send_format_values() {
        assert!(Cli::try_parse_from(["herald", "send", "--format", "text"]).is_ok());
        assert!(Cli::try_parse_from(["herald", "send", "--format", "html"]).is_err());
    }

    #[test]
    fn test_send_post_options() {
        assert!(
            Cli::try_parse_from(["herald", "send", "--format", "post", "--title", "Notice"]).is_ok()
        );
        assert!(
            Cli::try_parse_from([
                "herald", "send", "--format", "post", "--title", "T", "--link-text", "more",
            ])
            .is_err()
        );
    }

    #[test]
    fn test_chats_page_size_range() {
        assert!(Cli::try_parse_from(["herald", "chats", "--page-size", "20"]).is_ok());
        assert!(Cli::try_parse_from(["herald", "chats", "--page-size", "0"]).is_err());
    }
}
