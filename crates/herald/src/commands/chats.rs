//! `herald chats` command implementation.

use std::path::PathBuf;

use clap::Args;
use herald_config::{Config, Section};
use herald_feishu::{ChatSummary, FeishuClient};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the chats command.
#[derive(Args)]
pub(crate) struct ChatsArgs {
    /// Chats requested per page.
    #[arg(long, default_value_t = 50, value_parser = clap::value_parser!(u32).range(1..=100))]
    page_size: u32,

    /// Path to configuration file (default: auto-discover herald.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl ChatsArgs {
    /// Execute the chats command.
    ///
    /// # Errors
    ///
    /// Returns an error if credentials are missing or the listing fails.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let config = Config::load(self.config.as_deref(), None)?;
        config.require(&[Section::ChatApp])?;

        let client = FeishuClient::from_config(
            &config.feishu,
            &config.chat.app_id,
            &config.chat.app_secret,
        );

        let mut chats: Vec<ChatSummary> = Vec::new();
        let mut token: Option<String> = None;
        loop {
            let page = client.list_chats(self.page_size, token.as_deref())?;
            let next = page.next_page_token().filter(|_| page.has_more).map(str::to_owned);
            chats.extend(page.items);
            match next {
                Some(next) => token = Some(next),
                None => break,
            }
        }

        output.info(&format!("{} chat(s)", chats.len()));
        output.json(&serde_json::to_string_pretty(&chats)?);
        Ok(())
    }
}
