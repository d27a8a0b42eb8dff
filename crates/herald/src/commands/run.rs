//! `herald run` command implementation.

use std::path::PathBuf;

use clap::Args;
use herald_config::{CliSettings, Config};
use herald_feishu::FeishuClient;
use herald_pipeline::{Collaborators, Pipeline, SystemRunner};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the run command.
#[derive(Args)]
pub(crate) struct RunArgs {
    /// Log every external action instead of performing it.
    #[arg(long)]
    dry_run: bool,

    /// Content root directory (overrides config).
    #[arg(long)]
    content_root: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover herald.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl RunArgs {
    /// Execute the run command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is incomplete or any stage fails.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            content_root: self.content_root,
            ..Default::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        // Separate clients so no token is shared between stages
        let docs = FeishuClient::from_config(
            &config.feishu,
            &config.docs.app_id,
            &config.docs.app_secret,
        );
        let chat = FeishuClient::from_config(
            &config.feishu,
            &config.chat.app_id,
            &config.chat.app_secret,
        );
        let collaborators = Collaborators {
            runner: &SystemRunner,
            documents: &docs,
            chat: &chat,
        };

        let pipeline = Pipeline::new(&config, collaborators, self.dry_run)?;
        if self.dry_run {
            output.dry_run_banner();
        }

        let report = pipeline.run()?;
        output.run_report(&report);
        Ok(())
    }
}
