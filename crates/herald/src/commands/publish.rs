//! `herald publish` command implementation.

use std::path::PathBuf;

use chrono::Local;
use clap::Args;
use herald_config::{Config, Section};
use herald_feishu::FeishuClient;
use herald_pipeline::{Publication, Publisher};

use super::resolve_document;
use crate::error::CliError;
use crate::output::{Output, Tone};

/// Arguments for the publish command.
#[derive(Args)]
pub(crate) struct PublishArgs {
    /// Markdown file to publish (default: most recently modified under the content root).
    file: Option<PathBuf>,

    /// Show what would be published without creating a document.
    #[arg(long)]
    dry_run: bool,

    /// Path to configuration file (default: auto-discover herald.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl PublishArgs {
    /// Execute the publish command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is incomplete or publishing fails.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let config = Config::load(self.config.as_deref(), None)?;
        config.require(&[Section::Docs])?;

        let path = resolve_document(self.file, &config)?;
        output.info(&format!("Publishing {}...", path.display()));

        let client = FeishuClient::from_config(
            &config.feishu,
            &config.docs.app_id,
            &config.docs.app_secret,
        );
        let publisher = Publisher::new(&client, &config.docs, self.dry_run);

        match publisher.publish(&path, Local::now().naive_local())? {
            Publication::Published {
                document_id, total, ..
            } => {
                output.line(Tone::Good, "\nDocument published successfully!");
                output.info(&format!("ID: {document_id}"));
                output.info(&format!("Blocks: {total}"));
            }
            Publication::Simulated { title, blocks } => {
                output.dry_run_banner();
                output.info(&format!("Title: {title}"));
                output.info(&format!(
                    "Blocks: {blocks} in batches of {}",
                    config.docs.batch_size
                ));
            }
        }

        Ok(())
    }
}
