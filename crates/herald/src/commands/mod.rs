//! CLI command implementations.

mod chats;
mod publish;
mod run;
mod send;

pub(crate) use chats::ChatsArgs;
pub(crate) use publish::PublishArgs;
pub(crate) use run::RunArgs;
pub(crate) use send::SendArgs;

use std::path::PathBuf;

use herald_config::Config;
use herald_pipeline::{PipelineError, latest_markdown};

use crate::error::CliError;

/// The given file, or the most recently modified Markdown under the content root.
fn resolve_document(file: Option<PathBuf>, config: &Config) -> Result<PathBuf, CliError> {
    if let Some(file) = file {
        return Ok(file);
    }
    let root = &config.content_resolved.root;
    let latest = latest_markdown(root).ok_or_else(|| PipelineError::NotFound(root.clone()))?;
    Ok(latest)
}
