//! CLI error types.

use herald_config::ConfigError;
use herald_feishu::FeishuError;
use herald_pipeline::PipelineError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Feishu(#[from] FeishuError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Validation(String),
}
