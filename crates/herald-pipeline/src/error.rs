//! Pipeline error types.

use std::fmt;
use std::path::PathBuf;

use herald_config::ConfigError;
use herald_feishu::FeishuError;

/// One of the four ordered delivery stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Produce or reuse today's document.
    Generate,
    /// Republish the document as a hosted document.
    Publish,
    /// Send the document to a chat in size-limited parts.
    Broadcast,
    /// Commit and push the document.
    Persist,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Generate => "generate",
            Self::Publish => "publish",
            Self::Broadcast => "broadcast",
            Self::Persist => "persist",
        };
        f.pad(name)
    }
}

/// Error that aborts a pipeline run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The generation command could not be started or exited with failure.
    #[error("Content generation failed: {0}")]
    Generation(String),

    /// No document at the expected path and no Markdown under the root.
    #[error("No Markdown document found under {}", .0.display())]
    NotFound(PathBuf),

    /// Document creation or block insertion failed.
    #[error("Failed to publish {}", path.display())]
    Publish {
        /// Document being published.
        path: PathBuf,
        /// Underlying API error.
        #[source]
        source: FeishuError,
    },

    /// The document was created but some batches were rejected.
    #[error("Document {document_id} is incomplete: {inserted} of {total} blocks inserted")]
    PartialPublish {
        /// Id of the created document.
        document_id: String,
        /// Blocks that were inserted.
        inserted: usize,
        /// Blocks that should have been inserted.
        total: usize,
    },

    /// A chat message could not be delivered.
    #[error("Failed to send part {part} of {total}")]
    Broadcast {
        /// 1-based index of the failing part.
        part: usize,
        /// Number of parts in the broadcast.
        total: usize,
        /// Underlying API error.
        #[source]
        source: FeishuError,
    },

    /// No chat id was supplied or configured.
    #[error("No chat configured for broadcast (set chat.default_chat_id)")]
    ChatNotConfigured,

    /// A version control step failed.
    #[error("git {step} failed: {detail}")]
    Persist {
        /// Failing step (`add`, `commit` or `push`).
        step: &'static str,
        /// Command output or spawn error.
        detail: String,
    },

    /// Settings are missing or malformed.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The document could not be read.
    #[error("Failed to read {}", path.display())]
    Read {
        /// Stage that needed the document.
        stage: Stage,
        /// Document path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl PipelineError {
    /// Stage the error belongs to, if any.
    ///
    /// Configuration errors are raised before any stage starts.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::Generation(_) | Self::NotFound(_) => Some(Stage::Generate),
            Self::Publish { .. } | Self::PartialPublish { .. } => Some(Stage::Publish),
            Self::Broadcast { .. } | Self::ChatNotConfigured => Some(Stage::Broadcast),
            Self::Persist { .. } => Some(Stage::Persist),
            Self::Read { stage, .. } => Some(*stage),
            Self::Config(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_stage_mapping() {
        assert_eq!(
            PipelineError::NotFound(PathBuf::from("doc")).stage(),
            Some(Stage::Generate)
        );
        assert_eq!(
            PipelineError::PartialPublish {
                document_id: "d".to_owned(),
                inserted: 10,
                total: 12,
            }
            .stage(),
            Some(Stage::Publish)
        );
        assert_eq!(
            PipelineError::ChatNotConfigured.stage(),
            Some(Stage::Broadcast)
        );
        assert_eq!(
            PipelineError::Config(ConfigError::Missing(vec!["docs.app_id".to_owned()])).stage(),
            None
        );
    }

    #[test]
    fn test_display() {
        let err = PipelineError::Persist {
            step: "push",
            detail: "remote rejected".to_owned(),
        };
        assert_eq!(err.to_string(), "git push failed: remote rejected");
        assert_eq!(Stage::Broadcast.to_string(), "broadcast");
        assert_eq!(format!("{:<9}|", Stage::Publish), "publish  |");
    }
}
