//! Publish stage: republish the document as a hosted structured document.

use std::fs;
use std::path::Path;
use std::thread;
use std::time::Duration;

use chrono::NaiveDateTime;
use herald_config::DocsConfig;
use herald_markdown::markdown_to_blocks;
use tracing::{info, warn};

use crate::collaborators::DocumentHost;
use crate::document::document_title;
use crate::error::{PipelineError, Stage};

/// Result of the publish stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Publication {
    /// Every block was inserted into a new document.
    Published {
        /// Id of the created document.
        document_id: String,
        /// Blocks inserted.
        inserted: usize,
        /// Blocks converted from the Markdown.
        total: usize,
    },
    /// Dry run; nothing was created.
    Simulated {
        /// Title the document would have.
        title: String,
        /// Blocks that would be inserted.
        blocks: usize,
    },
}

/// Converts Markdown into blocks and appends them to a new document in batches.
pub struct Publisher<'a> {
    host: &'a dyn DocumentHost,
    docs: &'a DocsConfig,
    dry_run: bool,
}

impl<'a> Publisher<'a> {
    /// Create a publisher.
    pub fn new(host: &'a dyn DocumentHost, docs: &'a DocsConfig, dry_run: bool) -> Self {
        Self {
            host,
            docs,
            dry_run,
        }
    }

    /// Publish the Markdown file at `path`, titled with its stem and `now`.
    ///
    /// Batches that the API rejects are logged and skipped so the remaining
    /// content still lands in the document.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Publish`] if the document cannot be created,
    /// and [`PipelineError::PartialPublish`] if any batch was rejected.
    pub fn publish(&self, path: &Path, now: NaiveDateTime) -> Result<Publication, PipelineError> {
        let title = document_title(&self.docs.title_prefix, path, now);

        if self.dry_run && !path.exists() {
            info!("[dry-run] Would publish {} as '{}'", path.display(), title);
            return Ok(Publication::Simulated { title, blocks: 0 });
        }

        let markdown = fs::read_to_string(path).map_err(|source| PipelineError::Read {
            stage: Stage::Publish,
            path: path.to_path_buf(),
            source,
        })?;
        let blocks = markdown_to_blocks(&markdown);

        if self.dry_run {
            info!(
                "[dry-run] Would create '{}' with {} blocks in batches of {}",
                title,
                blocks.len(),
                self.docs.batch_size
            );
            return Ok(Publication::Simulated {
                title,
                blocks: blocks.len(),
            });
        }

        let publish_error = |source| PipelineError::Publish {
            path: path.to_path_buf(),
            source,
        };

        let folder = Some(self.docs.folder_token.as_str()).filter(|f| !f.is_empty());
        let document_id = self
            .host
            .create_document(&title, folder)
            .map_err(publish_error)?;
        let root = self
            .host
            .root_block_id(&document_id)
            .map_err(publish_error)?;

        let total = blocks.len();
        let batch_count = total.div_ceil(self.docs.batch_size.max(1));
        let delay = Duration::from_millis(self.docs.batch_delay_ms);
        let mut inserted = 0;

        for (i, batch) in blocks.chunks(self.docs.batch_size.max(1)).enumerate() {
            if i > 0 && !delay.is_zero() {
                thread::sleep(delay);
            }
            match self.host.append_blocks(&document_id, &root, batch) {
                Ok(()) => inserted += batch.len(),
                Err(e) => warn!("Batch {}/{} rejected: {}", i + 1, batch_count, e),
            }
        }

        info!("Inserted {}/{} blocks into {}", inserted, total, document_id);

        if inserted < total {
            return Err(PipelineError::PartialPublish {
                document_id,
                inserted,
                total,
            });
        }

        Ok(Publication::Published {
            document_id,
            inserted,
            total,
        })
    }
}
