//! Document operations.

use herald_markdown::Block;
use serde::de::IgnoredAny;
use serde_json::json;
use tracing::{debug, info};

use super::FeishuClient;
use crate::error::FeishuError;
use crate::types::{BlockList, CreatedDocument, DocxBlock};

impl FeishuClient {
    /// Create an empty document and return its id.
    ///
    /// `folder_token` places the document in a folder; `None` or an empty
    /// token uses the application's root.
    pub fn create_document(
        &self,
        title: &str,
        folder_token: Option<&str>,
    ) -> Result<String, FeishuError> {
        info!("Creating document '{}'", title);

        let mut body = json!({ "title": title });
        if let Some(folder) = folder_token.filter(|f| !f.is_empty()) {
            body["folder_token"] = json!(folder);
        }

        let created: CreatedDocument = self
            .post("docx/v1/documents", &body)?
            .into_data("document")?;

        info!("Created document {}", created.document.document_id);
        Ok(created.document.document_id)
    }

    /// Id of the document's root (page) block.
    pub fn root_block_id(&self, document_id: &str) -> Result<String, FeishuError> {
        let blocks: BlockList = self
            .get(&format!("docx/v1/documents/{document_id}/blocks"))?
            .into_data("block list")?;

        blocks
            .items
            .into_iter()
            .next()
            .map(|block| block.block_id)
            .ok_or(FeishuError::MissingData("root block"))
    }

    /// Append blocks as children of `parent_block_id`, in order.
    ///
    /// Sends a single request; callers are responsible for batching.
    pub fn append_blocks(
        &self,
        document_id: &str,
        parent_block_id: &str,
        blocks: &[Block],
    ) -> Result<(), FeishuError> {
        let children: Vec<DocxBlock> = blocks.iter().map(DocxBlock::from).collect();
        debug!(
            "Appending {} blocks to {}/{}",
            children.len(),
            document_id,
            parent_block_id
        );

        self.post::<_, IgnoredAny>(
            &format!("docx/v1/documents/{document_id}/blocks/{parent_block_id}/children"),
            &json!({ "children": children }),
        )?
        .check()?;
        Ok(())
    }
}
