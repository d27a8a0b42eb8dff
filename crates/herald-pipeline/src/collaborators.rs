//! Remote services the pipeline depends on.
//!
//! [`FeishuClient`] implements both traits; tests substitute in-memory doubles.

use herald_feishu::{FeishuClient, FeishuError};
use herald_markdown::Block;

/// Structured-block document hosting.
pub trait DocumentHost {
    /// Create an empty document and return its id.
    fn create_document(&self, title: &str, folder_token: Option<&str>)
    -> Result<String, FeishuError>;

    /// Id of the block new content is appended under.
    fn root_block_id(&self, document_id: &str) -> Result<String, FeishuError>;

    /// Append one batch of blocks, in order.
    fn append_blocks(
        &self,
        document_id: &str,
        parent_block_id: &str,
        blocks: &[Block],
    ) -> Result<(), FeishuError>;
}

/// Chat message delivery.
pub trait ChatTransport {
    /// Send a plain text message.
    fn send_text(&self, chat_id: &str, text: &str) -> Result<(), FeishuError>;

    /// Send an interactive card rendering `markdown`.
    fn send_card(&self, chat_id: &str, markdown: &str) -> Result<(), FeishuError>;
}

impl DocumentHost for FeishuClient {
    fn create_document(
        &self,
        title: &str,
        folder_token: Option<&str>,
    ) -> Result<String, FeishuError> {
        FeishuClient::create_document(self, title, folder_token)
    }

    fn root_block_id(&self, document_id: &str) -> Result<String, FeishuError> {
        FeishuClient::root_block_id(self, document_id)
    }

    fn append_blocks(
        &self,
        document_id: &str,
        parent_block_id: &str,
        blocks: &[Block],
    ) -> Result<(), FeishuError> {
        FeishuClient::append_blocks(self, document_id, parent_block_id, blocks)
    }
}

impl ChatTransport for FeishuClient {
    fn send_text(&self, chat_id: &str, text: &str) -> Result<(), FeishuError> {
        FeishuClient::send_text(self, chat_id, text)
    }

    fn send_card(&self, chat_id: &str, markdown: &str) -> Result<(), FeishuError> {
        FeishuClient::send_card(self, chat_id, markdown)
    }
}
