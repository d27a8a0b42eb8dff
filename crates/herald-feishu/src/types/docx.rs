//! Document (docx) wire types.

use herald_markdown::{Block, TextRun};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::{Deserialize, Serialize};

/// Block type of a plain text block.
const TEXT_BLOCK_TYPE: u8 = 2;

/// Characters left unescaped in link URLs (RFC 3986 unreserved).
const LINK_ESCAPE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Percent-encode a link target as the docx API expects.
///
/// # Examples
///
/// ```
/// use herald_feishu::types::encode_link_url;
///
/// assert_eq!(encode_link_url("https://a.io/x?y=1"), "https%3A%2F%2Fa.io%2Fx%3Fy%3D1");
/// ```
pub fn encode_link_url(url: &str) -> String {
    utf8_percent_encode(url, LINK_ESCAPE).to_string()
}

/// A block as sent to the append-children endpoint.
///
/// Every kind is sent as a text block; the kind only shapes the text
/// (bullet glyph, fence markers).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocxBlock {
    block_type: u8,
    text: TextBody,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct TextBody {
    elements: Vec<TextElement>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct TextElement {
    text_run: TextRunBody,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct TextRunBody {
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    text_element_style: Option<TextElementStyle>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct TextElementStyle {
    link: LinkBody,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct LinkBody {
    url: String,
}

impl From<&TextRun> for TextElement {
    fn from(run: &TextRun) -> Self {
        Self {
            text_run: TextRunBody {
                content: run.content.clone(),
                text_element_style: run.link.as_deref().map(|url| TextElementStyle {
                    link: LinkBody {
                        url: encode_link_url(url),
                    },
                }),
            },
        }
    }
}

impl From<&Block> for DocxBlock {
    fn from(block: &Block) -> Self {
        Self {
            block_type: TEXT_BLOCK_TYPE,
            text: TextBody {
                elements: block.runs.iter().map(TextElement::from).collect(),
            },
        }
    }
}

/// `data` of the create-document response.
#[derive(Debug, Deserialize)]
pub struct CreatedDocument {
    /// Created document.
    pub document: DocumentInfo,
}

/// Document metadata.
#[derive(Debug, Deserialize)]
pub struct DocumentInfo {
    /// Document id (also the id of its root block).
    pub document_id: String,
    /// Document revision.
    #[serde(default)]
    pub revision_id: Option<i64>,
    /// Document title.
    #[serde(default)]
    pub title: Option<String>,
}

/// `data` of the list-blocks response.
#[derive(Debug, Deserialize)]
pub struct BlockList {
    /// Blocks in document order; the first is the page (root) block.
    #[serde(default)]
    pub items: Vec<BlockSummary>,
}

/// Minimal view of a listed block.
#[derive(Debug, Deserialize)]
pub struct BlockSummary {
    /// Block id.
    pub block_id: String,
    /// Block type.
    #[serde(default)]
    pub block_type: Option<u8>,
}

#[cfg(test)]
mod tests {
    use herald_markdown::{BlockKind, build_block};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_plain_block_payload() {
        let block = build_block(BlockKind::Paragraph, "hello");
        let value = serde_json::to_value(DocxBlock::from(&block)).unwrap();
        assert_eq!(
            value,
            json!({
                "block_type": 2,
                "text": {"elements": [{"text_run": {"content": "hello"}}]}
            })
        );
    }

    #[test]
    fn test_linked_block_payload() {
        let block = build_block(BlockKind::ListItem, "• [Rust](https://rust-lang.org/) rocks");
        let value = serde_json::to_value(DocxBlock::from(&block)).unwrap();
        assert_eq!(
            value,
            json!({
                "block_type": 2,
                "text": {"elements": [
                    {"text_run": {"content": "• "}},
                    {"text_run": {
                        "content": "Rust",
                        "text_element_style": {"link": {"url": "https%3A%2F%2Frust-lang.org%2F"}}
                    }},
                    {"text_run": {"content": " rocks"}}
                ]}
            })
        );
    }

    #[test]
    fn test_encode_keeps_unreserved() {
        assert_eq!(encode_link_url("a-b_c.d~e"), "a-b_c.d~e");
        assert_eq!(encode_link_url("https://x.io/路径"), "https%3A%2F%2Fx.io%2F%E8%B7%AF%E5%BE%84");
    }

    #[test]
    fn test_parse_created_document() {
        let data: CreatedDocument = serde_json::from_value(json!({
            "document": {"document_id": "doxcnABC", "revision_id": 1, "title": "t"}
        }))
        .unwrap();
        assert_eq!(data.document.document_id, "doxcnABC");
        assert_eq!(data.document.revision_id, Some(1));
    }
}
