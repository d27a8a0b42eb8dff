//! Markdown ingestion for Herald.
//!
//! Converts the daily Markdown report into the two shapes the publishing
//! channels need:
//!
//! - [`markdown_to_blocks`]: a flat, ordered list of [`Block`]s for a
//!   structured-block document API (headings, list items, code, paragraphs,
//!   inline `[text](url)` links)
//! - [`transform_for_card`] + [`chunk_text`]: card-friendly text split into
//!   size-bounded [`Chunk`]s for a chat API with per-message limits
//!
//! This is intentionally not a general Markdown renderer. Tables, nested lists,
//! emphasis spans, images and block quotes pass through as plain paragraphs.
//!
//! # Example
//!
//! ```
//! use herald_markdown::{BlockKind, markdown_to_blocks};
//!
//! let blocks = markdown_to_blocks("# Hi\n- a\n- b\n\nEnd");
//! assert_eq!(blocks.len(), 4);
//! assert_eq!(blocks[0].kind, BlockKind::Heading { level: 1 });
//! assert_eq!(blocks[1].text(), "• a");
//! ```

mod block;
mod card;
mod chunk;
mod convert;
mod links;

pub use block::{BULLET, Block, BlockKind, TextRun, build_block};
pub use card::transform_for_card;
pub use chunk::{Chunk, chunk_text, into_chunks};
pub use convert::markdown_to_blocks;
pub use links::{Extracted, Link, extract_links};
