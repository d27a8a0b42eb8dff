//! Feishu open platform client for Herald.
//!
//! This crate provides the two remote collaborators of the delivery pipeline:
//! - Document hosting: create a document, find its root block, append blocks
//! - Chat broadcast: send text, interactive-card or rich-text post messages,
//!   list chats
//!
//! Both are served by [`FeishuClient`], which exchanges its application
//! credentials for a tenant access token on first use and keeps that token
//! for its own lifetime only.
//!
//! # Example
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::time::Duration;
//! use herald_feishu::FeishuClient;
//! use herald_markdown::markdown_to_blocks;
//!
//! let client = FeishuClient::new(
//!     "https://open.feishu.cn/open-apis",
//!     "cli_app_id",
//!     "app_secret",
//!     Duration::from_secs(30),
//! );
//!
//! let document_id = client.create_document("Daily digest", None)?;
//! let root = client.root_block_id(&document_id)?;
//! client.append_blocks(&document_id, &root, &markdown_to_blocks("# Hello"))?;
//! # Ok(())
//! # }
//! ```

// API client
mod client;
pub use client::FeishuClient;

// Wire types
pub mod types;
pub use types::{ChatPage, ChatSummary, PostMessage};

// Errors
pub mod error;
pub use error::FeishuError;
