//! Broadcast stage: send the document to a chat in size-limited parts.

use std::fs;
use std::path::Path;

use herald_config::{ChatConfig, ChatFormat};
use herald_markdown::{Chunk, into_chunks, transform_for_card};
use tracing::{debug, info};

use crate::collaborators::ChatTransport;
use crate::error::{PipelineError, Stage};

/// Trailing lines dropped before framing.
const FENCE_LINES: [&str; 2] = ["```", "'''"];

/// Result of the broadcast stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Every part was sent.
    Sent {
        /// Number of messages sent.
        parts: usize,
    },
    /// Dry run; parts were logged instead of sent.
    Simulated {
        /// Number of messages that would be sent.
        parts: usize,
    },
    /// Dry run with no document to send.
    Skipped,
}

/// Frames, transforms and chunks a document, then sends the parts in order.
pub struct Broadcaster<'a> {
    transport: &'a dyn ChatTransport,
    chat: &'a ChatConfig,
    dry_run: bool,
}

impl<'a> Broadcaster<'a> {
    /// Create a broadcaster.
    pub fn new(transport: &'a dyn ChatTransport, chat: &'a ChatConfig, dry_run: bool) -> Self {
        Self {
            transport,
            chat,
            dry_run,
        }
    }

    /// Send the document at `path` to `chat_id`.
    ///
    /// Parts are sent strictly in order. The first failure stops the
    /// broadcast; parts already sent stay sent.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::ChatNotConfigured`] for an empty chat id,
    /// [`PipelineError::Read`] if the document cannot be read and
    /// [`PipelineError::Broadcast`] naming the first part that failed.
    pub fn broadcast(&self, path: &Path, chat_id: &str) -> Result<Delivery, PipelineError> {
        if chat_id.trim().is_empty() {
            return Err(PipelineError::ChatNotConfigured);
        }

        if self.dry_run && !path.exists() {
            info!("[dry-run] {} does not exist, skipping broadcast", path.display());
            return Ok(Delivery::Skipped);
        }

        let text = fs::read_to_string(path).map_err(|source| PipelineError::Read {
            stage: Stage::Broadcast,
            path: path.to_path_buf(),
            source,
        })?;
        let chunks = self.prepare(&text);
        let total = chunks.len();

        if self.dry_run {
            for chunk in &chunks {
                info!(
                    "[dry-run] Would send part {}/{} ({} chars) to {}",
                    chunk.index,
                    chunk.total,
                    chunk.text.chars().count(),
                    chat_id
                );
                debug!("{}", chunk.labelled());
            }
            return Ok(Delivery::Simulated { parts: total });
        }

        for chunk in &chunks {
            let message = chunk.labelled();
            let sent = match self.chat.format {
                ChatFormat::Card => self.transport.send_card(chat_id, &message),
                ChatFormat::Text => self.transport.send_text(chat_id, &message),
            };
            sent.map_err(|source| PipelineError::Broadcast {
                part: chunk.index,
                total,
                source,
            })?;
            info!("Sent part {}/{} to {}", chunk.index, total, chat_id);
        }

        Ok(Delivery::Sent { parts: total })
    }

    /// Message parts for `text` in the configured format.
    pub fn prepare(&self, text: &str) -> Vec<Chunk> {
        let framed = frame(
            &self.chat.header,
            &strip_trailing_fences(text),
            &self.chat.footer,
            self.chat.format,
        );
        let body = match self.chat.format {
            ChatFormat::Card => transform_for_card(&framed),
            ChatFormat::Text => framed,
        };
        into_chunks(&body, self.chat.max_chars())
    }
}

/// Right-trim `text` and drop trailing lines that are only a fence marker.
fn strip_trailing_fences(text: &str) -> String {
    let mut lines: Vec<&str> = text.trim_end().lines().collect();
    while lines
        .last()
        .is_some_and(|line| FENCE_LINES.contains(&line.trim()))
    {
        lines.pop();
    }
    lines.join("\n").trim_end().to_owned()
}

/// Wrap `body` with the header and optional footer.
fn frame(header: &str, body: &str, footer: &str, format: ChatFormat) -> String {
    let mut sections = Vec::with_capacity(3);
    let header = header.trim();
    if !header.is_empty() {
        sections.push(match format {
            ChatFormat::Card => format!("**{header}**"),
            ChatFormat::Text => header.to_owned(),
        });
    }
    sections.push(body.to_owned());
    let footer = footer.trim();
    if !footer.is_empty() {
        sections.push(footer.to_owned());
    }
    format!("{}\n", sections.join("\n\n"))
}

#[cfg(test)]
mod tests {
    use herald_config::ChatFormat;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;
    use crate::mock::MockChatTransport;

    fn chat(format: ChatFormat) -> ChatConfig {
        ChatConfig {
            format,
            header: "Daily".to_owned(),
            ..ChatConfig::default()
        }
    }

    fn write(dir: &TempDir, content: &str) -> std::path::PathBuf {
        let path = dir.path().join("doc.md");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_strip_trailing_fences() {
        assert_eq!(strip_trailing_fences("body\n```\n'''\n\n"), "body");
        assert_eq!(strip_trailing_fences("```\ncode\n```\ntail"), "```\ncode\n```\ntail");
    }

    #[test]
    fn test_frame_card_and_text() {
        assert_eq!(
            frame("Daily", "body", "", ChatFormat::Card),
            "**Daily**\n\nbody\n"
        );
        assert_eq!(
            frame("Daily", "body", "Archive", ChatFormat::Text),
            "Daily\n\nbody\n\nArchive\n"
        );
    }

    #[test]
    fn test_prepare_card_transforms_headings() {
        let transport = MockChatTransport::new();
        let chat = chat(ChatFormat::Card);
        let chunks = Broadcaster::new(&transport, &chat, false).prepare("## News\n\n\n\n- a\n```");

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "**Daily**\n\n**News**\n\n- a");
    }

    #[test]
    fn test_prepare_text_limits() {
        let transport = MockChatTransport::new();
        let chat = chat(ChatFormat::Text);
        let line = "x".repeat(99) + "\n";
        let chunks = Broadcaster::new(&transport, &chat, false).prepare(&line.repeat(60));

        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| c.labelled().chars().count() <= 2800));
        let joined: String = chunks.iter().map(|c| c.text.as_str()).collect();
        assert!(joined.starts_with("Daily\n\n"));
    }

    #[test]
    fn test_sends_parts_in_order_with_markers() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, &("y".repeat(79) + "\n").repeat(150));
        let transport = MockChatTransport::new();
        let chat = chat(ChatFormat::Card);

        let delivery = Broadcaster::new(&transport, &chat, false)
            .broadcast(&path, "oc_1")
            .unwrap();

        assert_eq!(delivery, Delivery::Sent { parts: 2 });
        let sent = transport.sent();
        assert_eq!(sent.len(), 2);
        assert!(sent[0].content.starts_with("(part 1/2)\n**Daily**"));
        assert!(sent[1].content.starts_with("(part 2/2)\n"));
        assert!(sent.iter().all(|m| m.chat_id == "oc_1" && m.format == ChatFormat::Card));
    }

    #[test]
    fn test_single_part_has_no_marker() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "short");
        let transport = MockChatTransport::new();
        let chat = chat(ChatFormat::Text);

        Broadcaster::new(&transport, &chat, false)
            .broadcast(&path, "oc_1")
            .unwrap();

        assert_eq!(transport.sent()[0].content, "Daily\n\nshort\n");
        assert_eq!(transport.sent()[0].format, ChatFormat::Text);
    }

    #[test]
    fn test_failure_stops_at_failing_part() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, &("z".repeat(99) + "\n").repeat(100));
        let transport = MockChatTransport::new().with_failure_at(2);
        let chat = chat(ChatFormat::Text);

        let err = Broadcaster::new(&transport, &chat, false)
            .broadcast(&path, "oc_1")
            .unwrap_err();

        assert!(matches!(err, PipelineError::Broadcast { part: 2, total: 4, .. }));
        assert_eq!(transport.sent().len(), 1);
        assert_eq!(transport.attempts(), 2);
    }

    #[test]
    fn test_chat_not_configured() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "text");
        let transport = MockChatTransport::new();
        let chat = chat(ChatFormat::Card);

        let err = Broadcaster::new(&transport, &chat, false)
            .broadcast(&path, " ")
            .unwrap_err();
        assert!(matches!(err, PipelineError::ChatNotConfigured));
    }

    #[test]
    fn test_dry_run() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "text");
        let transport = MockChatTransport::new();
        let chat = chat(ChatFormat::Card);
        let broadcaster = Broadcaster::new(&transport, &chat, true);

        assert_eq!(
            broadcaster.broadcast(&path, "oc_1").unwrap(),
            Delivery::Simulated { parts: 1 }
        );
        assert_eq!(
            broadcaster
                .broadcast(&dir.path().join("missing.md"), "oc_1")
                .unwrap(),
            Delivery::Skipped
        );
        assert_eq!(transport.attempts(), 0);
    }
}
