//! Markdown to document blocks.
//!
//! Single pass over the source lines. Every non-blank line lands in exactly
//! one block path, so conversion always terminates and never fails.

use crate::block::{BULLET, Block, BlockKind, build_block};

const FENCE: &str = "```";

/// Line classification used by the converter.
#[derive(Debug, PartialEq, Eq)]
enum LineKind<'a> {
    Blank,
    Heading { level: u8, text: &'a str },
    ListItem(&'a str),
    Fence,
    Paragraph(&'a str),
}

fn classify(line: &str) -> LineKind<'_> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        LineKind::Blank
    } else if trimmed.starts_with('#') {
        let hashes = trimmed.len() - trimmed.trim_start_matches('#').len();
        LineKind::Heading {
            level: u8::try_from(hashes).unwrap_or(u8::MAX),
            text: trimmed.trim_start_matches(['#', ' ']).trim(),
        }
    } else if let Some(item) = trimmed.strip_prefix("- ") {
        LineKind::ListItem(item.trim())
    } else if trimmed.starts_with(FENCE) {
        LineKind::Fence
    } else {
        LineKind::Paragraph(trimmed)
    }
}

/// Convert a Markdown document into an ordered list of blocks.
///
/// Supported constructs:
/// - `#`-prefixed headings (any level)
/// - runs of `- ` bullet lines, one [`BlockKind::ListItem`] per line, text
///   prefixed with [`BULLET`]
/// - triple-backtick code fences; an unclosed fence swallows the rest of the
///   document as code
/// - every other non-blank line as a paragraph
///
/// Blank lines produce no block.
pub fn markdown_to_blocks(markdown: &str) -> Vec<Block> {
    let lines: Vec<&str> = markdown.lines().collect();
    let mut blocks = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        match classify(lines[i]) {
            LineKind::Blank => i += 1,
            LineKind::Heading { level, text } => {
                blocks.push(build_block(BlockKind::Heading { level }, text));
                i += 1;
            }
            LineKind::ListItem(_) => i = consume_list(&lines, i, &mut blocks),
            LineKind::Fence => i = consume_code(&lines, i, &mut blocks),
            LineKind::Paragraph(text) => {
                blocks.push(build_block(BlockKind::Paragraph, text));
                i += 1;
            }
        }
    }

    blocks
}

/// Consume consecutive list lines starting at `start`.
///
/// Returns the index of the first line that is not a list item.
fn consume_list(lines: &[&str], start: usize, blocks: &mut Vec<Block>) -> usize {
    let mut next = start;
    while let Some(LineKind::ListItem(item)) = lines.get(next).map(|line| classify(line)) {
        blocks.push(build_block(BlockKind::ListItem, &format!("{BULLET} {item}")));
        next += 1;
    }
    next
}

/// Consume a code fence opening at `start`.
///
/// Returns the index just past the closing fence, or the end of input when
/// the fence is never closed.
fn consume_code(lines: &[&str], start: usize, blocks: &mut Vec<Block>) -> usize {
    let body_start = start + 1;
    let close = lines[body_start.min(lines.len())..]
        .iter()
        .position(|line| line.trim().starts_with(FENCE))
        .map(|offset| body_start + offset);

    let body_end = close.unwrap_or(lines.len());
    let body = &lines[body_start.min(body_end)..body_end];
    let content = if body.is_empty() {
        format!("{FENCE}\n{FENCE}")
    } else {
        format!("{FENCE}\n{}\n{FENCE}", body.join("\n"))
    };
    blocks.push(build_block(BlockKind::Code, &content));

    close.map_or(lines.len(), |idx| idx + 1)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::block::TextRun;

    fn summary(blocks: &[Block]) -> Vec<(BlockKind, String)> {
        blocks.iter().map(|b| (b.kind, b.text())).collect()
    }

    #[test]
    fn test_mixed_document() {
        let blocks = markdown_to_blocks("# Hi\n- a\n- b\n\nEnd");
        assert_eq!(
            summary(&blocks),
            vec![
                (BlockKind::Heading { level: 1 }, "Hi".to_owned()),
                (BlockKind::ListItem, "• a".to_owned()),
                (BlockKind::ListItem, "• b".to_owned()),
                (BlockKind::Paragraph, "End".to_owned()),
            ]
        );
    }

    #[test]
    fn test_empty_and_blank_input() {
        assert!(markdown_to_blocks("").is_empty());
        assert!(markdown_to_blocks("\n   \n\t\n").is_empty());
    }

    #[test]
    fn test_heading_levels_and_markers() {
        let blocks = markdown_to_blocks("### Deep title\n  ## Indented\n###");
        assert_eq!(
            summary(&blocks),
            vec![
                (BlockKind::Heading { level: 3 }, "Deep title".to_owned()),
                (BlockKind::Heading { level: 2 }, "Indented".to_owned()),
                (BlockKind::Heading { level: 3 }, String::new()),
            ]
        );
    }

    #[test]
    fn test_list_run_resumes_at_next_line() {
        let blocks = markdown_to_blocks("- one\n- two\nafter\n- three");
        assert_eq!(
            summary(&blocks),
            vec![
                (BlockKind::ListItem, "• one".to_owned()),
                (BlockKind::ListItem, "• two".to_owned()),
                (BlockKind::Paragraph, "after".to_owned()),
                (BlockKind::ListItem, "• three".to_owned()),
            ]
        );
    }

    #[test]
    fn test_list_run_followed_by_heading() {
        let blocks = markdown_to_blocks("- a\n# Next");
        assert_eq!(
            summary(&blocks),
            vec![
                (BlockKind::ListItem, "• a".to_owned()),
                (BlockKind::Heading { level: 1 }, "Next".to_owned()),
            ]
        );
    }

    #[test]
    fn test_list_item_with_link_keeps_bullet() {
        let blocks = markdown_to_blocks("- [Post](https://r.example/1) (42 points)");
        assert_eq!(
            blocks[0].runs,
            vec![
                TextRun::plain("• "),
                TextRun::linked("Post", "https://r.example/1"),
                TextRun::plain(" (42 points)"),
            ]
        );
    }

    #[test]
    fn test_code_fence() {
        let blocks = markdown_to_blocks("```rust\nfn main() {}\n  # not a heading\n```\nafter");
        assert_eq!(
            summary(&blocks),
            vec![
                (
                    BlockKind::Code,
                    "```\nfn main() {}\n  # not a heading\n```".to_owned()
                ),
                (BlockKind::Paragraph, "after".to_owned()),
            ]
        );
    }

    #[test]
    fn test_unclosed_fence_takes_rest() {
        let blocks = markdown_to_blocks("intro\n```\nline one\n- not a list");
        assert_eq!(
            summary(&blocks),
            vec![
                (BlockKind::Paragraph, "intro".to_owned()),
                (BlockKind::Code, "```\nline one\n- not a list\n```".to_owned()),
            ]
        );
    }

    #[test]
    fn test_empty_fence_still_emits_block() {
        let blocks = markdown_to_blocks("```\n```");
        assert_eq!(summary(&blocks), vec![(BlockKind::Code, "```\n```".to_owned())]);

        let blocks = markdown_to_blocks("```");
        assert_eq!(summary(&blocks), vec![(BlockKind::Code, "```\n```".to_owned())]);
    }

    #[test]
    fn test_paragraph_is_trimmed_and_links_extracted() {
        let blocks = markdown_to_blocks("   see [here](http://h)   ");
        assert_eq!(
            blocks[0].runs,
            vec![TextRun::plain("see "), TextRun::linked("here", "http://h")]
        );
    }

    #[test]
    fn test_block_count_matches_logical_units() {
        let doc = "# Title\n\nIntro paragraph.\n\n## Section\n- a\n- b\n- c\n\n```\ncode\n```\n\nOutro\n";
        // 2 headings + 3 list items + 1 code + 2 paragraphs
        assert_eq!(markdown_to_blocks(doc).len(), 8);
    }

    #[test]
    fn test_crlf_input() {
        let blocks = markdown_to_blocks("# A\r\n- b\r\n");
        assert_eq!(
            summary(&blocks),
            vec![
                (BlockKind::Heading { level: 1 }, "A".to_owned()),
                (BlockKind::ListItem, "• b".to_owned()),
            ]
        );
    }

    #[test]
    fn test_bare_dash_is_paragraph() {
        let blocks = markdown_to_blocks("-\n-item");
        assert_eq!(
            summary(&blocks),
            vec![
                (BlockKind::Paragraph, "-".to_owned()),
                (BlockKind::Paragraph, "-item".to_owned()),
            ]
        );
    }
}
