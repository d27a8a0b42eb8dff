//! Document block model.

use crate::links::extract_links;

/// Glyph prepended to list item text.
pub const BULLET: &str = "•";

/// Kind of a renderable block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    /// ATX heading. The level is the number of leading `#` characters.
    Heading {
        /// Heading level (1 for `#`, 2 for `##`, ...).
        level: u8,
    },
    /// One item of a flat bullet list.
    ListItem,
    /// Fenced code block, content kept verbatim.
    Code,
    /// Any other non-blank line.
    Paragraph,
}

/// Plain or linked span of text inside a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRun {
    /// Text content.
    pub content: String,
    /// Link target, if this run is a hyperlink.
    pub link: Option<String>,
}

impl TextRun {
    /// Create an unlinked run.
    pub fn plain(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            link: None,
        }
    }

    /// Create a run linking to `url`.
    pub fn linked(content: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            link: Some(url.into()),
        }
    }
}

/// One renderable unit destined for a structured-block document API.
///
/// Blocks are flat: they have no children, and their order in a list is the
/// order of the source lines they came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// Block kind.
    pub kind: BlockKind,
    /// Text runs; their contents concatenate to the block's rendered text.
    pub runs: Vec<TextRun>,
}

impl Block {
    /// Rendered text of the block with link styling dropped.
    pub fn text(&self) -> String {
        self.runs.iter().map(|run| run.content.as_str()).collect()
    }

    /// Whether any run carries a link.
    pub fn has_links(&self) -> bool {
        self.runs.iter().any(|run| run.link.is_some())
    }
}

/// Build a block from one logical Markdown unit.
///
/// Inline links become linked runs and the text around them becomes plain
/// runs. Runs are split at the display-text offsets recorded during link
/// extraction, so repeated display text cannot be attributed to the wrong
/// link. A link at the very start of the fragment gets no empty leading run.
///
/// [`BlockKind::Code`] fragments are kept verbatim in a single run.
///
/// # Examples
///
/// ```
/// use herald_markdown::{BlockKind, TextRun, build_block};
///
/// let block = build_block(BlockKind::Paragraph, "read [this](https://a.example) first");
/// assert_eq!(
///     block.runs,
///     vec![
///         TextRun::plain("read "),
///         TextRun::linked("this", "https://a.example"),
///         TextRun::plain(" first"),
///     ]
/// );
/// ```
pub fn build_block(kind: BlockKind, fragment: &str) -> Block {
    if kind == BlockKind::Code {
        return Block {
            kind,
            runs: vec![TextRun::plain(fragment)],
        };
    }

    let extracted = extract_links(fragment);
    if extracted.links.is_empty() {
        return Block {
            kind,
            runs: vec![TextRun::plain(extracted.text)],
        };
    }

    let text = extracted.text.as_str();
    let mut runs = Vec::with_capacity(extracted.links.len() * 2 + 1);
    let mut cursor = 0;
    for link in &extracted.links {
        if link.range.start > cursor {
            runs.push(TextRun::plain(&text[cursor..link.range.start]));
        }
        runs.push(TextRun::linked(&text[link.range.clone()], &link.url));
        cursor = link.range.end;
    }
    if cursor < text.len() {
        runs.push(TextRun::plain(&text[cursor..]));
    }

    Block { kind, runs }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_link_free_fragment_is_single_run() {
        let block = build_block(BlockKind::Paragraph, "plain words, nothing else");
        assert_eq!(block.runs, vec![TextRun::plain("plain words, nothing else")]);
        assert_eq!(block.text(), "plain words, nothing else");
        assert!(!block.has_links());
    }

    #[test]
    fn test_empty_fragment_keeps_one_run() {
        let block = build_block(BlockKind::Heading { level: 3 }, "");
        assert_eq!(block.runs, vec![TextRun::plain("")]);
    }

    #[test]
    fn test_link_at_start_has_no_leading_run() {
        let block = build_block(BlockKind::Paragraph, "[Rust](https://rust-lang.org) is fun");
        assert_eq!(
            block.runs,
            vec![
                TextRun::linked("Rust", "https://rust-lang.org"),
                TextRun::plain(" is fun"),
            ]
        );
    }

    #[test]
    fn test_link_only_fragment() {
        let block = build_block(BlockKind::ListItem, "[A](http://x)");
        assert_eq!(block.runs, vec![TextRun::linked("A", "http://x")]);
    }

    #[test]
    fn test_adjacent_links() {
        let block = build_block(BlockKind::Paragraph, "[a](http://1)[b](http://2)");
        assert_eq!(
            block.runs,
            vec![TextRun::linked("a", "http://1"), TextRun::linked("b", "http://2")]
        );
    }

    #[test]
    fn test_repeated_display_text_uses_match_offsets() {
        let block = build_block(BlockKind::Paragraph, "post: [post](http://p) by me");
        assert_eq!(
            block.runs,
            vec![
                TextRun::plain("post: "),
                TextRun::linked("post", "http://p"),
                TextRun::plain(" by me"),
            ]
        );
        assert_eq!(block.text(), "post: post by me");
    }

    #[test]
    fn test_code_is_verbatim() {
        let block = build_block(BlockKind::Code, "```\nlet x = [a](b);\n```");
        assert_eq!(block.runs, vec![TextRun::plain("```\nlet x = [a](b);\n```")]);
    }
}
