//! Inline link extraction.
//!
//! Pulls `[text](url)` spans out of a fragment, leaving only the display text
//! in place. The byte range of every display text inside the cleaned output is
//! recorded during extraction so callers never have to re-search for it.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

static LINK_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").unwrap());

/// A link found in source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    /// Display text between the brackets.
    pub text: String,
    /// Target URL between the parentheses.
    pub url: String,
    /// Byte range of the display text within [`Extracted::text`].
    pub range: Range<usize>,
}

/// Result of [`extract_links`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted {
    /// Fragment with every link replaced by its display text.
    pub text: String,
    /// Links in order of first occurrence.
    pub links: Vec<Link>,
}

impl Extracted {
    /// Links as `(display text, url)` pairs.
    pub fn pairs(&self) -> Vec<(&str, &str)> {
        self.links
            .iter()
            .map(|link| (link.text.as_str(), link.url.as_str()))
            .collect()
    }
}

/// Extract inline `[text](url)` links from a fragment.
///
/// Matches are non-overlapping and taken left to right. A fragment without any
/// links is returned unchanged with an empty link list.
///
/// # Examples
///
/// ```
/// use herald_markdown::extract_links;
///
/// let extracted = extract_links("see [docs](https://example.com) now");
/// assert_eq!(extracted.text, "see docs now");
/// assert_eq!(extracted.pairs(), vec![("docs", "https://example.com")]);
/// assert_eq!(&extracted.text[extracted.links[0].range.clone()], "docs");
/// ```
pub fn extract_links(fragment: &str) -> Extracted {
    let mut text = String::with_capacity(fragment.len());
    let mut links = Vec::new();
    let mut last = 0;

    for caps in LINK_PATTERN.captures_iter(fragment) {
        let (Some(whole), Some(display), Some(url)) = (caps.get(0), caps.get(1), caps.get(2))
        else {
            continue;
        };

        text.push_str(&fragment[last..whole.start()]);
        let start = text.len();
        text.push_str(display.as_str());
        links.push(Link {
            text: display.as_str().to_owned(),
            url: url.as_str().to_owned(),
            range: start..text.len(),
        });
        last = whole.end();
    }

    if links.is_empty() {
        return Extracted {
            text: fragment.to_owned(),
            links,
        };
    }

    text.push_str(&fragment[last..]);
    Extracted { text, links }
}
