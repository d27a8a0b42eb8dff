//! Size-bounded, line-preferring text chunking.
//!
//! Sizes are measured in characters (Unicode scalar values), which is what
//! chat APIs count against their per-message limits.

/// One segment of a chunked text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// 1-based position of this chunk.
    pub index: usize,
    /// Total number of chunks the text was split into.
    pub total: usize,
    /// Chunk content.
    pub text: String,
}

impl Chunk {
    /// Marker prefixed to multi-part messages, e.g. `"(part 2/3)\n"`.
    ///
    /// Empty when the text fits in a single chunk.
    pub fn part_marker(&self) -> String {
        if self.total > 1 {
            format!("(part {}/{})\n", self.index, self.total)
        } else {
            String::new()
        }
    }

    /// Chunk text with its part marker prepended.
    pub fn labelled(&self) -> String {
        format!("{}{}", self.part_marker(), self.text)
    }
}

/// Split `text` into segments of at most `max_chars` characters.
///
/// Lines keep their terminators and are packed greedily into the current
/// segment. A line that would overflow starts a new segment; a line that is
/// longer than `max_chars` on its own is hard-split into `max_chars`-sized
/// slices. Concatenating the result always reproduces `text` exactly.
///
/// Empty input yields no chunks. A `max_chars` of zero is treated as one.
///
/// # Examples
///
/// ```
/// use herald_markdown::chunk_text;
///
/// assert_eq!(chunk_text("ab\ncd\n", 3), vec!["ab\n", "cd\n"]);
/// assert_eq!(chunk_text("abcdefg", 3), vec!["abc", "def", "g"]);
/// assert!(chunk_text("", 10).is_empty());
/// ```
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    let max = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in text.split_inclusive('\n') {
        let line_len = line.chars().count();
        if current_len + line_len <= max {
            current.push_str(line);
            current_len += line_len;
            continue;
        }

        if !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
        }

        if line_len > max {
            hard_split(line, max, &mut chunks);
            current_len = 0;
        } else {
            current.push_str(line);
            current_len = line_len;
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

/// Split `text` into numbered segments whose labelled form fits in `max_chars`.
///
/// When more than one segment is needed, room for the `"(part i/n)\n"` marker
/// is reserved inside the budget, so [`Chunk::labelled`] never exceeds
/// `max_chars` unless the budget is smaller than the marker itself.
pub fn into_chunks(text: &str, max_chars: usize) -> Vec<Chunk> {
    let max = max_chars.max(1);
    let mut parts = chunk_text(text, max);
    let mut reserved = 0;
    while parts.len() > 1 {
        let needed = marker_len(parts.len());
        if needed <= reserved {
            break;
        }
        reserved = needed;
        parts = chunk_text(text, max.saturating_sub(reserved));
    }

    let total = parts.len();
    parts
        .into_iter()
        .enumerate()
        .map(|(i, text)| Chunk {
            index: i + 1,
            total,
            text,
        })
        .collect()
}

/// Widest part marker for a text split into `total` parts.
fn marker_len(total: usize) -> usize {
    format!("(part {total}/{total})\n").chars().count()
}

/// Emit consecutive `max`-character slices of `line`.
fn hard_split(line: &str, max: usize, chunks: &mut Vec<String>) {
    let mut rest = line;
    while !rest.is_empty() {
        let cut = rest
            .char_indices()
            .nth(max)
            .map_or(rest.len(), |(offset, _)| offset);
        chunks.push(rest[..cut].to_owned());
        rest = &rest[cut..];
    }
}
