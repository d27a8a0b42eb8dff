//! Chat card text transformation.

/// Rewrite Markdown for a card renderer that supports bold and lists but not
/// headings.
///
/// Line by line:
/// - trailing whitespace is trimmed
/// - runs of blank lines collapse into a single blank line
/// - heading lines become `**title**`, or an empty line when the heading has
///   no title
/// - everything else passes through unchanged
///
/// # Examples
///
/// ```
/// use herald_markdown::transform_for_card;
///
/// assert_eq!(transform_for_card("## Title\n\n\n- item"), "**Title**\n\n- item");
/// ```
pub fn transform_for_card(markdown: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut prev_blank = false;

    for raw in markdown.lines() {
        let line = raw.trim_end();
        let stripped = line.trim_start();

        if stripped.is_empty() {
            if !prev_blank {
                lines.push(String::new());
                prev_blank = true;
            }
            continue;
        }
        prev_blank = false;

        if stripped.starts_with('#') {
            let title = stripped.trim_start_matches('#').trim();
            if title.is_empty() {
                lines.push(String::new());
            } else {
                lines.push(format!("**{title}**"));
            }
            continue;
        }

        lines.push(line.to_owned());
    }

    lines.join("\n")
}
