//! Terminal rendering of progress, run reports and message previews.
//!
//! Everything human-readable goes to stderr; only [`Output::json`] writes to
//! stdout so `herald chats` can be piped.

use std::error::Error;

use console::{Style, Term};
use herald_markdown::Chunk;
use herald_pipeline::{Delivery, Publication, RunReport, StageReport};

/// Width of separator rules.
const RULE_WIDTH: usize = 70;

/// How a line should stand out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Tone {
    Plain,
    Good,
    Caution,
    Bad,
    Notice,
}

/// Styled stderr writer for herald commands.
pub(crate) struct Output {
    term: Term,
    good: Style,
    caution: Style,
    bad: Style,
    notice: Style,
    faint: Style,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            good: Style::new().green(),
            caution: Style::new().yellow(),
            bad: Style::new().red(),
            notice: Style::new().cyan().bold(),
            faint: Style::new().dim(),
        }
    }

    fn style(&self, tone: Tone) -> Option<&Style> {
        match tone {
            Tone::Plain => None,
            Tone::Good => Some(&self.good),
            Tone::Caution => Some(&self.caution),
            Tone::Bad => Some(&self.bad),
            Tone::Notice => Some(&self.notice),
        }
    }

    /// Write one line in `tone`.
    pub(crate) fn line(&self, tone: Tone, msg: &str) {
        let text = match self.style(tone) {
            Some(style) => style.apply_to(msg).to_string(),
            None => msg.to_owned(),
        };
        let _ = self.term.write_line(&text);
    }

    /// Unstyled progress line.
    pub(crate) fn info(&self, msg: &str) {
        self.line(Tone::Plain, msg);
    }

    pub(crate) fn dry_run_banner(&self) {
        self.line(Tone::Notice, "[DRY RUN] No external changes will be made.");
    }

    /// Error followed by its `source()` chain.
    pub(crate) fn failure(&self, err: &dyn Error) {
        self.line(Tone::Bad, &format!("Error: {err}"));
        let mut source = err.source();
        while let Some(cause) = source {
            self.line(Tone::Bad, &format!("  caused by: {cause}"));
            source = cause.source();
        }
    }

    /// Per-stage lines of a pipeline run and the closing verdict.
    pub(crate) fn run_report(&self, report: &RunReport) {
        self.info(&format!("Document: {}", report.path.display()));
        for stage in &report.stages {
            let (tone, detail) = describe_stage(stage, report.dry_run);
            self.line(tone, &format!("  {:<9} {detail}", stage.stage()));
        }
        if report.dry_run {
            self.line(Tone::Notice, "\n[DRY RUN] Completed without external changes.");
        } else {
            self.line(Tone::Good, "\nPipeline completed successfully!");
        }
    }

    /// A message part framed by rules, as it would be sent.
    pub(crate) fn chunk_preview(&self, chunk: &Chunk) {
        let labelled = chunk.labelled();
        self.rule(&format!(
            "part {}/{} ({} chars)",
            chunk.index,
            chunk.total,
            labelled.chars().count()
        ));
        self.info(&labelled);
    }

    /// Dimmed horizontal rule, optionally labelled.
    pub(crate) fn rule(&self, label: &str) {
        let line = if label.is_empty() {
            "=".repeat(RULE_WIDTH)
        } else {
            let fill = RULE_WIDTH.saturating_sub(label.chars().count() + 4);
            format!("== {label} {}", "=".repeat(fill))
        };
        let _ = self.term.write_line(&self.faint.apply_to(line).to_string());
    }

    /// Machine-readable output on stdout.
    pub(crate) fn json(&self, data: &str) {
        let _ = Term::stdout().write_line(data);
    }
}

/// Tone and one-line summary of a completed stage.
fn describe_stage(stage: &StageReport, dry_run: bool) -> (Tone, String) {
    match stage {
        StageReport::Generated(generated) if generated.reused => {
            (Tone::Plain, "reused existing document".to_owned())
        }
        StageReport::Generated(_) => (Tone::Plain, "done".to_owned()),
        StageReport::Published(Publication::Published {
            document_id, total, ..
        }) => (
            Tone::Plain,
            format!("document {document_id} ({total} blocks)"),
        ),
        StageReport::Published(Publication::Simulated { title, blocks }) => (
            Tone::Plain,
            format!("would create '{title}' ({blocks} blocks)"),
        ),
        StageReport::Broadcast(Delivery::Sent { parts }) => {
            (Tone::Plain, format!("sent {parts} message(s)"))
        }
        StageReport::Broadcast(Delivery::Simulated { parts }) => {
            (Tone::Plain, format!("would send {parts} message(s)"))
        }
        StageReport::Broadcast(Delivery::Skipped) => {
            (Tone::Caution, "skipped, document does not exist".to_owned())
        }
        StageReport::Persisted { committed: true } => {
            (Tone::Plain, "committed and pushed".to_owned())
        }
        StageReport::Persisted { committed: false } if dry_run => {
            (Tone::Plain, "would commit and push".to_owned())
        }
        StageReport::Persisted { committed: false } => {
            (Tone::Caution, "nothing to commit, pushed".to_owned())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use herald_pipeline::Generated;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_describe_generated() {
        let reused = StageReport::Generated(Generated {
            path: PathBuf::from("doc/2026/10/20261019.md"),
            reused: true,
        });
        assert_eq!(
            describe_stage(&reused, false),
            (Tone::Plain, "reused existing document".to_owned())
        );
    }

    #[test]
    fn test_describe_skipped_broadcast_is_caution() {
        let (tone, detail) = describe_stage(&StageReport::Broadcast(Delivery::Skipped), true);
        assert_eq!(tone, Tone::Caution);
        assert_eq!(detail, "skipped, document does not exist");
    }

    #[test]
    fn test_describe_persist_depends_on_dry_run() {
        let stage = StageReport::Persisted { committed: false };
        assert_eq!(describe_stage(&stage, true).1, "would commit and push");
        assert_eq!(
            describe_stage(&stage, false),
            (Tone::Caution, "nothing to commit, pushed".to_owned())
        );
    }

    #[test]
    fn test_describe_published() {
        let stage = StageReport::Published(Publication::Published {
            document_id: "doxcn1".to_owned(),
            inserted: 12,
            total: 12,
        });
        assert_eq!(describe_stage(&stage, false).1, "document doxcn1 (12 blocks)");
    }
}
