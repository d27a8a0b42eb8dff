//! Persist stage: commit and push the document.

use std::path::Path;

use herald_config::GitConfig;
use tracing::info;

use crate::command::{CommandOutput, CommandRunner, Invocation};
use crate::document::display_path;
use crate::error::PipelineError;

/// Git output for a commit with nothing staged.
const EMPTY_COMMIT_MARKERS: [&str; 2] = ["nothing to commit", "nothing added to commit"];

/// Adds, commits and pushes a document with `git`.
pub struct Persister<'a> {
    runner: &'a dyn CommandRunner,
    project_dir: &'a Path,
    git: &'a GitConfig,
    dry_run: bool,
}

impl<'a> Persister<'a> {
    /// Create a persister working in `project_dir`.
    pub fn new(
        runner: &'a dyn CommandRunner,
        project_dir: &'a Path,
        git: &'a GitConfig,
        dry_run: bool,
    ) -> Self {
        Self {
            runner,
            project_dir,
            git,
            dry_run,
        }
    }

    /// Commit `path` and push. Returns whether a commit was created.
    ///
    /// An empty diff is not an error; push is attempted either way.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Persist`] naming the step that failed.
    pub fn persist(&self, path: &Path) -> Result<bool, PipelineError> {
        let relative = display_path(path, self.project_dir);
        let message = self.git.message_for(&relative);

        if self.dry_run {
            info!("[dry-run] Would commit {} with message '{}' and push", relative, message);
            return Ok(false);
        }

        let add = self.git_command(["add", relative.as_str()]);
        self.expect_success("add", &add)?;

        let commit = self.git_command(["commit", "-m", message.as_str()]);
        let output = self.execute("commit", &commit)?;
        let committed = if output.success() {
            info!("Committed {}", relative);
            true
        } else if is_empty_commit(&output) {
            info!("Nothing to commit for {}", relative);
            false
        } else {
            return Err(failure("commit", &output));
        };

        let push = self.git_command(["push"]);
        self.expect_success("push", &push)?;
        info!("Pushed {}", relative);

        Ok(committed)
    }

    fn git_command<const N: usize>(&self, args: [&str; N]) -> Invocation {
        Invocation::new("git", self.project_dir).args(args)
    }

    fn execute(
        &self,
        step: &'static str,
        invocation: &Invocation,
    ) -> Result<CommandOutput, PipelineError> {
        self.runner
            .run(invocation)
            .map_err(|e| PipelineError::Persist {
                step,
                detail: e.to_string(),
            })
    }

    fn expect_success(
        &self,
        step: &'static str,
        invocation: &Invocation,
    ) -> Result<(), PipelineError> {
        let output = self.execute(step, invocation)?;
        if output.success() {
            Ok(())
        } else {
            Err(failure(step, &output))
        }
    }
}

fn is_empty_commit(output: &CommandOutput) -> bool {
    let text = output.combined();
    EMPTY_COMMIT_MARKERS
        .iter()
        .any(|marker| text.contains(marker))
}

fn failure(step: &'static str, output: &CommandOutput) -> PipelineError {
    let detail = output.combined();
    PipelineError::Persist {
        step,
        detail: if detail.is_empty() {
            format!("exit status {:?}", output.status)
        } else {
            detail
        },
    }
}
