//! Generate stage: produce or reuse today's document.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use herald_config::Config;
use tracing::{info, warn};

use crate::command::{CommandRunner, Invocation};
use crate::document::{latest_markdown, today_path};
use crate::error::PipelineError;

/// Document produced by the generate stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generated {
    /// Document to publish and broadcast.
    pub path: PathBuf,
    /// Whether an existing document was reused instead of generated.
    pub reused: bool,
}

/// Runs the external generator unless today's document already exists.
pub struct Generator<'a> {
    runner: &'a dyn CommandRunner,
    root: &'a Path,
    project_dir: &'a Path,
    command: &'a [String],
    env: Vec<(String, String)>,
    dry_run: bool,
}

impl<'a> Generator<'a> {
    /// Create a generator from loaded settings.
    pub fn new(runner: &'a dyn CommandRunner, config: &'a Config, dry_run: bool) -> Self {
        Self {
            runner,
            root: &config.content_resolved.root,
            project_dir: &config.content_resolved.project_dir,
            command: &config.generate.command,
            env: config
                .agent
                .as_ref()
                .map(herald_config::AgentConfig::env_vars)
                .unwrap_or_default(),
            dry_run,
        }
    }

    /// Produce the document for `today`.
    ///
    /// An existing document is reused without running anything. After a
    /// successful run that left no file at the expected path, the most
    /// recently modified Markdown under the content root is used instead.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Generation`] if the command cannot start or
    /// fails, and [`PipelineError::NotFound`] if no document can be found.
    pub fn generate(&self, today: NaiveDate) -> Result<Generated, PipelineError> {
        let expected = today_path(self.root, today);

        if expected.exists() {
            info!("Reusing existing document {}", expected.display());
            return Ok(Generated {
                path: expected,
                reused: true,
            });
        }

        let invocation = self.invocation()?;

        if self.dry_run {
            info!("[dry-run] Would run `{}` to create {}", invocation, expected.display());
            return Ok(Generated {
                path: expected,
                reused: false,
            });
        }

        info!("Running `{}`", invocation);
        let output = self.runner.run(&invocation).map_err(|e| {
            PipelineError::Generation(format!("failed to start `{}`: {e}", invocation.program))
        })?;

        if !output.success() {
            let status = output
                .status
                .map_or_else(|| "a signal".to_owned(), |code| format!("status {code}"));
            return Err(PipelineError::Generation(format!(
                "`{invocation}` exited with {status}: {}",
                output.combined()
            )));
        }

        if expected.exists() {
            return Ok(Generated {
                path: expected,
                reused: false,
            });
        }

        warn!(
            "Generator succeeded but {} is missing, looking for the latest document",
            expected.display()
        );
        let fallback =
            latest_markdown(self.root).ok_or_else(|| PipelineError::NotFound(self.root.into()))?;
        info!("Using {}", fallback.display());
        Ok(Generated {
            path: fallback,
            reused: false,
        })
    }

    fn invocation(&self) -> Result<Invocation, PipelineError> {
        let (program, args) = self.command.split_first().ok_or_else(|| {
            PipelineError::Generation("no generation command configured".to_owned())
        })?;
        Ok(Invocation::new(program.as_str(), self.project_dir)
            .args(args.iter().map(String::as_str))
            .envs(self.env.iter().cloned()))
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;
    use crate::command::CommandOutput;
    use crate::mock::MockRunner;

    fn config(dir: &Path) -> Config {
        Config::from_toml(
            r#"
[generate]
command = ["python3", "-m", "app.newsletter"]

[agent]
model = "deepseek-chat"
api_key = "sk-test"
"#,
            dir,
        )
        .unwrap()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
    }

    fn write_doc(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "# Digest").unwrap();
    }

    #[test]
    fn test_reuses_existing_document() {
        let dir = TempDir::new().unwrap();
        let config = config(dir.path());
        let expected = dir.path().join("doc/2025/01/20250115.md");
        write_doc(&expected);
        let runner = MockRunner::new();

        let generated = Generator::new(&runner, &config, false)
            .generate(today())
            .unwrap();

        assert_eq!(
            generated,
            Generated {
                path: expected,
                reused: true
            }
        );
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn test_runs_command_with_agent_env() {
        let dir = TempDir::new().unwrap();
        let config = config(dir.path());
        let expected = dir.path().join("doc/2025/01/20250115.md");
        let target = expected.clone();
        let runner = MockRunner::new().with_effect("python3", move || write_doc(&target));

        let generated = Generator::new(&runner, &config, false)
            .generate(today())
            .unwrap();

        assert_eq!(generated.path, expected);
        assert!(!generated.reused);
        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].args, vec!["-m", "app.newsletter"]);
        assert_eq!(calls[0].cwd, dir.path());
        assert!(
            calls[0]
                .env
                .contains(&("HERALD_AGENT_MODEL".to_owned(), "deepseek-chat".to_owned()))
        );
    }

    #[test]
    fn test_command_failure() {
        let dir = TempDir::new().unwrap();
        let config = config(dir.path());
        let runner =
            MockRunner::new().with_output("python3", CommandOutput::failed(2, "quota exceeded"));

        let err = Generator::new(&runner, &config, false)
            .generate(today())
            .unwrap_err();

        assert!(matches!(err, PipelineError::Generation(_)));
        assert!(err.to_string().contains("quota exceeded"));
    }

    #[test]
    fn test_falls_back_to_latest_markdown() {
        let dir = TempDir::new().unwrap();
        let config = config(dir.path());
        let other = dir.path().join("doc/2025/01/20250114.md");
        write_doc(&other);
        let runner = MockRunner::new();

        let generated = Generator::new(&runner, &config, false)
            .generate(today())
            .unwrap();

        assert_eq!(generated.path, other);
    }

    #[test]
    fn test_not_found_after_success() {
        let dir = TempDir::new().unwrap();
        let config = config(dir.path());
        let runner = MockRunner::new();

        let err = Generator::new(&runner, &config, false)
            .generate(today())
            .unwrap_err();

        assert!(matches!(err, PipelineError::NotFound(_)));
    }

    #[test]
    fn test_dry_run_runs_nothing() {
        let dir = TempDir::new().unwrap();
        let config = config(dir.path());
        let runner = MockRunner::new();

        let generated = Generator::new(&runner, &config, true)
            .generate(today())
            .unwrap();

        assert_eq!(generated.path, dir.path().join("doc/2025/01/20250115.md"));
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn test_missing_command() {
        let dir = TempDir::new().unwrap();
        let config = Config::from_toml("", dir.path()).unwrap();
        let runner = MockRunner::new();

        let err = Generator::new(&runner, &config, false)
            .generate(today())
            .unwrap_err();
        assert!(matches!(err, PipelineError::Generation(_)));
    }
}
