//! Four-stage delivery orchestration.

use std::path::PathBuf;

use chrono::{Local, NaiveDateTime};
use herald_config::{Config, Section};
use tracing::info;

use crate::broadcast::{Broadcaster, Delivery};
use crate::collaborators::{ChatTransport, DocumentHost};
use crate::command::CommandRunner;
use crate::error::{PipelineError, Stage};
use crate::generate::{Generated, Generator};
use crate::persist::Persister;
use crate::publish::{Publication, Publisher};

/// Handles to everything the pipeline reaches outside the process.
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    /// Runs the generator and `git`.
    pub runner: &'a dyn CommandRunner,
    /// Hosts the published document.
    pub documents: &'a dyn DocumentHost,
    /// Delivers chat messages.
    pub chat: &'a dyn ChatTransport,
}

/// Outcome of one completed stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageReport {
    /// Document produced or reused.
    Generated(Generated),
    /// Document published or simulated.
    Published(Publication),
    /// Chat broadcast sent, simulated or skipped.
    Broadcast(Delivery),
    /// Document committed (or already up to date) and pushed.
    Persisted {
        /// Whether a new commit was created.
        committed: bool,
    },
}

impl StageReport {
    /// Stage this report belongs to.
    pub fn stage(&self) -> Stage {
        match self {
            Self::Generated(_) => Stage::Generate,
            Self::Published(_) => Stage::Publish,
            Self::Broadcast(_) => Stage::Broadcast,
            Self::Persisted { .. } => Stage::Persist,
        }
    }
}

/// Summary of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Document the run delivered.
    pub path: PathBuf,
    /// Whether external effects were simulated.
    pub dry_run: bool,
    /// One report per stage, in execution order.
    pub stages: Vec<StageReport>,
}

/// Generate, publish, broadcast and persist today's document.
///
/// Stages run strictly in order and the first failure ends the run. In
/// dry-run mode every external effect is logged instead of performed.
pub struct Pipeline<'a> {
    config: &'a Config,
    collaborators: Collaborators<'a>,
    dry_run: bool,
}

impl<'a> Pipeline<'a> {
    /// Create a pipeline after checking that every required setting is present.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Config`] listing all missing settings.
    pub fn new(
        config: &'a Config,
        collaborators: Collaborators<'a>,
        dry_run: bool,
    ) -> Result<Self, PipelineError> {
        config.require(&[Section::Generate, Section::Docs, Section::Chat])?;
        Ok(Self {
            config,
            collaborators,
            dry_run,
        })
    }

    /// Run every stage using the local clock.
    ///
    /// # Errors
    ///
    /// Returns the error of the first stage that failed.
    pub fn run(&self) -> Result<RunReport, PipelineError> {
        self.run_at(Local::now().naive_local())
    }

    /// Run every stage as if the current local time were `now`.
    ///
    /// # Errors
    ///
    /// Returns the error of the first stage that failed.
    pub fn run_at(&self, now: NaiveDateTime) -> Result<RunReport, PipelineError> {
        let Collaborators {
            runner,
            documents,
            chat,
        } = self.collaborators;
        let mut stages = Vec::with_capacity(4);

        info!("Stage 1/4: {}", Stage::Generate);
        let generated = Generator::new(runner, self.config, self.dry_run).generate(now.date())?;
        let path = generated.path.clone();
        stages.push(StageReport::Generated(generated));

        info!("Stage 2/4: {}", Stage::Publish);
        let publication = Publisher::new(documents, &self.config.docs, self.dry_run)
            .publish(&path, now)?;
        stages.push(StageReport::Published(publication));

        info!("Stage 3/4: {}", Stage::Broadcast);
        let delivery = Broadcaster::new(chat, &self.config.chat, self.dry_run)
            .broadcast(&path, &self.config.chat.default_chat_id)?;
        stages.push(StageReport::Broadcast(delivery));

        info!("Stage 4/4: {}", Stage::Persist);
        let committed = Persister::new(
            runner,
            &self.config.content_resolved.project_dir,
            &self.config.git,
            self.dry_run,
        )
        .persist(&path)?;
        stages.push(StageReport::Persisted { committed });

        info!("Pipeline finished for {}", path.display());
        Ok(RunReport {
            path,
            dry_run: self.dry_run,
            stages,
        })
    }
}
