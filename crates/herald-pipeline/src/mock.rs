//! Test doubles for the pipeline's collaborators.
//!
//! Provides [`MockRunner`], [`MockDocumentHost`] and [`MockChatTransport`]
//! for driving the pipeline without processes or network access. Every
//! double records what it was asked to do.

use std::collections::HashMap;
use std::io;
use std::sync::RwLock;

use herald_config::ChatFormat;
use herald_feishu::FeishuError;
use herald_markdown::Block;

use crate::collaborators::{ChatTransport, DocumentHost};
use crate::command::{CommandOutput, CommandRunner, Invocation};

type Effect = Box<dyn Fn() + Send + Sync>;

fn mock_failure(msg: &str) -> FeishuError {
    FeishuError::Api {
        code: 99_991_400,
        msg: msg.to_owned(),
    }
}

/// Scripted command runner.
///
/// Commands are matched by `"program first-arg"` (e.g. `"git commit"`), then
/// by program alone. Unmatched commands succeed with empty output.
///
/// # Example
///
/// ```ignore
/// use herald_pipeline::{CommandOutput, MockRunner};
///
/// let runner = MockRunner::new()
///     .with_output("git push", CommandOutput::failed(1, "rejected"));
/// ```
#[derive(Default)]
pub struct MockRunner {
    outputs: HashMap<String, CommandOutput>,
    effects: HashMap<String, Effect>,
    unavailable: Vec<String>,
    calls: RwLock<Vec<Invocation>>,
}

impl MockRunner {
    /// Create a runner where every command succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return `output` for commands matching `key`.
    #[must_use]
    pub fn with_output(mut self, key: &str, output: CommandOutput) -> Self {
        self.outputs.insert(key.to_owned(), output);
        self
    }

    /// Run `effect` whenever a command matching `key` is run.
    #[must_use]
    pub fn with_effect(mut self, key: &str, effect: impl Fn() + Send + Sync + 'static) -> Self {
        self.effects.insert(key.to_owned(), Box::new(effect));
        self
    }

    /// Fail to start `program`, as if it were not installed.
    #[must_use]
    pub fn with_unavailable(mut self, program: &str) -> Self {
        self.unavailable.push(program.to_owned());
        self
    }

    /// Invocations received, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.read().unwrap().clone()
    }

    fn lookup<'a, T>(map: &'a HashMap<String, T>, invocation: &Invocation) -> Option<&'a T> {
        invocation
            .args
            .first()
            .and_then(|arg| map.get(&format!("{} {arg}", invocation.program)))
            .or_else(|| map.get(&invocation.program))
    }
}

impl CommandRunner for MockRunner {
    fn run(&self, invocation: &Invocation) -> io::Result<CommandOutput> {
        self.calls.write().unwrap().push(invocation.clone());

        if self.unavailable.contains(&invocation.program) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} not found", invocation.program),
            ));
        }

        if let Some(effect) = Self::lookup(&self.effects, invocation) {
            effect();
        }

        Ok(Self::lookup(&self.outputs, invocation)
            .cloned()
            .unwrap_or_else(|| CommandOutput::ok("")))
    }
}

/// Request received by [`MockDocumentHost`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    /// `create_document`.
    CreateDocument {
        /// Requested title.
        title: String,
        /// Requested folder.
        folder_token: Option<String>,
    },
    /// `root_block_id`.
    RootBlock {
        /// Document queried.
        document_id: String,
    },
    /// `append_blocks`.
    Append {
        /// Target document.
        document_id: String,
        /// Parent block.
        parent_block_id: String,
        /// Number of blocks in the batch.
        count: usize,
    },
}

/// In-memory document host.
///
/// Creates a document with id `doxcnMock` whose root block shares the id.
#[derive(Debug, Default)]
pub struct MockDocumentHost {
    fail_create: bool,
    failing_batches: Vec<usize>,
    calls: RwLock<Vec<HostCall>>,
    appended: RwLock<Vec<Vec<Block>>>,
}

impl MockDocumentHost {
    /// Id of every document this host creates.
    pub const DOCUMENT_ID: &'static str = "doxcnMock";

    /// Create a host that accepts everything.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject document creation.
    #[must_use]
    pub fn with_create_failure(mut self) -> Self {
        self.fail_create = true;
        self
    }

    /// Reject the append request with 0-based position `batch`.
    #[must_use]
    pub fn with_failing_batch(mut self, batch: usize) -> Self {
        self.failing_batches.push(batch);
        self
    }

    /// Requests received, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn calls(&self) -> Vec<HostCall> {
        self.calls.read().unwrap().clone()
    }

    /// Batches that were accepted, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn appended(&self) -> Vec<Vec<Block>> {
        self.appended.read().unwrap().clone()
    }

    fn record(&self, call: HostCall) {
        self.calls.write().unwrap().push(call);
    }
}

impl DocumentHost for MockDocumentHost {
    fn create_document(
        &self,
        title: &str,
        folder_token: Option<&str>,
    ) -> Result<String, FeishuError> {
        self.record(HostCall::CreateDocument {
            title: title.to_owned(),
            folder_token: folder_token.map(str::to_owned),
        });
        if self.fail_create {
            return Err(mock_failure("create rejected"));
        }
        Ok(Self::DOCUMENT_ID.to_owned())
    }

    fn root_block_id(&self, document_id: &str) -> Result<String, FeishuError> {
        self.record(HostCall::RootBlock {
            document_id: document_id.to_owned(),
        });
        Ok(document_id.to_owned())
    }

    fn append_blocks(
        &self,
        document_id: &str,
        parent_block_id: &str,
        blocks: &[Block],
    ) -> Result<(), FeishuError> {
        let position = self
            .calls()
            .iter()
            .filter(|c| matches!(c, HostCall::Append { .. }))
            .count();
        self.record(HostCall::Append {
            document_id: document_id.to_owned(),
            parent_block_id: parent_block_id.to_owned(),
            count: blocks.len(),
        });
        if self.failing_batches.contains(&position) {
            return Err(mock_failure("batch rejected"));
        }
        self.appended.write().unwrap().push(blocks.to_vec());
        Ok(())
    }
}

/// Message delivered to [`MockChatTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    /// Target chat.
    pub chat_id: String,
    /// Card or text.
    pub format: ChatFormat,
    /// Message body.
    pub content: String,
}

/// In-memory chat transport.
#[derive(Debug, Default)]
pub struct MockChatTransport {
    fail_at: Option<usize>,
    attempts: RwLock<usize>,
    sent: RwLock<Vec<SentMessage>>,
}

impl MockChatTransport {
    /// Create a transport that delivers everything.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the `attempt`-th send (1-based).
    #[must_use]
    pub fn with_failure_at(mut self, attempt: usize) -> Self {
        self.fail_at = Some(attempt);
        self
    }

    /// Messages delivered, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.read().unwrap().clone()
    }

    /// Number of send attempts, including failed ones.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn attempts(&self) -> usize {
        *self.attempts.read().unwrap()
    }

    fn deliver(&self, chat_id: &str, format: ChatFormat, content: &str) -> Result<(), FeishuError> {
        let attempt = {
            let mut attempts = self.attempts.write().unwrap();
            *attempts += 1;
            *attempts
        };
        if self.fail_at == Some(attempt) {
            return Err(mock_failure("send rejected"));
        }
        self.sent.write().unwrap().push(SentMessage {
            chat_id: chat_id.to_owned(),
            format,
            content: content.to_owned(),
        });
        Ok(())
    }
}

impl ChatTransport for MockChatTransport {
    fn send_text(&self, chat_id: &str, text: &str) -> Result<(), FeishuError> {
        self.deliver(chat_id, ChatFormat::Text, text)
    }

    fn send_card(&self, chat_id: &str, markdown: &str) -> Result<(), FeishuError> {
        self.deliver(chat_id, ChatFormat::Card, markdown)
    }
}
