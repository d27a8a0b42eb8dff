//! Daily delivery pipeline for Herald.
//!
//! A run walks four stages in a fixed order and stops at the first failure:
//!
//! 1. **Generate**: reuse today's `YYYY/MM/YYYYMMDD.md` or run the generator
//! 2. **Publish**: convert the Markdown to blocks and append them to a new
//!    hosted document in batches
//! 3. **Broadcast**: frame, card-transform and chunk the text, then send each
//!    part to a chat in order
//! 4. **Persist**: `git add`, `git commit` (an empty diff is fine) and `git push`
//!
//! The pipeline never spawns processes or opens connections itself. It is
//! handed a [`CommandRunner`], a [`DocumentHost`] and a [`ChatTransport`], so
//! each stage can also be driven on its own.
//!
//! # Example
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use herald_config::Config;
//! use herald_feishu::FeishuClient;
//! use herald_pipeline::{Collaborators, Pipeline, SystemRunner};
//!
//! let config = Config::load(None, None)?;
//! let docs = FeishuClient::from_config(&config.feishu, &config.docs.app_id, &config.docs.app_secret);
//! let chat = FeishuClient::from_config(&config.feishu, &config.chat.app_id, &config.chat.app_secret);
//!
//! let collaborators = Collaborators {
//!     runner: &SystemRunner,
//!     documents: &docs,
//!     chat: &chat,
//! };
//! let report = Pipeline::new(&config, collaborators, false)?.run()?;
//! println!("delivered {}", report.path.display());
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//!
//! - `mock`: in-memory [`MockRunner`], [`MockDocumentHost`] and
//!   [`MockChatTransport`] for tests

mod broadcast;
mod collaborators;
mod command;
mod document;
mod error;
mod generate;
#[cfg(any(test, feature = "mock"))]
mod mock;
mod persist;
mod pipeline;
mod publish;

pub use broadcast::{Broadcaster, Delivery};
pub use collaborators::{ChatTransport, DocumentHost};
pub use command::{CommandOutput, CommandRunner, Invocation, SystemRunner};
pub use document::{display_path, document_title, latest_markdown, today_path};
pub use error::{PipelineError, Stage};
pub use generate::{Generated, Generator};
#[cfg(any(test, feature = "mock"))]
pub use mock::{HostCall, MockChatTransport, MockDocumentHost, MockRunner, SentMessage};
pub use persist::Persister;
pub use pipeline::{Collaborators, Pipeline, RunReport, StageReport};
pub use publish::{Publication, Publisher};
