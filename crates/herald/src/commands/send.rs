//! `herald send` command implementation.

use std::path::PathBuf;

use clap::{Args, ValueEnum};
use herald_config::{ChatFormat, CliSettings, Config, Section};
use herald_feishu::{FeishuClient, PostMessage};
use herald_pipeline::{Broadcaster, Delivery};
use serde_json::Value;

use super::resolve_document;
use crate::error::CliError;
use crate::output::{Output, Tone};

/// Chat message format.
#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    /// Interactive card with Markdown rendering.
    Card,
    /// Plain text.
    Text,
    /// Rich-text post built from the post options instead of a document.
    Post,
}

impl FormatArg {
    /// Broadcast format for document messages; `None` for posts.
    fn chat_format(self) -> Option<ChatFormat> {
        match self {
            Self::Card => Some(ChatFormat::Card),
            Self::Text => Some(ChatFormat::Text),
            Self::Post => None,
        }
    }
}

/// Content of a `--format post` message.
#[derive(Args, Default)]
#[command(next_help_heading = "Post message")]
struct PostArgs {
    /// Post title.
    #[arg(long)]
    title: Option<String>,

    /// First line of text.
    #[arg(long)]
    text: Option<String>,

    /// Link text, shown after the first line.
    #[arg(long, requires = "link_url")]
    link_text: Option<String>,

    /// Link target for --link-text.
    #[arg(long, requires = "link_text")]
    link_url: Option<String>,

    /// User to mention.
    #[arg(long)]
    at_user_id: Option<String>,

    /// Image to attach, by image key.
    #[arg(long)]
    image_key: Option<String>,

    /// JSON file holding the complete post content (overrides the options above).
    #[arg(long)]
    content_file: Option<PathBuf>,
}

impl PostArgs {
    fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.text.is_none()
            && self.link_text.is_none()
            && self.link_url.is_none()
            && self.at_user_id.is_none()
            && self.image_key.is_none()
            && self.content_file.is_none()
    }

    /// The post content object to send.
    fn content(self) -> Result<Value, CliError> {
        if let Some(path) = self.content_file {
            let text = std::fs::read_to_string(path)?;
            return Ok(serde_json::from_str(&text)?);
        }
        let title = self.title.ok_or_else(|| {
            CliError::Validation("--format post needs --title or --content-file".to_owned())
        })?;
        Ok(PostMessage {
            title,
            text: self.text,
            link_text: self.link_text,
            link_url: self.link_url,
            at_user_id: self.at_user_id,
            image_key: self.image_key,
        }
        .to_content())
    }
}

/// Arguments for the send command.
#[derive(Args)]
pub(crate) struct SendArgs {
    /// Markdown file to send (default: most recently modified under the content root).
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Target chat ID (overrides config).
    #[arg(long, conflicts_with = "chat_name")]
    chat_id: Option<String>,

    /// Target chat name, looked up among the chats the app has joined.
    #[arg(long)]
    chat_name: Option<String>,

    /// Message format (overrides config).
    #[arg(long, value_enum)]
    format: Option<FormatArg>,

    #[command(flatten)]
    post: PostArgs,

    /// Print every message part instead of sending.
    #[arg(long)]
    dry_run: bool,

    /// Path to configuration file (default: auto-discover herald.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl SendArgs {
    /// Execute the send command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is incomplete, the chat cannot be
    /// found, or any part fails to send.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let post = if self.format == Some(FormatArg::Post) {
            if self.file.is_some() {
                return Err(CliError::Validation(
                    "--file does not apply to --format post".to_owned(),
                ));
            }
            Some(self.post.content()?)
        } else if self.post.is_empty() {
            None
        } else {
            return Err(CliError::Validation(
                "post options require --format post".to_owned(),
            ));
        };

        let cli_settings = CliSettings {
            chat_id: self.chat_id,
            chat_format: self.format.and_then(FormatArg::chat_format),
            ..Default::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        if self.chat_name.is_some() {
            config.require(&[Section::ChatApp])?;
        } else {
            config.require(&[Section::Chat])?;
        }

        let client = FeishuClient::from_config(
            &config.feishu,
            &config.chat.app_id,
            &config.chat.app_secret,
        );

        let chat_id = match &self.chat_name {
            Some(name) => {
                let chat = client.find_chat_by_name(name)?.ok_or_else(|| {
                    CliError::Validation(format!("No chat found matching '{name}'"))
                })?;
                output.info(&format!("Found chat '{}' ({})", chat.name, chat.chat_id));
                chat.chat_id
            }
            None => config.chat.default_chat_id.clone(),
        };

        if let Some(content) = post {
            if self.dry_run {
                output.dry_run_banner();
                output.info(&format!("Would send post to {chat_id}:"));
                output.info(&serde_json::to_string_pretty(&content)?);
                return Ok(());
            }
            client.send_post(&chat_id, &content)?;
            output.line(Tone::Good, &format!("\nSent post to {chat_id}."));
            return Ok(());
        }

        let path = resolve_document(self.file, &config)?;
        let broadcaster = Broadcaster::new(&client, &config.chat, self.dry_run);

        if self.dry_run {
            let text = std::fs::read_to_string(&path)?;
            let chunks = broadcaster.prepare(&text);
            output.dry_run_banner();
            output.info(&format!(
                "Would send {} in {} part(s) to {chat_id}",
                path.display(),
                chunks.len()
            ));
            for chunk in &chunks {
                output.chunk_preview(chunk);
            }
            output.rule("");
            return Ok(());
        }

        output.info(&format!("Sending {} to {chat_id}...", path.display()));
        if let Delivery::Sent { parts } = broadcaster.broadcast(&path, &chat_id)? {
            output.line(Tone::Good, &format!("\nSent {parts} message(s)."));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_post_content_from_options() {
        let args = PostArgs {
            title: Some("Notice".to_owned()),
            text: Some("hello".to_owned()),
            ..PostArgs::default()
        };
        assert_eq!(
            args.content().unwrap(),
            json!({"post": {"zh_cn": {"title": "Notice", "content": [[
                {"tag": "text", "text": "hello"}
            ]]}}})
        );
    }

    #[test]
    fn test_post_content_from_file_wins() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("post.json");
        std::fs::write(&path, r#"{"post": {"en_us": {"title": "File", "content": []}}}"#)
            .unwrap();

        let args = PostArgs {
            title: Some("ignored".to_owned()),
            content_file: Some(path),
            ..PostArgs::default()
        };
        assert_eq!(args.content().unwrap()["post"]["en_us"]["title"], "File");
    }

    #[test]
    fn test_post_needs_title() {
        let err = PostArgs::default().content().unwrap_err();
        assert!(matches!(err, CliError::Validation(_)));
    }

    #[test]
    fn test_post_args_empty() {
        assert!(PostArgs::default().is_empty());
        let args = PostArgs {
            image_key: Some("img".to_owned()),
            ..PostArgs::default()
        };
        assert!(!args.is_empty());
    }
}
