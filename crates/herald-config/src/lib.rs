//! Configuration management for Herald.
//!
//! Parses `herald.toml` with serde and provides auto-discovery of the config
//! file in parent directories. Settings are validated once at load time and
//! handed to the rest of the system as typed structs.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Required settings
//!
//! Credentials are only needed by the commands that talk to the remote
//! services, so their presence is checked on demand with
//! [`Config::require`]. A single [`ConfigError::Missing`] lists every missing
//! key for the requested sections.
//!
//! ## Environment Variable Expansion
//!
//! String values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `feishu.base_url`
//! - `docs.app_id`, `docs.app_secret`, `docs.folder_token`
//! - `chat.app_id`, `chat.app_secret`, `chat.default_chat_id`
//! - `agent.api_key`, `agent.base_url`

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override content root directory.
    pub content_root: Option<PathBuf>,
    /// Override target chat id.
    pub chat_id: Option<String>,
    /// Override chat message format.
    pub chat_format: Option<ChatFormat>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "herald.toml";

/// Default Feishu open platform endpoint.
pub const DEFAULT_BASE_URL: &str = "https://open.feishu.cn/open-apis";

/// Upper bound accepted by the document API for children per request.
const MAX_BATCH_SIZE: usize = 50;

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Content configuration (paths are relative strings from TOML).
    content: ContentConfigRaw,
    /// Content generation command.
    pub generate: GenerateConfig,
    /// Generation agent parameters (optional section).
    pub agent: Option<AgentConfig>,
    /// Shared API client settings.
    pub feishu: FeishuConfig,
    /// Document hosting settings.
    pub docs: DocsConfig,
    /// Chat broadcast settings.
    pub chat: ChatConfig,
    /// Version control settings.
    pub git: GitConfig,

    /// Resolved content configuration (set after loading).
    #[serde(skip)]
    pub content_resolved: ContentConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Raw content configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ContentConfigRaw {
    root: Option<String>,
}

/// Resolved content configuration with absolute paths.
#[derive(Debug, Default, Clone)]
pub struct ContentConfig {
    /// Root directory holding `YYYY/MM/YYYYMMDD.md` documents.
    pub root: PathBuf,
    /// Project directory: working directory for the generator and git.
    pub project_dir: PathBuf,
}

/// Content generation settings.
#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct GenerateConfig {
    /// Program and arguments run to produce today's document.
    pub command: Vec<String>,
}

/// Generation agent parameters, passed through to the generator.
#[derive(Debug, Deserialize, Clone)]
pub struct AgentConfig {
    /// Model name.
    #[serde(default)]
    pub model: String,
    /// API key for the model provider.
    #[serde(default)]
    pub api_key: String,
    /// Model provider endpoint.
    #[serde(default)]
    pub base_url: Option<String>,
    /// Sampling temperature.
    #[serde(default)]
    pub temperature: Option<f64>,
    /// Request rate limit.
    #[serde(default)]
    pub requests_per_minute: Option<u32>,
}

impl AgentConfig {
    /// Environment variables exported to the generation command.
    pub fn env_vars(&self) -> Vec<(String, String)> {
        let mut vars = vec![
            ("HERALD_AGENT_MODEL".to_owned(), self.model.clone()),
            ("HERALD_AGENT_API_KEY".to_owned(), self.api_key.clone()),
        ];
        if let Some(base_url) = &self.base_url {
            vars.push(("HERALD_AGENT_BASE_URL".to_owned(), base_url.clone()));
        }
        if let Some(temperature) = self.temperature {
            vars.push((
                "HERALD_AGENT_TEMPERATURE".to_owned(),
                temperature.to_string(),
            ));
        }
        if let Some(rpm) = self.requests_per_minute {
            vars.push(("HERALD_AGENT_REQUESTS_PER_MINUTE".to_owned(), rpm.to_string()));
        }
        vars
    }
}

/// Shared Feishu API settings.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct FeishuConfig {
    /// Open platform base URL.
    pub base_url: String,
    /// HTTP timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for FeishuConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout_secs: 30,
        }
    }
}

/// Document hosting settings.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DocsConfig {
    /// Application id.
    pub app_id: String,
    /// Application secret.
    pub app_secret: String,
    /// Destination folder token; empty means the app's root.
    pub folder_token: String,
    /// Prefix for generated document titles.
    pub title_prefix: String,
    /// Blocks per append request.
    pub batch_size: usize,
    /// Pause between append requests in milliseconds.
    pub batch_delay_ms: u64,
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            app_id: String::new(),
            app_secret: String::new(),
            folder_token: String::new(),
            title_prefix: "AINews".to_owned(),
            batch_size: 10,
            batch_delay_ms: 200,
        }
    }
}

/// Chat message format.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ChatFormat {
    /// Interactive card rendering Markdown (bold, lists, links).
    #[default]
    Card,
    /// Plain text message.
    Text,
}

/// Chat broadcast settings.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ChatConfig {
    /// Application id.
    pub app_id: String,
    /// Application secret.
    pub app_secret: String,
    /// Chat that receives the daily broadcast.
    pub default_chat_id: String,
    /// Message format.
    pub format: ChatFormat,
    /// First line of every broadcast.
    pub header: String,
    /// Last line of every broadcast; omitted when empty.
    pub footer: String,
    /// Per-message character limit for card messages.
    pub card_max_chars: usize,
    /// Per-message character limit for text messages.
    pub text_max_chars: usize,
}

impl ChatConfig {
    /// Character limit for the configured format.
    pub fn max_chars(&self) -> usize {
        match self.format {
            ChatFormat::Card => self.card_max_chars,
            ChatFormat::Text => self.text_max_chars,
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            app_id: String::new(),
            app_secret: String::new(),
            default_chat_id: String::new(),
            format: ChatFormat::Card,
            header: "Today's digest has arrived".to_owned(),
            footer: String::new(),
            card_max_chars: 8000,
            text_max_chars: 2800,
        }
    }
}

/// Version control settings.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GitConfig {
    /// Commit message template; `{path}` is replaced by the document path.
    pub commit_message: String,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            commit_message: "Auto: add {path}".to_owned(),
        }
    }
}

impl GitConfig {
    /// Commit message for a document path.
    pub fn message_for(&self, path: &str) -> String {
        self.commit_message.replace("{path}", path)
    }
}

/// Configuration section whose required keys a command depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    /// `[generate]` (and `[agent]` when present).
    Generate,
    /// `[docs]`.
    Docs,
    /// `[chat]` credentials only.
    ChatApp,
    /// `[chat]` credentials and target chat.
    Chat,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Required settings are missing or empty.
    #[error("Missing required settings: {}", .0.join(", "))]
    Missing(Vec<String>),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`docs.app_secret`").
        field: String,
        /// Error message (e.g., "${`FEISHU_APP_SECRET`} not set").
        message: String,
    },
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

/// Require a numeric field to be positive.
fn require_positive(value: u64, field: &str) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::Validation(format!(
            "{field} must be greater than 0"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `herald.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Parse configuration from TOML text, resolving paths against `base`.
    ///
    /// # Errors
    ///
    /// Returns error if parsing, expansion or validation fails.
    pub fn from_toml(content: &str, base: &Path) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(content)?;
        config.expand_env_vars()?;
        config.resolve_paths(base);
        config.validate()?;
        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(root) = &settings.content_root {
            self.content_resolved.root.clone_from(root);
        }
        if let Some(chat_id) = &settings.chat_id {
            self.chat.default_chat_id.clone_from(chat_id);
        }
        if let Some(format) = settings.chat_format {
            self.chat.format = format;
        }
    }

    /// Check that every key required by `sections` is set.
    ///
    /// Unlike [`Config::validate`], which checks values that are present,
    /// this checks for presence. All missing keys across all requested
    /// sections are collected into one error.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` naming each missing key.
    pub fn require(&self, sections: &[Section]) -> Result<(), ConfigError> {
        let mut missing = Vec::new();
        let mut check = |value: &str, key: &str| {
            if value.trim().is_empty() {
                missing.push(key.to_owned());
            }
        };

        for section in sections {
            match section {
                Section::Generate => {
                    check(
                        self.generate.command.first().map_or("", String::as_str),
                        "generate.command",
                    );
                    if let Some(agent) = &self.agent {
                        check(&agent.model, "agent.model");
                        check(&agent.api_key, "agent.api_key");
                    }
                }
                Section::Docs => {
                    check(&self.docs.app_id, "docs.app_id");
                    check(&self.docs.app_secret, "docs.app_secret");
                }
                Section::ChatApp | Section::Chat => {
                    check(&self.chat.app_id, "chat.app_id");
                    check(&self.chat.app_secret, "chat.app_secret");
                    if *section == Section::Chat {
                        check(&self.chat.default_chat_id, "chat.default_chat_id");
                    }
                }
            }
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Missing(missing))
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            content: ContentConfigRaw::default(),
            generate: GenerateConfig::default(),
            agent: None,
            feishu: FeishuConfig::default(),
            docs: DocsConfig::default(),
            chat: ChatConfig::default(),
            git: GitConfig::default(),
            content_resolved: ContentConfig {
                root: base.join("doc"),
                project_dir: base.to_path_buf(),
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml(&content, config_dir(path))?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Checks that values which are set are well-formed. Called automatically
    /// after loading from file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_http_url(&self.feishu.base_url, "feishu.base_url")?;
        require_positive(self.feishu.timeout_secs, "feishu.timeout_secs")?;
        self.validate_docs()?;
        self.validate_chat()?;
        if let Some(agent) = &self.agent
            && let Some(base_url) = &agent.base_url
        {
            require_http_url(base_url, "agent.base_url")?;
        }
        Ok(())
    }

    /// Validate document hosting configuration.
    fn validate_docs(&self) -> Result<(), ConfigError> {
        if self.docs.title_prefix.is_empty() {
            return Err(ConfigError::Validation(
                "docs.title_prefix cannot be empty".to_owned(),
            ));
        }
        if self.docs.batch_size == 0 || self.docs.batch_size > MAX_BATCH_SIZE {
            return Err(ConfigError::Validation(format!(
                "docs.batch_size must be between 1 and {MAX_BATCH_SIZE}"
            )));
        }
        Ok(())
    }

    /// Validate chat broadcast configuration.
    fn validate_chat(&self) -> Result<(), ConfigError> {
        require_positive(self.chat.card_max_chars as u64, "chat.card_max_chars")?;
        require_positive(self.chat.text_max_chars as u64, "chat.text_max_chars")?;
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        expand::expand_all(&mut [
            (&mut self.feishu.base_url, "feishu.base_url"),
            (&mut self.docs.app_id, "docs.app_id"),
            (&mut self.docs.app_secret, "docs.app_secret"),
            (&mut self.docs.folder_token, "docs.folder_token"),
            (&mut self.chat.app_id, "chat.app_id"),
            (&mut self.chat.app_secret, "chat.app_secret"),
            (&mut self.chat.default_chat_id, "chat.default_chat_id"),
        ])?;

        if let Some(agent) = &mut self.agent {
            agent.api_key = expand::expand_env(&agent.api_key, "agent.api_key")?;
            if let Some(base_url) = &agent.base_url {
                agent.base_url = Some(expand::expand_env(base_url, "agent.base_url")?);
            }
        }

        Ok(())
    }

    /// Resolve relative paths to absolute paths based on config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        self.content_resolved = ContentConfig {
            root: config_dir.join(self.content.root.as_deref().unwrap_or("doc")),
            project_dir: config_dir.to_path_buf(),
        };
    }
}

/// Directory containing the config file at `path`.
///
/// A bare file name has an empty parent, which is not a usable working
/// directory, so it maps to `.`.
fn config_dir(path: &Path) -> &Path {
    path.parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or(Path::new("."))
}
