//! Configuration management for wikirec.
//!
//! Parses `wikirec.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! The configuration carries two tables:
//!
//! - `[messages]` - human-readable strings for every recorded page error
//! - `[compat]` - switches pinning legacy page behaviour
//!
//! ## Environment Variable Expansion
//!
//! Message strings support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default

mod expand;

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "wikirec.toml";

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Error message table.
    pub messages: Messages,
    /// Legacy behaviour switches.
    pub compat: CompatConfig,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Symbolic names of the conditions a page can record an error for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKey {
    /// Page name missing or empty.
    NameNotSetOrNil,
    /// Commit metadata missing or not a structured record.
    CommitMustBeGiven,
    /// Markup format missing.
    FormatNotSet,
    /// Accessor called before a page was loaded.
    NoPageFetched,
    /// Lookup by name returned nothing.
    NoPageFound,
    /// Update called without content or commit.
    CommitNotEmptyAndContentNotEmpty,
}

impl MessageKey {
    /// All keys, in declaration order.
    pub const ALL: [Self; 6] = [
        Self::NameNotSetOrNil,
        Self::CommitMustBeGiven,
        Self::FormatNotSet,
        Self::NoPageFetched,
        Self::NoPageFound,
        Self::CommitNotEmptyAndContentNotEmpty,
    ];

    /// Key as it appears in the `[messages]` table.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NameNotSetOrNil => "name_not_set_or_nil",
            Self::CommitMustBeGiven => "commit_must_be_given",
            Self::FormatNotSet => "format_not_set",
            Self::NoPageFetched => "no_page_fetched",
            Self::NoPageFound => "no_page_found",
            Self::CommitNotEmptyAndContentNotEmpty => "commit_not_empty_and_content_not_empty",
        }
    }

    /// Parse a `[messages]` table key.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.as_str() == name)
    }
}

/// Error message table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Messages {
    pub name_not_set_or_nil: String,
    pub commit_must_be_given: String,
    pub format_not_set: String,
    pub no_page_fetched: String,
    pub no_page_found: String,
    pub commit_not_empty_and_content_not_empty: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            name_not_set_or_nil: "name is not set or nil".to_owned(),
            commit_must_be_given: "commit must be given".to_owned(),
            format_not_set: "format is not set".to_owned(),
            no_page_fetched: "no page fetched".to_owned(),
            no_page_found: "no page found".to_owned(),
            commit_not_empty_and_content_not_empty: "commit and content must not be empty"
                .to_owned(),
        }
    }
}

impl Messages {
    /// Message for a condition.
    #[must_use]
    pub fn get(&self, key: MessageKey) -> &str {
        match key {
            MessageKey::NameNotSetOrNil => &self.name_not_set_or_nil,
            MessageKey::CommitMustBeGiven => &self.commit_must_be_given,
            MessageKey::FormatNotSet => &self.format_not_set,
            MessageKey::NoPageFetched => &self.no_page_fetched,
            MessageKey::NoPageFound => &self.no_page_found,
            MessageKey::CommitNotEmptyAndContentNotEmpty => {
                &self.commit_not_empty_and_content_not_empty
            }
        }
    }

    /// Message for a condition given by its table key.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&str> {
        MessageKey::from_name(name).map(|key| self.get(key))
    }

    fn get_mut(&mut self, key: MessageKey) -> &mut String {
        match key {
            MessageKey::NameNotSetOrNil => &mut self.name_not_set_or_nil,
            MessageKey::CommitMustBeGiven => &mut self.commit_must_be_given,
            MessageKey::FormatNotSet => &mut self.format_not_set,
            MessageKey::NoPageFetched => &mut self.no_page_fetched,
            MessageKey::NoPageFound => &mut self.no_page_found,
            MessageKey::CommitNotEmptyAndContentNotEmpty => {
                &mut self.commit_not_empty_and_content_not_empty
            }
        }
    }
}

/// Legacy behaviour switches.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CompatConfig {
    /// `Page::save` reports `true` when validation fails and nothing was written.
    ///
    /// Enabled by default to keep existing callers working. Callers must then
    /// check the recorded error or the persisted flag to detect the skip.
    pub invalid_save_returns_true: bool,
}

impl Default for CompatConfig {
    fn default() -> Self {
        Self {
            invalid_save_returns_true: true,
        }
    }
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
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`messages.no_page_found`").
        field: String,
        /// Error message (e.g., "${`WIKI_LANG`} not set").
        message: String,
    },
}

impl Config {
    /// Load configuration from file.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `wikirec.toml` in current directory and parents,
    /// falling back to defaults when none is found.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            return Self::load_from_file(path);
        }

        let discovered = std::env::current_dir()
            .ok()
            .and_then(|cwd| Self::discover_config_from(&cwd));
        match discovered {
            Some(path) => Self::load_from_file(&path),
            None => Ok(Self::default()),
        }
    }

    /// Parse configuration from a TOML string.
    ///
    /// Applies environment expansion and validation, like [`Config::load`].
    ///
    /// # Errors
    ///
    /// Returns error if parsing, expansion or validation fails.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(content)?;
        config.expand_env_vars()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any message is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for key in MessageKey::ALL {
            if self.messages.get(key).trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "messages.{} cannot be empty",
                    key.as_str()
                )));
            }
        }
        Ok(())
    }

    /// Search for config file in `start` and its parents.
    fn discover_config_from(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
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

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml(&content)?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Expand environment variable references in message strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        for key in MessageKey::ALL {
            let field = format!("messages.{}", key.as_str());
            let slot = self.messages.get_mut(key);
            let expanded = expand::expand_env(slot.as_str(), &field)?;
            *slot = expanded;
        }
        Ok(())
    }
}
