//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.surveybot.toml` files.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".surveybot.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Telegram connection settings.
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Survey rules.
    #[serde(default)]
    pub survey: SurveyConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Append-only member log.
    #[serde(default = "default_members_file")]
    pub members_file: PathBuf,

    /// Directory for archived JSON reports. Archiving is off when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_dir: Option<PathBuf>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            members_file: default_members_file(),
            report_dir: None,
        }
    }
}

fn default_members_file() -> PathBuf {
    PathBuf::from("community_members.txt")
}

/// Telegram Bot API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Bot API base URL.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Bot token. Prefer the SURVEYBOT_TOKEN environment variable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Long-polling timeout passed to getUpdates.
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout_seconds: u64,

    /// HTTP request timeout. Must exceed the polling timeout.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,

    /// Pause before polling again after a failed getUpdates.
    #[serde(default = "default_retry_delay")]
    pub retry_delay_seconds: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            token: None,
            poll_timeout_seconds: default_poll_timeout(),
            request_timeout_seconds: default_request_timeout(),
            retry_delay_seconds: default_retry_delay(),
        }
    }
}

fn default_api_url() -> String {
    "https://api.telegram.org".to_string()
}

fn default_poll_timeout() -> u64 {
    30
}

fn default_request_timeout() -> u64 {
    60
}

fn default_retry_delay() -> u64 {
    5
}

/// Survey rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurveyConfig {
    /// Members required before a survey can be created.
    #[serde(default = "default_min_members")]
    pub min_members: usize,

    /// Largest question count a creator may choose.
    #[serde(default = "default_max_questions")]
    pub max_questions: usize,

    #[serde(default = "default_min_options")]
    pub min_options: usize,

    #[serde(default = "default_max_options")]
    pub max_options: usize,

    /// Longest option in bytes (Telegram caps callback data at 64).
    #[serde(default = "default_max_option_bytes")]
    pub max_option_bytes: usize,
}

impl Default for SurveyConfig {
    fn default() -> Self {
        Self {
            min_members: default_min_members(),
            max_questions: default_max_questions(),
            min_options: default_min_options(),
            max_options: default_max_options(),
            max_option_bytes: default_max_option_bytes(),
        }
    }
}

fn default_min_members() -> usize {
    3
}

fn default_max_questions() -> usize {
    3
}

fn default_min_options() -> usize {
    2
}

fn default_max_options() -> usize {
    4
}

fn default_max_option_bytes() -> usize {
    64
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(DEFAULT_CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// Only values the user actually provided are applied.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref token) = args.token {
            self.telegram.token = Some(token.clone());
        }
        if let Some(ref api_url) = args.api_url {
            self.telegram.api_url = api_url.clone();
        }
        if let Some(timeout) = args.poll_timeout {
            self.telegram.poll_timeout_seconds = timeout;
            if self.telegram.request_timeout_seconds <= timeout {
                self.telegram.request_timeout_seconds = timeout.saturating_add(30);
            }
        }
        if let Some(ref members_file) = args.members_file {
            self.general.members_file = members_file.clone();
        }
        if let Some(ref report_dir) = args.report_dir {
            self.general.report_dir = Some(report_dir.clone());
        }
    }

    /// Check that the survey rules and timeouts are usable.
    pub fn validate(&self) -> Result<()> {
        let survey = &self.survey;
        if survey.min_members == 0 {
            bail!("survey.min_members must be at least 1");
        }
        if survey.max_questions == 0 {
            bail!("survey.max_questions must be at least 1");
        }
        if survey.min_options < 2 {
            bail!("survey.min_options must be at least 2");
        }
        if survey.max_options < survey.min_options {
            bail!("survey.max_options must not be below survey.min_options");
        }
        if survey.max_option_bytes == 0 {
            bail!("survey.max_option_bytes must be at least 1");
        }
        if self.telegram.request_timeout_seconds <= self.telegram.poll_timeout_seconds {
            bail!("telegram.request_timeout_seconds must exceed telegram.poll_timeout_seconds");
        }
        Ok(())
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
