//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// SurveyBot - community surveys over Telegram
///
/// Members join with /start, one member at a time creates a short
/// multiple-choice survey with /create_survey, everyone answers through
/// inline buttons, and the creator closes the round with /show_results.
///
/// Examples:
///   surveybot --token 123456:ABC-DEF
///   SURVEYBOT_TOKEN=123456:ABC-DEF surveybot --members-file members.txt
///   surveybot --check
///   surveybot --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Telegram bot token
    ///
    /// Overrides the token in the configuration file.
    #[arg(long, env = "SURVEYBOT_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Telegram Bot API base URL
    #[arg(long, value_name = "URL", env = "TELEGRAM_API_URL")]
    pub api_url: Option<String>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .surveybot.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Member log file
    #[arg(long, value_name = "FILE")]
    pub members_file: Option<PathBuf>,

    /// Directory where survey reports are archived as JSON
    #[arg(long, value_name = "DIR")]
    pub report_dir: Option<PathBuf>,

    /// Long-polling timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub poll_timeout: Option<u64>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (errors only)
    #[arg(short, long)]
    pub quiet: bool,

    /// Load configuration and member log, print a summary and exit
    ///
    /// Makes no network calls.
    #[arg(long)]
    pub check: bool,

    /// Generate a default .surveybot.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if self.poll_timeout == Some(0) {
            return Err("Poll timeout must be at least 1 second".to_string());
        }

        if let Some(ref token) = self.token {
            if token.trim().is_empty() {
                return Err("Bot token must not be empty".to_string());
            }
        }

        if let Some(ref url) = self.api_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("API URL must start with 'http://' or 'https://'".to_string());
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
