//! SurveyBot - community surveys over Telegram
//!
//! A long-polling Telegram bot: members join with /start, one member at a
//! time drafts a short multiple-choice survey, every member answers it
//! through inline buttons and the creator closes the round with
//! /show_results.
//!
//! Exit codes:
//!   0 - Clean shutdown (Ctrl-C) or successful --check / --init-config
//!   1 - Startup error (configuration, member log, token, Bot API)

mod analysis;
mod bot;
mod cli;
mod config;
mod error;
mod models;
mod registry;
mod report;
mod survey;

use anyhow::{Context, Result};
use bot::{SharedBot, SurveyBot, TelegramClient};
use cli::Args;
use config::{Config, DEFAULT_CONFIG_FILE};
use registry::{MemberLog, MemberRegistry};
use std::sync::Arc;
use std::time::Duration;
use survey::SurveyLimits;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse_args();

    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    init_logging(&args);

    info!("SurveyBot v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    if let Err(e) = run(args).await {
        error!("SurveyBot failed: {:#}", e);
        eprintln!("\nError: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .surveybot.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(DEFAULT_CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "{} already exists. Remove it first or edit it manually.",
            DEFAULT_CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", DEFAULT_CONFIG_FILE))?;

    println!("Created {} with default settings.", DEFAULT_CONFIG_FILE);
    println!("   Set the bot token there or export SURVEYBOT_TOKEN.");
    Ok(())
}

/// Initialize logging. RUST_LOG wins over the verbosity flags.
fn init_logging(args: &Args) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.log_level().to_string()));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Load state and serve updates until shutdown.
async fn run(args: Args) -> Result<()> {
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);
    config.validate().context("Invalid configuration")?;

    let members_file = config.general.members_file.clone();
    let registry = MemberRegistry::open(MemberLog::new(&members_file))
        .with_context(|| format!("Failed to open member log {}", members_file.display()))?;

    if args.check {
        return handle_check(&config, &registry);
    }

    let token = config
        .telegram
        .token
        .clone()
        .filter(|token| !token.trim().is_empty())
        .context("No bot token configured. Use --token, SURVEYBOT_TOKEN or telegram.token")?;

    let client = TelegramClient::new(&config.telegram, &token)?;
    let me = client
        .get_me()
        .await
        .context("Failed to verify the bot token")?;
    info!(
        "Connected as @{}",
        me.username.as_deref().unwrap_or(&me.first_name)
    );

    if let Some(ref dir) = config.general.report_dir {
        info!("Archiving survey reports to {}", dir.display());
    }

    let limits = SurveyLimits::from(&config.survey);
    let bot = SurveyBot::new(registry, limits).with_report_dir(config.general.report_dir.clone());
    let bot: SharedBot = Arc::new(Mutex::new(bot));

    bot::poller::run(
        bot,
        client,
        Duration::from_secs(config.telegram.retry_delay_seconds),
    )
    .await
}

/// Handle --check: print the effective setup and exit without network calls.
fn handle_check(config: &Config, registry: &MemberRegistry) -> Result<()> {
    println!("Configuration OK");
    println!("   Bot API: {}", config.telegram.api_url);
    println!(
        "   Token: {}",
        if config.telegram.token.is_some() {
            "configured"
        } else {
            "missing"
        }
    );
    println!(
        "   Member log: {} ({} members)",
        config.general.members_file.display(),
        registry.count()
    );
    for member in registry.list_all() {
        println!("     {} {}", member.id, member.display_name);
    }
    println!(
        "   Surveys: at least {} members, 1-{} questions, {}-{} options",
        config.survey.min_members,
        config.survey.max_questions,
        config.survey.min_options,
        config.survey.max_options
    );
    match config.general.report_dir {
        Some(ref dir) => println!("   Reports: {}", dir.display()),
        None => println!("   Reports: not archived"),
    }
    Ok(())
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", DEFAULT_CONFIG_FILE);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {:#}", e);
            Ok(Config::default())
        }
    }
}
