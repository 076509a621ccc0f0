use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use dotenv::dotenv;
use dreamweaver_core::config::{get_default_config_file, DreamConfig, APP_NAME};
use dreamweaver_core::{DreamGateway, GeminiClient};
use dreamweaver_journal::{FileJournalStore, Journal};
use tracing::{debug, info};

mod app;
mod cli;
mod logging;
mod output;
mod session;

use crate::cli::{Args, Command, ConfigCommand};
use crate::output::print_usage_instructions;
use crate::session::DreamSession;

/// Loads the config file named on the command line, or the default one
fn load_config(args: &Args) -> Result<(DreamConfig, std::path::PathBuf)> {
    let path = match &args.config {
        Some(path) => path.clone(),
        None => get_default_config_file(APP_NAME)?,
    };
    let mut config = DreamConfig::load_from_file(&path)
        .with_context(|| format!("Failed to load config from {}", path.display()))?;
    if let Some(journal) = &args.journal {
        config.journal_path = Some(journal.clone());
    }
    Ok((config.with_env_api_key(), path))
}

fn open_journal(config: &DreamConfig) -> Result<Journal> {
    let path = config.resolve_journal_path()?;
    debug!("Using journal at {}", path.display());
    Ok(Journal::open(FileJournalStore::new(path)))
}

fn run_config_command(config: &DreamConfig, path: &std::path::Path, command: ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Show => {
            let mut shown = config.clone();
            shown.api_key = Some(config.masked_api_key());
            println!("{}", format!("# {}", path.display()).dimmed());
            print!("{}", toml::to_string_pretty(&shown).context("Failed to render config")?);
        }
        ConfigCommand::Init { force } => {
            if path.exists() && !force {
                println!("Config already exists at {} (use --force to overwrite)", path.display());
                return Ok(());
            }
            DreamConfig::default().save_to_file(path)?;
            println!("Wrote default config to {}", path.display().to_string().cyan());
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables before anything reads them
    dotenv().ok();

    let args = Args::parse();
    let (config, config_path) = load_config(&args)?;

    let level = logging::resolve_level(
        args.verbose,
        args.log_level.as_deref(),
        config.log_level.as_deref(),
    );
    logging::init(&level);
    info!("Loaded configuration from {}", config_path.display());

    let command = match args.command {
        Some(command) => command,
        None if args.interactive => Command::Interactive,
        None => {
            print_usage_instructions();
            return Ok(());
        }
    };

    match command {
        Command::Journal { command } => {
            let mut journal = open_journal(&config)?;
            app::run_journal_command(&mut journal, command)
        }
        Command::Config { command } => run_config_command(&config, &config_path, command),
        Command::Dream { themes, save, out } => {
            let mut session = new_session(&config, themes)?;
            app::run_single_dream(&mut session, save, out).await
        }
        Command::Interactive => {
            let mut session = new_session(&config, Vec::new())?;
            app::run_interactive(&mut session).await
        }
    }
}

/// Wires the Gemini client, gateway and journal into a session.
/// Empty `themes` falls back to the configured defaults.
fn new_session(config: &DreamConfig, themes: Vec<String>) -> Result<DreamSession<GeminiClient>> {
    let client =
        GeminiClient::new(config.clone()).context("Failed to initialize Gemini client")?;

    let themes = if themes.is_empty() {
        config.default_themes.clone().unwrap_or_default()
    } else {
        themes
    };

    let journal = open_journal(config)?;
    Ok(DreamSession::new(DreamGateway::new(client), journal, themes))
}
