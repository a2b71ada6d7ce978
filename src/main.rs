use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use tracing::info;

use palabra::cli::{Cli, Commands};
use palabra::config::{load_config, validate_config};
use palabra::gemini::GeminiBackend;
use palabra::locale::Language;
use palabra::models::{LoadState, Selection};
use palabra::orchestrator::Orchestrator;
use palabra::{daemon, view};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Listing languages needs no config file.
    if let Some(Commands::Languages) = cli.command {
        print_languages();
        return Ok(());
    }

    let config = load_config(&cli.config).with_context(|| format!("loading config from {}", cli.config.display()))?;

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.palabra.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    info!(config_path = %cli.config.display(), "config loaded");

    validate_config(&config).context("config validation failed")?;
    info!("config validated successfully");

    match cli.command {
        Some(Commands::Validate) => {
            println!("Configuration is valid.");
        }
        Some(Commands::Show { date, lang, json }) => {
            let language = match lang {
                Some(code) => code.parse::<Language>()?,
                None => config.default_language(),
            };
            let date = date.unwrap_or_else(|| Local::now().date_naive());

            let backend = Arc::new(GeminiBackend::from_config(&config.gemini).context("creating Gemini backend")?);
            let orchestrator = Orchestrator::new(backend);
            orchestrator.set_selection(Selection::new(date, language));
            let snapshot = orchestrator.settled().await;

            if json {
                println!("{}", serde_json::to_string_pretty(&snapshot).context("serializing snapshot")?);
            } else {
                print!("{}", view::render_text(&view::ViewModel::from_snapshot(&snapshot, language)));
            }

            if snapshot.readings_status == LoadState::Error {
                anyhow::bail!(
                    "readings could not be loaded: {}",
                    snapshot.readings_error.as_deref().unwrap_or("unknown error")
                );
            }
        }
        Some(Commands::Languages) => print_languages(),
        Some(Commands::Serve) | None => {
            daemon::run(config).await?;
        }
    }

    Ok(())
}

fn print_languages() {
    for language in Language::ALL {
        println!("{:<4}{:<12}{}", language.code(), language.native_name(), language.english_name());
    }
}
