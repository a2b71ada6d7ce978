use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "palabra", about = "La Palabra Diaria: daily readings, saints and Catholic news")]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, global = true, default_value = "palabra.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate the configuration file
    Validate,

    /// Fetch one day's content and print it
    Show {
        /// Date to show (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Language code (es, en, fr, it, de, ko, ja, zh)
        #[arg(long)]
        lang: Option<String>,

        /// Print the settled snapshot as JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// List supported languages
    Languages,

    /// Run the HTTP server (default)
    Serve,
}
