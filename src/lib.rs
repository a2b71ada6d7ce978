pub mod backend;
pub mod cli;
pub mod config;
pub mod content;
pub mod daemon;
pub mod error;
pub mod gemini;
pub mod locale;
pub mod models;
pub mod orchestrator;
pub mod prompt;
pub mod server;
pub mod view;
