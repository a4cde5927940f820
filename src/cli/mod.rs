//! CLI module for docqa
//!
//! Provides subcommands:
//! - `serve`: HTTP server for upload, chat and reset
//! - `ask`: load one document and answer questions from the terminal

pub mod ask;
pub mod serve;

use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::infrastructure::logging::init_logging;

/// docqa - ask questions about a single PDF, DOCX or text document
#[derive(Parser)]
#[command(name = "docqa")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP server
    Serve,

    /// Load a document and answer questions about it
    Ask(ask::AskArgs),
}

/// Read `.env` and the layered configuration, then start logging
fn prepare() -> anyhow::Result<AppConfig> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;
    init_logging(&config.logging)?;

    Ok(config)
}
