//! Iris classification CLI
//!
//! Fills in the measurement form in the terminal against a local model
//! bundle, or talks to a running iris server.

mod client;
mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{form, history, predict};
use iris_lib::{models::MeasurementRecord, DEFAULT_ARTIFACT_PATH};
use std::path::PathBuf;

/// Iris Classification CLI
#[derive(Parser)]
#[command(name = "iris")]
#[command(author, version, about = "CLI for the Iris Classification App", long_about = None)]
pub struct Cli {
    /// Server URL (can also be set via IRIS_API_URL env var)
    #[arg(long, env = "IRIS_API_URL", default_value = "http://localhost:8501")]
    pub api_url: String,

    /// Output format
    #[arg(long, short, default_value = "table")]
    pub format: output::OutputFormat,

    /// Enable verbose output
    #[arg(long, short)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fill in the measurement form interactively
    Form {
        /// Model bundle to load
        #[arg(long, env = "IRIS_ARTIFACT_PATH", default_value = DEFAULT_ARTIFACT_PATH)]
        artifact: PathBuf,
    },

    /// Classify one specimen on the server
    Predict {
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        sepal_length: f64,

        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        sepal_width: f64,

        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        petal_length: f64,

        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        petal_width: f64,
    },

    /// Show the predictions made on the server so far
    History,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .compact()
            .with_writer(std::io::stderr)
            .with_max_level(tracing::Level::DEBUG)
            .init();
    }

    match cli.command {
        Commands::Form { artifact } => {
            form::run(&artifact, cli.format)?;
        }
        Commands::Predict {
            sepal_length,
            sepal_width,
            petal_length,
            petal_width,
        } => {
            let client = client::ApiClient::new(&cli.api_url)?;
            let record = MeasurementRecord::new(sepal_length, sepal_width, petal_length, petal_width);
            predict::run(&client, record, cli.format).await?;
        }
        Commands::History => {
            let client = client::ApiClient::new(&cli.api_url)?;
            history::run(&client, cli.format).await?;
        }
    }

    Ok(())
}
