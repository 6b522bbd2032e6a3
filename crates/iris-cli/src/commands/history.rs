//! Session history from the server

use anyhow::Result;
use colored::Colorize;
use iris_lib::presenter::{HistoryTable, EMPTY_HISTORY_MESSAGE};

use crate::client::ApiClient;
use crate::output::{print_warning, OutputFormat};

pub async fn run(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let history = client.history().await?;

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&history)?;
            println!("{}", json);
        }
        OutputFormat::Table => {
            if history.results.is_empty() {
                print_warning(EMPTY_HISTORY_MESSAGE);
                return Ok(());
            }

            println!("{}", "Predictions so far".bold());
            println!("{}", HistoryTable::from_history(&history.results).render());
            println!("\nTotal: {} predictions", history.count);
        }
    }

    Ok(())
}
