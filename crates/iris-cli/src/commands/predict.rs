//! Single prediction against the server

use anyhow::Result;
use colored::Colorize;
use iris_lib::{models::MeasurementRecord, SuccessNotice};

use crate::client::ApiClient;
use crate::output::{color_confidence, print_success, OutputFormat};

pub async fn run(client: &ApiClient, record: MeasurementRecord, format: OutputFormat) -> Result<()> {
    let result = client.predict(&record).await?;

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&result)?;
            println!("{}", json);
        }
        OutputFormat::Table => {
            let notice = SuccessNotice::from(&result);
            print_success(&notice.class_line().bold().to_string());
            println!("  Confidence score: {}", color_confidence(result.confidence_score));
        }
    }

    Ok(())
}
