use std::path::Path;
use thiserror::Error;

use crate::report::PingReport;

#[derive(Debug, Error)]
pub enum ExportError {
    IO(#[from] std::io::Error),
    Serde(#[from] serde_json::Error),
}

impl std::fmt::Display for ExportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportError::IO(e) => write!(f, "I/O error: {e}"),
            ExportError::Serde(e) => write!(f, "Serialization error: {e}"),
        }
    }
}

pub async fn export_report(report: &PingReport, filename: &Path) -> Result<(), ExportError> {
    let json = serde_json::to_string_pretty(report)?;
    tokio::fs::write(filename, json).await?;
    Ok(())
}
