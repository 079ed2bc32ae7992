use crate::batch::BatchSummary;
use crate::error::{ImportExportError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use tracing::info;

pub mod csv;
pub mod display;
pub mod json;
pub mod text;

/// Supported batch export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Json,
    Text,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
            ExportFormat::Text => "txt",
        }
    }

    /// Guess the format from an output path's extension
    pub fn from_path(path: &Path) -> Option<Self> {
        match crate::import::extension_of(path)?.as_str() {
            "csv" => Some(ExportFormat::Csv),
            "json" => Some(ExportFormat::Json),
            "txt" | "text" => Some(ExportFormat::Text),
            _ => None,
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ImportExportError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            "text" | "txt" => Ok(ExportFormat::Text),
            other => Err(ImportExportError::UnsupportedFormat {
                format: other.to_string(),
            }),
        }
    }
}

/// Write a batch summary to `output_path` in the requested format
pub fn export_batch(summary: &BatchSummary, format: ExportFormat, output_path: &Path) -> Result<()> {
    match format {
        ExportFormat::Csv => csv::export_batch(summary, output_path)?,
        ExportFormat::Json => json::export_json(summary, output_path)?,
        ExportFormat::Text => text::export_batch(summary, output_path)?,
    }

    info!(
        path = %output_path.display(),
        format = format.extension(),
        patients = summary.total,
        "Exported batch results"
    );
    Ok(())
}

pub(crate) fn export_failed(path: &Path, reason: impl ToString) -> ImportExportError {
    ImportExportError::ExportFailed {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_format_parsing() {
        assert_eq!("CSV".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert_eq!("txt".parse::<ExportFormat>().unwrap(), ExportFormat::Text);
        assert!("xlsx".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            ExportFormat::from_path(&PathBuf::from("out/results.JSON")),
            Some(ExportFormat::Json)
        );
        assert_eq!(ExportFormat::from_path(&PathBuf::from("results")), None);
    }
}
