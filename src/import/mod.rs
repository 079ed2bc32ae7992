use crate::error::{ImportExportError, Result};
use crate::models::PatientData;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

pub mod csv;
pub mod json;

/// A patient loaded from a file, tagged with a caller-visible identifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientRecord {
    pub id: String,
    pub patient: PatientData,
}

/// Trait for importing patient data from different file formats
pub trait ImportFormat {
    /// Check if this importer can handle the given file
    fn can_import(&self, file_path: &Path) -> bool;

    /// Import every patient in the file
    fn import_file(&self, file_path: &Path) -> Result<Vec<PatientRecord>>;

    /// Get the format name for this importer
    fn get_format_name(&self) -> &'static str;
}

/// Manager for coordinating different import formats
pub struct ImportManager {
    importers: Vec<Box<dyn ImportFormat>>,
}

impl Default for ImportManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ImportManager {
    /// Create a new import manager with all available importers
    pub fn new() -> Self {
        let importers: Vec<Box<dyn ImportFormat>> = vec![
            Box::new(csv::CsvImporter::new()),
            Box::new(json::JsonImporter),
        ];

        Self { importers }
    }

    /// Import a single file, picking the importer by extension
    pub fn import_file(&self, file_path: &Path) -> Result<Vec<PatientRecord>> {
        let importer = self
            .importers
            .iter()
            .find(|importer| importer.can_import(file_path))
            .ok_or_else(|| ImportExportError::UnsupportedFormat {
                format: extension_of(file_path).unwrap_or_else(|| "(none)".to_string()),
            })?;

        let records = importer.import_file(file_path)?;
        info!(
            file = %file_path.display(),
            format = importer.get_format_name(),
            patients = records.len(),
            "Imported patients"
        );

        Ok(records)
    }
}

pub(crate) fn extension_of(file_path: &Path) -> Option<String> {
    file_path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NutriError;
    use std::path::PathBuf;

    #[test]
    fn test_unsupported_extension() {
        let manager = ImportManager::new();
        let err = manager.import_file(&PathBuf::from("patients.xlsx")).unwrap_err();
        assert!(matches!(
            err,
            NutriError::ImportExport(ImportExportError::UnsupportedFormat { ref format }) if format == "xlsx"
        ));
    }
}
