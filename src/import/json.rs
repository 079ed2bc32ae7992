use super::{extension_of, ImportFormat, PatientRecord};
use crate::error::{ImportExportError, Result};
use crate::models::PatientData;
use serde::Deserialize;
use std::path::Path;

/// Reads either a single patient object or an array of patients
///
/// Array items may carry an `id`; items without one are numbered from 1.
pub struct JsonImporter;

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonDocument {
    Many(Vec<JsonItem>),
    One(PatientData),
}

#[derive(Deserialize)]
struct JsonItem {
    #[serde(default)]
    id: Option<String>,
    #[serde(flatten)]
    patient: PatientData,
}

impl JsonImporter {
    /// Parse patient records from a JSON string
    pub fn parse_str(content: &str) -> Result<Vec<PatientRecord>> {
        let document: JsonDocument =
            serde_json::from_str(content).map_err(|e| ImportExportError::ParseError {
                format: "json".to_string(),
                row: e.line(),
                reason: e.to_string(),
            })?;

        let records = match document {
            JsonDocument::One(patient) => vec![PatientRecord {
                id: "1".to_string(),
                patient,
            }],
            JsonDocument::Many(items) => items
                .into_iter()
                .enumerate()
                .map(|(index, item)| PatientRecord {
                    id: item.id.unwrap_or_else(|| (index + 1).to_string()),
                    patient: item.patient,
                })
                .collect(),
        };

        Ok(records)
    }

    /// Load exactly one patient, as used by the `calculate` and `advise` commands
    pub fn load_patient(file_path: &Path) -> Result<PatientData> {
        let content = std::fs::read_to_string(file_path)?;
        let mut records = Self::parse_str(&content)?;
        if records.len() != 1 {
            return Err(ImportExportError::ParseError {
                format: "json".to_string(),
                row: 1,
                reason: format!("expected one patient, found {}", records.len()),
            }
            .into());
        }
        Ok(records.remove(0).patient)
    }
}

impl ImportFormat for JsonImporter {
    fn can_import(&self, file_path: &Path) -> bool {
        extension_of(file_path).as_deref() == Some("json")
    }

    fn import_file(&self, file_path: &Path) -> Result<Vec<PatientRecord>> {
        let content = std::fs::read_to_string(file_path)?;
        Self::parse_str(&content)
    }

    fn get_format_name(&self) -> &'static str {
        "JSON"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ConditionTag, Sex};
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_single_object() {
        let records = JsonImporter::parse_str(
            r#"{"age": 30, "sex": "male", "weight_kg": 70, "height_cm": 175}"#,
        )
        .unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "1");
        assert_eq!(records[0].patient.weight_kg, Some(70.0));
    }

    #[test]
    fn test_array_with_and_without_ids() {
        let records = JsonImporter::parse_str(
            r#"[
                {"id": "bed-4", "age": 71, "sex": "female", "weight_kg": 52, "height_cm": 150,
                 "conditions": ["ckd"], "condition_details": {"ckd": {"stage": "4"}}},
                {"age": 40, "sex": "male", "weight_kg": 90, "height_cm": 182}
            ]"#,
        )
        .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "bed-4");
        assert_eq!(records[0].patient.sex, Sex::Female);
        assert!(records[0].patient.has_condition(ConditionTag::Ckd));
        assert_eq!(records[1].id, "2");
    }

    #[test]
    fn test_invalid_json_reports_parse_error() {
        let err = JsonImporter::parse_str("{ not json").unwrap_err();
        assert!(err.to_string().contains("json"));
    }

    #[test]
    fn test_load_patient_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"age": 55, "sex": "female", "weight_kg": 64, "height_cm": 158}}"#).unwrap();

        let patient = JsonImporter::load_patient(file.path()).unwrap();
        assert_eq!(patient.age, Some(55.0));
    }
}
