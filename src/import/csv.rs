use csv::{ReaderBuilder, StringRecord, Trim};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use super::{extension_of, ImportFormat, PatientRecord};
use crate::error::{ImportExportError, Result};
use crate::models::{
    CkdDetails, CkdStage, ConditionTag, DiabetesDetails, DyslipidemiaDetails, GoutDetails,
    HypertensionDetails, PatientData, Sex,
};

/// CSV importer with flexible column mapping
///
/// One patient per row. `conditions` holds tags separated by `;` or `|`.
/// Empty cells mean "not provided".
pub struct CsvImporter {
    column_mapping: HashMap<String, String>,
}

impl Default for CsvImporter {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvImporter {
    pub fn new() -> Self {
        let mut column_mapping = HashMap::new();

        // Common column name variations
        Self::add_mapping(&mut column_mapping, "id", &["id", "patient_id", "mrn"]);
        Self::add_mapping(&mut column_mapping, "age", &["age", "age_years"]);
        Self::add_mapping(&mut column_mapping, "sex", &["sex", "gender"]);
        Self::add_mapping(
            &mut column_mapping,
            "weight_kg",
            &["weight_kg", "weight", "weightkg", "kg"],
        );
        Self::add_mapping(
            &mut column_mapping,
            "height_cm",
            &["height_cm", "height", "heightcm", "cm"],
        );
        Self::add_mapping(
            &mut column_mapping,
            "activity_level",
            &["activity_level", "activity", "activitylevel"],
        );
        Self::add_mapping(
            &mut column_mapping,
            "stress_factor",
            &["stress_factor", "stress", "stressfactor"],
        );
        Self::add_mapping(
            &mut column_mapping,
            "protein_need",
            &["protein_need", "protein", "proteinneed"],
        );
        Self::add_mapping(
            &mut column_mapping,
            "conditions",
            &["conditions", "medical_conditions", "comorbidities"],
        );
        Self::add_mapping(&mut column_mapping, "systolic", &["systolic", "sbp"]);
        Self::add_mapping(&mut column_mapping, "diastolic", &["diastolic", "dbp"]);
        Self::add_mapping(&mut column_mapping, "hba1c", &["hba1c", "a1c"]);
        Self::add_mapping(&mut column_mapping, "ckd_stage", &["ckd_stage", "stage"]);
        Self::add_mapping(&mut column_mapping, "uric_acid", &["uric_acid", "uricacid"]);
        Self::add_mapping(&mut column_mapping, "ldl", &["ldl"]);
        Self::add_mapping(&mut column_mapping, "hdl", &["hdl"]);
        Self::add_mapping(&mut column_mapping, "triglycerides", &["triglycerides", "tg"]);

        Self { column_mapping }
    }

    fn add_mapping(mapping: &mut HashMap<String, String>, standard: &str, variations: &[&str]) {
        for variation in variations {
            mapping.insert(variation.to_lowercase(), standard.to_string());
        }
    }

    fn normalize_column_name(&self, name: &str) -> String {
        let normalized = name.trim().to_lowercase().replace([' ', '-'], "_");

        self.column_mapping
            .get(&normalized)
            .cloned()
            .unwrap_or(normalized)
    }

    /// Parse all patient rows from a reader
    pub fn parse_reader<R: Read>(&self, reader: R) -> Result<Vec<PatientRecord>> {
        let mut csv_reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::All)
            .flexible(true)
            .from_reader(reader);

        let headers = csv_reader
            .headers()
            .map_err(|e| parse_error(1, e.to_string()))?
            .clone();

        let columns: HashMap<String, usize> = headers
            .iter()
            .enumerate()
            .map(|(index, name)| (self.normalize_column_name(name), index))
            .collect();

        let mut records = Vec::new();
        for (index, row) in csv_reader.records().enumerate() {
            // Header is row 1
            let row_number = index + 2;
            let row = row.map_err(|e| parse_error(row_number, e.to_string()))?;
            let cells = Row {
                columns: &columns,
                record: &row,
                number: row_number,
            };

            let id = cells
                .text("id")
                .map(str::to_string)
                .unwrap_or_else(|| (index + 1).to_string());
            records.push(PatientRecord {
                id,
                patient: Self::patient_from_row(&cells)?,
            });
        }

        Ok(records)
    }

    fn patient_from_row(row: &Row<'_>) -> Result<PatientData> {
        let sex = match row.text("sex") {
            Some(value) => value
                .parse::<Sex>()
                .map_err(|reason| parse_error(row.number, reason))?,
            None => Sex::default(),
        };

        let conditions = match row.text("conditions") {
            Some(value) => value
                .split([';', '|'])
                .map(str::trim)
                .filter(|tag| !tag.is_empty())
                .map(|tag| tag.parse::<ConditionTag>())
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|reason| parse_error(row.number, reason))?,
            None => Vec::new(),
        };

        let mut patient = PatientData {
            age: row.number_cell("age")?,
            sex,
            weight_kg: row.number_cell("weight_kg")?,
            height_cm: row.number_cell("height_cm")?,
            activity_level: row.text("activity_level").unwrap_or_default().to_string(),
            stress_factor: row.text("stress_factor").unwrap_or_default().to_string(),
            protein_need: row.text("protein_need").unwrap_or_default().to_string(),
            conditions: Vec::new(),
            condition_details: Default::default(),
        };
        for tag in conditions {
            patient = patient.with_condition(tag);
        }

        let details = &mut patient.condition_details;

        let (systolic, diastolic) = (row.number_cell("systolic")?, row.number_cell("diastolic")?);
        if systolic.is_some() || diastolic.is_some() {
            details.hypertension = Some(HypertensionDetails { systolic, diastolic });
        }

        if let Some(hba1c) = row.number_cell("hba1c")? {
            details.diabetes_t2 = Some(DiabetesDetails { hba1c: Some(hba1c) });
        }

        if let Some(stage) = row.text("ckd_stage") {
            let stage = stage
                .parse::<CkdStage>()
                .map_err(|reason| parse_error(row.number, reason))?;
            details.ckd = Some(CkdDetails { stage: Some(stage) });
        }

        if let Some(uric_acid) = row.number_cell("uric_acid")? {
            details.gout = Some(GoutDetails { uric_acid: Some(uric_acid) });
        }

        let lipids = DyslipidemiaDetails {
            ldl: row.number_cell("ldl")?,
            hdl: row.number_cell("hdl")?,
            triglycerides: row.number_cell("triglycerides")?,
        };
        if lipids != DyslipidemiaDetails::default() {
            details.dyslipidemia = Some(lipids);
        }

        Ok(patient)
    }
}

struct Row<'a> {
    columns: &'a HashMap<String, usize>,
    record: &'a StringRecord,
    number: usize,
}

impl<'a> Row<'a> {
    /// Non-empty cell text for a standard column name
    fn text(&self, column: &str) -> Option<&'a str> {
        self.columns
            .get(column)
            .and_then(|&index| self.record.get(index))
            .filter(|value| !value.is_empty())
    }

    fn number_cell(&self, column: &str) -> Result<Option<f64>> {
        match self.text(column) {
            Some(value) => value.parse::<f64>().map(Some).map_err(|_| {
                parse_error(self.number, format!("invalid number in {}: {}", column, value))
            }),
            None => Ok(None),
        }
    }
}

fn parse_error(row: usize, reason: impl Into<String>) -> crate::error::NutriError {
    ImportExportError::ParseError {
        format: "csv".to_string(),
        row,
        reason: reason.into(),
    }
    .into()
}

impl ImportFormat for CsvImporter {
    fn can_import(&self, file_path: &Path) -> bool {
        extension_of(file_path).as_deref() == Some("csv")
    }

    fn import_file(&self, file_path: &Path) -> Result<Vec<PatientRecord>> {
        let file = std::fs::File::open(file_path)?;
        self.parse_reader(file)
    }

    fn get_format_name(&self) -> &'static str {
        "CSV"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NutriError;

    #[test]
    fn test_parse_basic_rows() {
        let data = "\
id,age,sex,weight_kg,height_cm,activity_level,stress_factor,protein_need,conditions
p1,30,male,70,175,sedentary,none,normal,
p2,62,F,58.5,160,light,moderate,high,ckd;gout
";
        let records = CsvImporter::new().parse_reader(data.as_bytes()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "p1");
        assert_eq!(records[0].patient.age, Some(30.0));
        assert!(records[0].patient.conditions.is_empty());
        assert_eq!(records[1].patient.sex, Sex::Female);
        assert_eq!(records[1].patient.protein_need, "high");
        assert_eq!(
            records[1].patient.conditions,
            vec![ConditionTag::Ckd, ConditionTag::Gout]
        );
    }

    #[test]
    fn test_column_aliases_and_details() {
        let data = "\
Patient ID,Age,Gender,Weight,Height,SBP,DBP,CKD Stage,LDL
a,70,female,50,150,160,,3a,130
";
        let records = CsvImporter::new().parse_reader(data.as_bytes()).unwrap();
        let patient = &records[0].patient;

        assert_eq!(records[0].id, "a");
        assert_eq!(patient.weight_kg, Some(50.0));
        let bp = patient.condition_details.hypertension.as_ref().unwrap();
        assert_eq!((bp.systolic, bp.diastolic), (Some(160.0), None));
        assert_eq!(
            patient.condition_details.ckd.as_ref().unwrap().stage,
            Some(CkdStage::Stage3a)
        );
        let lipids = patient.condition_details.dyslipidemia.as_ref().unwrap();
        assert_eq!(lipids.ldl, Some(130.0));
        assert!(patient.condition_details.gout.is_none());
    }

    #[test]
    fn test_empty_numeric_cell_is_absent() {
        let data = "age,sex,weight_kg,height_cm\n,male,70,175\n";
        let records = CsvImporter::new().parse_reader(data.as_bytes()).unwrap();
        assert_eq!(records[0].patient.age, None);
        assert_eq!(records[0].id, "1");
    }

    #[test]
    fn test_errors_carry_row_number() {
        let data = "age,sex,weight_kg,height_cm\n30,male,70,175\n30,male,seventy,175\n";
        let err = CsvImporter::new().parse_reader(data.as_bytes()).unwrap_err();
        match err {
            NutriError::ImportExport(ImportExportError::ParseError { row, reason, .. }) => {
                assert_eq!(row, 3);
                assert!(reason.contains("weight_kg"));
            }
            other => panic!("unexpected error: {other}"),
        }

        let data = "age,sex,weight_kg,height_cm,conditions\n30,male,70,175,asthma\n";
        assert!(CsvImporter::new().parse_reader(data.as_bytes()).is_err());
    }
}
