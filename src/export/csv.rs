use super::export_failed;
use crate::batch::{BatchOutcome, BatchSummary};
use crate::error::Result;
use csv::Writer;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

/// One flattened output row; result columns are empty for rejected patients
#[derive(Debug, Serialize)]
struct ResultRow<'a> {
    id: &'a str,
    status: &'static str,
    bmr_kcal: Option<i64>,
    tdee_kcal: Option<i64>,
    protein_g: Option<i64>,
    carbs_g: Option<i64>,
    fat_g: Option<i64>,
    protein_pct: Option<i64>,
    carbs_pct: Option<i64>,
    fat_pct: Option<i64>,
    error: Option<&'a str>,
}

impl<'a> From<&'a BatchOutcome> for ResultRow<'a> {
    fn from(outcome: &'a BatchOutcome) -> Self {
        let r = outcome.results.as_ref();
        Self {
            id: &outcome.id,
            status: if outcome.is_success() { "ok" } else { "rejected" },
            bmr_kcal: r.map(|r| r.bmr),
            tdee_kcal: r.map(|r| r.tdee),
            protein_g: r.map(|r| r.protein_grams),
            carbs_g: r.map(|r| r.carb_grams),
            fat_g: r.map(|r| r.fat_grams),
            protein_pct: r.map(|r| r.macro_percent.protein),
            carbs_pct: r.map(|r| r.macro_percent.carbs),
            fat_pct: r.map(|r| r.macro_percent.fat),
            error: outcome.error.as_deref(),
        }
    }
}

/// Write batch outcomes as CSV to any writer
pub fn write_batch<W: Write>(summary: &BatchSummary, writer: W) -> std::result::Result<(), csv::Error> {
    let mut writer = Writer::from_writer(writer);
    for outcome in &summary.outcomes {
        writer.serialize(ResultRow::from(outcome))?;
    }
    writer.flush()?;
    Ok(())
}

/// Export batch outcomes to a CSV file (suitable for spreadsheets)
pub fn export_batch<P: AsRef<Path>>(summary: &BatchSummary, output_path: P) -> Result<()> {
    let output_path = output_path.as_ref();
    let file = std::fs::File::create(output_path)?;
    write_batch(summary, file).map_err(|e| export_failed(output_path, e))?;
    Ok(())
}
