use crate::batch::BatchSummary;
use crate::error::Result;
use crate::models::NutritionResults;
use std::io::Write;
use std::path::Path;

/// Export a batch summary as a human-readable text report
pub fn export_batch<P: AsRef<Path>>(summary: &BatchSummary, output_path: P) -> Result<()> {
    let mut file = std::fs::File::create(output_path)?;
    write_batch(summary, &mut file)?;
    Ok(())
}

pub fn write_batch<W: Write>(summary: &BatchSummary, out: &mut W) -> std::io::Result<()> {
    let rule = "=".repeat(60);

    writeln!(out, "{}", rule)?;
    writeln!(out, "NUTRITION REQUIREMENTS REPORT")?;
    writeln!(out, "{}", rule)?;
    writeln!(out)?;

    writeln!(out, "Run: {}", summary.run_id)?;
    writeln!(out, "Patients: {}", summary.total)?;
    writeln!(out, "Calculated: {}", summary.successful)?;
    writeln!(out, "Rejected: {}", summary.failed)?;
    writeln!(out)?;

    for outcome in &summary.outcomes {
        writeln!(out, "Patient {}", outcome.id)?;
        writeln!(out, "{}", "-".repeat(40))?;
        match (&outcome.results, &outcome.error) {
            (Some(results), _) => write_results(results, out)?,
            (None, Some(error)) => writeln!(out, "Not calculated: {}", error)?,
            (None, None) => writeln!(out, "Not calculated")?,
        }
        writeln!(out)?;
    }

    Ok(())
}

/// Write one patient's results block
pub fn write_results<W: Write>(results: &NutritionResults, out: &mut W) -> std::io::Result<()> {
    writeln!(out, "BMR: {} kcal/day", results.bmr)?;
    writeln!(out, "TDEE: {} kcal/day", results.tdee)?;
    writeln!(
        out,
        "Protein: {} g/day ({}%)",
        results.protein_grams, results.macro_percent.protein
    )?;
    writeln!(
        out,
        "Carbohydrate: {} g/day ({}%)",
        results.carb_grams, results.macro_percent.carbs
    )?;
    writeln!(
        out,
        "Fat: {} g/day ({}%)",
        results.fat_grams, results.macro_percent.fat
    )?;
    Ok(())
}
