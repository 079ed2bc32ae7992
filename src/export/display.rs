//! Terminal tables for results, batches and reference data

use crate::batch::BatchSummary;
use crate::models::NutritionResults;
use crate::reference::ReferenceEntry;
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct ResultLine {
    #[tabled(rename = "Measure")]
    measure: &'static str,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "% of energy")]
    share: String,
}

#[derive(Tabled)]
struct BatchLine<'a> {
    #[tabled(rename = "ID")]
    id: &'a str,
    #[tabled(rename = "BMR")]
    bmr: String,
    #[tabled(rename = "TDEE")]
    tdee: String,
    #[tabled(rename = "Protein g")]
    protein: String,
    #[tabled(rename = "Carbs g")]
    carbs: String,
    #[tabled(rename = "Fat g")]
    fat: String,
    #[tabled(rename = "Note")]
    note: &'a str,
}

#[derive(Tabled)]
struct ReferenceLine {
    #[tabled(rename = "Key")]
    key: &'static str,
    #[tabled(rename = "Label")]
    label: &'static str,
    #[tabled(rename = "Multiplier")]
    multiplier: String,
}

/// Results of one calculation as a table
pub fn results_table(results: &NutritionResults) -> String {
    let pct = |value: i64| format!("{}%", value);
    let lines = vec![
        ResultLine {
            measure: "BMR",
            value: format!("{} kcal/day", results.bmr),
            share: String::new(),
        },
        ResultLine {
            measure: "TDEE",
            value: format!("{} kcal/day", results.tdee),
            share: String::new(),
        },
        ResultLine {
            measure: "Protein",
            value: format!("{} g/day", results.protein_grams),
            share: pct(results.macro_percent.protein),
        },
        ResultLine {
            measure: "Carbohydrate",
            value: format!("{} g/day", results.carb_grams),
            share: pct(results.macro_percent.carbs),
        },
        ResultLine {
            measure: "Fat",
            value: format!("{} g/day", results.fat_grams),
            share: pct(results.macro_percent.fat),
        },
    ];

    Table::new(lines).with(Style::rounded()).to_string()
}

/// One row per batch outcome; rejected rows show their validation message
pub fn batch_table(summary: &BatchSummary) -> String {
    let lines: Vec<BatchLine<'_>> = summary
        .outcomes
        .iter()
        .map(|outcome| {
            let cell = |f: fn(&NutritionResults) -> i64| {
                outcome
                    .results
                    .as_ref()
                    .map_or_else(|| "-".to_string(), |r| f(r).to_string())
            };
            BatchLine {
                id: &outcome.id,
                bmr: cell(|r| r.bmr),
                tdee: cell(|r| r.tdee),
                protein: cell(|r| r.protein_grams),
                carbs: cell(|r| r.carb_grams),
                fat: cell(|r| r.fat_grams),
                note: outcome.error.as_deref().unwrap_or(""),
            }
        })
        .collect();

    Table::new(lines).with(Style::rounded()).to_string()
}

/// Reference entries with their multipliers, `-` for label-only entries
pub fn reference_table(entries: &[ReferenceEntry]) -> String {
    let lines: Vec<ReferenceLine> = entries
        .iter()
        .map(|entry| ReferenceLine {
            key: entry.key,
            label: entry.label,
            multiplier: entry
                .multiplier
                .map_or_else(|| "-".to_string(), |m| format!("x{:.3}", m)),
        })
        .collect();

    Table::new(lines).with(Style::rounded()).to_string()
}
