//! Reference tables mapping categorical selections to multipliers
//!
//! Each table declares its own default multiplier, so a lookup never fails:
//! an empty or unrecognized key resolves to that default.

use crate::models::{CkdStage, ConditionTag};
use serde::Serialize;

/// A single selectable option
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReferenceEntry {
    pub key: &'static str,
    pub label: &'static str,
    /// Absent for label-only tables
    pub multiplier: Option<f64>,
}

/// Immutable lookup table with a declared fallback multiplier
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReferenceTable {
    pub name: &'static str,
    pub entries: &'static [ReferenceEntry],
    pub default_multiplier: f64,
}

impl ReferenceTable {
    pub fn get(&self, key: &str) -> Option<&'static ReferenceEntry> {
        self.entries.iter().find(|entry| entry.key == key)
    }

    /// Multiplier for `key`, or the table default when the key is unknown
    pub fn multiplier(&self, key: &str) -> f64 {
        self.get(key)
            .and_then(|entry| entry.multiplier)
            .unwrap_or(self.default_multiplier)
    }

    pub fn label(&self, key: &str) -> Option<&'static str> {
        self.get(key).map(|entry| entry.label)
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|entry| entry.key)
    }
}

const fn entry(key: &'static str, label: &'static str, multiplier: f64) -> ReferenceEntry {
    ReferenceEntry {
        key,
        label,
        multiplier: Some(multiplier),
    }
}

const fn label_only(key: &'static str, label: &'static str) -> ReferenceEntry {
    ReferenceEntry {
        key,
        label,
        multiplier: None,
    }
}

/// Physical activity factor applied to BMR
pub static ACTIVITY_LEVELS: ReferenceTable = ReferenceTable {
    name: "activity",
    entries: &[
        entry("sedentary", "Sedentary (office work)", 1.2),
        entry("light", "Lightly active (1-3 days/week)", 1.375),
        entry("moderate", "Moderately active (3-5 days/week)", 1.55),
        entry("active", "Very active (6-7 days/week)", 1.725),
        entry("very_active", "Extremely active (physical labour)", 1.9),
    ],
    default_multiplier: 1.2,
};

/// Metabolic stress factor from illness or injury
pub static STRESS_FACTORS: ReferenceTable = ReferenceTable {
    name: "stress",
    entries: &[
        entry("none", "No stress or illness", 1.0),
        entry("mild", "Mild stress (minor surgery)", 1.2),
        entry("moderate", "Moderate stress (infection, fracture)", 1.4),
        entry("severe", "Severe stress (burns, multiple trauma)", 1.6),
        entry("critical", "Critical (sepsis, major burns)", 2.0),
    ],
    default_multiplier: 1.0,
};

/// Protein requirement in grams per kilogram of body weight
pub static PROTEIN_NEEDS: ReferenceTable = ReferenceTable {
    name: "protein",
    entries: &[
        entry("normal", "Normal (0.8 - 1.0 g/kg)", 0.9),
        entry("maintenance", "Maintenance, mild stress (1.0 - 1.2 g/kg)", 1.1),
        entry("moderate", "Moderate stress (1.2 - 1.5 g/kg)", 1.35),
        entry("high", "High, wound healing (1.5 - 2.0 g/kg)", 1.75),
        entry("very_high", "Very high, major burns (>2.0 g/kg)", 2.2),
    ],
    default_multiplier: 1.2,
};

pub static MEDICAL_CONDITIONS: &[ReferenceEntry] = &[
    label_only("hypertension", "Hypertension"),
    label_only("diabetes_t2", "Type 2 diabetes"),
    label_only("ckd", "Chronic kidney disease"),
    label_only("gout", "Gout"),
    label_only("dyslipidemia", "Dyslipidemia"),
];

pub static CKD_STAGES: &[ReferenceEntry] = &[
    label_only("1", "Stage 1"),
    label_only("2", "Stage 2"),
    label_only("3a", "Stage 3a"),
    label_only("3b", "Stage 3b"),
    label_only("4", "Stage 4"),
    label_only("5", "Stage 5"),
];

/// Total lookup: the multiplier for `key` in `table`, falling back to the
/// table's default
pub fn lookup(table: &ReferenceTable, key: &str) -> f64 {
    table.multiplier(key)
}

pub fn condition_label(tag: ConditionTag) -> &'static str {
    label_in(MEDICAL_CONDITIONS, tag.key())
}

pub fn ckd_stage_label(stage: CkdStage) -> &'static str {
    label_in(CKD_STAGES, stage.key())
}

fn label_in(entries: &'static [ReferenceEntry], key: &str) -> &'static str {
    entries
        .iter()
        .find(|entry| entry.key == key)
        .map(|entry| entry.label)
        .unwrap_or("Unknown")
}
