use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Biological sex used by the Mifflin-St Jeor equation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

impl Default for Sex {
    fn default() -> Self {
        Sex::Male
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sex::Male => write!(f, "Male"),
            Sex::Female => write!(f, "Female"),
        }
    }
}

impl FromStr for Sex {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" => Ok(Sex::Male),
            "female" | "f" => Ok(Sex::Female),
            _ => Err(format!("Invalid sex: {}", s)),
        }
    }
}

/// Chronic conditions the clinician can flag on a patient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionTag {
    Hypertension,
    #[serde(rename = "diabetes_t2")]
    DiabetesT2,
    Ckd,
    Gout,
    Dyslipidemia,
}

impl ConditionTag {
    pub const ALL: [ConditionTag; 5] = [
        ConditionTag::Hypertension,
        ConditionTag::DiabetesT2,
        ConditionTag::Ckd,
        ConditionTag::Gout,
        ConditionTag::Dyslipidemia,
    ];

    /// Key used in forms, CSV files and JSON payloads
    pub fn key(&self) -> &'static str {
        match self {
            ConditionTag::Hypertension => "hypertension",
            ConditionTag::DiabetesT2 => "diabetes_t2",
            ConditionTag::Ckd => "ckd",
            ConditionTag::Gout => "gout",
            ConditionTag::Dyslipidemia => "dyslipidemia",
        }
    }
}

impl fmt::Display for ConditionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ConditionTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        ConditionTag::ALL
            .into_iter()
            .find(|tag| tag.key() == key)
            .ok_or_else(|| format!("Unknown condition: {}", s))
    }
}

/// Chronic kidney disease stage (KDIGO G1-G5, with 3 split into 3a/3b)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CkdStage {
    #[serde(rename = "1")]
    Stage1,
    #[serde(rename = "2")]
    Stage2,
    #[serde(rename = "3a")]
    Stage3a,
    #[serde(rename = "3b")]
    Stage3b,
    #[serde(rename = "4")]
    Stage4,
    #[serde(rename = "5")]
    Stage5,
}

impl CkdStage {
    pub const ALL: [CkdStage; 6] = [
        CkdStage::Stage1,
        CkdStage::Stage2,
        CkdStage::Stage3a,
        CkdStage::Stage3b,
        CkdStage::Stage4,
        CkdStage::Stage5,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            CkdStage::Stage1 => "1",
            CkdStage::Stage2 => "2",
            CkdStage::Stage3a => "3a",
            CkdStage::Stage3b => "3b",
            CkdStage::Stage4 => "4",
            CkdStage::Stage5 => "5",
        }
    }
}

impl fmt::Display for CkdStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for CkdStage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        CkdStage::ALL
            .into_iter()
            .find(|stage| stage.key() == key)
            .ok_or_else(|| format!("Invalid CKD stage: {}", s))
    }
}

/// Blood pressure readings in mmHg
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HypertensionDetails {
    pub systolic: Option<f64>,
    pub diastolic: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiabetesDetails {
    /// Glycated haemoglobin, percent
    pub hba1c: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CkdDetails {
    pub stage: Option<CkdStage>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GoutDetails {
    /// Serum uric acid, mg/dL
    pub uric_acid: Option<f64>,
}

/// Lipid panel, all values in mg/dL
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DyslipidemiaDetails {
    pub ldl: Option<f64>,
    pub hdl: Option<f64>,
    pub triglycerides: Option<f64>,
}

/// Optional clinical measurements attached to flagged conditions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConditionDetails {
    pub hypertension: Option<HypertensionDetails>,
    pub diabetes_t2: Option<DiabetesDetails>,
    pub ckd: Option<CkdDetails>,
    pub gout: Option<GoutDetails>,
    pub dyslipidemia: Option<DyslipidemiaDetails>,
}

/// Patient inputs for a single calculation request
///
/// `age`, `weight_kg` and `height_cm` are optional at the type level so that a
/// half-filled form can be represented; the calculator rejects it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatientData {
    /// Age in years
    pub age: Option<f64>,

    pub sex: Sex,

    /// Body weight in kilograms
    pub weight_kg: Option<f64>,

    /// Height in centimeters
    pub height_cm: Option<f64>,

    /// Key into the activity reference table
    pub activity_level: String,

    /// Key into the stress reference table
    pub stress_factor: String,

    /// Key into the protein-need reference table
    pub protein_need: String,

    pub conditions: Vec<ConditionTag>,

    pub condition_details: ConditionDetails,
}

impl PatientData {
    /// Build patient data with the three required biometrics filled in
    pub fn new(age: f64, sex: Sex, weight_kg: f64, height_cm: f64) -> Self {
        Self {
            age: Some(age),
            sex,
            weight_kg: Some(weight_kg),
            height_cm: Some(height_cm),
            ..Self::default()
        }
    }

    pub fn with_activity(mut self, key: impl Into<String>) -> Self {
        self.activity_level = key.into();
        self
    }

    pub fn with_stress(mut self, key: impl Into<String>) -> Self {
        self.stress_factor = key.into();
        self
    }

    pub fn with_protein_need(mut self, key: impl Into<String>) -> Self {
        self.protein_need = key.into();
        self
    }

    /// Flag a condition; flagging the same tag twice is a no-op
    pub fn with_condition(mut self, tag: ConditionTag) -> Self {
        if !self.conditions.contains(&tag) {
            self.conditions.push(tag);
        }
        self
    }

    pub fn has_condition(&self, tag: ConditionTag) -> bool {
        self.conditions.contains(&tag)
    }
}

/// Macronutrient share of total macro-derived calories, in whole percent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacroPercent {
    pub protein: i64,
    pub carbs: i64,
    pub fat: i64,
}

impl MacroPercent {
    pub fn total(&self) -> i64 {
        self.protein + self.carbs + self.fat
    }
}

/// Energy and macronutrient targets derived from a `PatientData`
///
/// Energy values are kcal/day, masses are g/day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NutritionResults {
    pub bmr: i64,
    pub tdee: i64,
    pub protein_grams: i64,
    pub fat_grams: i64,
    pub carb_grams: i64,
    pub macro_percent: MacroPercent,
}
