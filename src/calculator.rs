use crate::error::ValidationError;
use crate::models::{MacroPercent, NutritionResults, PatientData, Sex};
use crate::reference::{lookup, ACTIVITY_LEVELS, PROTEIN_NEEDS, STRESS_FACTORS};
use serde::Serialize;

/// Energy density of protein and carbohydrate, kcal per gram
pub const KCAL_PER_GRAM_PROTEIN: f64 = 4.0;
pub const KCAL_PER_GRAM_CARB: f64 = 4.0;
/// Energy density of fat, kcal per gram
pub const KCAL_PER_GRAM_FAT: f64 = 9.0;

/// Share of non-protein calories assigned to fat; carbohydrate takes the rest
pub const FAT_SHARE: f64 = 0.30;
pub const CARB_SHARE: f64 = 0.70;

/// Unrounded intermediate values of a calculation
///
/// Every field keeps full `f64` precision; rounding happens only in
/// [`EnergyBreakdown::to_results`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EnergyBreakdown {
    pub bmr: f64,
    pub activity_multiplier: f64,
    pub stress_multiplier: f64,
    pub tdee: f64,
    pub protein_grams: f64,
    pub protein_calories: f64,
    /// TDEE left after protein; negative when protein alone exceeds TDEE
    pub remaining_calories: f64,
    pub fat_calories: f64,
    pub carb_calories: f64,
    pub fat_grams: f64,
    pub carb_grams: f64,
}

impl EnergyBreakdown {
    pub fn total_macro_calories(&self) -> f64 {
        self.protein_calories + self.fat_calories + self.carb_calories
    }

    /// Round every displayed value half-up into the output structure
    pub fn to_results(&self) -> NutritionResults {
        let total = self.total_macro_calories();
        let percent = |calories: f64| round_half_up(calories / total * 100.0);

        NutritionResults {
            bmr: round_half_up(self.bmr),
            tdee: round_half_up(self.tdee),
            protein_grams: round_half_up(self.protein_grams),
            fat_grams: round_half_up(self.fat_grams),
            carb_grams: round_half_up(self.carb_grams),
            macro_percent: MacroPercent {
                protein: percent(self.protein_calories),
                carbs: percent(self.carb_calories),
                fat: percent(self.fat_calories),
            },
        }
    }
}

/// Deterministic energy and macronutrient calculator
///
/// Stateless and free of I/O; safe to call from any number of threads.
pub struct NutritionCalculator;

impl NutritionCalculator {
    /// Compute rounded nutrition targets for a patient
    pub fn compute(patient: &PatientData) -> Result<NutritionResults, ValidationError> {
        Self::breakdown(patient).map(|breakdown| breakdown.to_results())
    }

    /// Run the full calculation without the final rounding step
    pub fn breakdown(patient: &PatientData) -> Result<EnergyBreakdown, ValidationError> {
        let age = require(patient.age, "age")?;
        let weight_kg = require(patient.weight_kg, "weight_kg")?;
        let height_cm = require(patient.height_cm, "height_cm")?;

        let bmr = Self::mifflin_st_jeor(weight_kg, height_cm, age, patient.sex);

        let activity_multiplier = lookup(&ACTIVITY_LEVELS, &patient.activity_level);
        let stress_multiplier = lookup(&STRESS_FACTORS, &patient.stress_factor);
        let tdee = bmr * activity_multiplier * stress_multiplier;

        let protein_grams = weight_kg * lookup(&PROTEIN_NEEDS, &patient.protein_need);
        let protein_calories = protein_grams * KCAL_PER_GRAM_PROTEIN;

        // Not clamped: protein can exceed TDEE for high-stress, high-protein patients
        let remaining_calories = tdee - protein_calories;
        let fat_calories = remaining_calories * FAT_SHARE;
        let carb_calories = remaining_calories * CARB_SHARE;

        Ok(EnergyBreakdown {
            bmr,
            activity_multiplier,
            stress_multiplier,
            tdee,
            protein_grams,
            protein_calories,
            remaining_calories,
            fat_calories,
            carb_calories,
            fat_grams: fat_calories / KCAL_PER_GRAM_FAT,
            carb_grams: carb_calories / KCAL_PER_GRAM_CARB,
        })
    }

    /// Basal Metabolic Rate by the Mifflin-St Jeor equation (1990)
    ///
    /// BMR = 10 x weight_kg + 6.25 x height_cm - 5 x age + s,
    /// where s = +5 for men and -161 for women.
    pub fn mifflin_st_jeor(weight_kg: f64, height_cm: f64, age: f64, sex: Sex) -> f64 {
        let sex_constant = match sex {
            Sex::Male => 5.0,
            Sex::Female => -161.0,
        };

        10.0 * weight_kg + 6.25 * height_cm - 5.0 * age + sex_constant
    }
}

/// Convenience wrapper around [`NutritionCalculator::compute`]
pub fn compute(patient: &PatientData) -> Result<NutritionResults, ValidationError> {
    NutritionCalculator::compute(patient)
}

/// Round to the nearest integer, ties toward positive infinity
pub fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

fn require(value: Option<f64>, field: &'static str) -> Result<f64, ValidationError> {
    match value {
        Some(v) if v != 0.0 && !v.is_nan() => Ok(v),
        _ => Err(ValidationError::MissingField { field }),
    }
}
