use nutrirs::error::ValidationError;
use nutrirs::models::{PatientData, Sex};
use nutrirs::reference::{ACTIVITY_LEVELS, PROTEIN_NEEDS, STRESS_FACTORS};
use nutrirs::{compute, NutritionCalculator};
use proptest::prelude::*;

/// End-to-end checks of the calculator against hand-computed reference values

#[cfg(test)]
mod calculator_tests {
    use super::*;

    fn reference_male() -> PatientData {
        PatientData::new(30.0, Sex::Male, 70.0, 175.0)
            .with_activity("sedentary")
            .with_stress("none")
            .with_protein_need("normal")
    }

    #[test]
    fn test_reference_male() {
        let results = compute(&reference_male()).unwrap();

        assert_eq!(results.bmr, 1649);
        assert_eq!(results.tdee, 1979);
        assert_eq!(results.protein_grams, 63);
        assert_eq!(results.fat_grams, 58);
        assert_eq!(results.carb_grams, 302);
        assert_eq!(results.macro_percent.protein, 13);
        assert_eq!(results.macro_percent.carbs, 61);
        assert_eq!(results.macro_percent.fat, 26);
    }

    #[test]
    fn test_reference_female() {
        let mut patient = reference_male();
        patient.sex = Sex::Female;
        let results = compute(&patient).unwrap();

        assert_eq!(results.bmr, 1483);
        assert_eq!(results.tdee, 1779);
        assert_eq!(results.protein_grams, 63);
        assert_eq!(results.fat_grams, 51);
        assert_eq!(results.carb_grams, 267);
        assert_eq!(
            (
                results.macro_percent.protein,
                results.macro_percent.carbs,
                results.macro_percent.fat
            ),
            (14, 60, 26)
        );
    }

    #[test]
    fn test_unknown_protein_key_uses_default_multiplier() {
        let patient = reference_male().with_protein_need("extreme");
        let results = compute(&patient).unwrap();

        // 70 kg x 1.2 g/kg
        assert_eq!(results.protein_grams, 84);
        assert_eq!(results.fat_grams, 55);
        assert_eq!(results.carb_grams, 287);
        assert_eq!(results.macro_percent.protein, 17);
        assert_eq!(results.macro_percent.carbs, 58);
        assert_eq!(results.macro_percent.fat, 25);
    }

    #[test]
    fn test_unknown_activity_and_stress_match_defaults() {
        let baseline = compute(&reference_male()).unwrap();

        let unknown = reference_male().with_activity("couch").with_stress("");
        assert_eq!(compute(&unknown).unwrap(), baseline);
    }

    #[test]
    fn test_protein_equal_to_tdee_leaves_nothing_for_fat_and_carbs() {
        // BMR 300, TDEE 360, protein 100 kg x 0.9 g/kg x 4 = 360 kcal
        let patient = PatientData::new(266.0, Sex::Male, 100.0, 100.0)
            .with_activity("sedentary")
            .with_stress("none")
            .with_protein_need("normal");

        let breakdown = NutritionCalculator::breakdown(&patient).unwrap();
        assert_eq!(breakdown.remaining_calories, 0.0);

        let results = breakdown.to_results();
        assert_eq!(results.bmr, 300);
        assert_eq!(results.tdee, 360);
        assert_eq!(results.fat_grams, 0);
        assert_eq!(results.carb_grams, 0);
        assert_eq!(results.macro_percent.protein, 100);
        assert_eq!(results.macro_percent.carbs, 0);
        assert_eq!(results.macro_percent.fat, 0);
    }

    #[test]
    fn test_protein_above_tdee_yields_negative_macros() {
        let patient = PatientData::new(120.0, Sex::Female, 50.0, 80.0)
            .with_activity("sedentary")
            .with_stress("none")
            .with_protein_need("very_high");

        let breakdown = NutritionCalculator::breakdown(&patient).unwrap();
        assert!(breakdown.remaining_calories < 0.0);

        let results = breakdown.to_results();
        assert_eq!(results.bmr, 239);
        assert_eq!(results.protein_grams, 110);
        assert_eq!(results.fat_grams, -5);
        assert_eq!(results.carb_grams, -27);
        assert_eq!(results.macro_percent.protein, 153);
        assert_eq!(results.macro_percent.carbs, -37);
        assert_eq!(results.macro_percent.fat, -16);
    }

    #[test]
    fn test_zero_bmr_leaves_percentages_unguarded() {
        // 10 x 10 + 6.25 x 16 - 5 x 41 + 5 = 0
        let patient = PatientData::new(41.0, Sex::Male, 10.0, 16.0)
            .with_activity("sedentary")
            .with_stress("none")
            .with_protein_need("normal");

        let breakdown = NutritionCalculator::breakdown(&patient).unwrap();
        assert_eq!(breakdown.bmr, 0.0);
        assert!(breakdown.total_macro_calories().abs() < 1e-12);

        let results = breakdown.to_results();
        assert_eq!(results.bmr, 0);
        assert_eq!(results.tdee, 0);
        assert!(results.macro_percent.protein.abs() > 1_000_000_000);
    }

    #[test]
    fn test_missing_fields_are_rejected_in_order() {
        let mut patient = reference_male();
        patient.age = None;
        patient.weight_kg = Some(0.0);
        assert_eq!(
            compute(&patient),
            Err(ValidationError::MissingField { field: "age" })
        );

        patient.age = Some(30.0);
        assert_eq!(
            compute(&patient),
            Err(ValidationError::MissingField { field: "weight_kg" })
        );

        patient.weight_kg = Some(70.0);
        patient.height_cm = Some(f64::NAN);
        assert_eq!(
            compute(&patient),
            Err(ValidationError::MissingField { field: "height_cm" })
        );
    }

    #[test]
    fn test_no_range_validation_beyond_presence() {
        let patient = PatientData::new(30.0, Sex::Male, 70.0, -175.0);
        assert!(compute(&patient).is_ok());
    }

    #[test]
    fn test_conditions_do_not_change_results() {
        use nutrirs::models::ConditionTag;

        let plain = compute(&reference_male()).unwrap();
        let with_conditions = reference_male()
            .with_condition(ConditionTag::Ckd)
            .with_condition(ConditionTag::Hypertension);
        assert_eq!(compute(&with_conditions).unwrap(), plain);
    }
}

fn table_key(keys: Vec<&'static str>) -> impl Strategy<Value = &'static str> {
    proptest::sample::select(keys)
}

prop_compose! {
    fn adult_patient()(
        age in 18.0f64..90.0,
        male in any::<bool>(),
        weight in 40.0f64..150.0,
        height in 140.0f64..200.0,
        activity in table_key(ACTIVITY_LEVELS.keys().collect()),
        stress in table_key(STRESS_FACTORS.keys().collect()),
        protein in table_key(PROTEIN_NEEDS.keys().collect()),
    ) -> PatientData {
        let sex = if male { Sex::Male } else { Sex::Female };
        PatientData::new(age, sex, weight, height)
            .with_activity(activity)
            .with_stress(stress)
            .with_protein_need(protein)
    }
}

proptest! {
    #[test]
    fn prop_percentages_sum_to_about_100(patient in adult_patient()) {
        let results = compute(&patient).unwrap();
        let total = results.macro_percent.total();
        prop_assert!((99..=101).contains(&total), "percent total {}", total);
    }

    #[test]
    fn prop_adult_ranges_give_non_negative_macros(patient in adult_patient()) {
        let results = compute(&patient).unwrap();
        prop_assert!(results.fat_grams >= 0);
        prop_assert!(results.carb_grams >= 0);
        prop_assert!(results.tdee >= results.bmr);
    }

    #[test]
    fn prop_compute_is_deterministic(patient in adult_patient()) {
        prop_assert_eq!(compute(&patient).unwrap(), compute(&patient).unwrap());
    }

    #[test]
    fn prop_sex_shifts_bmr_by_166(patient in adult_patient()) {
        let mut male = patient.clone();
        male.sex = Sex::Male;
        let mut female = patient;
        female.sex = Sex::Female;

        let male_bmr = NutritionCalculator::breakdown(&male).unwrap().bmr;
        let female_bmr = NutritionCalculator::breakdown(&female).unwrap().bmr;
        prop_assert!((male_bmr - female_bmr - 166.0).abs() < 1e-9);
    }

    #[test]
    fn prop_fat_and_carb_energy_split_30_70(patient in adult_patient()) {
        let b = NutritionCalculator::breakdown(&patient).unwrap();
        prop_assert!((b.fat_calories - 0.3 * b.remaining_calories).abs() < 1e-9);
        prop_assert!((b.fat_calories + b.carb_calories - b.remaining_calories).abs() < 1e-6);
        prop_assert!((b.total_macro_calories() - b.tdee).abs() < 1e-6);
    }
}
