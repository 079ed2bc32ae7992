//! Prompt construction for the advice provider

use crate::models::{NutritionResults, PatientData};
use crate::reference::{ckd_stage_label, condition_label, ACTIVITY_LEVELS, STRESS_FACTORS};

/// Placeholder for a measurement the clinician left blank
const NOT_PROVIDED: &str = "not provided";

const COUNSELLING_INSTRUCTIONS: &str = r#"Based on the information above, **paying particular attention to the listed chronic conditions and clinical measurements**, provide specific dietary advice covering the following sections:

1.  **Nutrition Goals:** State the main goals of the diet (for example: meeting energy needs, supporting recovery, glycaemic control guided by HbA1c, blood pressure control, preserving kidney function...).
2.  **Meal Distribution:** Suggest how to split meals across the day (for example: 3 main meals and 2 snacks) to optimise absorption and keep energy steady.
3.  **Food Choices:**
    *   **Protein sources:** Give examples of good protein-rich foods (lean meat, fish, eggs, dairy, legumes...).
    *   **Carbohydrate sources:** Suggest complex, fibre-rich carbohydrates (brown rice, oats, sweet potato, vegetables...).
    *   **Fat sources:** Suggest healthy fat sources (avocado, nuts, olive oil, oily fish...).
4.  **Special Considerations:** Based on the clinical condition, **chronic conditions and the specific measurements**, give the key advice and the foods to avoid (for example: salt restriction for hypertension, glycaemic index for diabetes, protein and electrolyte control by stage for chronic kidney disease...).
5.  **Hydration:** Recommend a daily fluid intake and any other suitable fluids.

Present the answer professionally and clearly, using markdown with headings and lists so it is easy to follow."#;

/// Render one line per condition that carries at least one measurement
///
/// Returns an empty string when no details were entered.
pub fn format_condition_details(patient: &PatientData) -> String {
    let details = &patient.condition_details;
    let mut lines = Vec::new();

    if let Some(bp) = &details.hypertension {
        let (systolic, diastolic) = (measured(bp.systolic), measured(bp.diastolic));
        if systolic.is_some() || diastolic.is_some() {
            lines.push(format!(
                "- Hypertension: blood pressure {}/{} mmHg",
                or_not_provided(systolic),
                or_not_provided(diastolic)
            ));
        }
    }

    if let Some(hba1c) = measured(details.diabetes_t2.as_ref().and_then(|d| d.hba1c)) {
        lines.push(format!("- Type 2 diabetes: HbA1c {}%", hba1c));
    }

    if let Some(stage) = details.ckd.as_ref().and_then(|d| d.stage) {
        lines.push(format!("- Chronic kidney disease: {}", ckd_stage_label(stage)));
    }

    if let Some(uric_acid) = measured(details.gout.as_ref().and_then(|d| d.uric_acid)) {
        lines.push(format!("- Gout: uric acid {} mg/dL", uric_acid));
    }

    if let Some(lipids) = &details.dyslipidemia {
        let (ldl, hdl, triglycerides) = (
            measured(lipids.ldl),
            measured(lipids.hdl),
            measured(lipids.triglycerides),
        );
        if ldl.is_some() || hdl.is_some() || triglycerides.is_some() {
            lines.push(format!(
                "- Dyslipidemia: LDL {} mg/dL, HDL {} mg/dL, Triglycerides {} mg/dL",
                or_not_provided(ldl),
                or_not_provided(hdl),
                or_not_provided(triglycerides)
            ));
        }
    }

    lines.join("\n")
}

/// Build the full counselling prompt for a patient and their results
pub fn build_advice_prompt(patient: &PatientData, results: &NutritionResults) -> String {
    let activity = ACTIVITY_LEVELS
        .label(&patient.activity_level)
        .unwrap_or("Unknown");
    let stress = STRESS_FACTORS
        .label(&patient.stress_factor)
        .unwrap_or("Unknown");

    let conditions = patient
        .conditions
        .iter()
        .map(|tag| condition_label(*tag))
        .collect::<Vec<_>>()
        .join(", ");

    let mut prompt = String::new();
    prompt.push_str(
        "You are a clinical nutrition specialist. Based on the patient information and the \
         estimated nutritional needs below, write a detailed dietary counselling plan.\n\n",
    );

    prompt.push_str("### Patient Information\n");
    prompt.push_str(&format!("- **Age:** {}\n", or_not_provided(patient.age)));
    prompt.push_str(&format!("- **Sex:** {}\n", patient.sex));
    prompt.push_str(&format!("- **Weight:** {} kg\n", or_not_provided(patient.weight_kg)));
    prompt.push_str(&format!("- **Height:** {} cm\n", or_not_provided(patient.height_cm)));
    prompt.push_str(&format!("- **Activity level:** {}\n", activity));
    prompt.push_str(&format!("- **Clinical condition (stress factor):** {}\n", stress));
    prompt.push_str(&format!(
        "- **Chronic conditions:** {}\n",
        if conditions.is_empty() { "None" } else { conditions.as_str() }
    ));

    let details = format_condition_details(patient);
    if !details.is_empty() {
        prompt.push_str("\n### Chronic Condition Details\n");
        prompt.push_str(&details);
        prompt.push('\n');
    }

    prompt.push_str("\n### Estimated Nutritional Needs\n");
    prompt.push_str(&format!("- **Basal metabolic rate (BMR):** {} kcal/day\n", results.bmr));
    prompt.push_str(&format!("- **Total energy (TDEE):** {} kcal/day\n", results.tdee));
    prompt.push_str(&format!(
        "- **Protein:** {} g/day ({}%)\n",
        results.protein_grams, results.macro_percent.protein
    ));
    prompt.push_str(&format!(
        "- **Carbohydrate:** {} g/day ({}%)\n",
        results.carb_grams, results.macro_percent.carbs
    ));
    prompt.push_str(&format!(
        "- **Fat:** {} g/day ({}%)\n\n",
        results.fat_grams, results.macro_percent.fat
    ));

    prompt.push_str(COUNSELLING_INSTRUCTIONS);
    prompt.push('\n');

    prompt
}

/// A blank form field arrives as 0; treat it like an absent value
fn measured(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v != 0.0 && !v.is_nan())
}

fn or_not_provided(value: Option<f64>) -> String {
    match measured(value) {
        Some(v) => v.to_string(),
        None => NOT_PROVIDED.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        CkdDetails, CkdStage, ConditionTag, DiabetesDetails, DyslipidemiaDetails, GoutDetails,
        HypertensionDetails, MacroPercent, Sex,
    };

    fn sample_results() -> NutritionResults {
        NutritionResults {
            bmr: 1649,
            tdee: 1979,
            protein_grams: 63,
            fat_grams: 58,
            carb_grams: 302,
            macro_percent: MacroPercent { protein: 13, carbs: 61, fat: 26 },
        }
    }

    #[test]
    fn test_no_details_renders_empty() {
        let patient = PatientData::new(30.0, Sex::Male, 70.0, 175.0);
        assert_eq!(format_condition_details(&patient), "");
    }

    #[test]
    fn test_partial_blood_pressure_marks_missing_value() {
        let mut patient = PatientData::new(30.0, Sex::Male, 70.0, 175.0)
            .with_condition(ConditionTag::Hypertension);
        patient.condition_details.hypertension = Some(HypertensionDetails {
            systolic: Some(150.0),
            diastolic: None,
        });

        assert_eq!(
            format_condition_details(&patient),
            "- Hypertension: blood pressure 150/not provided mmHg"
        );
    }

    #[test]
    fn test_empty_detail_records_are_skipped() {
        let mut patient = PatientData::new(30.0, Sex::Male, 70.0, 175.0);
        patient.condition_details.hypertension = Some(HypertensionDetails::default());
        patient.condition_details.dyslipidemia = Some(DyslipidemiaDetails::default());
        patient.condition_details.ckd = Some(CkdDetails { stage: None });

        assert_eq!(format_condition_details(&patient), "");
    }

    #[test]
    fn test_zero_measurements_count_as_not_provided() {
        let mut patient = PatientData::new(30.0, Sex::Male, 70.0, 175.0);
        patient.condition_details.hypertension = Some(HypertensionDetails {
            systolic: Some(0.0),
            diastolic: Some(0.0),
        });
        patient.condition_details.diabetes_t2 = Some(DiabetesDetails { hba1c: Some(0.0) });
        patient.condition_details.gout = Some(GoutDetails { uric_acid: Some(0.0) });
        patient.condition_details.dyslipidemia = Some(DyslipidemiaDetails {
            ldl: Some(160.0),
            hdl: Some(0.0),
            triglycerides: None,
        });

        assert_eq!(
            format_condition_details(&patient),
            "- Dyslipidemia: LDL 160 mg/dL, HDL not provided mg/dL, Triglycerides not provided mg/dL"
        );

        patient.condition_details.hypertension = Some(HypertensionDetails {
            systolic: Some(0.0),
            diastolic: Some(95.0),
        });
        assert!(format_condition_details(&patient)
            .starts_with("- Hypertension: blood pressure not provided/95 mmHg\n"));
    }

    #[test]
    fn test_prompt_carries_every_field() {
        let mut patient = PatientData::new(62.0, Sex::Female, 58.5, 160.0)
            .with_activity("light")
            .with_stress("moderate")
            .with_protein_need("high")
            .with_condition(ConditionTag::Ckd)
            .with_condition(ConditionTag::Gout);
        patient.condition_details.ckd = Some(CkdDetails { stage: Some(CkdStage::Stage3b) });

        let prompt = build_advice_prompt(&patient, &sample_results());

        assert!(prompt.contains("- **Age:** 62"));
        assert!(prompt.contains("- **Sex:** Female"));
        assert!(prompt.contains("- **Weight:** 58.5 kg"));
        assert!(prompt.contains("- **Height:** 160 cm"));
        assert!(prompt.contains("Lightly active (1-3 days/week)"));
        assert!(prompt.contains("Moderate stress (infection, fracture)"));
        assert!(prompt.contains("Chronic kidney disease, Gout"));
        assert!(prompt.contains("### Chronic Condition Details\n- Chronic kidney disease: Stage 3b"));
        assert!(prompt.contains("1979 kcal/day"));
        assert!(prompt.contains("63 g/day (13%)"));
        assert!(prompt.contains("302 g/day (61%)"));
        assert!(prompt.contains("58 g/day (26%)"));
        assert!(prompt.contains("5.  **Hydration:**"));
    }

    #[test]
    fn test_prompt_unknown_keys_and_no_conditions() {
        let patient = PatientData::new(30.0, Sex::Male, 70.0, 175.0).with_activity("jogging");
        let prompt = build_advice_prompt(&patient, &sample_results());

        assert!(prompt.contains("- **Activity level:** Unknown"));
        assert!(prompt.contains("- **Clinical condition (stress factor):** Unknown"));
        assert!(prompt.contains("- **Chronic conditions:** None"));
        assert!(!prompt.contains("Chronic Condition Details"));
    }
}
