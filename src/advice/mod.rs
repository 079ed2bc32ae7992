//! Dietary advice from an external language model
//!
//! The calculator hands its results to an [`AdviceProvider`] together with
//! the patient data. A request is a single call: it succeeds with free text
//! or fails, and is never retried.

mod gemini;
pub mod prompt;

pub use gemini::GeminiAdvisor;
pub use prompt::{build_advice_prompt, format_condition_details};

use async_trait::async_trait;
use tracing::{info, instrument, warn};

use crate::error::AdviceError;
use crate::models::{NutritionResults, PatientData};

/// A text-generation backend that turns a prompt into counselling text
#[async_trait]
pub trait AdviceProvider: Send + Sync {
    /// Short provider identifier used in logs
    fn name(&self) -> &'static str;

    /// Send one prompt and return the generated text
    async fn generate(&self, prompt: &str) -> Result<String, AdviceError>;
}

/// Build the prompt for a patient and ask `provider` for advice
///
/// Blank responses are reported as [`AdviceError::EmptyResponse`].
#[instrument(skip_all, fields(provider = provider.name()))]
pub async fn get_nutrition_advice(
    provider: &dyn AdviceProvider,
    patient: &PatientData,
    results: &NutritionResults,
) -> Result<String, AdviceError> {
    let prompt = build_advice_prompt(patient, results);

    match provider.generate(&prompt).await {
        Ok(text) if text.trim().is_empty() => {
            warn!("Advice provider returned blank text");
            Err(AdviceError::EmptyResponse)
        }
        Ok(text) => {
            info!(chars = text.len(), "Received nutrition advice");
            Ok(text)
        }
        Err(e) => {
            warn!(error = %e, "Advice request failed");
            Err(e)
        }
    }
}
