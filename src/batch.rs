//! Parallel batch calculation using rayon
//!
//! Each patient is computed independently; a row that fails validation is
//! reported in its outcome and never stops the rest of the batch.

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::Serialize;
use std::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

use crate::calculator::NutritionCalculator;
use crate::config::BatchSettings;
use crate::error::{NutriError, Result};
use crate::import::PatientRecord;
use crate::models::NutritionResults;

/// Result of a single patient calculation within a batch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchOutcome {
    pub id: String,
    pub results: Option<NutritionResults>,
    /// Validation message when the calculation was rejected
    pub error: Option<String>,
}

impl BatchOutcome {
    pub fn is_success(&self) -> bool {
        self.results.is_some()
    }
}

/// Summary of a batch run
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub run_id: Uuid,
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub duration_ms: u128,
    /// Outcomes in input order
    pub outcomes: Vec<BatchOutcome>,
}

impl BatchSummary {
    /// Check if every patient was calculated
    pub fn is_fully_successful(&self) -> bool {
        self.failed == 0
    }

    /// Get human-readable summary
    pub fn to_string_pretty(&self) -> String {
        format!(
            "Batch Summary\n  \
             Patients: {}\n  \
             Calculated: {}\n  \
             Rejected: {}\n  \
             Total Time: {:.2}s",
            self.total,
            self.successful,
            self.failed,
            self.duration_ms as f64 / 1000.0
        )
    }
}

/// Runs the calculator over many patients on a dedicated thread pool
pub struct BatchCalculator {
    pub settings: BatchSettings,
}

impl Default for BatchCalculator {
    fn default() -> Self {
        Self::with_settings(BatchSettings::default())
    }
}

impl BatchCalculator {
    pub fn with_settings(settings: BatchSettings) -> Self {
        Self { settings }
    }

    /// Calculate every record, preserving input order in the summary
    pub fn run(&self, records: &[PatientRecord]) -> Result<BatchSummary> {
        let start_time = Instant::now();
        info!(patients = records.len(), "Starting batch calculation");

        let mut builder = rayon::ThreadPoolBuilder::new();
        if let Some(num_threads) = self.settings.num_threads {
            builder = builder.num_threads(num_threads);
        }
        let pool = builder
            .build()
            .map_err(|e| NutriError::Configuration(format!("Failed to create thread pool: {}", e)))?;

        let progress = self.progress_bar(records.len());

        let outcomes: Vec<BatchOutcome> = pool.install(|| {
            records
                .par_iter()
                .map(|record| {
                    let outcome = Self::calculate_one(record);
                    if let Some(pb) = &progress {
                        pb.inc(1);
                    }
                    outcome
                })
                .collect()
        });

        if let Some(pb) = progress {
            pb.finish_with_message("Complete");
        }

        let successful = outcomes.iter().filter(|o| o.is_success()).count();
        let summary = BatchSummary {
            run_id: Uuid::new_v4(),
            total: records.len(),
            successful,
            failed: records.len() - successful,
            duration_ms: start_time.elapsed().as_millis(),
            outcomes,
        };

        info!("{}", summary.to_string_pretty());
        Ok(summary)
    }

    fn calculate_one(record: &PatientRecord) -> BatchOutcome {
        match NutritionCalculator::compute(&record.patient) {
            Ok(results) => BatchOutcome {
                id: record.id.clone(),
                results: Some(results),
                error: None,
            },
            Err(e) => {
                debug!(id = %record.id, error = %e, "Patient rejected");
                BatchOutcome {
                    id: record.id.clone(),
                    results: None,
                    error: Some(e.to_string()),
                }
            }
        }
    }

    fn progress_bar(&self, len: usize) -> Option<ProgressBar> {
        if !self.settings.show_progress {
            return None;
        }

        let pb = ProgressBar::new(len as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ({msg})")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        Some(pb)
    }
}
