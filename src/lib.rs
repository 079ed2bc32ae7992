// Library interface for NutriRS modules
// This allows integration tests and benchmarks to access the core functionality

pub mod advice;
pub mod batch;
pub mod calculator;
pub mod config;
pub mod error;
pub mod export;
pub mod import;
pub mod logging;
pub mod models;
pub mod reference;

// Re-export commonly used types for convenience
pub use models::*;
pub use calculator::{compute, round_half_up, EnergyBreakdown, NutritionCalculator};
pub use reference::{lookup, ReferenceEntry, ReferenceTable};
pub use advice::{get_nutrition_advice, AdviceProvider, GeminiAdvisor};
pub use batch::{BatchCalculator, BatchOutcome, BatchSummary};
pub use config::AppConfig;
pub use error::{AdviceError, NutriError, Result, ValidationError};
pub use logging::{LogConfig, LogFormat, LogLevel};
