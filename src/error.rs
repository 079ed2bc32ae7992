//! Unified error hierarchy for NutriRS
//!
//! The calculator itself only ever produces [`ValidationError`]. Everything
//! else here belongs to the collaborators around it: the advice provider,
//! file import/export and configuration.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for all NutriRS operations
#[derive(Debug, Error)]
pub enum NutriError {
    /// Required patient data missing
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Advice generation failed
    #[error("Advice error: {0}")]
    Advice(#[from] AdviceError),

    /// Import/export errors
    #[error("Import/Export error: {0}")]
    ImportExport(#[from] ImportExportError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Patient data failed the calculator precondition
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// age, weight or height absent, zero or NaN
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },
}

impl ValidationError {
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::MissingField { field } => field,
        }
    }
}

/// Failures of the external advice-generation service
#[derive(Debug, Error)]
pub enum AdviceError {
    /// No API key configured
    #[error("API key not set: {env_var}")]
    MissingApiKey { env_var: String },

    /// Transport-level failure
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Service answered with a non-success status
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Service answered but carried no text
    #[error("No text response from advice service")]
    EmptyResponse,

    /// Response body could not be decoded
    #[error("Failed to parse response: {0}")]
    Parse(String),
}

/// Import and export errors
#[derive(Debug, Error)]
pub enum ImportExportError {
    /// Unsupported format
    #[error("Unsupported format: {format}")]
    UnsupportedFormat { format: String },

    /// Row-level parsing error
    #[error("Parse error in {format} at row {row}: {reason}")]
    ParseError {
        format: String,
        row: usize,
        reason: String,
    },

    /// Export failed
    #[error("Export failed to {path}: {reason}")]
    ExportFailed { path: PathBuf, reason: String },
}

/// Result type alias for NutriRS operations
pub type Result<T> = std::result::Result<T, NutriError>;

impl NutriError {
    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            NutriError::Validation(_) => ErrorSeverity::Warning,
            NutriError::ImportExport(ImportExportError::ParseError { .. }) => ErrorSeverity::Warning,
            NutriError::Advice(AdviceError::MissingApiKey { .. }) => ErrorSeverity::Critical,
            NutriError::Configuration(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::Error,
        }
    }

    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            NutriError::Validation(err) => format!(
                "Please enter the patient's {} before calculating.",
                err.field().replace('_', " ")
            ),
            NutriError::Advice(AdviceError::MissingApiKey { env_var }) => {
                format!("Advice service is not configured. Set {} and try again.", env_var)
            }
            NutriError::Advice(_) => "Failed to get nutrition advice from AI.".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Misconfiguration that prevents the command from running at all
    Critical,
    /// Error that prevents operation but system can continue
    Error,
    /// Recoverable by correcting the input
    Warning,
}

impl ErrorSeverity {
    /// Convert to tracing level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            ErrorSeverity::Critical => tracing::Level::ERROR,
            ErrorSeverity::Error => tracing::Level::ERROR,
            ErrorSeverity::Warning => tracing::Level::WARN,
        }
    }
}
