use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::logging::LogConfig;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application metadata
    pub metadata: ConfigMetadata,

    /// Reference-table keys used when a request leaves them out
    #[serde(default)]
    pub defaults: CalculationDefaults,

    /// Advice service settings
    #[serde(default)]
    pub advice: AdviceSettings,

    /// Batch calculation settings
    #[serde(default)]
    pub batch: BatchSettings,

    #[serde(default)]
    pub logging: LogConfig,
}

/// Configuration metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigMetadata {
    /// Configuration format version
    pub version: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalculationDefaults {
    pub activity_level: String,
    pub stress_factor: String,
    pub protein_need: String,
}

/// Settings for the LLM advice provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdviceSettings {
    /// Model name passed to the generateContent endpoint
    pub model: String,

    /// Environment variable holding the API key
    pub api_key_env: String,

    /// Checked when `api_key_env` is unset
    pub fallback_api_key_env: Option<String>,

    /// Base URL of the Generative Language API
    pub base_url: String,

    pub temperature: Option<f32>,

    pub max_output_tokens: Option<u32>,

    /// Whole-request timeout
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchSettings {
    /// Worker threads (None uses one per CPU)
    pub num_threads: Option<usize>,

    /// Show a progress bar while calculating
    pub show_progress: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        let now = Utc::now();

        AppConfig {
            metadata: ConfigMetadata {
                version: "1.0".to_string(),
                created_at: now,
                updated_at: now,
            },
            defaults: CalculationDefaults::default(),
            advice: AdviceSettings::default(),
            batch: BatchSettings::default(),
            logging: LogConfig::default(),
        }
    }
}

impl Default for CalculationDefaults {
    fn default() -> Self {
        CalculationDefaults {
            activity_level: "sedentary".to_string(),
            stress_factor: "none".to_string(),
            protein_need: "maintenance".to_string(),
        }
    }
}

impl Default for AdviceSettings {
    fn default() -> Self {
        AdviceSettings {
            model: "gemini-3-flash-preview".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            fallback_api_key_env: Some("API_KEY".to_string()),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            temperature: None,
            max_output_tokens: None,
            timeout_seconds: 60,
        }
    }
}

impl Default for BatchSettings {
    fn default() -> Self {
        BatchSettings {
            num_threads: None,
            show_progress: true,
        }
    }
}

impl AdviceSettings {
    /// Read the API key from the configured environment variables
    pub fn resolve_api_key(&self) -> Option<String> {
        std::iter::once(self.api_key_env.as_str())
            .chain(self.fallback_api_key_env.as_deref())
            .filter_map(|name| std::env::var(name).ok())
            .find(|key| !key.trim().is_empty())
    }
}

/// Configuration management implementation
impl AppConfig {
    /// Load configuration from TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: AppConfig = toml::from_str(&content)
            .with_context(|| "Failed to parse TOML configuration")?;

        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.metadata.updated_at = Utc::now();

        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }

        let toml_content = toml::to_string_pretty(self)
            .with_context(|| "Failed to serialize configuration to TOML")?;

        fs::write(&path, toml_content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        Ok(())
    }

    /// Get default configuration file path
    pub fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".nutrirs")
            .join("config.toml")
    }

    /// Load configuration from `path`, or from the default location
    ///
    /// Only a missing file at the default location falls back to defaults.
    /// An explicit path must exist, and a file that exists must parse.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(path) => return Self::load_from_file(path),
            None => Self::default_config_path(),
        };

        match Self::load_from_file(&config_path) {
            Ok(config) => Ok(config),
            Err(e) if is_not_found(&e) => Ok(Self::default()),
            Err(e) => Err(e),
        }
    }
}

fn is_not_found(error: &anyhow::Error) -> bool {
    error
        .downcast_ref::<std::io::Error>()
        .is_some_and(|e| e.kind() == std::io::ErrorKind::NotFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        let deserialized: AppConfig = toml::from_str(&toml_str).unwrap();

        assert_eq!(config.metadata.version, deserialized.metadata.version);
        assert_eq!(config.defaults, deserialized.defaults);
        assert_eq!(config.advice, deserialized.advice);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let toml_str = r#"
            [metadata]
            version = "1.0"
            created_at = "2025-01-01T00:00:00Z"
            updated_at = "2025-01-01T00:00:00Z"

            [advice]
            model = "gemini-2.5-flash"
        "#;

        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.advice.model, "gemini-2.5-flash");
        assert_eq!(config.advice.api_key_env, "GEMINI_API_KEY");
        assert_eq!(config.defaults.activity_level, "sedentary");
        assert!(config.batch.show_progress);
    }

    #[test]
    fn test_config_file_io() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("nested").join("config.toml");

        let mut original = AppConfig::default();
        original.defaults.protein_need = "high".to_string();
        original.advice.timeout_seconds = 15;

        original.save_to_file(&config_path).unwrap();
        let loaded = AppConfig::load_from_file(&config_path).unwrap();

        assert_eq!(loaded.defaults.protein_need, "high");
        assert_eq!(loaded.advice.timeout_seconds, 15);
    }

    #[test]
    fn test_load_or_default_requires_explicit_file() {
        let temp_dir = tempdir().unwrap();
        let err = AppConfig::load_or_default(Some(&temp_dir.path().join("absent.toml"))).unwrap_err();
        assert!(is_not_found(&err));
    }

    #[test]
    fn test_load_or_default_rejects_malformed_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, "[defaults]\nprotein_need = \"very_high\"\n[advice\n").unwrap();

        let err = AppConfig::load_or_default(Some(&config_path)).unwrap_err();
        assert!(err.to_string().contains("Failed to parse TOML configuration"));
        assert!(!is_not_found(&err));
    }

    #[test]
    fn test_load_or_default_reads_explicit_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        let mut config = AppConfig::default();
        config.defaults.protein_need = "very_high".to_string();
        config.save_to_file(&config_path).unwrap();

        let loaded = AppConfig::load_or_default(Some(&config_path)).unwrap();
        assert_eq!(loaded.defaults.protein_need, "very_high");
    }

    #[test]
    fn test_resolve_api_key_uses_fallback() {
        let settings = AdviceSettings {
            api_key_env: "NUTRIRS_TEST_PRIMARY_KEY_UNSET".to_string(),
            fallback_api_key_env: Some("NUTRIRS_TEST_FALLBACK_KEY".to_string()),
            ..AdviceSettings::default()
        };

        std::env::set_var("NUTRIRS_TEST_FALLBACK_KEY", "secret");
        assert_eq!(settings.resolve_api_key(), Some("secret".to_string()));
        std::env::remove_var("NUTRIRS_TEST_FALLBACK_KEY");
        assert_eq!(settings.resolve_api_key(), None);
    }
}
