use std::{io, path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use crate::eligibility::EligibilityRules;

/// Settings for the search pipeline and the eligibility classifier.
///
/// Stored as TOML. Every field is optional on disk and falls back to its
/// default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// Quiescence window of the free-text debouncer, in milliseconds.
    debounce_ms: u64,

    /// Maximum number of requests listed at once.
    result_limit: usize,

    /// Thresholds used by the eligibility classifier.
    pub eligibility: EligibilityRules,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            result_limit: default_result_limit(),
            eligibility: EligibilityRules::default(),
        }
    }
}

/// Errors raised while loading or saving a [`Config`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("Failed to read config file: {0}")]
    Read(#[source] io::Error),

    /// The file is not valid TOML or does not match the schema.
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// The configuration could not be rendered as TOML.
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// The file could not be written.
    #[error("Failed to write config file: {0}")]
    Write(#[source] io::Error),

    /// The values parse but contradict each other.
    #[error("Invalid config: {0}")]
    Invalid(String),
}

impl Config {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, if the TOML content is
    /// invalid, or if the thresholds are inconsistent.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Read)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Loads the configuration at `path`, or the defaults if there is no
    /// file there.
    ///
    /// # Errors
    ///
    /// Same as [`Config::load`] when the file exists.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or if
    /// the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(ConfigError::Write)
    }

    /// Returns the debounce quiescence window.
    #[must_use]
    pub const fn debounce_window(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Sets the debounce quiescence window in milliseconds.
    pub const fn set_debounce_ms(&mut self, millis: u64) {
        self.debounce_ms = millis;
    }

    /// Returns the maximum number of listed requests.
    #[must_use]
    pub const fn result_limit(&self) -> usize {
        self.result_limit
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let rules = &self.eligibility;
        if rules.min_age_years > rules.max_age_years {
            return Err(ConfigError::Invalid(format!(
                "min_age_years ({}) exceeds max_age_years ({})",
                rules.min_age_years, rules.max_age_years
            )));
        }
        if !(rules.min_weight_kg.is_finite() && rules.min_weight_kg > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "min_weight_kg must be a positive number, got {}",
                rules.min_weight_kg
            )));
        }
        Ok(())
    }
}

const fn default_debounce_ms() -> u64 {
    300
}

const fn default_result_limit() -> usize {
    200
}

/// The serialized versions of the configuration.
/// This allows for future changes to the configuration format and to the domain
/// type without breaking compatibility.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default = "default_debounce_ms")]
        debounce_ms: u64,

        #[serde(default = "default_result_limit")]
        result_limit: usize,

        #[serde(default)]
        eligibility: EligibilityRules,
    },
}

impl From<Versions> for Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                debounce_ms,
                result_limit,
                eligibility,
            } => Self {
                debounce_ms,
                result_limit,
                eligibility,
            },
        }
    }
}

impl From<Config> for Versions {
    fn from(config: Config) -> Self {
        Self::V1 {
            debounce_ms: config.debounce_ms,
            result_limit: config.result_limit,
            eligibility: config.eligibility,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn load_reads_valid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            br#"_version = "1"
debounce_ms = 150
result_limit = 20

[eligibility]
min_weight_kg = 7.5
max_age_years = 7
"#,
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.debounce_window(), Duration::from_millis(150));
        assert_eq!(config.result_limit(), 20);
        assert!((config.eligibility.min_weight_kg - 7.5).abs() < f64::EPSILON);
        assert_eq!(config.eligibility.max_age_years, 7);
        assert_eq!(config.eligibility.min_age_years, 1);
    }

    #[test]
    fn load_missing_file_returns_error() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("missing.toml");

        let error = Config::load(&missing).unwrap_err();
        assert!(error.to_string().starts_with("Failed to read config file:"));
    }

    #[test]
    fn load_or_default_without_file() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("missing.toml");

        assert_eq!(Config::load_or_default(&missing).unwrap(), Config::default());
    }

    #[test]
    fn load_invalid_toml_returns_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"_version = \"1\"\ndebounce_ms = \"soon\"\n")
            .unwrap();

        let error = Config::load(file.path()).unwrap_err();
        assert!(error.to_string().starts_with("Failed to parse config file:"));
    }

    #[test]
    fn load_rejects_inverted_age_range() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"_version = \"1\"\n[eligibility]\nmin_age_years = 9\nmax_age_years = 2\n")
            .unwrap();

        let error = Config::load(file.path()).unwrap_err();
        assert!(matches!(error, ConfigError::Invalid(_)));
    }

    #[test]
    fn save_then_load_preserves_values() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");
        let mut config = Config::default();
        config.set_debounce_ms(500);
        config.eligibility.illness_markers = vec!["sick".to_string()];

        config.save(&path).unwrap();

        assert_eq!(Config::load(&path).unwrap(), config);
    }

    #[test]
    fn empty_file_returns_default() {
        // Tests that deserialising an empty file returns the default configuration.
        let expected = Config::default();
        let actual: Config = toml::from_str(r#"_version = "1""#).unwrap();
        assert_eq!(actual, expected);
    }
}
