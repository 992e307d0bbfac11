use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use validator::Validate;

use crate::error::Result;
use crate::processors::alerts::AlertThresholds;
use crate::processors::correction::CorrectionOptions;
use crate::utils::constants::{
    DEFAULT_CONFIG_FILE, DEFAULT_FORECAST_DAYS, DEFAULT_LATITUDE, DEFAULT_LOGS_DIR,
    DEFAULT_LONGITUDE, DEFAULT_SOURCE, DEFAULT_TIMEZONE, ENV_PREFIX, SLOT_NONE,
};
use crate::writers::MetricsFormat;

/// Application configuration
///
/// Sources in increasing precedence: built-in defaults, a config file, then
/// `FORECAST__SECTION__KEY` environment variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, Default)]
#[serde(default)]
pub struct Settings {
    #[validate(nested)]
    pub app: AppSettings,

    #[validate(nested)]
    pub correction: CorrectionOptions,

    pub alerts: AlertThresholds,

    pub model_slot: ModelSlotSettings,

    pub verification: VerificationSettings,

    pub storage: StorageSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct AppSettings {
    pub name: String,

    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,

    pub timezone: String,

    #[validate(range(min = 1, max = 16))]
    pub forecast_days: u32,

    pub source: String,

    pub log_level: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME").to_string(),
            latitude: DEFAULT_LATITUDE,
            longitude: DEFAULT_LONGITUDE,
            timezone: DEFAULT_TIMEZONE.to_string(),
            forecast_days: DEFAULT_FORECAST_DAYS,
            source: DEFAULT_SOURCE.to_string(),
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSlotSettings {
    pub default: String,
}

impl Default for ModelSlotSettings {
    fn default() -> Self {
        Self {
            default: SLOT_NONE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct VerificationSettings {
    /// Nearest-match window such as `5min`; exact matching when unset
    pub time_tolerance: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub logs_dir: PathBuf,
    pub format: MetricsFormat,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            logs_dir: PathBuf::from(DEFAULT_LOGS_DIR),
            format: MetricsFormat::Json,
        }
    }
}

impl Settings {
    /// Load and validate settings
    ///
    /// An explicit `path` must exist; otherwise `forecast-processor.toml` in the
    /// working directory is used when present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let settings: Settings = Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        tracing::debug!(?settings, "Settings loaded");
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProcessingError;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, name: &str, body: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(body.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::default();

        assert!(settings.validate().is_ok());
        assert_eq!(settings.app.latitude, 52.2297);
        assert_eq!(settings.app.forecast_days, 7);
        assert_eq!(settings.correction.max_precip_mm, 80.0);
        assert_eq!(settings.correction.smooth_window, 3);
        assert_eq!(settings.alerts.rain_mm, 20.0);
        assert_eq!(settings.model_slot.default, "none");
        assert_eq!(settings.verification.time_tolerance, None);
        assert_eq!(settings.storage.logs_dir, PathBuf::from("ai-weather-logs"));
        assert_eq!(settings.storage.format, MetricsFormat::Json);
    }

    #[test]
    fn test_load_partial_file() -> Result<()> {
        let dir = TempDir::new()?;
        let path = write_config(
            &dir,
            "settings.toml",
            r#"
[app]
latitude = 50.06
forecast_days = 3

[alerts]
rain_mm = 15.5

[verification]
time_tolerance = "10min"

[storage]
format = "text"
"#,
        );

        let settings = Settings::load(Some(&path))?;

        assert_eq!(settings.app.latitude, 50.06);
        assert_eq!(settings.app.longitude, 21.0122);
        assert_eq!(settings.app.forecast_days, 3);
        assert_eq!(settings.alerts.rain_mm, 15.5);
        assert_eq!(settings.alerts.heat_c, 35.0);
        assert_eq!(settings.verification.time_tolerance.as_deref(), Some("10min"));
        assert_eq!(settings.storage.format, MetricsFormat::Text);
        assert_eq!(settings.correction, CorrectionOptions::default());
        Ok(())
    }

    #[test]
    fn test_invalid_values_rejected() -> Result<()> {
        let dir = TempDir::new()?;
        let path = write_config(
            &dir,
            "bad.toml",
            "[app]\nlatitude = 123.0\n\n[correction]\nsmooth_window = 0\n",
        );

        let result = Settings::load(Some(&path));
        assert!(matches!(result, Err(ProcessingError::Validation(_))));
        Ok(())
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let result = Settings::load(Some(Path::new("/nonexistent/forecast.toml")));
        assert!(matches!(result, Err(ProcessingError::Config(_))));
    }

    #[test]
    fn test_forecast_days_range() {
        let mut settings = Settings::default();
        settings.app.forecast_days = 17;
        assert!(settings.validate().is_err());

        settings.app.forecast_days = 16;
        assert!(settings.validate().is_ok());
    }
}
