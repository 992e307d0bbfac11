use chrono::Duration;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::models::{RawTable, WeatherTable};
use crate::readers::open_meteo::OpenMeteoReader;
use crate::utils::constants::{
    DEFAULT_FORECAST_DAYS, DEFAULT_LATITUDE, DEFAULT_LONGITUDE, DEFAULT_SOURCE, DEFAULT_TIMEZONE,
    SUPPORTED_SOURCES,
};

/// What to fetch
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub timezone: String,
    pub days: u32,
    pub source: String,
}

impl ForecastRequest {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            ..Self::default()
        }
    }

    pub fn with_days(mut self, days: u32) -> Self {
        self.days = days;
        self
    }

    pub fn with_timezone(mut self, timezone: &str) -> Self {
        self.timezone = timezone.to_string();
        self
    }

    pub fn with_source(mut self, source: &str) -> Self {
        self.source = source.to_string();
        self
    }
}

impl Default for ForecastRequest {
    fn default() -> Self {
        Self {
            latitude: DEFAULT_LATITUDE,
            longitude: DEFAULT_LONGITUDE,
            timezone: DEFAULT_TIMEZONE.to_string(),
            days: DEFAULT_FORECAST_DAYS,
            source: DEFAULT_SOURCE.to_string(),
        }
    }
}

/// Supplier of hourly forecast tables
///
/// `Ok(None)` means the source is unavailable for this request; callers process
/// that as an empty table.
pub trait ForecastSource {
    fn fetch(&self, request: &ForecastRequest) -> Result<Option<WeatherTable>>;
}

/// Forecast stored on disk: Open-Meteo JSON (`.json`) or CSV with a `time` column
pub struct FileForecastSource {
    path: PathBuf,
}

impl FileForecastSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn is_json(&self) -> bool {
        self.path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
    }

    fn read_table(&self) -> Result<Option<WeatherTable>> {
        if self.is_json() {
            OpenMeteoReader::new().read_path(&self.path)
        } else {
            let raw = RawTable::from_path(&self.path)?;
            raw.to_weather_table(true).map(Some)
        }
    }
}

impl ForecastSource for FileForecastSource {
    fn fetch(&self, request: &ForecastRequest) -> Result<Option<WeatherTable>> {
        if !SUPPORTED_SOURCES.contains(&request.source.as_str()) {
            tracing::warn!(source = %request.source, "Unsupported forecast source");
            return Ok(None);
        }

        let Some(table) = self.read_table()? else {
            return Ok(None);
        };

        let table = limit_days(&table, request.days);
        tracing::info!(
            path = %self.path.display(),
            rows = table.len(),
            days = request.days,
            "Forecast loaded"
        );
        Ok(Some(table))
    }
}

/// Keep rows within `days` days of the first timestamp
pub fn limit_days(table: &WeatherTable, days: u32) -> WeatherTable {
    match table.first_time() {
        Some(start) => table.truncate_before(start + Duration::days(i64::from(days))),
        None => table.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::time::parse_timestamp;
    use chrono::NaiveDateTime;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn csv_file(body: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(body.as_bytes()).unwrap();
        file
    }

    fn ts(value: &str) -> NaiveDateTime {
        parse_timestamp(value).unwrap()
    }

    #[test]
    fn test_fetch_csv_forecast() -> Result<()> {
        let file = csv_file(
            "time,temperature_c,precip_mm\n\
             2025-11-04 01:00,6.0,\n\
             2025-11-04 00:00,5.0,0.4\n",
        );

        let table = FileForecastSource::new(file.path())
            .fetch(&ForecastRequest::default())?
            .unwrap();

        assert_eq!(table.index(), &[ts("2025-11-04 00:00"), ts("2025-11-04 01:00")]);
        assert_eq!(table.field("precipitation").unwrap(), &[Some(0.4), Some(0.0)]);
        Ok(())
    }

    #[test]
    fn test_fetch_json_forecast() -> Result<()> {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile()?;
        file.write_all(
            br#"{"hourly": {"time": ["2025-11-04T00:00"], "temperature_2m": [3.5]}}"#,
        )?;

        let table = FileForecastSource::new(file.path())
            .fetch(&ForecastRequest::new(50.0, 19.9))?
            .unwrap();
        assert_eq!(table.value("temperature", 0), Some(3.5));
        Ok(())
    }

    #[test]
    fn test_days_limit() -> Result<()> {
        let mut body = String::from("time,temperature\n");
        for day in 1..=5 {
            body.push_str(&format!("2025-11-0{} 00:00,{}.0\n", day, day));
            body.push_str(&format!("2025-11-0{} 12:00,{}.5\n", day, day));
        }
        let file = csv_file(&body);

        let request = ForecastRequest::default().with_days(2);
        let table = FileForecastSource::new(file.path()).fetch(&request)?.unwrap();

        assert_eq!(table.len(), 4);
        assert_eq!(table.last_time(), Some(ts("2025-11-02 12:00")));
        Ok(())
    }

    #[test]
    fn test_unsupported_source_is_unavailable() -> Result<()> {
        let file = csv_file("time,temperature\n2025-11-04 00:00,1.0\n");
        let request = ForecastRequest::default().with_source("met-office");

        assert!(FileForecastSource::new(file.path()).fetch(&request)?.is_none());
        Ok(())
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let source = FileForecastSource::new("/nonexistent/forecast.csv");
        assert!(source.fetch(&ForecastRequest::default()).is_err());
    }
}
