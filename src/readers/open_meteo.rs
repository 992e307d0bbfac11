use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::error::{ProcessingError, Result};
use crate::models::raw::canonical_column;
use crate::models::WeatherTable;
use crate::utils::constants::{FIELD_PRECIPITATION, TIME_COLUMN};
use crate::utils::time::parse_timestamp;

#[derive(Debug, Deserialize)]
struct Payload {
    hourly: Option<HourlyBlock>,
}

#[derive(Debug, Deserialize)]
struct HourlyBlock {
    time: Vec<String>,
    #[serde(flatten)]
    series: BTreeMap<String, Value>,
}

/// Reader for Open-Meteo forecast responses (`hourly` block)
pub struct OpenMeteoReader {
    fill_missing_precipitation: bool,
}

impl OpenMeteoReader {
    pub fn new() -> Self {
        Self {
            fill_missing_precipitation: true,
        }
    }

    pub fn with_fill_missing_precipitation(fill_missing_precipitation: bool) -> Self {
        Self {
            fill_missing_precipitation,
        }
    }

    pub fn read_path(&self, path: &Path) -> Result<Option<WeatherTable>> {
        let file = File::open(path)?;
        self.read(BufReader::new(file))
    }

    /// Parse a payload; `None` when it carries no hourly block
    pub fn read<R: Read>(&self, reader: R) -> Result<Option<WeatherTable>> {
        let payload: Payload = serde_json::from_reader(reader)?;
        self.table_from_payload(payload)
    }

    pub fn read_str(&self, json: &str) -> Result<Option<WeatherTable>> {
        let payload: Payload = serde_json::from_str(json)?;
        self.table_from_payload(payload)
    }

    fn table_from_payload(&self, payload: Payload) -> Result<Option<WeatherTable>> {
        let Some(hourly) = payload.hourly else {
            tracing::warn!("Forecast payload has no hourly block");
            return Ok(None);
        };

        let mut index = Vec::with_capacity(hourly.time.len());
        for (row, raw) in hourly.time.iter().enumerate() {
            let ts = parse_timestamp(raw).ok_or_else(|| ProcessingError::InvalidTimestamp {
                row: row + 1,
                value: raw.clone(),
            })?;
            index.push(ts);
        }

        let mut fields = BTreeMap::new();
        for (name, value) in hourly.series {
            let field = canonical_column(&name);
            if field == TIME_COLUMN || fields.contains_key(&field) {
                continue;
            }

            let Some(values) = numeric_series(&value) else {
                tracing::debug!(series = %name, "Skipping non-numeric hourly series");
                continue;
            };

            let fill = self.fill_missing_precipitation && field == FIELD_PRECIPITATION;
            let values = if fill {
                values.into_iter().map(|v| v.or(Some(0.0))).collect()
            } else {
                values
            };
            fields.insert(field, values);
        }

        let table = WeatherTable::new(index, fields)?;
        tracing::debug!(rows = table.len(), "Parsed Open-Meteo hourly block");
        Ok(Some(table))
    }
}

impl Default for OpenMeteoReader {
    fn default() -> Self {
        Self::new()
    }
}

/// An array of numbers and nulls; anything else is not a weather series
fn numeric_series(value: &Value) -> Option<Vec<Option<f64>>> {
    value
        .as_array()?
        .iter()
        .map(|item| match item {
            Value::Null => Some(None),
            Value::Number(n) => Some(n.as_f64().filter(|v| v.is_finite())),
            _ => None,
        })
        .collect()
}
