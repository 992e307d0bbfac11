use std::collections::BTreeMap;
use std::fs;
use std::io::Read;
use std::path::Path;

use crate::error::{ProcessingError, Result};
use crate::models::WeatherTable;
use crate::utils::constants::{
    COLUMN_ALIASES, FIELD_PRECIPITATION, MISSING_MARKERS, NUMERIC_FIELDS, TIME_COLUMN,
};
use crate::utils::time::parse_timestamp;

/// Observed-data uploads share the raw table shape
pub type ObservedTable = RawTable;

/// Un-indexed tabular data: a header row and string cells, exactly as uploaded.
///
/// Column names are normalized to the canonical field names on construction;
/// nothing else is interpreted until [`RawTable::to_weather_table`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self> {
        let headers: Vec<String> = headers.iter().map(|h| canonical_column(h)).collect();

        for (i, row) in rows.iter().enumerate() {
            if row.len() != headers.len() {
                return Err(ProcessingError::InvalidFormat(format!(
                    "Row {} has {} cells, expected {}",
                    i + 1,
                    row.len(),
                    headers.len()
                )));
            }
        }

        Ok(Self { headers, rows })
    }

    /// Read CSV with a header row
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv_reader
            .headers()?
            .iter()
            .map(str::to_string)
            .collect::<Vec<_>>();

        let mut rows = Vec::new();
        for record in csv_reader.records() {
            let record = record?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        Self::new(headers, rows)
    }

    /// Read CSV from raw bytes; input that is not UTF-8 is decoded as Windows-1250
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);

        match std::str::from_utf8(bytes) {
            Ok(text) => Self::from_csv_reader(text.as_bytes()),
            Err(_) => {
                let (decoded, _, had_errors) = encoding_rs::WINDOWS_1250.decode(bytes);
                if had_errors {
                    tracing::warn!("Upload contained bytes invalid in Windows-1250; replaced");
                }
                Self::from_csv_reader(decoded.as_bytes())
            }
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Columns from `required` that this table lacks
    pub fn missing_columns(&self, required: &[&str]) -> Vec<String> {
        required
            .iter()
            .filter(|name| !self.has_column(name))
            .map(|name| name.to_string())
            .collect()
    }

    pub fn require_columns(&self, required: &[&str]) -> Result<()> {
        let missing = self.missing_columns(required);
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ProcessingError::MissingColumns(missing))
        }
    }

    /// Parse the `time` column into the index and the remaining columns as numeric fields
    ///
    /// Known weather fields must parse cell by cell. Any other column is kept only
    /// when all of its cells are numeric, so text columns such as a station name
    /// are dropped. With `fill_missing_precipitation`, empty precipitation cells
    /// become 0.0, as forecast feeds report no rain that way.
    pub fn to_weather_table(&self, fill_missing_precipitation: bool) -> Result<WeatherTable> {
        let time_idx = self
            .column_index(TIME_COLUMN)
            .ok_or_else(|| ProcessingError::MissingColumns(vec![TIME_COLUMN.to_string()]))?;

        let mut index = Vec::with_capacity(self.rows.len());
        for (row_no, row) in self.rows.iter().enumerate() {
            let raw = &row[time_idx];
            let ts = parse_timestamp(raw).ok_or_else(|| ProcessingError::InvalidTimestamp {
                row: row_no + 1,
                value: raw.clone(),
            })?;
            index.push(ts);
        }

        let mut fields = BTreeMap::new();
        for (col_idx, name) in self.headers.iter().enumerate() {
            if col_idx == time_idx || name.is_empty() || fields.contains_key(name) {
                continue;
            }

            let fill_zero = fill_missing_precipitation && name == FIELD_PRECIPITATION;
            let values = match self.parse_column(col_idx, name, fill_zero.then_some(0.0)) {
                Ok(values) => values,
                Err(err) if !NUMERIC_FIELDS.contains(&name.as_str()) => {
                    tracing::debug!(column = %name, "Skipping non-numeric column: {}", err);
                    continue;
                }
                Err(err) => return Err(err),
            };
            fields.insert(name.clone(), values);
        }

        WeatherTable::new(index, fields)
    }

    fn parse_column(
        &self,
        col_idx: usize,
        name: &str,
        default: Option<f64>,
    ) -> Result<Vec<Option<f64>>> {
        self.rows
            .iter()
            .enumerate()
            .map(|(row_no, row)| {
                let cell = &row[col_idx];
                parse_cell(cell)
                    .map(|value| value.or(default))
                    .map_err(|_| ProcessingError::InvalidNumber {
                        row: row_no + 1,
                        column: name.to_string(),
                        value: cell.clone(),
                    })
            })
            .collect()
    }
}

/// Map a source column name onto its canonical field name
pub fn canonical_column(name: &str) -> String {
    let trimmed = name.trim();
    COLUMN_ALIASES
        .iter()
        .find(|(alias, _)| alias.eq_ignore_ascii_case(trimmed))
        .map(|(_, canonical)| canonical.to_string())
        .unwrap_or_else(|| trimmed.to_lowercase())
}

/// Parse a numeric cell; missing markers and non-finite values are "no data"
pub fn parse_cell(cell: &str) -> std::result::Result<Option<f64>, std::num::ParseFloatError> {
    let trimmed = cell.trim();
    if MISSING_MARKERS.contains(&trimmed) {
        return Ok(None);
    }

    let value = trimmed.replace(',', ".").parse::<f64>()?;
    Ok(value.is_finite().then_some(value))
}
