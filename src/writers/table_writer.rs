use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::Result;
use crate::models::WeatherTable;
use crate::utils::constants::TIME_COLUMN;

const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// CSV dump of a table: `time` followed by every field, empty cell for no data
pub struct TableWriter {
    precision: Option<usize>,
}

impl TableWriter {
    pub fn new() -> Self {
        Self { precision: None }
    }

    /// Fixed number of decimals for every value
    pub fn with_precision(precision: usize) -> Self {
        Self {
            precision: Some(precision),
        }
    }

    pub fn write_path(&self, table: &WeatherTable, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        self.write(table, file)?;
        tracing::info!(path = %path.display(), rows = table.len(), "Table written");
        Ok(())
    }

    pub fn write<W: Write>(&self, table: &WeatherTable, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        let names: Vec<&str> = table.field_names().collect();

        let mut header = vec![TIME_COLUMN];
        header.extend(&names);
        csv_writer.write_record(&header)?;

        for (row, ts) in table.index().iter().enumerate() {
            let mut record = Vec::with_capacity(names.len() + 1);
            record.push(ts.format(TIME_FORMAT).to_string());
            for name in &names {
                record.push(self.format_value(table.value(name, row)));
            }
            csv_writer.write_record(&record)?;
        }

        csv_writer.flush()?;
        Ok(())
    }

    fn format_value(&self, value: Option<f64>) -> String {
        match (value, self.precision) {
            (None, _) => String::new(),
            (Some(v), Some(precision)) => format!("{:.*}", precision, v),
            (Some(v), None) => v.to_string(),
        }
    }
}

impl Default for TableWriter {
    fn default() -> Self {
        Self::new()
    }
}
