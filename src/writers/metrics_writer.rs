use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::models::VerificationMetrics;
use crate::utils::constants::{DEFAULT_LOGS_DIR, METRICS_FILE_PREFIX};
use crate::utils::filename::{generate_metrics_filename, unique_path};

/// On-disk layout of a saved metrics mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MetricsFormat {
    /// Pretty JSON object; NaN becomes null
    #[default]
    Json,
    /// `key: value` lines
    Text,
}

impl MetricsFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            MetricsFormat::Json => "json",
            MetricsFormat::Text => "txt",
        }
    }
}

/// Persists verification results into a logs directory
pub struct MetricsWriter {
    dir: PathBuf,
    format: MetricsFormat,
    prefix: String,
}

impl MetricsWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            format: MetricsFormat::Json,
            prefix: METRICS_FILE_PREFIX.to_string(),
        }
    }

    pub fn with_format(mut self, format: MetricsFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.prefix = prefix.to_string();
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write a timestamped file and return its location
    pub fn save(&self, metrics: &VerificationMetrics) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;

        let filename = generate_metrics_filename(&self.prefix, self.format.extension());
        let path = unique_path(&self.dir, &filename);
        self.write_to(metrics, &path)?;

        tracing::info!(path = %path.display(), n_samples = metrics.n_samples, "Metrics saved");
        Ok(path)
    }

    /// Write to an explicit path
    pub fn write_to(&self, metrics: &VerificationMetrics, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        match self.format {
            MetricsFormat::Json => {
                serde_json::to_writer_pretty(&mut writer, metrics)?;
                writeln!(writer)?;
            }
            MetricsFormat::Text => writer.write_all(metrics.to_text().as_bytes())?,
        }

        writer.flush()?;
        Ok(())
    }
}

impl Default for MetricsWriter {
    fn default() -> Self {
        Self::new(DEFAULT_LOGS_DIR)
    }
}
