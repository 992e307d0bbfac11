use chrono::Duration;
use std::collections::HashMap;

use crate::error::Result;
use crate::models::{FieldMetrics, ObservedTable, VerificationMetrics, WeatherTable};
use crate::utils::stats::pearson;
use crate::utils::time::parse_tolerance;

/// Pairs of (forecast row, observed row) that survived alignment, in forecast order
pub type Alignment = Vec<(usize, usize)>;

/// Compares a forecast against observed ground truth
#[derive(Debug, Clone, Default)]
pub struct ForecastVerifier {
    time_tolerance: Option<Duration>,
}

impl ForecastVerifier {
    /// Exact-timestamp matching
    pub fn new() -> Self {
        Self {
            time_tolerance: None,
        }
    }

    /// Nearest-timestamp matching within `tolerance` (inclusive)
    pub fn with_tolerance(tolerance: Duration) -> Self {
        Self {
            time_tolerance: Some(tolerance),
        }
    }

    /// Parse an optional tolerance string such as `5min`
    pub fn from_tolerance_str(tolerance: Option<&str>) -> Result<Self> {
        match tolerance {
            Some(value) => Ok(Self::with_tolerance(parse_tolerance(value)?)),
            None => Ok(Self::new()),
        }
    }

    pub fn time_tolerance(&self) -> Option<Duration> {
        self.time_tolerance
    }

    /// Normalize the upload, align it against the forecast and compute metrics per shared field
    ///
    /// Fails only on a malformed upload (missing or unparseable `time`, non-numeric
    /// cells, duplicate timestamps). Fields that cannot be compared are absent from
    /// the result.
    pub fn verify(
        &self,
        forecast: &WeatherTable,
        actuals: &ObservedTable,
    ) -> Result<VerificationMetrics> {
        let observed = actuals.to_weather_table(false)?;
        Ok(self.verify_tables(forecast, &observed))
    }

    /// Metrics for an already indexed observed table
    pub fn verify_tables(
        &self,
        forecast: &WeatherTable,
        observed: &WeatherTable,
    ) -> VerificationMetrics {
        let alignment = self.align(forecast, observed);
        let mut metrics = VerificationMetrics::new(alignment.len());

        if alignment.is_empty() {
            tracing::warn!(
                forecast_rows = forecast.len(),
                observed_rows = observed.len(),
                "No common timestamps between forecast and observations"
            );
            return metrics;
        }

        for field in forecast.field_names().filter(|f| observed.has_field(f)) {
            if let Some(field_metrics) = field_metrics(forecast, observed, field, &alignment) {
                metrics.fields.insert(field.to_string(), field_metrics);
            } else {
                tracing::debug!(field, "No valid sample pairs; field skipped");
            }
        }

        tracing::info!(
            n_samples = metrics.n_samples,
            fields = metrics.fields.len(),
            "Verification complete"
        );
        metrics
    }

    /// Match forecast rows to observed rows
    pub fn align(&self, forecast: &WeatherTable, observed: &WeatherTable) -> Alignment {
        match self.time_tolerance {
            None => align_exact(forecast, observed),
            Some(tolerance) => align_nearest(forecast, observed, tolerance),
        }
    }
}

/// Functional entry point: `time_tolerance` is a duration string such as `5min`
pub fn verify(
    forecast: &WeatherTable,
    actuals: &ObservedTable,
    time_tolerance: Option<&str>,
) -> Result<VerificationMetrics> {
    ForecastVerifier::from_tolerance_str(time_tolerance)?.verify(forecast, actuals)
}

/// Inner join on identical timestamps (both indexes are sorted and unique)
fn align_exact(forecast: &WeatherTable, observed: &WeatherTable) -> Alignment {
    let f_index = forecast.index();
    let o_index = observed.index();
    let mut pairs = Vec::new();
    let (mut i, mut j) = (0, 0);

    while i < f_index.len() && j < o_index.len() {
        match f_index[i].cmp(&o_index[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                pairs.push((i, j));
                i += 1;
                j += 1;
            }
        }
    }

    pairs
}

/// Nearest observed timestamp within the tolerance, at most one match on each side
///
/// Ties in distance prefer the earlier observed row. When several forecast rows
/// pick the same observed row, the closest keeps it (earlier forecast row on a tie)
/// and the others are dropped.
fn align_nearest(
    forecast: &WeatherTable,
    observed: &WeatherTable,
    tolerance: Duration,
) -> Alignment {
    let o_index = observed.index();
    let tolerance_ms = tolerance.num_milliseconds();
    let mut claims: HashMap<usize, (usize, i64)> = HashMap::new();

    for (f_row, ts) in forecast.index().iter().enumerate() {
        let pos = o_index.partition_point(|o| o < ts);
        let candidates = [pos.checked_sub(1), (pos < o_index.len()).then_some(pos)];

        let nearest = candidates
            .into_iter()
            .flatten()
            .map(|o_row| (o_row, (o_index[o_row] - *ts).num_milliseconds().abs()))
            .min_by_key(|&(o_row, distance)| (distance, o_row));

        let Some((o_row, distance)) = nearest else {
            continue;
        };
        if distance > tolerance_ms {
            continue;
        }

        claims
            .entry(o_row)
            .and_modify(|claim| {
                if distance < claim.1 {
                    *claim = (f_row, distance);
                }
            })
            .or_insert((f_row, distance));
    }

    let mut pairs: Alignment = claims
        .into_iter()
        .map(|(o_row, (f_row, _))| (f_row, o_row))
        .collect();
    pairs.sort_unstable();
    pairs
}

fn field_metrics(
    forecast: &WeatherTable,
    observed: &WeatherTable,
    field: &str,
    alignment: &[(usize, usize)],
) -> Option<FieldMetrics> {
    let (predicted, actual): (Vec<f64>, Vec<f64>) = alignment
        .iter()
        .filter_map(|&(f_row, o_row)| {
            Some((forecast.value(field, f_row)?, observed.value(field, o_row)?))
        })
        .unzip();

    if predicted.is_empty() {
        return None;
    }

    let n = predicted.len() as f64;
    let errors: Vec<f64> = predicted.iter().zip(&actual).map(|(f, a)| f - a).collect();

    Some(FieldMetrics {
        count: predicted.len(),
        mae: errors.iter().map(|e| e.abs()).sum::<f64>() / n,
        rmse: (errors.iter().map(|e| e * e).sum::<f64>() / n).sqrt(),
        bias: errors.iter().sum::<f64>() / n,
        correlation: pearson(&predicted, &actual),
    })
}
