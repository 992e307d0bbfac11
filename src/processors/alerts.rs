use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::WeatherTable;
use crate::utils::constants::{
    DEFAULT_COLD_THRESHOLD_C, DEFAULT_HEAT_THRESHOLD_C, DEFAULT_RAIN_THRESHOLD_MM,
    FIELD_PRECIPITATION, FIELD_TEMPERATURE,
};

/// Named alert limits
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertThresholds {
    pub rain_mm: f64,
    pub cold_c: f64,
    pub heat_c: f64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            rain_mm: DEFAULT_RAIN_THRESHOLD_MM,
            cold_c: DEFAULT_COLD_THRESHOLD_C,
            heat_c: DEFAULT_HEAT_THRESHOLD_C,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    HeavyRain,
    SevereCold,
    SevereHeat,
}

impl AlertKind {
    /// Evaluation and display order
    pub const ORDER: [AlertKind; 3] = [
        AlertKind::HeavyRain,
        AlertKind::SevereCold,
        AlertKind::SevereHeat,
    ];

    pub fn field(&self) -> &'static str {
        match self {
            AlertKind::HeavyRain => FIELD_PRECIPITATION,
            AlertKind::SevereCold | AlertKind::SevereHeat => FIELD_TEMPERATURE,
        }
    }

    pub fn threshold(&self, thresholds: &AlertThresholds) -> f64 {
        match self {
            AlertKind::HeavyRain => thresholds.rain_mm,
            AlertKind::SevereCold => thresholds.cold_c,
            AlertKind::SevereHeat => thresholds.heat_c,
        }
    }

    fn breaches(&self, value: f64, threshold: f64) -> bool {
        match self {
            AlertKind::SevereCold => value <= threshold,
            AlertKind::HeavyRain | AlertKind::SevereHeat => value >= threshold,
        }
    }

    /// Whether `candidate` is a more severe breach than `current`
    fn more_extreme(&self, candidate: f64, current: f64) -> bool {
        match self {
            AlertKind::SevereCold => candidate < current,
            AlertKind::HeavyRain | AlertKind::SevereHeat => candidate > current,
        }
    }
}

/// One triggered warning
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    pub kind: AlertKind,
    pub threshold: f64,
    /// Most severe value that breached the threshold
    pub extreme: f64,
    /// First timestamp at which the threshold was breached
    pub first_at: NaiveDateTime,
}

impl Alert {
    pub fn message(&self) -> String {
        match self.kind {
            AlertKind::HeavyRain => format!(
                "Heavy rain expected in the coming hours (>= {} mm).",
                self.threshold
            ),
            AlertKind::SevereCold => {
                format!("Very low temperature (at or below {} °C).", self.threshold)
            }
            AlertKind::SevereHeat => {
                format!("Very high temperature (at or above {} °C).", self.threshold)
            }
        }
    }
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

/// Threshold scan over a (corrected) forecast table
#[derive(Debug, Clone, Default)]
pub struct AlertEvaluator {
    thresholds: AlertThresholds,
}

impl AlertEvaluator {
    pub fn new(thresholds: AlertThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &AlertThresholds {
        &self.thresholds
    }

    /// Alerts in fixed order: rain, cold, heat
    ///
    /// A missing field only skips the checks that need it.
    pub fn evaluate(&self, table: &WeatherTable) -> Vec<Alert> {
        let alerts: Vec<Alert> = AlertKind::ORDER
            .iter()
            .filter_map(|kind| self.check(table, *kind))
            .collect();

        if !alerts.is_empty() {
            tracing::info!(count = alerts.len(), "Alerts triggered");
        }
        alerts
    }

    fn check(&self, table: &WeatherTable, kind: AlertKind) -> Option<Alert> {
        let values = table.field(kind.field())?;
        let threshold = kind.threshold(&self.thresholds);
        let mut alert: Option<Alert> = None;

        for (row, value) in values.iter().enumerate() {
            let Some(value) = *value else { continue };
            if !kind.breaches(value, threshold) {
                continue;
            }
            match alert.as_mut() {
                Some(existing) => {
                    if kind.more_extreme(value, existing.extreme) {
                        existing.extreme = value;
                    }
                }
                None => {
                    alert = Some(Alert {
                        kind,
                        threshold,
                        extreme: value,
                        first_at: table.index()[row],
                    })
                }
            }
        }

        if let Some(alert) = &alert {
            tracing::debug!(
                kind = ?alert.kind,
                extreme = alert.extreme,
                threshold,
                "Threshold breached"
            );
        }
        alert
    }
}

/// Functional entry point returning the display messages
pub fn evaluate(table: &WeatherTable, thresholds: &AlertThresholds) -> Vec<String> {
    AlertEvaluator::new(*thresholds)
        .evaluate(table)
        .iter()
        .map(Alert::message)
        .collect()
}
