use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{CorrectionNote, WeatherTable};
use crate::processors::stage::{Pipeline, Stage, StageContext, StageOutput};
use crate::utils::constants::{
    DEFAULT_MAX_PRECIP_MM, DEFAULT_SMOOTH_WINDOW, FIELD_PRECIPITATION, FIELD_TEMPERATURE,
};
use crate::utils::stats::sample_std;

pub const NOTE_NO_DATA: &str = "No data: post-processing skipped.";
pub const NOTE_NO_CHANGES: &str = "Post-processing made no changes (data looked OK).";
pub const NOTE_SMOOTHING_NO_REDUCTION: &str =
    "Temperature smoothing ran, but no drop in variability was detected.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct CorrectionOptions {
    #[validate(range(min = 0.0))]
    pub max_precip_mm: f64,

    #[validate(range(min = 1))]
    pub smooth_window: usize,

    pub enable_clip: bool,
    pub enable_smooth: bool,
}

impl Default for CorrectionOptions {
    fn default() -> Self {
        Self {
            max_precip_mm: DEFAULT_MAX_PRECIP_MM,
            smooth_window: DEFAULT_SMOOTH_WINDOW,
            enable_clip: true,
            enable_smooth: true,
        }
    }
}

/// Clamp precipitation above a ceiling to exactly the ceiling
#[derive(Debug, Clone, Copy)]
pub struct PrecipitationClip {
    max_precip_mm: f64,
}

impl PrecipitationClip {
    pub fn new(max_precip_mm: f64) -> Self {
        Self { max_precip_mm }
    }
}

impl Stage for PrecipitationClip {
    fn name(&self) -> &str {
        "precipitation-clip"
    }

    fn apply(&self, table: &WeatherTable, _context: &StageContext) -> StageOutput {
        let max = self.max_precip_mm;
        let over: Vec<f64> = table
            .present_values(FIELD_PRECIPITATION)
            .filter(|v| *v > max)
            .collect();

        if over.is_empty() {
            return StageOutput::unchanged(table);
        }

        let original_max = over.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        tracing::debug!(
            clipped = over.len(),
            original_max,
            max_precip_mm = max,
            "Clipping precipitation"
        );

        StageOutput::new(table.map_values(FIELD_PRECIPITATION, |v| v.min(max)), Vec::new())
            .with_note(format!(
                "Clipped {} precipitation {} above {} mm (original maximum: {:.1} mm).",
                over.len(),
                if over.len() == 1 { "value" } else { "values" },
                max,
                original_max
            ))
    }
}

/// Centered moving average over temperature
#[derive(Debug, Clone, Copy)]
pub struct TemperatureSmoothing {
    window: usize,
}

impl TemperatureSmoothing {
    pub fn new(window: usize) -> Self {
        Self {
            window: window.max(1),
        }
    }
}

impl Stage for TemperatureSmoothing {
    fn name(&self) -> &str {
        "temperature-smoothing"
    }

    fn apply(&self, table: &WeatherTable, _context: &StageContext) -> StageOutput {
        let Some(before) = table.field(FIELD_TEMPERATURE) else {
            return StageOutput::unchanged(table);
        };
        let before_std = sample_std(before);

        let smoothed = table.rolling_mean_centered(FIELD_TEMPERATURE, self.window);
        let after_std = smoothed.field(FIELD_TEMPERATURE).and_then(sample_std);

        let note = match (before_std, after_std) {
            (Some(before), Some(after)) if after < before => CorrectionNote::new(format!(
                "Smoothed temperature with a {}h window (spread dropped from {:.2} to {:.2}).",
                self.window, before, after
            )),
            _ => CorrectionNote::new(NOTE_SMOOTHING_NO_REDUCTION),
        };
        tracing::debug!(window = self.window, ?before_std, ?after_std, "Smoothed temperature");

        StageOutput::new(smoothed, vec![note])
    }
}

/// Explainable clipping and smoothing, clip before smooth
#[derive(Debug, Clone, Default)]
pub struct CorrectionPipeline {
    options: CorrectionOptions,
}

impl CorrectionPipeline {
    pub fn new(options: CorrectionOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &CorrectionOptions {
        &self.options
    }

    /// Enabled stages in run order
    pub fn stages(&self) -> Pipeline {
        let mut pipeline = Pipeline::new("ai-corrections");
        if self.options.enable_clip {
            pipeline.push(Box::new(PrecipitationClip::new(self.options.max_precip_mm)));
        }
        if self.options.enable_smooth {
            pipeline.push(Box::new(TemperatureSmoothing::new(self.options.smooth_window)));
        }
        pipeline
    }

    /// Run the enabled stages in order
    ///
    /// An empty table yields a single "no data" note; a run where no stage
    /// reported anything yields a single "no changes" note.
    pub fn correct(&self, table: &WeatherTable) -> StageOutput {
        self.apply(table, &StageContext::default())
    }
}

impl Stage for CorrectionPipeline {
    fn name(&self) -> &str {
        "ai-corrections"
    }

    fn apply(&self, table: &WeatherTable, context: &StageContext) -> StageOutput {
        if table.is_empty() {
            return StageOutput::unchanged(table).with_note(NOTE_NO_DATA);
        }

        let mut current = self.stages().apply(table, context);

        if current.notes.is_empty() {
            current.notes.push(CorrectionNote::new(NOTE_NO_CHANGES));
        }

        tracing::info!(rows = table.len(), notes = current.notes.len(), "Corrections applied");
        current
    }
}

/// Functional entry point over explicit options
pub fn correct(table: &WeatherTable, options: &CorrectionOptions) -> StageOutput {
    CorrectionPipeline::new(options.clone()).correct(table)
}
