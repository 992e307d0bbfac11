use crate::models::{CorrectionNote, WeatherTable};
use crate::processors::alerts::{Alert, AlertEvaluator};
use crate::processors::correction::CorrectionPipeline;
use crate::processors::model_slots::ModelSlotRegistry;
use crate::processors::stage::Stage;

/// Result of one forecast run
#[derive(Debug, Clone, Default)]
pub struct ProcessedForecast {
    pub table: WeatherTable,
    /// Model notes followed by correction notes
    pub notes: Vec<CorrectionNote>,
    pub alerts: Vec<Alert>,
}

/// Composition root: model slot, then corrections, then alerts
pub struct ForecastProcessor {
    registry: ModelSlotRegistry,
    corrections: Option<CorrectionPipeline>,
    alerts: AlertEvaluator,
}

impl ForecastProcessor {
    pub fn new(registry: ModelSlotRegistry, alerts: AlertEvaluator) -> Self {
        Self {
            registry,
            corrections: Some(CorrectionPipeline::default()),
            alerts,
        }
    }

    pub fn with_corrections(mut self, corrections: CorrectionPipeline) -> Self {
        self.corrections = Some(corrections);
        self
    }

    /// Skip the correction pipeline entirely
    pub fn without_corrections(mut self) -> Self {
        self.corrections = None;
        self
    }

    pub fn registry(&self) -> &ModelSlotRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ModelSlotRegistry {
        &mut self.registry
    }

    /// Run the full chain; an unavailable source is processed as an empty table
    pub fn process(
        &self,
        table: Option<WeatherTable>,
        slot: &str,
        latitude: f64,
        longitude: f64,
    ) -> ProcessedForecast {
        let table = table.unwrap_or_else(|| {
            tracing::warn!("Forecast source unavailable; processing an empty table");
            WeatherTable::empty()
        });

        let modeled = self.registry.apply(&table, slot, latitude, longitude);
        let mut notes = modeled.notes;

        let corrected = match &self.corrections {
            Some(pipeline) => {
                let output = pipeline.correct(&modeled.table);
                notes.extend(output.notes);
                output.table
            }
            None => modeled.table,
        };

        let alerts = self.alerts.evaluate(&corrected);
        tracing::info!(
            slot,
            rows = corrected.len(),
            notes = notes.len(),
            alerts = alerts.len(),
            corrections = self.corrections.as_ref().map(|p| p.name()),
            "Forecast processed"
        );

        ProcessedForecast {
            table: corrected,
            notes,
            alerts,
        }
    }
}

impl Default for ForecastProcessor {
    fn default() -> Self {
        Self::new(ModelSlotRegistry::new(), AlertEvaluator::default())
    }
}
