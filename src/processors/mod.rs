pub mod alerts;
pub mod correction;
pub mod forecast_processor;
pub mod model_slots;
pub mod stage;
pub mod verification;

pub use alerts::{Alert, AlertEvaluator, AlertKind, AlertThresholds};
pub use correction::{
    CorrectionOptions, CorrectionPipeline, PrecipitationClip, TemperatureSmoothing,
};
pub use forecast_processor::{ForecastProcessor, ProcessedForecast};
pub use model_slots::{ModelSlot, ModelSlotRegistry};
pub use stage::{FnStage, Pipeline, Stage, StageContext, StageOutput};
pub use verification::ForecastVerifier;
