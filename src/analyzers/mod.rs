pub mod forecast_summary;

pub use forecast_summary::{ForecastSummary, PrecipitationStats, TemperatureStats};
