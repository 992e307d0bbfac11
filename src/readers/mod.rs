pub mod open_meteo;
pub mod source;

pub use open_meteo::OpenMeteoReader;
pub use source::{limit_days, FileForecastSource, ForecastRequest, ForecastSource};
