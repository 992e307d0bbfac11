pub mod metrics;
pub mod note;
pub mod raw;
pub mod table;

pub use metrics::{metric_prefix, FieldMetrics, VerificationMetrics};
pub use note::CorrectionNote;
pub use raw::{ObservedTable, RawTable};
pub use table::{WeatherTable, WeatherTableBuilder};
