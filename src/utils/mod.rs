pub mod constants;
pub mod filename;
pub mod logging;
pub mod stats;
pub mod time;

pub use constants::*;
pub use filename::{generate_metrics_filename, unique_path};
pub use time::{parse_timestamp, parse_tolerance};
