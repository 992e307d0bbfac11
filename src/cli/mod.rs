pub mod args;
pub mod commands;

pub use args::{Cli, Commands, CorrectionArgs, ForecastArgs};
pub use commands::run;
