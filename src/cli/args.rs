use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::writers::MetricsFormat;

#[derive(Parser)]
#[command(name = "forecast-processor")]
#[command(about = "Forecast correction, alerting and verification for hourly weather data")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,

    #[arg(
        short,
        long,
        global = true,
        help = "Configuration file [default: forecast-processor.toml if present]"
    )]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Apply a model slot and the correction pipeline to a forecast file
    Correct {
        #[command(flatten)]
        forecast: ForecastArgs,

        #[command(flatten)]
        correction: CorrectionArgs,

        #[arg(short, long, help = "Write the corrected table as CSV")]
        output_file: Option<PathBuf>,

        #[arg(long, help = "Print extremes, alerts and notes in the summary")]
        detailed: bool,
    },

    /// Compare a corrected forecast against observed data
    Verify {
        #[command(flatten)]
        forecast: ForecastArgs,

        #[command(flatten)]
        correction: CorrectionArgs,

        #[arg(long, help = "Observed CSV with time, temperature and precipitation")]
        observed: PathBuf,

        #[arg(short, long, help = "Nearest-match tolerance such as 5min or 1h")]
        tolerance: Option<String>,

        #[arg(long, help = "Save the metrics into the logs directory")]
        save: bool,

        #[arg(long, value_enum, help = "Saved metrics format [default: from config]")]
        format: Option<MetricsFormat>,

        #[arg(long, help = "Logs directory [default: from config]")]
        logs_dir: Option<PathBuf>,
    },

    /// Evaluate alerts over a forecast file without corrections
    Alerts {
        #[command(flatten)]
        forecast: ForecastArgs,
    },

    /// List registered model slots
    Slots,
}

/// Where the forecast comes from and which slot to run
#[derive(Args, Debug, Clone)]
pub struct ForecastArgs {
    #[arg(short, long, help = "Forecast file (Open-Meteo .json or CSV)")]
    pub input_file: PathBuf,

    #[arg(short, long, help = "Model slot [default: from config]")]
    pub slot: Option<String>,

    #[arg(long, allow_negative_numbers = true, help = "Latitude [default: from config]")]
    pub lat: Option<f64>,

    #[arg(long, allow_negative_numbers = true, help = "Longitude [default: from config]")]
    pub lon: Option<f64>,

    #[arg(short, long, help = "Forecast days to keep [default: from config]")]
    pub days: Option<u32>,

    #[arg(long, help = "Forecast source name [default: from config]")]
    pub source: Option<String>,
}

/// Overrides for the correction pipeline
#[derive(Args, Debug, Clone, Default)]
pub struct CorrectionArgs {
    #[arg(long, help = "Precipitation ceiling in mm")]
    pub max_precip: Option<f64>,

    #[arg(long, help = "Temperature smoothing window in hours")]
    pub smooth_window: Option<usize>,

    #[arg(long, help = "Disable precipitation clipping")]
    pub no_clip: bool,

    #[arg(long, help = "Disable temperature smoothing")]
    pub no_smooth: bool,

    #[arg(long, help = "Skip the correction pipeline entirely")]
    pub no_corrections: bool,
}
