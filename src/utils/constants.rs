/// Canonical field names
pub const FIELD_TEMPERATURE: &str = "temperature";
pub const FIELD_PRECIPITATION: &str = "precipitation";
pub const FIELD_HUMIDITY: &str = "humidity";

/// Column holding timestamps in CSV uploads and dumps
pub const TIME_COLUMN: &str = "time";

/// Source column names mapped onto canonical field names
pub const COLUMN_ALIASES: &[(&str, &str)] = &[
    ("temperature_c", FIELD_TEMPERATURE),
    ("temperature_2m", FIELD_TEMPERATURE),
    ("precip_mm", FIELD_PRECIPITATION),
    ("relative_humidity_2m", FIELD_HUMIDITY),
];

/// Fields whose cells must all be numeric or a missing marker
pub const NUMERIC_FIELDS: &[&str] = &[FIELD_TEMPERATURE, FIELD_PRECIPITATION, FIELD_HUMIDITY];

/// Columns an observed-data upload must carry
pub const REQUIRED_OBSERVED_COLUMNS: &[&str] =
    &[TIME_COLUMN, FIELD_TEMPERATURE, FIELD_PRECIPITATION];

/// Cell values read as "no data"
pub const MISSING_MARKERS: &[&str] = &["", "nan", "NaN", "NA", "N/A", "null", "None", "-"];

/// Correction defaults
pub const DEFAULT_MAX_PRECIP_MM: f64 = 80.0;
pub const DEFAULT_SMOOTH_WINDOW: usize = 3;

/// Alert defaults
pub const DEFAULT_RAIN_THRESHOLD_MM: f64 = 20.0;
pub const DEFAULT_COLD_THRESHOLD_C: f64 = -10.0;
pub const DEFAULT_HEAT_THRESHOLD_C: f64 = 35.0;

/// Model slot names
pub const SLOT_NONE: &str = "none";
pub const SLOT_MOCK_GRAPHCAST: &str = "mock-graphcast";
pub const SLOT_MOCK_DOWNSCALER: &str = "mock-downscaler";

/// Placeholder model parameters
pub const GRAPHCAST_PRECIP_FACTOR: f64 = 0.9;
pub const GRAPHCAST_TEMP_WINDOW: usize = 2;
pub const DOWNSCALER_LAT_MODULUS: f64 = 5.0;
pub const DOWNSCALER_SCALE: f64 = 0.1;

/// Application defaults (Warsaw)
pub const DEFAULT_LATITUDE: f64 = 52.2297;
pub const DEFAULT_LONGITUDE: f64 = 21.0122;
pub const DEFAULT_TIMEZONE: &str = "auto";
pub const DEFAULT_FORECAST_DAYS: u32 = 7;
pub const DEFAULT_SOURCE: &str = "open-meteo";
pub const SUPPORTED_SOURCES: &[&str] = &[DEFAULT_SOURCE];

/// Storage defaults
pub const DEFAULT_LOGS_DIR: &str = "ai-weather-logs";
pub const METRICS_FILE_PREFIX: &str = "verification";

/// Configuration
pub const DEFAULT_CONFIG_FILE: &str = "forecast-processor.toml";
pub const ENV_PREFIX: &str = "FORECAST";
