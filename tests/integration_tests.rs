use forecast_processor::analyzers::ForecastSummary;
use forecast_processor::error::ProcessingError;
use forecast_processor::models::ObservedTable;
use forecast_processor::processors::{
    AlertEvaluator, AlertKind, ForecastProcessor, ForecastVerifier, ModelSlotRegistry,
};
use forecast_processor::readers::{FileForecastSource, ForecastRequest, ForecastSource};
use forecast_processor::utils::constants::REQUIRED_OBSERVED_COLUMNS;
use forecast_processor::writers::{MetricsFormat, MetricsWriter, TableWriter};
use forecast_processor::{verify, Settings};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const FORECAST_JSON: &str = r#"{
    "latitude": 52.23,
    "longitude": 21.01,
    "hourly": {
        "time": [
            "2025-11-04T00:00", "2025-11-04T01:00", "2025-11-04T02:00",
            "2025-11-04T03:00", "2025-11-04T04:00"
        ],
        "temperature_2m": [4.0, 5.0, 7.0, 6.0, 5.5],
        "precipitation": [0.0, 0.4, 96.0, null, 1.0]
    }
}"#;

const OBSERVED_CSV: &str = "time,temperature_c,precip_mm\n\
2025-11-04 00:00,4.5,0.0\n\
2025-11-04 01:00,5.0,0.6\n\
2025-11-04 02:00,6.0,30.0\n\
2025-11-04 09:00,3.0,0.0\n";

fn write(dir: &Path, name: &str, body: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, body).expect("Failed to write fixture");
    path
}

#[test]
fn test_end_to_end_forecast_flow() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let forecast_path = write(temp_dir.path(), "forecast.json", FORECAST_JSON);
    let observed_path = write(temp_dir.path(), "observed.csv", OBSERVED_CSV);

    let request = ForecastRequest::new(52.23, 21.01).with_days(1);
    let table = FileForecastSource::new(&forecast_path)
        .fetch(&request)
        .unwrap();
    assert_eq!(table.as_ref().map(|t| t.len()), Some(5));

    let processor = ForecastProcessor::default();
    let processed = processor.process(table, "mock-downscaler", 52.23, 21.01);

    let notes: Vec<&str> = processed.notes.iter().map(|n| n.as_str()).collect();
    assert_eq!(notes.len(), 3);
    assert!(notes[0].starts_with("slot=mock-downscaler"));
    assert!(notes[1].starts_with("Clipped 1 precipitation value above 80 mm"));
    assert!(notes[2].starts_with("Smoothed temperature"));
    assert_eq!(processed.table.value("precipitation", 2), Some(80.0));
    assert_eq!(processed.table.value("precipitation", 3), Some(0.0));
    assert_eq!(
        processed.alerts.iter().map(|a| a.kind).collect::<Vec<_>>(),
        vec![AlertKind::HeavyRain]
    );

    // Verification against the corrected table
    let actuals = ObservedTable::from_path(&observed_path).unwrap();
    actuals.require_columns(REQUIRED_OBSERVED_COLUMNS).unwrap();
    let metrics = ForecastVerifier::new()
        .verify(&processed.table, &actuals)
        .unwrap();

    assert_eq!(metrics.n_samples, 3);
    assert_eq!(metrics.get("precip_count"), Some(3.0));
    // Precipitation errors: 0.0, -0.2, +50.0
    let precip_mae = metrics.get("precip_mae").unwrap();
    assert!((precip_mae - 50.2 / 3.0).abs() < 1e-9, "{}", precip_mae);

    // Persistence
    let logs_dir = temp_dir.path().join("ai-weather-logs");
    let saved = MetricsWriter::new(&logs_dir).save(&metrics).unwrap();
    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&saved).unwrap()).unwrap();
    assert_eq!(json["n_samples"], 3);
    assert!(json.get("temp_mae").is_some());

    let text_path = MetricsWriter::new(&logs_dir)
        .with_format(MetricsFormat::Text)
        .save(&metrics)
        .unwrap();
    assert!(fs::read_to_string(text_path)
        .unwrap()
        .starts_with("n_samples: 3\n"));

    // Corrected table dump
    let dump = temp_dir.path().join("corrected.csv");
    TableWriter::new().write_path(&processed.table, &dump).unwrap();
    assert!(fs::read_to_string(&dump)
        .unwrap()
        .starts_with("time,precipitation,temperature\n"));

    let summary = ForecastSummary::from_table(&processed.table);
    assert!(summary.summary().contains("(5 hours)"));
}

#[test]
fn test_verification_with_tolerance() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let forecast_path = write(temp_dir.path(), "forecast.json", FORECAST_JSON);
    let table = FileForecastSource::new(&forecast_path)
        .fetch(&ForecastRequest::default())
        .unwrap()
        .unwrap();

    let shifted = "time,temperature,precipitation\n\
                   2025-11-04 00:03,4.0,0.0\n\
                   2025-11-04 00:58,5.0,0.4\n\
                   2025-11-04 03:20,6.0,0.0\n";
    let actuals = ObservedTable::from_csv_reader(shifted.as_bytes()).unwrap();

    let exact = verify(&table, &actuals, None).unwrap();
    assert_eq!(exact.n_samples, 0);
    assert_eq!(exact.to_map().len(), 1);

    let near = verify(&table, &actuals, Some("5min")).unwrap();
    assert_eq!(near.n_samples, 2);
    assert_eq!(near.get("temp_mae"), Some(0.0));

    let wide = verify(&table, &actuals, Some("30min")).unwrap();
    assert_eq!(wide.n_samples, 3);
}

#[test]
fn test_malformed_upload_is_reported() {
    let table = FileForecastSource::new("unused.json");
    assert!(table.fetch(&ForecastRequest::default()).is_err());

    let csv = "time,temperature\n2025-11-04 00:00,1.0\n";
    let upload = ObservedTable::from_csv_reader(csv.as_bytes()).unwrap();
    match upload.require_columns(REQUIRED_OBSERVED_COLUMNS) {
        Err(ProcessingError::MissingColumns(missing)) => {
            assert_eq!(missing, vec!["precipitation".to_string()])
        }
        other => panic!("expected missing columns, got {:?}", other),
    }
}

#[test]
fn test_alerts_without_corrections() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let forecast_path = write(
        temp_dir.path(),
        "heat.csv",
        "time,temperature,precipitation\n\
         2025-07-01 12:00,36.5,0.0\n\
         2025-07-01 13:00,37.0,25.0\n",
    );

    let table = FileForecastSource::new(&forecast_path)
        .fetch(&ForecastRequest::default())
        .unwrap();
    let processor =
        ForecastProcessor::new(ModelSlotRegistry::new(), AlertEvaluator::default())
            .without_corrections();
    let processed = processor.process(table, "none", 0.0, 0.0);

    let messages: Vec<String> = processed.alerts.iter().map(|a| a.message()).collect();
    assert_eq!(messages.len(), 2);
    assert!(messages[0].starts_with("Heavy rain"));
    assert!(messages[1].starts_with("Very high temperature"));
    assert!(processed.notes.is_empty());
}

#[test]
fn test_settings_drive_components() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = write(
        temp_dir.path(),
        "forecast-processor.toml",
        "[alerts]\nheat_c = 30.0\n\n[correction]\nenable_smooth = false\n",
    );

    let settings = Settings::load(Some(&config_path)).unwrap();
    assert_eq!(settings.alerts.heat_c, 30.0);
    assert!(!settings.correction.enable_smooth);
    assert_eq!(settings.storage.format, MetricsFormat::Json);
}
