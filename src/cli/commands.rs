use std::path::Path;
use validator::Validate;

use crate::analyzers::ForecastSummary;
use crate::cli::args::{Cli, Commands, CorrectionArgs, ForecastArgs};
use crate::error::Result;
use crate::models::ObservedTable;
use crate::processors::{
    AlertEvaluator, CorrectionOptions, CorrectionPipeline, ForecastProcessor, ForecastVerifier,
    ModelSlotRegistry, ProcessedForecast,
};
use crate::readers::{FileForecastSource, ForecastRequest, ForecastSource};
use crate::settings::Settings;
use crate::utils::constants::REQUIRED_OBSERVED_COLUMNS;
use crate::writers::{MetricsWriter, TableWriter};

pub fn run(cli: Cli, settings: &Settings) -> Result<()> {
    match cli.command {
        Commands::Correct {
            forecast,
            correction,
            output_file,
            detailed,
        } => {
            let processed = process_forecast(settings, &forecast, &correction)?;
            print_processed(&processed, detailed);

            if let Some(path) = output_file {
                ensure_parent(&path)?;
                TableWriter::new().write_path(&processed.table, &path)?;
                println!("\nCorrected forecast written to {}", path.display());
            }
        }

        Commands::Verify {
            forecast,
            correction,
            observed,
            tolerance,
            save,
            format,
            logs_dir,
        } => {
            let processed = process_forecast(settings, &forecast, &correction)?;

            println!("Reading observations: {}", observed.display());
            let actuals = ObservedTable::from_path(&observed)?;
            actuals.require_columns(REQUIRED_OBSERVED_COLUMNS)?;

            let tolerance = tolerance.or_else(|| settings.verification.time_tolerance.clone());
            let verifier = ForecastVerifier::from_tolerance_str(tolerance.as_deref())?;
            let metrics = verifier.verify(&processed.table, &actuals)?;

            println!("{}", serde_json::to_string_pretty(&metrics)?);
            if metrics.n_samples == 0 {
                println!("⚠️  No common timestamps between forecast and observations");
            } else {
                println!("Compared {} forecast rows with observations", metrics.n_samples);
            }

            if save {
                let dir = logs_dir.unwrap_or_else(|| settings.storage.logs_dir.clone());
                let writer = MetricsWriter::new(dir)
                    .with_format(format.unwrap_or(settings.storage.format));
                let path = writer.save(&metrics)?;
                println!("Metrics saved to {}", path.display());
            }
        }

        Commands::Alerts { forecast } => {
            let processor = ForecastProcessor::new(
                ModelSlotRegistry::new(),
                AlertEvaluator::new(settings.alerts),
            )
            .without_corrections();
            let (request, slot) = build_request(settings, &forecast);

            let table = FileForecastSource::new(&forecast.input_file).fetch(&request)?;
            let processed = processor.process(table, &slot, request.latitude, request.longitude);

            print_alerts(&processed);
        }

        Commands::Slots => {
            let registry = ModelSlotRegistry::new();
            println!("Registered model slots:");
            for name in registry.names() {
                let marker = if name == settings.model_slot.default {
                    " (default)"
                } else {
                    ""
                };
                println!("  {}{}", name, marker);
            }
        }
    }

    Ok(())
}

/// Request and slot name from config, overridden by flags
fn build_request(settings: &Settings, args: &ForecastArgs) -> (ForecastRequest, String) {
    let app = &settings.app;
    let request = ForecastRequest::new(
        args.lat.unwrap_or(app.latitude),
        args.lon.unwrap_or(app.longitude),
    )
    .with_days(args.days.unwrap_or(app.forecast_days))
    .with_timezone(&app.timezone)
    .with_source(args.source.as_deref().unwrap_or(&app.source));

    let slot = args
        .slot
        .clone()
        .unwrap_or_else(|| settings.model_slot.default.clone());
    (request, slot)
}

fn correction_options(settings: &Settings, args: &CorrectionArgs) -> Result<CorrectionOptions> {
    let mut options = settings.correction.clone();
    if let Some(max) = args.max_precip {
        options.max_precip_mm = max;
    }
    if let Some(window) = args.smooth_window {
        options.smooth_window = window;
    }
    options.enable_clip &= !args.no_clip;
    options.enable_smooth &= !args.no_smooth;

    options.validate()?;
    Ok(options)
}

fn process_forecast(
    settings: &Settings,
    forecast: &ForecastArgs,
    correction: &CorrectionArgs,
) -> Result<ProcessedForecast> {
    let (request, slot) = build_request(settings, forecast);
    println!("Loading forecast: {}", forecast.input_file.display());

    let mut processor =
        ForecastProcessor::new(ModelSlotRegistry::new(), AlertEvaluator::new(settings.alerts));
    processor = if correction.no_corrections {
        processor.without_corrections()
    } else {
        processor.with_corrections(CorrectionPipeline::new(correction_options(
            settings, correction,
        )?))
    };

    let table = FileForecastSource::new(&forecast.input_file).fetch(&request)?;
    Ok(processor.process(table, &slot, request.latitude, request.longitude))
}

fn print_processed(processed: &ProcessedForecast, detailed: bool) {
    let summary = ForecastSummary::from_table(&processed.table);

    if detailed {
        println!("\n{}", summary.detailed_summary(&processed.alerts, &processed.notes));
        return;
    }

    println!("\n{}", summary.summary());

    println!("\nProcessing notes:");
    if processed.notes.is_empty() {
        println!("  No additional adjustments.");
    }
    for note in &processed.notes {
        println!("  - {}", note);
    }

    print_alerts(processed);
}

fn print_alerts(processed: &ProcessedForecast) {
    if processed.alerts.is_empty() {
        println!("\n✅ No alerts");
        return;
    }

    println!("\n⚠️  Alerts:");
    for alert in &processed.alerts {
        println!(
            "  - {} (peak {:.1}, from {})",
            alert,
            alert.extreme,
            alert.first_at.format("%Y-%m-%d %H:%M")
        );
    }
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}
