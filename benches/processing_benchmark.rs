use chrono::{Duration, NaiveDate, NaiveDateTime};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use forecast_processor::models::{ObservedTable, WeatherTable};
use forecast_processor::processors::{
    AlertEvaluator, CorrectionPipeline, ForecastProcessor, ForecastVerifier, ModelSlotRegistry,
};

// Hourly forecast over `days` days with a daily temperature cycle and occasional storms
fn create_forecast(days: usize) -> WeatherTable {
    let start = NaiveDate::from_ymd_opt(2025, 7, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    let hours = days * 24;

    let index: Vec<NaiveDateTime> = (0..hours)
        .map(|h| start + Duration::hours(h as i64))
        .collect();
    let temperature: Vec<f64> = (0..hours)
        .map(|h| 18.0 + 8.0 * ((h % 24) as f64 / 24.0 * std::f64::consts::TAU).sin())
        .collect();
    let precipitation: Vec<f64> = (0..hours)
        .map(|h| if h % 37 == 0 { 95.0 } else { (h % 5) as f64 * 0.3 })
        .collect();

    WeatherTable::builder()
        .index(index)
        .dense_field("temperature", &temperature)
        .dense_field("precipitation", &precipitation)
        .build()
        .unwrap()
}

// Observations every hour, shifted by a few minutes
fn create_observed(days: usize, offset_minutes: i64) -> ObservedTable {
    let start = NaiveDate::from_ymd_opt(2025, 7, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();

    let mut csv = String::from("time,temperature,precipitation\n");
    for h in 0..days * 24 {
        let ts = start + Duration::hours(h as i64) + Duration::minutes(offset_minutes);
        csv.push_str(&format!(
            "{},{:.2},{:.1}\n",
            ts.format("%Y-%m-%d %H:%M"),
            17.0 + (h % 24) as f64 * 0.4,
            (h % 7) as f64 * 0.2
        ));
    }

    ObservedTable::from_csv_reader(csv.as_bytes()).unwrap()
}

fn benchmark_correction_pipeline(c: &mut Criterion) {
    let forecast = create_forecast(7);
    let pipeline = CorrectionPipeline::default();

    c.bench_function("correction_pipeline_7d", |b| {
        b.iter(|| {
            let output = pipeline.correct(black_box(&forecast));
            black_box(output.notes.len())
        })
    });
}

fn benchmark_forecast_processor(c: &mut Criterion) {
    let forecast = create_forecast(7);
    let processor = ForecastProcessor::new(ModelSlotRegistry::new(), AlertEvaluator::default());

    c.bench_function("forecast_processor_graphcast_7d", |b| {
        b.iter(|| {
            let result =
                processor.process(Some(forecast.clone()), "mock-graphcast", 52.2297, 21.0122);
            black_box(result.alerts.len())
        })
    });
}

fn benchmark_verification(c: &mut Criterion) {
    let forecast = create_forecast(7);
    let exact = create_observed(7, 0);
    let shifted = create_observed(7, 4);

    c.bench_function("verification_exact_7d", |b| {
        let verifier = ForecastVerifier::new();
        b.iter(|| black_box(verifier.verify(&forecast, &exact).unwrap().n_samples))
    });

    c.bench_function("verification_tolerance_7d", |b| {
        let verifier = ForecastVerifier::with_tolerance(Duration::minutes(5));
        b.iter(|| black_box(verifier.verify(&forecast, &shifted).unwrap().n_samples))
    });
}

fn benchmark_varying_forecast_lengths(c: &mut Criterion) {
    let mut group = c.benchmark_group("verification_by_days");

    for &days in &[1, 7, 16, 60] {
        group.bench_with_input(BenchmarkId::new("days", days), &days, |b, &days| {
            let forecast = create_forecast(days);
            let observed = create_observed(days, 3);
            let verifier = ForecastVerifier::with_tolerance(Duration::minutes(10));

            b.iter(|| black_box(verifier.verify(&forecast, &observed).unwrap().fields.len()))
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    benchmark_correction_pipeline,
    benchmark_forecast_processor,
    benchmark_verification,
    benchmark_varying_forecast_lengths
);
criterion_main!(benches);
