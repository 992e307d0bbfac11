use chrono::NaiveDateTime;

use crate::models::{CorrectionNote, WeatherTable};
use crate::processors::alerts::Alert;
use crate::utils::constants::{FIELD_PRECIPITATION, FIELD_TEMPERATURE};
use crate::utils::stats::mean;

#[derive(Debug, Clone, PartialEq)]
pub struct TemperatureStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub min_at: NaiveDateTime,
    pub max_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrecipitationStats {
    pub total: f64,
    pub wettest_hour: NaiveDateTime,
    pub wettest_amount: f64,
}

/// Headline figures of a forecast table, rendered as short plain text
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ForecastSummary {
    pub rows: usize,
    pub period: Option<(NaiveDateTime, NaiveDateTime)>,
    pub temperature: Option<TemperatureStats>,
    pub precipitation: Option<PrecipitationStats>,
}

impl ForecastSummary {
    pub fn from_table(table: &WeatherTable) -> Self {
        let period = table.first_time().zip(table.last_time());

        Self {
            rows: table.len(),
            period,
            temperature: temperature_stats(table),
            precipitation: precipitation_stats(table),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// One paragraph suitable for reading aloud
    pub fn summary(&self) -> String {
        let Some((start, end)) = self.period else {
            return "No forecast data available.".to_string();
        };

        let mut text = format!(
            "Forecast from {} to {} ({} hours).",
            start.format("%Y-%m-%d %H:%M"),
            end.format("%Y-%m-%d %H:%M"),
            self.rows
        );

        match &self.temperature {
            Some(t) => text.push_str(&format!(
                " Temperature between {:.1}°C and {:.1}°C, averaging {:.1}°C.",
                t.min, t.max, t.mean
            )),
            None => text.push_str(" No temperature data."),
        }

        match &self.precipitation {
            Some(p) if p.total > 0.0 => text.push_str(&format!(
                " Total precipitation {:.1} mm, heaviest at {} ({:.1} mm).",
                p.total,
                p.wettest_hour.format("%Y-%m-%d %H:%M"),
                p.wettest_amount
            )),
            Some(_) => text.push_str(" No precipitation expected."),
            None => text.push_str(" No precipitation data."),
        }

        text
    }

    /// Summary followed by alerts and processing notes
    pub fn detailed_summary(&self, alerts: &[Alert], notes: &[CorrectionNote]) -> String {
        let mut text = self.summary();

        if let Some(t) = &self.temperature {
            text.push_str(&format!(
                "\n\nExtremes:\n- Coldest: {:.1}°C at {}\n- Warmest: {:.1}°C at {}",
                t.min,
                t.min_at.format("%Y-%m-%d %H:%M"),
                t.max,
                t.max_at.format("%Y-%m-%d %H:%M")
            ));
        }

        text.push_str("\n\nAlerts:");
        if alerts.is_empty() {
            text.push_str("\n- none");
        }
        for alert in alerts {
            text.push_str(&format!("\n- {}", alert));
        }

        text.push_str("\n\nProcessing notes:");
        if notes.is_empty() {
            text.push_str("\n- No additional adjustments.");
        }
        for note in notes {
            text.push_str(&format!("\n- {}", note));
        }

        text
    }
}

fn temperature_stats(table: &WeatherTable) -> Option<TemperatureStats> {
    let values = table.field(FIELD_TEMPERATURE)?;
    let index = table.index();

    let mut present = values
        .iter()
        .enumerate()
        .filter_map(|(row, v)| v.map(|v| (row, v)));
    let (first_row, first) = present.next()?;

    let mut stats = TemperatureStats {
        min: first,
        max: first,
        mean: 0.0,
        min_at: index[first_row],
        max_at: index[first_row],
    };

    for (row, value) in present {
        if value < stats.min {
            stats.min = value;
            stats.min_at = index[row];
        }
        if value > stats.max {
            stats.max = value;
            stats.max_at = index[row];
        }
    }

    stats.mean = mean(values).unwrap_or(first);
    Some(stats)
}

fn precipitation_stats(table: &WeatherTable) -> Option<PrecipitationStats> {
    let values = table.field(FIELD_PRECIPITATION)?;
    let index = table.index();

    let mut total = 0.0;
    let mut wettest: Option<(usize, f64)> = None;
    for (row, value) in values.iter().enumerate() {
        let Some(value) = *value else { continue };
        total += value;
        if wettest.map_or(true, |(_, max)| value > max) {
            wettest = Some((row, value));
        }
    }

    let (row, amount) = wettest?;
    Some(PrecipitationStats {
        total,
        wettest_hour: index[row],
        wettest_amount: amount,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use pretty_assertions::assert_eq;

    fn hours(n: usize) -> Vec<NaiveDateTime> {
        let start = NaiveDate::from_ymd_opt(2025, 11, 4)
            .unwrap()
            .and_hms_opt(6, 0, 0)
            .unwrap();
        (0..n).map(|h| start + Duration::hours(h as i64)).collect()
    }

    #[test]
    fn test_empty_table_summary() {
        let summary = ForecastSummary::from_table(&WeatherTable::empty());

        assert!(summary.is_empty());
        assert_eq!(summary.summary(), "No forecast data available.");
    }

    #[test]
    fn test_summary_figures() {
        let table = WeatherTable::builder()
            .index(hours(4))
            .field("temperature", vec![Some(4.0), None, Some(9.0), Some(5.0)])
            .dense_field("precipitation", &[0.0, 2.5, 0.5, 0.0])
            .build()
            .unwrap();

        let summary = ForecastSummary::from_table(&table);
        let temperature = summary.temperature.clone().unwrap();
        let precipitation = summary.precipitation.clone().unwrap();

        assert_eq!(summary.rows, 4);
        assert_eq!(temperature.min, 4.0);
        assert_eq!(temperature.max, 9.0);
        assert_eq!(temperature.mean, 6.0);
        assert_eq!(temperature.max_at, hours(4)[2]);
        assert_eq!(precipitation.total, 3.0);
        assert_eq!(precipitation.wettest_hour, hours(4)[1]);

        assert_eq!(
            summary.summary(),
            "Forecast from 2025-11-04 06:00 to 2025-11-04 09:00 (4 hours). \
             Temperature between 4.0°C and 9.0°C, averaging 6.0°C. \
             Total precipitation 3.0 mm, heaviest at 2025-11-04 07:00 (2.5 mm)."
        );
    }

    #[test]
    fn test_dry_and_partial_tables() {
        let dry = WeatherTable::builder()
            .index(hours(2))
            .dense_field("precipitation", &[0.0, 0.0])
            .build()
            .unwrap();

        let text = ForecastSummary::from_table(&dry).summary();
        assert!(text.ends_with("No temperature data. No precipitation expected."), "{}", text);
    }

    #[test]
    fn test_detailed_summary_lists_notes() {
        let table = WeatherTable::builder()
            .index(hours(2))
            .dense_field("temperature", &[1.0, 2.0])
            .build()
            .unwrap();
        let notes = vec![CorrectionNote::new("slot=none")];

        let text = ForecastSummary::from_table(&table).detailed_summary(&[], &notes);
        assert!(text.contains("Alerts:\n- none"), "{}", text);
        assert!(text.ends_with("Processing notes:\n- slot=none"), "{}", text);
    }
}
