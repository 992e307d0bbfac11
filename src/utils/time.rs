use crate::error::{ProcessingError, Result};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse an ISO-8601 timestamp
///
/// Accepts `YYYY-MM-DD HH:MM[:SS]`, the `T`-separated form, RFC 3339 with an
/// offset (converted to UTC) and bare dates (midnight).
///
/// # Examples
/// ```
/// use forecast_processor::utils::parse_timestamp;
///
/// let ts = parse_timestamp("2025-11-04 12:00").unwrap();
/// assert_eq!(ts.to_string(), "2025-11-04 12:00:00");
/// ```
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    for format in NAIVE_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(ts);
        }
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(ts.naive_utc());
    }

    // Space-separated date and time with an offset, e.g. "2025-11-04 12:00:00+01:00"
    if let Ok(ts) = DateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S%:z") {
        return Some(ts.naive_utc());
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Parse a duration string such as `5min`, `30s`, `1h` or `2 days`
///
/// # Examples
/// ```
/// use forecast_processor::utils::parse_tolerance;
///
/// let tolerance = parse_tolerance("5min").unwrap();
/// assert_eq!(tolerance.num_seconds(), 300);
/// ```
pub fn parse_tolerance(value: &str) -> Result<Duration> {
    let trimmed = value.trim();
    let split_at = trimmed
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(trimmed.len());
    let (amount_str, unit_str) = trimmed.split_at(split_at);

    if amount_str.is_empty() {
        return Err(ProcessingError::InvalidTolerance(format!(
            "'{}' has no numeric amount",
            value
        )));
    }

    let amount = amount_str.parse::<f64>().map_err(|_| {
        ProcessingError::InvalidTolerance(format!("invalid amount '{}'", amount_str))
    })?;

    let unit_ms = match unit_str.trim() {
        "ms" | "millis" | "milliseconds" => 1.0,
        "s" | "sec" | "secs" | "second" | "seconds" => 1_000.0,
        "min" | "mins" | "minute" | "minutes" | "m" | "T" => 60_000.0,
        "h" | "H" | "hr" | "hour" | "hours" => 3_600_000.0,
        "d" | "D" | "day" | "days" => 86_400_000.0,
        "" => {
            return Err(ProcessingError::InvalidTolerance(format!(
                "'{}' has no unit",
                value
            )))
        }
        other => {
            return Err(ProcessingError::InvalidTolerance(format!(
                "unknown unit '{}'",
                other
            )))
        }
    };

    let millis = amount * unit_ms;
    if !millis.is_finite() || millis > i64::MAX as f64 {
        return Err(ProcessingError::InvalidTolerance(format!(
            "'{}' is out of range",
            value
        )));
    }

    Ok(Duration::milliseconds(millis.round() as i64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = NaiveDate::from_ymd_opt(2025, 11, 4)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();

        assert_eq!(parse_timestamp("2025-11-04 12:00"), Some(expected));
        assert_eq!(parse_timestamp("2025-11-04T12:00"), Some(expected));
        assert_eq!(parse_timestamp("2025-11-04T12:00:00"), Some(expected));
        assert_eq!(parse_timestamp(" 2025-11-04 12:00:00 "), Some(expected));
        assert_eq!(parse_timestamp("2025-11-04T13:00:00+01:00"), Some(expected));
        assert_eq!(parse_timestamp("2025-11-04T12:00:00Z"), Some(expected));
    }

    #[test]
    fn test_parse_bare_date() {
        let ts = parse_timestamp("2025-11-04").unwrap();
        assert_eq!(ts.to_string(), "2025-11-04 00:00:00");
    }

    #[test]
    fn test_parse_invalid_timestamp() {
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("yesterday").is_none());
        assert!(parse_timestamp("2025-13-40 12:00").is_none());
    }

    #[test]
    fn test_parse_tolerance_units() {
        assert_eq!(parse_tolerance("5min").unwrap(), Duration::minutes(5));
        assert_eq!(parse_tolerance("30s").unwrap(), Duration::seconds(30));
        assert_eq!(parse_tolerance("1h").unwrap(), Duration::hours(1));
        assert_eq!(parse_tolerance("2 days").unwrap(), Duration::days(2));
        assert_eq!(parse_tolerance("1.5h").unwrap(), Duration::minutes(90));
        assert_eq!(parse_tolerance("250ms").unwrap(), Duration::milliseconds(250));
    }

    #[test]
    fn test_parse_tolerance_rejects_garbage() {
        assert!(parse_tolerance("").is_err());
        assert!(parse_tolerance("min").is_err());
        assert!(parse_tolerance("5").is_err());
        assert!(parse_tolerance("5 fortnights").is_err());
        assert!(parse_tolerance("-5min").is_err());
    }
}
