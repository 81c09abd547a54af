//! Time series samples and their text rendering

use chrono::DateTime;
use serde::{Deserialize, Serialize};

/// One point of a time series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Milliseconds since the Unix epoch, UTC
    pub timestamp_ms: i64,
    pub value: f64,
}

impl Sample {
    pub fn new(timestamp_ms: i64, value: f64) -> Self {
        Self {
            timestamp_ms,
            value,
        }
    }
}

/// Renders a millisecond timestamp as `YYYY-MM-DDTHH:MM:SS.mmm` (UTC)
///
/// Returns `None` when the timestamp is outside the representable range.
pub fn format_timestamp(timestamp_ms: i64) -> Option<String> {
    DateTime::from_timestamp_millis(timestamp_ms).map(|dt| {
        dt.naive_utc()
            .format("%Y-%m-%dT%H:%M:%S%.3f")
            .to_string()
    })
}

/// Renders a value in its natural decimal form
///
/// Shortest representation that round-trips. Integral values keep one
/// decimal (`5.0`), magnitudes below `1e-4` or from `1e16` up use exponent
/// notation with a signed, two-digit exponent (`1e+16`, `1.5e-05`).
pub fn format_value(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0.0" } else { "0.0" }.to_string();
    }

    let scientific = format!("{value:e}");
    let (mantissa, exponent) = match scientific.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (scientific.as_str(), 0),
    };

    if (-4..16).contains(&exponent) {
        let plain = format!("{value}");
        if plain.contains('.') {
            plain
        } else {
            format!("{plain}.0")
        }
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{mantissa}e{sign}{:02}", exponent.abs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(5.0, "5.0")]
    #[test_case(6.2, "6.2")]
    #[test_case(-15.0, "-15.0")]
    #[test_case(10023.0, "10023.0")]
    #[test_case(8.587678, "8.587678")]
    #[test_case(0.0001, "0.0001")]
    #[test_case(0.000015, "1.5e-05")]
    #[test_case(1e16, "1e+16")]
    #[test_case(123456789012345.0, "123456789012345.0")]
    #[test_case(-0.0, "-0.0")]
    #[test_case(f64::NAN, "nan")]
    #[test_case(f64::NEG_INFINITY, "-inf")]
    fn test_format_value(value: f64, expected: &str) {
        assert_eq!(format_value(value), expected);
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(
            format_timestamp(1_000_000_000_000).as_deref(),
            Some("2001-09-09T01:46:40.000")
        );
        assert_eq!(
            format_timestamp(1_000_000_003_600).as_deref(),
            Some("2001-09-09T01:46:43.600")
        );
        assert_eq!(format_timestamp(0).as_deref(), Some("1970-01-01T00:00:00.000"));
        assert_eq!(format_timestamp(i64::MAX), None);
    }

    #[test]
    fn test_negative_timestamp() {
        assert_eq!(
            format_timestamp(-1).as_deref(),
            Some("1969-12-31T23:59:59.999")
        );
    }
}
