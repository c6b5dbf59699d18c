//! Time window resolution
//!
//! Turns a relative period string ("3h", "1d", ...) into an absolute
//! [start, end] pair anchored at the current instant.

use chrono::{DateTime, Duration, Utc};

use crate::error::SourceError;

/// Absolute query window, derived fresh per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Resolve a relative period into an absolute window ending now.
    ///
    /// The period grammar is `<integer><unit>` with unit one of `w`, `d`,
    /// `h`, `m`, `s`.
    pub fn resolve(period: &str) -> Result<Self, SourceError> {
        let span =
            parse_period(period).ok_or_else(|| SourceError::InvalidPeriod(period.to_string()))?;
        let end = Utc::now();
        Ok(Self {
            start: end - span,
            end,
        })
    }

    /// Window start in the upstream wire format.
    pub fn start_param(&self) -> String {
        format_instant(self.start)
    }

    /// Window end in the upstream wire format.
    pub fn end_param(&self) -> String {
        format_instant(self.end)
    }
}

/// Parse `<integer><unit>` into a duration.
fn parse_period(period: &str) -> Option<Duration> {
    let period = period.trim();
    let unit = period.chars().last()?;
    let count = &period[..period.len() - unit.len_utf8()];
    if count.is_empty() || !count.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let count: i64 = count.parse().ok()?;
    let unit_seconds: i64 = match unit {
        'w' => 604_800,
        'd' => 86_400,
        'h' => 3_600,
        'm' => 60,
        's' => 1,
        _ => return None,
    };
    Duration::try_seconds(count.checked_mul(unit_seconds)?)
}

// The endpoint expects a timezone-less ISO-8601 instant with a literal "Z"
// suffix; fractional seconds are always emitted at microsecond precision.
fn format_instant(instant: DateTime<Utc>) -> String {
    instant.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_exact_difference() {
        let cases = [
            ("2w", Duration::weeks(2)),
            ("1d", Duration::days(1)),
            ("3h", Duration::hours(3)),
            ("45m", Duration::minutes(45)),
            ("10s", Duration::seconds(10)),
        ];
        for (period, expected) in cases {
            let window = TimeWindow::resolve(period).unwrap();
            assert_eq!(window.end - window.start, expected, "period {}", period);
        }
    }

    #[test]
    fn test_resolve_anchored_at_now() {
        let before = Utc::now();
        let window = TimeWindow::resolve("3h").unwrap();
        let after = Utc::now();
        assert!(window.end >= before && window.end <= after);
    }

    #[test]
    fn test_invalid_periods_rejected() {
        for period in ["", "h", "3", "3x", "1.5h", "3 h", "-3h", "h3", "3hh"] {
            let result = TimeWindow::resolve(period);
            assert!(
                matches!(result, Err(SourceError::InvalidPeriod(_))),
                "period {:?} should be invalid",
                period
            );
        }
    }

    #[test]
    fn test_wire_format() {
        let instant = DateTime::from_timestamp(1_600_000_000, 500_000_000).unwrap();
        assert_eq!(format_instant(instant), "2020-09-13T12:26:40.500000Z");
    }

    #[test]
    fn test_wire_format_whole_seconds() {
        let instant = DateTime::from_timestamp(1_600_000_000, 0).unwrap();
        assert_eq!(format_instant(instant), "2020-09-13T12:26:40.000000Z");
    }
}
