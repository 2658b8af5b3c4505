//! ISO-8601 durations as reported by video providers (`PT1H2M3S`)

use regex::Regex;
use std::sync::LazyLock;

use crate::error::NoteError;

static DURATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^P(?:(\d+(?:[.,]\d+)?)Y)?(?:(\d+(?:[.,]\d+)?)M)?(?:(\d+(?:[.,]\d+)?)W)?(?:(\d+(?:[.,]\d+)?)D)?(?:T(?:(\d+(?:[.,]\d+)?)H)?(?:(\d+(?:[.,]\d+)?)M)?(?:(\d+(?:[.,]\d+)?)S)?)?$",
    )
    .expect("duration pattern is valid")
});

const MINUTE: u64 = 60;
const HOUR: u64 = 60 * MINUTE;
const DAY: u64 = 24 * HOUR;
const WEEK: u64 = 7 * DAY;
const MONTH: u64 = 30 * DAY;
const YEAR: u64 = 365 * DAY;

/// Duration split into the components it was written with
///
/// Components are kept as given; `PT90M` stays 90 minutes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Duration {
    pub years: u64,
    pub months: u64,
    pub weeks: u64,
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl Duration {
    /// Parse an ISO-8601 duration; fractional parts are truncated
    pub fn parse(input: &str) -> Result<Self, NoteError> {
        let input = input.trim();
        let caps = DURATION_RE
            .captures(input)
            .filter(|_| input != "P" && !input.ends_with('T'))
            .ok_or_else(|| NoteError::Parse(format!("invalid ISO-8601 duration: {:?}", input)))?;

        let component = |i: usize| -> u64 {
            caps.get(i)
                .and_then(|m| m.as_str().split(['.', ',']).next())
                .and_then(|whole| whole.parse().ok())
                .unwrap_or(0)
        };

        Ok(Self {
            years: component(1),
            months: component(2),
            weeks: component(3),
            days: component(4),
            hours: component(5),
            minutes: component(6),
            seconds: component(7),
        })
    }

    /// Total length in seconds (365-day years, 30-day months)
    ///
    /// Saturates at `u64::MAX` for absurdly long durations.
    pub fn to_seconds(&self) -> u64 {
        [
            (self.years, YEAR),
            (self.months, MONTH),
            (self.weeks, WEEK),
            (self.days, DAY),
            (self.hours, HOUR),
            (self.minutes, MINUTE),
            (self.seconds, 1),
        ]
        .iter()
        .fold(0u64, |total, &(value, unit)| {
            total.saturating_add(value.saturating_mul(unit))
        })
    }

    /// Compact form such as `1h 5m 3s`; zero components are skipped
    pub fn format(&self) -> String {
        [
            (self.years, 'y'),
            (self.months, 'm'),
            (self.weeks, 'w'),
            (self.days, 'd'),
            (self.hours, 'h'),
            (self.minutes, 'm'),
            (self.seconds, 's'),
        ]
        .iter()
        .filter(|(value, _)| *value > 0)
        .map(|(value, unit)| format!("{}{}", value, unit))
        .collect::<Vec<_>>()
        .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_seconds_saturates() {
        let d = Duration::parse("P999999999999Y").unwrap();
        assert_eq!(d.years, 999_999_999_999);
        assert_eq!(d.to_seconds(), u64::MAX);

        let d = Duration {
            seconds: u64::MAX,
            minutes: 1,
            ..Default::default()
        };
        assert_eq!(d.to_seconds(), u64::MAX);
    }

    #[test]
    fn test_format_zero_is_empty() {
        assert_eq!(Duration::default().format(), "");
    }

    #[test]
    fn test_format_seconds_only() {
        let d = Duration {
            seconds: 45,
            ..Default::default()
        };
        assert_eq!(d.format(), "45s");
    }

    #[test]
    fn test_format_skips_zero_components() {
        let d = Duration {
            hours: 2,
            seconds: 5,
            ..Default::default()
        };
        assert_eq!(d.format(), "2h 5s");
    }

    #[test]
    fn test_format_all_components_in_order() {
        let d = Duration::parse("P1Y2M3W4DT5H6M7S").unwrap();
        assert_eq!(d.format(), "1y 2m 3w 4d 5h 6m 7s");
    }

    #[test]
    fn test_parse_video_durations() {
        let d = Duration::parse("PT4M13S").unwrap();
        assert_eq!(d.minutes, 4);
        assert_eq!(d.seconds, 13);
        assert_eq!(d.to_seconds(), 253);

        let d = Duration::parse("PT1H").unwrap();
        assert_eq!(d.to_seconds(), 3600);
        assert_eq!(d.format(), "1h");

        let d = Duration::parse("P1DT2H").unwrap();
        assert_eq!(d.to_seconds(), 86400 + 7200);
    }

    #[test]
    fn test_parse_keeps_decomposition() {
        let d = Duration::parse("PT90M").unwrap();
        assert_eq!(d.hours, 0);
        assert_eq!(d.minutes, 90);
        assert_eq!(d.format(), "90m");
    }

    #[test]
    fn test_parse_truncates_fractions() {
        let d = Duration::parse("PT1.5S").unwrap();
        assert_eq!(d.seconds, 1);
        let d = Duration::parse("PT2,9S").unwrap();
        assert_eq!(d.seconds, 2);
    }

    #[test]
    fn test_parse_zero_duration() {
        let d = Duration::parse("P0D").unwrap();
        assert_eq!(d, Duration::default());
        assert_eq!(d.format(), "");
    }

    #[test]
    fn test_parse_invalid() {
        for input in ["", "P", "PT", "4M13S", "PT4X", "P1DT", "garbage"] {
            assert!(
                matches!(Duration::parse(input), Err(NoteError::Parse(_))),
                "expected parse error for {:?}",
                input
            );
        }
    }
}
