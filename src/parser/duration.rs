use crate::common::Granularity;
use crate::error::{CarbonaraError, CarbonaraResult};

/// Render a granularity as `<number><unit>`, unit in `{s, Min, H, D}`,
/// picking the coarsest unit that divides it evenly so round numbers stay
/// round (`"5Min"` rather than `"300s"`). Used for the `sampling` and
/// `timespan` fields of the `to_dict` persistence shape (§4.3).
pub fn format_duration(granularity: Granularity) -> String {
    let nanos = granularity.nanos();
    const SECOND: i64 = 1_000_000_000;
    const MINUTE: i64 = 60 * SECOND;
    const HOUR: i64 = 60 * MINUTE;
    const DAY: i64 = 24 * HOUR;

    if nanos % DAY == 0 {
        format!("{}D", nanos / DAY)
    } else if nanos % HOUR == 0 {
        format!("{}H", nanos / HOUR)
    } else if nanos % MINUTE == 0 {
        format!("{}Min", nanos / MINUTE)
    } else if nanos % SECOND == 0 {
        format!("{}s", nanos / SECOND)
    } else {
        format!("{}s", nanos as f64 / SECOND as f64)
    }
}

/// Parse a duration string of the form `<number><unit>`, unit in
/// `{s, Min, H, D}`, or a bare (possibly fractional) number of seconds.
pub fn parse_duration(input: &str) -> CarbonaraResult<Granularity> {
    let trimmed = input.trim();
    let invalid = || CarbonaraError::InvalidDuration {
        input: input.to_string(),
    };

    let (number, seconds_per_unit) = if let Some(n) = trimmed.strip_suffix("Min") {
        (n, 60.0)
    } else if let Some(n) = trimmed.strip_suffix('H') {
        (n, 3600.0)
    } else if let Some(n) = trimmed.strip_suffix('D') {
        (n, 86400.0)
    } else if let Some(n) = trimmed.strip_suffix('s') {
        (n, 1.0)
    } else {
        (trimmed, 1.0)
    };

    let value: f64 = number.trim().parse().map_err(|_| invalid())?;
    Granularity::from_seconds_f64(value * seconds_per_unit).map_err(|_| invalid())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_minutes_and_hours_when_exact() {
        assert_eq!(format_duration(Granularity::from_seconds_f64(300.0).unwrap()), "5Min");
        assert_eq!(format_duration(Granularity::from_seconds_f64(3600.0).unwrap()), "1H");
        assert_eq!(format_duration(Granularity::from_seconds_f64(86400.0).unwrap()), "1D");
    }

    #[test]
    fn falls_back_to_seconds_when_not_round() {
        assert_eq!(format_duration(Granularity::from_seconds_f64(90.0).unwrap()), "90s");
        assert_eq!(format_duration(Granularity::from_seconds_f64(0.2).unwrap()), "0.2s");
    }

    #[test]
    fn parses_units_and_bare_seconds() {
        assert_eq!(parse_duration("5Min").unwrap().seconds_f64(), 300.0);
        assert_eq!(parse_duration("2H").unwrap().seconds_f64(), 7200.0);
        assert_eq!(parse_duration("1D").unwrap().seconds_f64(), 86400.0);
        assert_eq!(parse_duration("60").unwrap().seconds_f64(), 60.0);
        assert_eq!(parse_duration("0.2s").unwrap().seconds_f64(), 0.2);
    }

    #[test]
    fn round_trips() {
        for secs in [1.0, 60.0, 300.0, 3600.0, 86400.0, 43200.0] {
            let g = Granularity::from_seconds_f64(secs).unwrap();
            let s = format_duration(g);
            let back = parse_duration(&s).unwrap();
            assert_eq!(back.nanos(), g.nanos());
        }
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("abc").is_err());
        assert!(parse_duration("-5s").is_err());
    }
}
