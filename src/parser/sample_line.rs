use crate::common::{Sample, Timestamp};
use crate::error::{CarbonaraError, CarbonaraResult};
use chrono::NaiveDateTime;

/// Parse one `YYYY-MM-DD HH:MM:SS,value` line as read by the `create` and
/// `update` CLI utilities (§6). Blank lines and lines starting with `#` are
/// not samples — callers filter those out before calling this.
pub fn parse_sample_line(line: &str) -> CarbonaraResult<Sample> {
    let invalid = || CarbonaraError::InvalidTimestamp {
        input: line.to_string(),
    };
    let (ts_part, value_part) = line.rsplit_once(',').ok_or_else(invalid)?;
    let naive = NaiveDateTime::parse_from_str(ts_part.trim(), "%Y-%m-%d %H:%M:%S")
        .map_err(|_| invalid())?;
    let value: f64 = value_part.trim().parse().map_err(|_| invalid())?;
    Ok(Sample::new(Timestamp::from_naive_datetime(naive), value))
}

/// Parse the ISO-8601 keys used by the `to_dict`/`from_dict` value maps.
pub fn parse_iso8601(input: &str) -> CarbonaraResult<Timestamp> {
    let invalid = || CarbonaraError::InvalidTimestamp {
        input: input.to_string(),
    };
    if let Ok(naive) = NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(Timestamp::from_naive_datetime(naive));
    }
    let naive = NaiveDateTime::parse_from_str(input, "%Y-%m-%d %H:%M:%S%.f").map_err(|_| invalid())?;
    Ok(Timestamp::from_naive_datetime(naive))
}

/// Render a timestamp as the ISO-8601 key form used by `to_dict`.
pub fn format_iso8601(ts: Timestamp) -> String {
    let naive = ts.to_naive_datetime();
    let nanos = ts.nanos().rem_euclid(1_000_000_000);
    if nanos == 0 {
        naive.format("%Y-%m-%dT%H:%M:%S").to_string()
    } else {
        naive.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
    }
}
