use crate::aggregators::AggregationMethod;
use crate::common::{Granularity, Sample, Timestamp};
use crate::error::{CarbonaraError, CarbonaraResult};
use crate::parser::{format_duration, format_iso8601, parse_duration, parse_iso8601};
use crate::series::aggregated::AggregatedTimeSerie;
use crate::series::archive::TimeSerieArchive;
use crate::series::raw::BoundTimeSerie;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Binary persistence form: carries every byte of state, including NaN
/// bucket values, so `unserialize(serialize(x)) == x` holds structurally
/// (invariant 3, §8). Encoded with `bincode` over this crate's own types'
/// `serde` impls rather than JSON, since JSON cannot represent NaN.
#[derive(Serialize, Deserialize)]
struct ArchiveBlob {
    raw_samples: Vec<Sample>,
    block_size: Option<Granularity>,
    back_window: u32,
    aggregation_method: AggregationMethod,
    aggregated: Vec<AggregatedBlob>,
}

#[derive(Serialize, Deserialize)]
struct AggregatedBlob {
    sampling: Granularity,
    aggregation_method: AggregationMethod,
    max_size: Option<usize>,
    buckets: Vec<(Timestamp, f64)>,
}

impl TimeSerieArchive {
    pub fn serialize(&self) -> CarbonaraResult<Vec<u8>> {
        let blob = ArchiveBlob {
            raw_samples: self.raw().samples().to_vec(),
            block_size: self.raw().block_size(),
            back_window: self.raw().back_window(),
            aggregation_method: self.aggregation_method(),
            aggregated: self
                .aggregated_series()
                .iter()
                .map(|s| AggregatedBlob {
                    sampling: s.sampling(),
                    aggregation_method: s.aggregation_method(),
                    max_size: s.max_size(),
                    buckets: s.raw_buckets().to_vec(),
                })
                .collect(),
        };
        bincode::serde::encode_to_vec(&blob, bincode::config::standard()).map_err(|e| {
            CarbonaraError::Serialization {
                reason: e.to_string(),
            }
        })
    }

    pub fn unserialize(bytes: &[u8]) -> CarbonaraResult<Self> {
        let (blob, _): (ArchiveBlob, usize) =
            bincode::serde::decode_from_slice(bytes, bincode::config::standard()).map_err(|e| {
                CarbonaraError::Deserialization {
                    reason: e.to_string(),
                }
            })?;
        let raw = BoundTimeSerie::from_parts(blob.raw_samples, blob.block_size, blob.back_window);
        let aggregated = blob
            .aggregated
            .into_iter()
            .map(|a| AggregatedTimeSerie::from_parts(a.sampling, a.aggregation_method, a.max_size, a.buckets))
            .collect();
        Ok(TimeSerieArchive::from_parts(raw, aggregated, blob.aggregation_method))
    }

    /// The interoperable JSON-like shape described in §4.3: a `timeserie`
    /// object dumping the raw bounded buffer, and an `archives` array
    /// dumping each aggregated view, in the order they're stored (finest
    /// first).
    pub fn to_dict(&self) -> Value {
        let raw = self.raw();
        let block_size_secs = raw.block_size().map(|b| b.seconds_f64()).unwrap_or(0.0);
        let timespan_secs = block_size_secs * (raw.back_window() as f64 + 1.0);
        let timespan = render_duration(timespan_secs);

        let raw_values: Vec<(Timestamp, f64)> =
            raw.iter().map(|s| (s.timestamp, s.value)).collect();

        let mut root = Map::new();
        root.insert(
            "timeserie".to_string(),
            Value::Object({
                let mut m = Map::new();
                m.insert("values".to_string(), values_to_json(&raw_values));
                m.insert("timespan".to_string(), Value::String(timespan));
                m
            }),
        );

        let archives = self
            .aggregated_series()
            .iter()
            .map(|series| {
                let mut m = Map::new();
                m.insert(
                    "aggregation_method".to_string(),
                    Value::String(series.aggregation_method().name()),
                );
                m.insert(
                    "sampling".to_string(),
                    Value::String(format_duration(series.sampling())),
                );
                m.insert(
                    "max_size".to_string(),
                    series
                        .max_size()
                        .map(|n| Value::from(n as u64))
                        .unwrap_or(Value::Null),
                );
                m.insert("values".to_string(), values_to_json(series.raw_buckets()));
                Value::Object(m)
            })
            .collect();
        root.insert("archives".to_string(), Value::Array(archives));

        Value::Object(root)
    }

    pub fn from_dict(value: &Value) -> CarbonaraResult<Self> {
        let malformed = |reason: &str| CarbonaraError::Deserialization {
            reason: reason.to_string(),
        };
        let root = value.as_object().ok_or_else(|| malformed("expected object"))?;

        let timeserie = root
            .get("timeserie")
            .and_then(Value::as_object)
            .ok_or_else(|| malformed("missing timeserie"))?;
        let raw_values = json_to_values(
            timeserie
                .get("values")
                .ok_or_else(|| malformed("missing timeserie.values"))?,
        )?;
        let timespan_str = timeserie
            .get("timespan")
            .and_then(Value::as_str)
            .ok_or_else(|| malformed("missing timeserie.timespan"))?;
        let timespan_secs = parse_duration(timespan_str)?.seconds_f64();

        let archives_json = root
            .get("archives")
            .and_then(Value::as_array)
            .ok_or_else(|| malformed("missing archives"))?;

        let mut aggregated = Vec::with_capacity(archives_json.len());
        let mut method = AggregationMethod::Mean;
        for entry in archives_json {
            let obj = entry
                .as_object()
                .ok_or_else(|| malformed("archive entry not an object"))?;
            let method_name = obj
                .get("aggregation_method")
                .and_then(Value::as_str)
                .ok_or_else(|| malformed("missing aggregation_method"))?;
            method = AggregationMethod::parse(method_name).ok_or_else(|| {
                CarbonaraError::InvalidAggregationMethod {
                    name: method_name.to_string(),
                }
            })?;
            let sampling_str = obj
                .get("sampling")
                .and_then(Value::as_str)
                .ok_or_else(|| malformed("missing sampling"))?;
            let sampling = parse_duration(sampling_str)?;
            let max_size = match obj.get("max_size") {
                Some(Value::Number(n)) => {
                    Some(n.as_u64().ok_or_else(|| malformed("bad max_size"))? as usize)
                }
                _ => None,
            };
            let buckets =
                json_to_values(obj.get("values").ok_or_else(|| malformed("missing values"))?)?;
            aggregated.push(AggregatedTimeSerie::from_parts(
                sampling, method, max_size, buckets,
            ));
        }
        aggregated.sort_by_key(|s| s.sampling());

        let block_size = aggregated.last().map(|s| s.sampling());
        let back_window = match block_size {
            Some(bs) if bs.seconds_f64() > 0.0 => {
                ((timespan_secs / bs.seconds_f64()).round() as i64 - 1).max(0) as u32
            }
            _ => 0,
        };
        let raw = BoundTimeSerie::from_parts(
            raw_values
                .into_iter()
                .map(|(ts, v)| Sample::new(ts, v))
                .collect(),
            block_size,
            back_window,
        );

        Ok(TimeSerieArchive::from_parts(raw, aggregated, method))
    }
}

fn render_duration(seconds: f64) -> String {
    if seconds <= 0.0 {
        return "0s".to_string();
    }
    Granularity::from_seconds_f64(seconds)
        .map(format_duration)
        .unwrap_or_else(|_| "0s".to_string())
}

fn values_to_json(points: &[(Timestamp, f64)]) -> Value {
    let mut map = Map::new();
    for (ts, v) in points {
        let value = if v.is_finite() {
            Value::from(*v)
        } else {
            Value::Null
        };
        map.insert(format_iso8601(*ts), value);
    }
    Value::Object(map)
}

fn json_to_values(value: &Value) -> CarbonaraResult<Vec<(Timestamp, f64)>> {
    let obj = value
        .as_object()
        .ok_or_else(|| CarbonaraError::Deserialization {
            reason: "expected values object".to_string(),
        })?;
    let mut out = Vec::with_capacity(obj.len());
    for (key, v) in obj {
        let ts = parse_iso8601(key)?;
        let val = match v {
            Value::Null => f64::NAN,
            Value::Number(n) => n.as_f64().ok_or_else(|| CarbonaraError::Deserialization {
                reason: format!("bad numeric value for {key}"),
            })?,
            _ => {
                return Err(CarbonaraError::Deserialization {
                    reason: format!("unexpected value type for {key}"),
                })
            }
        };
        out.push((ts, val));
    }
    out.sort_by_key(|(ts, _)| *ts);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::archive::ArchiveDefinition;
    use chrono::NaiveDate;

    fn ts(h: u32, m: u32, s: u32) -> Timestamp {
        Timestamp::from_naive_datetime(
            NaiveDate::from_ymd_opt(2014, 1, 1)
                .unwrap()
                .and_hms_opt(h, m, s)
                .unwrap(),
        )
    }

    fn def(secs: f64, points: usize) -> ArchiveDefinition {
        ArchiveDefinition::new(Granularity::from_seconds_f64(secs).unwrap(), Some(points))
    }

    #[test]
    fn binary_round_trip_is_structural() {
        let mut archive = TimeSerieArchive::from_definitions(
            vec![def(60.0, 10), def(300.0, 6)],
            AggregationMethod::Mean,
        )
        .unwrap();
        archive
            .set_values(&[
                Sample::new(ts(11, 46, 4), 4.0),
                Sample::new(ts(11, 47, 34), 8.0),
                Sample::new(ts(12, 5, 13), 5.0),
            ])
            .unwrap();

        let bytes = archive.serialize().unwrap();
        let restored = TimeSerieArchive::unserialize(&bytes).unwrap();
        assert_eq!(archive.fetch(None, None), restored.fetch(None, None));
    }

    #[test]
    fn dict_round_trip_preserves_std_archive() {
        let mut archive =
            TimeSerieArchive::from_definitions(vec![def(1.0, 86400)], AggregationMethod::Std)
                .unwrap();
        let base = ts(23, 40, 0);
        let samples: Vec<Sample> = (0..10)
            .map(|i| Sample::new(Timestamp::from_nanos(base.nanos() + i * 1_000_000_000), i as f64))
            .collect();
        archive.set_values(&samples).unwrap();

        let dict = archive.to_dict();
        let restored = TimeSerieArchive::from_dict(&dict).unwrap();
        assert_eq!(
            archive.fetch(None, None).len(),
            restored.fetch(None, None).len()
        );
    }

    #[test]
    fn nan_bucket_round_trips_through_dict_as_null() {
        let mut series = AggregatedTimeSerie::new(
            Granularity::from_seconds_f64(1.0).unwrap(),
            AggregationMethod::Std,
            None,
        );
        series
            .set_values([(ts(0, 0, 0), [1.0].as_slice())])
            .unwrap();
        let json = values_to_json(series.raw_buckets());
        let back = json_to_values(&json).unwrap();
        assert!(back[0].1.is_nan());
    }
}
