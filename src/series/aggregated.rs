use crate::aggregators::AggregationMethod;
use crate::common::{Granularity, Timestamp};
use crate::error::CarbonaraResult;

/// A single down-sampled view of a raw series: one bucket per `sampling`
/// window, reduced with `aggregation_method`. Like `BoundTimeSerie`, storage
/// is a sorted `Vec` rather than a tree, since buckets are produced and
/// consumed in timestamp order far more often than they are looked up
/// randomly.
#[derive(Clone, Debug)]
pub struct AggregatedTimeSerie {
    sampling: Granularity,
    aggregation_method: AggregationMethod,
    max_size: Option<usize>,
    buckets: Vec<(Timestamp, f64)>,
}

impl AggregatedTimeSerie {
    pub fn new(
        sampling: Granularity,
        aggregation_method: AggregationMethod,
        max_size: Option<usize>,
    ) -> Self {
        AggregatedTimeSerie {
            sampling,
            aggregation_method,
            max_size,
            buckets: Vec::new(),
        }
    }

    /// Reconstruct a series directly from already-computed buckets (used by
    /// deserialization). `buckets` must be sorted and bucket-aligned; this
    /// does not re-derive them from raw values.
    pub fn from_parts(
        sampling: Granularity,
        aggregation_method: AggregationMethod,
        max_size: Option<usize>,
        buckets: Vec<(Timestamp, f64)>,
    ) -> Self {
        AggregatedTimeSerie {
            sampling,
            aggregation_method,
            max_size,
            buckets,
        }
    }

    pub fn sampling(&self) -> Granularity {
        self.sampling
    }

    pub fn aggregation_method(&self) -> AggregationMethod {
        self.aggregation_method
    }

    pub fn max_size(&self) -> Option<usize> {
        self.max_size
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// All stored buckets, including any whose computed value is NaN —
    /// those are still "emitted as-is" at the storage layer. Use `fetch`
    /// for the consumer-facing view that drops NaN buckets.
    pub fn raw_buckets(&self) -> &[(Timestamp, f64)] {
        &self.buckets
    }

    /// Recompute every bucket touched by this round of ingest. `touched` is
    /// `(bucket_start, raw_values_in_that_bucket)`; the archive is
    /// responsible for determining which buckets are in scope and supplying
    /// the full (not delta) set of raw values for each, so a method like a
    /// percentile is always computed fresh rather than updated
    /// incrementally. Buckets with no touched raw values are left alone:
    /// the raw data for them may simply have scrolled out of the bounded
    /// raw series's retention window, which does not invalidate an already
    /// computed aggregate.
    pub fn set_values<'a>(
        &mut self,
        touched: impl IntoIterator<Item = (Timestamp, &'a [f64])>,
    ) -> CarbonaraResult<()> {
        for (bucket_start, values) in touched {
            if values.is_empty() {
                continue;
            }
            let mut scratch = values.to_vec();
            let value = self.aggregation_method.reduce(&mut scratch)?;
            self.upsert(bucket_start, value);
        }
        self.evict_to_max_size();
        Ok(())
    }

    fn upsert(&mut self, bucket_start: Timestamp, value: f64) {
        match self.buckets.binary_search_by_key(&bucket_start, |(ts, _)| *ts) {
            Ok(idx) => self.buckets[idx].1 = value,
            Err(idx) => self.buckets.insert(idx, (bucket_start, value)),
        }
    }

    fn evict_to_max_size(&mut self) {
        if let Some(max) = self.max_size {
            if self.buckets.len() > max {
                let excess = self.buckets.len() - max;
                self.buckets.drain(0..excess);
            }
        }
    }

    /// Half-open `[from, to)` range, ascending, skipping NaN-valued buckets.
    pub fn fetch(&self, from: Option<Timestamp>, to: Option<Timestamp>) -> Vec<(Timestamp, f64)> {
        let from = from.unwrap_or(Timestamp::MIN);
        let to = to.unwrap_or(Timestamp::MAX);
        self.buckets
            .iter()
            .filter(|(ts, v)| *ts >= from && *ts < to && !v.is_nan())
            .cloned()
            .collect()
    }
}

#[cfg(test)]
#[path = "aggregated_tests.rs"]
mod aggregated_tests;
