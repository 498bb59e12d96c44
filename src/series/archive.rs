use crate::aggregators::AggregationMethod;
use crate::common::{Granularity, Sample, Timestamp};
use crate::error::CarbonaraResult;
use crate::series::aggregated::AggregatedTimeSerie;
use crate::series::raw::BoundTimeSerie;
use tracing::{debug, instrument};

/// Owns one bounded raw series plus an ordered set of aggregated series
/// (finest sampling first) that are kept in step with it. This is the
/// engine's unit of ingest, query, and persistence.
#[derive(Clone, Debug)]
pub struct TimeSerieArchive {
    raw: BoundTimeSerie,
    aggregated: Vec<AggregatedTimeSerie>,
    aggregation_method: AggregationMethod,
}

/// One `(granularity, retained point count)` entry passed to
/// `from_definitions`. `points = None` means unbounded retention for that
/// granularity's aggregated series.
#[derive(Copy, Clone, Debug)]
pub struct ArchiveDefinition {
    pub granularity: Granularity,
    pub points: Option<usize>,
}

impl ArchiveDefinition {
    pub fn new(granularity: Granularity, points: Option<usize>) -> Self {
        ArchiveDefinition { granularity, points }
    }
}

impl TimeSerieArchive {
    pub fn from_definitions(
        mut defs: Vec<ArchiveDefinition>,
        aggregation_method: AggregationMethod,
    ) -> CarbonaraResult<Self> {
        defs.sort_by_key(|d| d.granularity);
        let coarsest = defs.last().map(|d| d.granularity);
        let aggregated = defs
            .iter()
            .map(|d| AggregatedTimeSerie::new(d.granularity, aggregation_method, d.points))
            .collect();
        // Raw back_window is always 0 when derived this way: the reference
        // CLI fixture (`create 2,2 file` -> dump) prints "Back window: 0 x
        // 2s = 0s", which only holds for back_window = 0.
        let raw = BoundTimeSerie::new(Vec::new(), coarsest, 0)?;
        Ok(TimeSerieArchive {
            raw,
            aggregated,
            aggregation_method,
        })
    }

    /// Reassemble an archive from already-valid parts (used by
    /// deserialization, which trusts the persisted/dumped state rather than
    /// re-deriving it through `set_values`). `aggregated` must already be
    /// sorted finest-first.
    pub fn from_parts(
        raw: BoundTimeSerie,
        aggregated: Vec<AggregatedTimeSerie>,
        aggregation_method: AggregationMethod,
    ) -> Self {
        TimeSerieArchive {
            raw,
            aggregated,
            aggregation_method,
        }
    }

    pub fn raw(&self) -> &BoundTimeSerie {
        &self.raw
    }

    pub fn aggregated_series(&self) -> &[AggregatedTimeSerie] {
        &self.aggregated
    }

    pub fn aggregation_method(&self) -> AggregationMethod {
        self.aggregation_method
    }

    /// Merge is followed by an aggregate recompute against the full,
    /// still-untruncated raw sample set, and only then does the raw series
    /// prune itself down to its retention window (gnocchi's
    /// `before_truncate_callback` ordering): an aggregated series's oldest
    /// surviving bucket can depend on raw samples that this very call would
    /// otherwise have already dropped before they were ever read.
    #[instrument(skip(self, samples), fields(count = samples.len()))]
    pub fn set_values(&mut self, samples: &[Sample]) -> CarbonaraResult<()> {
        if samples.is_empty() {
            return Ok(());
        }
        self.raw.merge(samples)?;

        let min_incoming = samples.iter().map(|s| s.timestamp).min().unwrap();

        for series in self.aggregated.iter_mut() {
            let floor_ts = min_incoming.bucket_start(series.sampling());
            let touched = group_into_buckets(&self.raw, series.sampling(), floor_ts);
            let touched_refs: Vec<(Timestamp, &[f64])> =
                touched.iter().map(|(ts, v)| (*ts, v.as_slice())).collect();
            series.set_values(touched_refs)?;
        }

        self.raw.prune();

        debug!(samples = samples.len(), "archive ingest complete");
        Ok(())
    }

    /// Finest-to-coarsest boundary cascade: a coarser bucket is only
    /// emitted for the stretch of time a finer series can no longer cover
    /// (because it evicted that history), never for a stretch a finer
    /// series still holds, gaps inside it notwithstanding. A coarse bucket
    /// that starts at exactly the finer series's earliest surviving bucket
    /// is still emitted (the two describe different-width windows over
    /// that instant, not redundant views of the same one) — the cascade's
    /// per-level ceiling is therefore the finer level's earliest bucket
    /// start *plus one nanosecond*, not the bucket start itself. A naive
    /// "full sub-interval coverage" check drops that case; this reading is
    /// the one that reproduces the reference fixtures.
    pub fn fetch(
        &self,
        from: Option<Timestamp>,
        to: Option<Timestamp>,
    ) -> Vec<(Timestamp, f64, f64)> {
        let mut coarse_limit: Option<Timestamp> = None;
        let mut per_level = Vec::with_capacity(self.aggregated.len());

        for series in &self.aggregated {
            let window_to = match (to, coarse_limit) {
                (Some(t), Some(c)) => t.min(c),
                (Some(t), None) => t,
                (None, Some(c)) => c,
                (None, None) => Timestamp::MAX,
            };
            let points = series.fetch(from, Some(window_to));
            if let Some(min_ts) = points.iter().map(|(ts, _)| *ts).min() {
                let ceiling = Timestamp::from_nanos(min_ts.nanos().saturating_add(1));
                coarse_limit = Some(coarse_limit.map_or(ceiling, |c| c.min(ceiling)));
            }
            let gran_secs = series.sampling().seconds_f64();
            per_level.push(
                points
                    .into_iter()
                    .map(|(ts, v)| (ts, gran_secs, v))
                    .collect::<Vec<_>>(),
            );
        }

        per_level.into_iter().rev().flatten().collect()
    }
}

/// Group the raw samples with timestamp >= `floor_ts` into `(bucket_start,
/// values)` pairs at `sampling` granularity, in ascending bucket order.
fn group_into_buckets(
    raw: &BoundTimeSerie,
    sampling: Granularity,
    floor_ts: Timestamp,
) -> Vec<(Timestamp, Vec<f64>)> {
    let mut groups: Vec<(Timestamp, Vec<f64>)> = Vec::new();
    for sample in raw.iter().filter(|s| s.timestamp >= floor_ts) {
        let bucket = sample.timestamp.bucket_start(sampling);
        match groups.last_mut() {
            Some((ts, values)) if *ts == bucket => values.push(sample.value),
            _ => groups.push((bucket, vec![sample.value])),
        }
    }
    groups
}

#[cfg(test)]
#[path = "archive_tests.rs"]
mod archive_tests;
