use crate::common::{Granularity, Sample, Timestamp};
use crate::error::{CarbonaraError, CarbonaraResult};

/// Bounded raw measurement buffer. Backed by a `Vec<Sample>` kept sorted by
/// timestamp rather than a tree or hash map, mirroring the host crate's
/// per-chunk sample storage: the common case is an append near the end, and
/// binary search keeps lookups cheap without the overhead of a balanced tree.
#[derive(Clone, Debug, Default)]
pub struct BoundTimeSerie {
    samples: Vec<Sample>,
    block_size: Option<Granularity>,
    back_window: u32,
}

impl BoundTimeSerie {
    pub fn new(
        initial: Vec<Sample>,
        block_size: Option<Granularity>,
        back_window: u32,
    ) -> CarbonaraResult<Self> {
        let mut series = BoundTimeSerie {
            samples: Vec::new(),
            block_size,
            back_window,
        };
        if !initial.is_empty() {
            series.set_values(&initial)?;
        }
        Ok(series)
    }

    /// Construct from separate, equal-length timestamp and value slices
    /// (the reference constructor's shape, rather than pre-paired samples).
    pub fn from_data(
        timestamps: &[Timestamp],
        values: &[f64],
        block_size: Option<Granularity>,
        back_window: u32,
    ) -> CarbonaraResult<Self> {
        if timestamps.len() != values.len() {
            return Err(CarbonaraError::LengthMismatch {
                timestamps: timestamps.len(),
                values: values.len(),
            });
        }
        let initial = timestamps
            .iter()
            .zip(values.iter())
            .map(|(ts, v)| Sample::new(*ts, *v))
            .collect();
        BoundTimeSerie::new(initial, block_size, back_window)
    }

    /// Reconstruct a series directly from already-valid parts (used by
    /// deserialization, which trusts the persisted state rather than
    /// re-deriving it through `set_values`).
    pub fn from_parts(samples: Vec<Sample>, block_size: Option<Granularity>, back_window: u32) -> Self {
        BoundTimeSerie {
            samples,
            block_size,
            back_window,
        }
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn block_size(&self) -> Option<Granularity> {
        self.block_size
    }

    pub fn back_window(&self) -> u32 {
        self.back_window
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter()
    }

    pub fn first(&self) -> Option<&Sample> {
        self.samples.first()
    }

    pub fn last(&self) -> Option<&Sample> {
        self.samples.last()
    }

    /// Retention horizon below which a sample can no longer be accepted:
    /// `floor(t_max / block_size) * block_size - back_window * block_size`,
    /// computed from the timestamp of the newest sample *already retained*
    /// (not the incoming batch) — so a single large initial batch is never
    /// checked against itself. `None` block_size means no horizon at all.
    fn horizon(&self, t_max: Timestamp) -> Timestamp {
        match self.block_size {
            None => Timestamp::MIN,
            Some(bs) => {
                let block_start = t_max.bucket_start(bs);
                let offset_nanos = bs.nanos().saturating_mul(self.back_window as i64);
                Timestamp::from_nanos(block_start.nanos() - offset_nanos)
            }
        }
    }

    /// Merge an unordered batch of samples and prune anything that falls
    /// outside the resulting retention window. All-or-nothing: if any
    /// incoming sample falls before the retention horizon implied by the
    /// series's current newest sample, the whole call fails and nothing is
    /// mutated. An empty series accepts any first batch unconditionally.
    pub fn set_values(&mut self, incoming: &[Sample]) -> CarbonaraResult<()> {
        self.merge(incoming)?;
        self.prune();
        Ok(())
    }

    /// Merge an unordered batch without pruning. Exposed separately so
    /// `TimeSerieArchive` can recompute aggregated buckets against the full
    /// merged raw sample set — mirroring gnocchi's `before_truncate_callback`
    /// hook — before retention drops history an aggregated series still
    /// needs to rebuild the buckets this batch touched.
    pub(crate) fn merge(&mut self, incoming: &[Sample]) -> CarbonaraResult<()> {
        if incoming.is_empty() {
            return Ok(());
        }

        // Batch-level dedup: later entries in the same call win.
        let mut batch: Vec<Sample> = incoming.to_vec();
        batch.sort_by_key(|s| s.timestamp);
        dedup_keep_last(&mut batch);

        if !self.samples.is_empty() {
            let existing_max = self.samples.last().map(|s| s.timestamp).unwrap();
            let batch_max = batch.last().map(|s| s.timestamp).unwrap();
            let t_new_max = existing_max.max(batch_max);
            let horizon = self.horizon(t_new_max);
            if let Some(bad) = batch
                .iter()
                .filter(|s| s.timestamp < horizon)
                .map(|s| s.timestamp)
                .min()
            {
                return Err(CarbonaraError::BackWindowViolation {
                    bad_timestamp: bad,
                    first_timestamp: horizon,
                });
            }
        }

        self.samples = merge_overwrite(std::mem::take(&mut self.samples), batch);
        Ok(())
    }

    /// Recompute the horizon against the current maximum and drop anything
    /// that now falls outside the retained window.
    pub(crate) fn prune(&mut self) {
        if let Some(new_max) = self.samples.last().map(|s| s.timestamp) {
            let horizon = self.horizon(new_max);
            let start = self.samples.partition_point(|s| s.timestamp < horizon);
            if start > 0 {
                self.samples.drain(0..start);
            }
        }
    }
}

fn dedup_keep_last(sorted: &mut Vec<Sample>) {
    let mut write = 0;
    for read in 1..sorted.len() {
        if sorted[read].timestamp == sorted[write].timestamp {
            sorted[write] = sorted[read];
        } else {
            write += 1;
            sorted[write] = sorted[read];
        }
    }
    sorted.truncate(write + 1);
}

/// Merge two timestamp-sorted, timestamp-unique vectors; where both contain
/// the same timestamp, `new` wins.
fn merge_overwrite(old: Vec<Sample>, new: Vec<Sample>) -> Vec<Sample> {
    let mut result = Vec::with_capacity(old.len() + new.len());
    let mut i = 0;
    let mut j = 0;
    while i < old.len() && j < new.len() {
        match old[i].timestamp.cmp(&new[j].timestamp) {
            std::cmp::Ordering::Less => {
                result.push(old[i]);
                i += 1;
            }
            std::cmp::Ordering::Greater => {
                result.push(new[j]);
                j += 1;
            }
            std::cmp::Ordering::Equal => {
                result.push(new[j]);
                i += 1;
                j += 1;
            }
        }
    }
    result.extend_from_slice(&old[i..]);
    result.extend_from_slice(&new[j..]);
    result
}

#[cfg(test)]
#[path = "raw_tests.rs"]
mod raw_tests;
