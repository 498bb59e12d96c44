use crate::aggregators::AggregationMethod;
use crate::common::Timestamp;
use crate::error::{CarbonaraError, CarbonaraResult};
use crate::series::archive::TimeSerieArchive;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::instrument;

/// Cross-archive aggregation: `fetch` every archive, group the results by
/// granularity, and combine whichever archives actually hold a value at each
/// bucket. An archive that never configured a given granularity takes no
/// part in that granularity's overlap accounting at all; one that did
/// configure it but produced nothing there (out of range, evicted, or
/// simply never ingested) counts as a gap, the same as any other archive's
/// absence — there is no separate "this archive doesn't apply" escape hatch
/// beyond declared configuration.
#[instrument(skip(archives), fields(archives = archives.len()))]
pub fn aggregated(
    archives: &[TimeSerieArchive],
    from: Option<Timestamp>,
    to: Option<Timestamp>,
    method: AggregationMethod,
    needed_percent_of_overlap: f64,
) -> CarbonaraResult<Vec<(Timestamp, f64, f64)>> {
    if archives.is_empty() {
        return Ok(Vec::new());
    }

    let per_archive: Vec<Vec<(Timestamp, f64, f64)>> =
        archives.iter().map(|a| a.fetch(from, to)).collect();

    let declared: Vec<BTreeSet<u64>> = archives
        .iter()
        .map(|a| {
            a.aggregated_series()
                .iter()
                .map(|s| s.sampling().seconds_f64().to_bits())
                .collect()
        })
        .collect();

    if per_archive.iter().all(|rows| rows.is_empty()) {
        let first = &declared[0];
        let differ = declared[1..].iter().any(|s| s != first);
        if differ {
            return Err(CarbonaraError::UnAggregableTimeseries {
                reason: "archives have no data and declare different granularities".to_string(),
            });
        }
        return Ok(Vec::new());
    }

    // Per archive, per granularity (keyed by its f64-bits so equal
    // granularities always hash identically): bucket_start -> value.
    let per_archive_groups: Vec<BTreeMap<u64, HashMap<Timestamp, f64>>> = per_archive
        .iter()
        .map(|rows| {
            let mut groups: BTreeMap<u64, HashMap<Timestamp, f64>> = BTreeMap::new();
            for (ts, gran, value) in rows {
                groups.entry(gran.to_bits()).or_default().insert(*ts, *value);
            }
            groups
        })
        .collect();

    let mut all_grans: BTreeSet<u64> = BTreeSet::new();
    for groups in &per_archive_groups {
        all_grans.extend(groups.keys().copied());
    }

    let mut output: Vec<(Timestamp, f64, f64)> = Vec::new();

    for gran_bits in all_grans {
        let gran_secs = f64::from_bits(gran_bits);

        // Archives that declared this exact granularity take part in the
        // overlap accounting, whether or not they produced any rows for it.
        let participants: Vec<usize> = declared
            .iter()
            .enumerate()
            .filter(|(_, d)| d.contains(&gran_bits))
            .map(|(idx, _)| idx)
            .collect();
        if participants.is_empty() {
            continue;
        }
        let n_participants = participants.len() as u32;

        // The shared window is [max(earliest_i), min(latest_i)] over each
        // participant's own bucket range at this granularity (§4.4 step 3),
        // not a trim of the union down to its first/last fully-covered
        // timestamp: a participant missing its own earliest (or latest)
        // bucket inside another participant's range must show up as a gap
        // within the window, not silently shrink the window to dodge it.
        let mut low = Timestamp::MIN;
        let mut high = Timestamp::MAX;
        let mut window_defined = true;
        for &idx in &participants {
            match per_archive_groups[idx].get(&gran_bits) {
                Some(group) if !group.is_empty() => {
                    let earliest = *group.keys().min().unwrap();
                    let latest = *group.keys().max().unwrap();
                    low = low.max(earliest);
                    high = high.min(latest);
                }
                _ => window_defined = false,
            }
        }
        if !window_defined || low > high {
            return Err(CarbonaraError::UnAggregableTimeseries {
                reason: format!("no shared window at {gran_secs}s granularity"),
            });
        }

        // Union and intersection computed only inside [low, high] (§4.4
        // step 4); points outside it never need to "overlap" with anything.
        let mut counts: BTreeMap<Timestamp, u32> = BTreeMap::new();
        for &idx in &participants {
            if let Some(group) = per_archive_groups[idx].get(&gran_bits) {
                for ts in group.keys().filter(|ts| **ts >= low && **ts <= high) {
                    *counts.entry(*ts).or_insert(0) += 1;
                }
            }
        }
        if counts.is_empty() {
            continue;
        }

        let union_len = counts.len();
        let intersection_len = counts.values().filter(|&&c| c == n_participants).count();
        let overlap = 100.0 * intersection_len as f64 / union_len as f64;
        if overlap < needed_percent_of_overlap {
            return Err(CarbonaraError::UnAggregableTimeseries {
                reason: format!(
                    "{overlap:.1}% overlap at {gran_secs}s granularity is below the required {needed_percent_of_overlap:.1}%"
                ),
            });
        }

        for ts in counts.keys() {
            let mut values: Vec<f64> = participants
                .iter()
                .filter_map(|&idx| per_archive_groups[idx].get(&gran_bits)?.get(ts).copied())
                .collect();
            if values.is_empty() {
                continue;
            }
            let combined = method.reduce(&mut values)?;
            output.push((*ts, gran_secs, combined));
        }
    }

    output.sort_by(|a, b| a.0.cmp(&b.0).then(b.1.partial_cmp(&a.1).unwrap()));
    Ok(output)
}
