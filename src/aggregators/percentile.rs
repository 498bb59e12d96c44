/// Linearly-interpolated percentile over `values` (need not be sorted on
/// entry). `pct` is in `(0, 100)`. Equivalent to NumPy's default `linear`
/// interpolation method, which is what the reference implementation's
/// dataframe library uses under the hood.
pub fn percentile(values: &mut [f64], pct: f64) -> f64 {
    debug_assert!(!values.is_empty());
    values.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let n = values.len();
    if n == 1 {
        return values[0];
    }
    let rank = (pct / 100.0) * (n - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        return values[lower];
    }
    let weight = rank - lower as f64;
    values[lower] + (values[upper] - values[lower]) * weight
}

pub fn median(values: &mut [f64]) -> f64 {
    percentile(values, 50.0)
}

/// Sample standard deviation (divisor `n - 1`). NaN on a singleton bucket,
/// matching the reference's pandas-backed `std()` rather than a streaming
/// variance accumulator, which would instead return `0.0` for a single
/// sample.
pub fn sample_std_dev(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return f64::NAN;
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    let sum_sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    (sum_sq / (n - 1) as f64).sqrt()
}
