//! Order statistics used by imputation and binning.

/// Median of `values`, or `None` when empty.
///
/// For an even count this is the mean of the two middle values.
pub fn median(values: &[f64]) -> Option<f64> {
    let sorted = sorted(values);
    let n = sorted.len();
    match n {
        0 => None,
        _ if n % 2 == 1 => Some(sorted[n / 2]),
        _ => Some((sorted[n / 2 - 1] + sorted[n / 2]) / 2.0),
    }
}

/// Empirical quantiles with linear interpolation between closest ranks.
///
/// Each `p` in `probs` must lie in `[0, 1]`. Returns `None` when `values`
/// is empty.
pub fn quantiles(values: &[f64], probs: &[f64]) -> Option<Vec<f64>> {
    let sorted = sorted(values);
    if sorted.is_empty() {
        return None;
    }
    let last = (sorted.len() - 1) as f64;
    Some(
        probs
            .iter()
            .map(|p| {
                let pos = p.clamp(0.0, 1.0) * last;
                let lo = pos.floor() as usize;
                let hi = pos.ceil() as usize;
                sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
            })
            .collect(),
    )
}

fn sorted(values: &[f64]) -> Vec<f64> {
    let mut v: Vec<f64> = values.iter().copied().filter(|x| !x.is_nan()).collect();
    v.sort_by(f64::total_cmp);
    v
}
