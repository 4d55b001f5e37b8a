/// Additive (Laplace-style) smoothing of occurrence counts
///
/// Each outcome receives `(count + bias) / Σ(count' + bias)`. A zero total
/// (only possible with zero counts and zero bias) falls back to a uniform
/// distribution so the result is always well formed.
pub fn additive_smoothing(counts: &[u64], bias: f64) -> Vec<f64> {
    if counts.is_empty() {
        return Vec::new();
    }

    let total: f64 = counts.iter().map(|&count| count as f64 + bias).sum();
    if total <= 0.0 {
        let uniform = 1.0 / counts.len() as f64;
        return vec![uniform; counts.len()];
    }

    counts
        .iter()
        .map(|&count| (count as f64 + bias) / total)
        .collect()
}

/// Absolute distance of a probability sum from one
pub fn normalization_error<I>(probabilities: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    (probabilities.into_iter().sum::<f64>() - 1.0).abs()
}

/// Inverse-CDF draw over `(outcome, probability)` pairs in slice order
///
/// Subtracts each probability from `draw` until the remainder reaches zero.
/// When floating error leaves the accumulated mass short of `draw`, the last
/// outcome is returned. Returns `None` only for an empty slice.
pub fn inverse_cdf<T: Copy>(outcomes: &[(T, f64)], draw: f64) -> Option<T> {
    let mut remainder = draw;
    for &(outcome, probability) in outcomes {
        remainder -= probability;
        if remainder <= 0.0 {
            return Some(outcome);
        }
    }
    outcomes.last().map(|&(outcome, _)| outcome)
}
