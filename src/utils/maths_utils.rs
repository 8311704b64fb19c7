use std::f64;

#[inline]
pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    data.iter().sum::<f64>() / data.len() as f64
}

/// Mean and *sample* standard deviation (N-1 denominator).
/// Returns (0.0, 0.0) on empty input and (mean, 0.0) on a single value.
#[inline]
pub fn mean_and_stddev(data: &[f64]) -> (f64, f64) {
    let count = data.len();
    if count == 0 {
        return (0.0, 0.0);
    }

    let mean = mean(data);
    if count < 2 {
        return (mean, 0.0);
    }

    let variance: f64 = data
        .iter()
        .map(|value| {
            let diff = mean - *value;
            diff * diff
        })
        .sum::<f64>()
        / (count - 1) as f64;

    (mean, variance.sqrt())
}

/// Exponentially-weighted moving average with adjusted weights:
/// value i (0 = oldest) is weighted by (1 - alpha)^(n - 1 - i), then the
/// weighted sum is normalized by the weight total. The newest value carries
/// weight 1; older values decay geometrically.
///
/// Returns None on empty input.
#[inline]
pub fn ewma(data: &[f64], alpha: f64) -> Option<f64> {
    if data.is_empty() {
        return None;
    }

    let decay = 1.0 - alpha;
    let mut weighted_sum = 0.0;
    let mut weight_total = 0.0;
    for &x in data {
        weighted_sum = weighted_sum * decay + x;
        weight_total = weight_total * decay + 1.0;
    }

    Some(weighted_sum / weight_total)
}
