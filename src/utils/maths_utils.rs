use statrs::statistics::Statistics;

/// (min, max) of a column, or `None` when it is empty or holds a NaN.
pub fn get_min_max(vec: &[f64]) -> Option<(f64, f64)> {
    if vec.is_empty() {
        return None;
    }
    let min = Statistics::min(vec.iter());
    let max = Statistics::max(vec.iter());
    if min.is_nan() || max.is_nan() {
        return None;
    }
    Some((min, max))
}

/// Min-max scale a single value. A zero-width range maps everything to 0.0
/// instead of dividing by zero.
#[inline]
pub fn min_max_scale(value: f64, min: f64, max: f64) -> f64 {
    let span = max - min;
    if span == 0.0 || !span.is_finite() {
        0.0
    } else {
        (value - min) / span
    }
}

/// Logistic activation, clamped so `exp` never overflows.
#[inline]
pub fn sigmoid(x: f64) -> f64 {
    let x = x.clamp(-500.0, 500.0);
    1.0 / (1.0 + (-x).exp())
}

#[cfg(test)]
pub fn mean(vec: &[f64]) -> f64 {
    if vec.is_empty() {
        return 0.0;
    }
    Statistics::mean(vec.iter())
}
