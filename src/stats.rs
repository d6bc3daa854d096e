/// Pearson correlation coefficient between two series.
///
/// Pairs values index by index, truncating to the shorter series. Returns 0 for
/// empty input or when either series has zero variance.
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len().min(y.len());
    if n == 0 {
        return 0.0;
    }

    let (x, y) = (&x[..n], &y[..n]);
    let nf = n as f64;
    let sum_x: f64 = x.iter().sum();
    let sum_y: f64 = y.iter().sum();
    let sum_xy: f64 = x.iter().zip(y).map(|(a, b)| a * b).sum();
    let sum_x2: f64 = x.iter().map(|a| a * a).sum();
    let sum_y2: f64 = y.iter().map(|b| b * b).sum();

    let spread_x = nf * sum_x2 - sum_x * sum_x;
    let spread_y = nf * sum_y2 - sum_y * sum_y;
    // Accumulated rounding can leave a constant series with a tiny non-zero spread.
    if is_negligible(spread_x, nf * sum_x2) || is_negligible(spread_y, nf * sum_y2) {
        return 0.0;
    }

    let numerator = nf * sum_xy - sum_x * sum_y;
    let denominator = (spread_x * spread_y).sqrt();
    if denominator == 0.0 || !denominator.is_finite() {
        return 0.0;
    }
    let r = numerator / denominator;
    if r.is_finite() {
        r.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

fn is_negligible(spread: f64, scale: f64) -> bool {
    spread <= scale.abs().max(1.0) * 1e-12
}

/// Ordinary least squares slope of `values` against their indices `0..n`.
pub fn linear_slope(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }

    let nf = n as f64;
    let mean_x = (nf - 1.0) / 2.0;
    let mean_y = values.iter().sum::<f64>() / nf;

    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for (i, value) in values.iter().enumerate() {
        let dx = i as f64 - mean_x;
        numerator += dx * (value - mean_y);
        denominator += dx * dx;
    }

    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}
