//! Risk metrics — stateless rolling statistics over a single time series.
//!
//! All series are index-aligned `Vec<f64>` with `f64::NAN` marking undefined
//! values (insufficient history or missing input). A rolling window only
//! produces a value once it holds `window` defined observations.

/// Trading days per year used for annualisation.
pub const ANNUALIZATION_DAYS: f64 = 252.0;

/// Mean of a slice; 0.0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator).
///
/// Returns NaN for fewer than two values and exactly 0.0 when every value is
/// identical, so constant inputs never leak rounding noise.
pub fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let first = values[0];
    if values.iter().all(|v| *v == first) {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    var.sqrt()
}

/// Rolling mean over `window` observations.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<f64> {
    rolling_apply(values, window, mean)
}

/// Rolling sample standard deviation over `window` observations.
pub fn rolling_std(values: &[f64], window: usize) -> Vec<f64> {
    rolling_apply(values, window, sample_std)
}

fn rolling_apply(values: &[f64], window: usize, f: fn(&[f64]) -> f64) -> Vec<f64> {
    let n = values.len();
    let mut out = vec![f64::NAN; n];
    if window == 0 || n < window {
        return out;
    }
    for i in (window - 1)..n {
        let slice = &values[i + 1 - window..=i];
        if slice.iter().any(|v| v.is_nan()) {
            continue;
        }
        out[i] = f(slice);
    }
    out
}

/// One-period simple returns: `x[t] / x[t-1] - 1`. The first value is NaN.
pub fn pct_change(values: &[f64]) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    for i in 1..values.len() {
        out[i] = values[i] / values[i - 1] - 1.0;
    }
    out
}

/// Annualised realized volatility: rolling std of returns × √252.
pub fn realized_vol(returns: &[f64], lookback: usize) -> Vec<f64> {
    rolling_std(returns, lookback)
        .into_iter()
        .map(|s| s * ANNUALIZATION_DAYS.sqrt())
        .collect()
}

/// Realized volatility of a close series (returns computed internally).
pub fn realized_vol_from_closes(closes: &[f64], lookback: usize) -> Vec<f64> {
    realized_vol(&pct_change(closes), lookback)
}

/// Drawdown from the running maximum: `(x - peak) / peak`.
///
/// NaN inputs produce NaN and do not move the running peak.
pub fn drawdown(series: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(series.len());
    let mut peak = f64::NAN;
    for &x in series {
        if x.is_nan() {
            out.push(f64::NAN);
            continue;
        }
        if peak.is_nan() || x > peak {
            peak = x;
        }
        out.push((x - peak) / peak);
    }
    out
}

/// Minimum drawdown of a series; 0.0 when empty or never below its peak.
pub fn max_drawdown(series: &[f64]) -> f64 {
    drawdown(series)
        .into_iter()
        .filter(|d| !d.is_nan())
        .fold(0.0_f64, f64::min)
}

/// Running product of `(1 + r)`, NaN returns treated as 0.
pub fn cumulative_growth(returns: &[f64]) -> Vec<f64> {
    let mut acc = 1.0;
    returns
        .iter()
        .map(|r| {
            let r = if r.is_nan() { 0.0 } else { *r };
            acc *= 1.0 + r;
            acc
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-12,
            "actual={actual}, expected={expected}"
        );
    }

    #[test]
    fn rolling_mean_warmup_is_nan() {
        let out = rolling_mean(&[1.0, 2.0, 3.0, 4.0], 3);
        assert!(out[0].is_nan() && out[1].is_nan());
        assert_approx(out[2], 2.0);
        assert_approx(out[3], 3.0);
    }

    #[test]
    fn rolling_std_is_sample_std() {
        let out = rolling_std(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0], 8);
        // Sample variance = 32 / 7
        assert_approx(out[7], (32.0_f64 / 7.0).sqrt());
    }

    #[test]
    fn rolling_std_constant_is_exact_zero() {
        let out = rolling_std(&[0.1; 5], 3);
        assert_eq!(out[4], 0.0);
    }

    #[test]
    fn rolling_window_with_nan_is_undefined() {
        let out = rolling_mean(&[1.0, f64::NAN, 3.0, 4.0, 5.0], 2);
        assert!(out[1].is_nan());
        assert!(out[2].is_nan());
        assert_approx(out[3], 3.5);
    }

    #[test]
    fn pct_change_basic() {
        let r = pct_change(&[100.0, 101.0, 103.0]);
        assert!(r[0].is_nan());
        assert_approx(r[1], 0.01);
        assert_approx(r[2], 103.0 / 101.0 - 1.0);
    }

    #[test]
    fn realized_vol_annualises() {
        let returns = [f64::NAN, 0.01, -0.01, 0.01, -0.01];
        let vol = realized_vol(&returns, 4);
        let expected = sample_std(&[0.01, -0.01, 0.01, -0.01]) * 252.0_f64.sqrt();
        assert!(vol[3].is_nan());
        assert_approx(vol[4], expected);
    }

    #[test]
    fn drawdown_tracks_running_peak() {
        let dd = drawdown(&[100.0, 110.0, 99.0, 120.0]);
        assert_approx(dd[0], 0.0);
        assert_approx(dd[1], 0.0);
        assert_approx(dd[2], -0.1);
        assert_approx(dd[3], 0.0);
    }

    #[test]
    fn drawdown_nan_does_not_move_peak() {
        let dd = drawdown(&[100.0, f64::NAN, 90.0]);
        assert!(dd[1].is_nan());
        assert_approx(dd[2], -0.1);
    }

    #[test]
    fn max_drawdown_empty_is_zero() {
        assert_eq!(max_drawdown(&[]), 0.0);
    }

    #[test]
    fn cumulative_growth_treats_nan_as_flat() {
        let g = cumulative_growth(&[0.1, f64::NAN, -0.5]);
        assert_approx(g[0], 1.1);
        assert_approx(g[1], 1.1);
        assert_approx(g[2], 0.55);
    }
}
