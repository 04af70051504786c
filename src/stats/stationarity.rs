//! Augmented Dickey-Fuller unit-root test (constant, no trend).
//!
//! H0: the series has a unit root (non-stationary).
//! H1: the series is stationary.

use nalgebra::{DMatrix, DVector};
use statrs::distribution::{ContinuousCDF, Normal};
use std::fmt;

/// p-value below which H0 is rejected.
pub const SIGNIFICANCE_LEVEL: f64 = 0.05;

// MacKinnon (2010) finite-sample critical value coefficients, constant only:
// cv(n) = b0 + b1/n + b2/n^2 + b3/n^3
const CRITICAL_COEFFS: [(&str, [f64; 4]); 3] = [
    ("1%", [-3.43035, -6.5393, -16.786, -79.433]),
    ("5%", [-2.86154, -2.8903, -4.234, -40.040]),
    ("10%", [-2.56677, -1.5384, -2.809, 0.0]),
];

// MacKinnon (1994) response surface for the approximate p-value
const TAU_MAX: f64 = 2.74;
const TAU_MIN: f64 = -18.83;
const TAU_STAR: f64 = -1.61;
const TAU_SMALL_P: [f64; 3] = [2.1659, 1.4412, 0.038269];
const TAU_LARGE_P: [f64; 4] = [1.7339, 0.93202, -0.12745, -0.010368];

#[derive(Debug, Clone)]
pub struct AdfResult {
    pub statistic: f64,
    pub p_value: f64,
    pub used_lag: usize,
    pub n_obs: usize,
    pub critical_values: Vec<(String, f64)>,
}

impl AdfResult {
    pub fn is_stationary(&self) -> bool {
        self.p_value < SIGNIFICANCE_LEVEL
    }

    pub fn verdict(&self) -> &'static str {
        if self.is_stationary() {
            "The series is stationary (reject H0)"
        } else {
            "The series is non-stationary (fail to reject H0)"
        }
    }
}

impl fmt::Display for AdfResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ADF Statistic: {:.6}", self.statistic)?;
        writeln!(f, "p-value: {:.6}", self.p_value)?;
        writeln!(f, "Lags used: {}", self.used_lag)?;
        writeln!(f, "Observations: {}", self.n_obs)?;
        writeln!(f, "Critical Values:")?;
        for (level, value) in &self.critical_values {
            writeln!(f, "  {level}: {value:.4}")?;
        }
        write!(f, "{}", self.verdict())
    }
}

/// Schwert's rule, `ceil(12 * (n / 100)^(1/4))`, capped so the regression
/// keeps enough degrees of freedom.
pub fn default_max_lag(n: usize) -> usize {
    let schwert = (12.0 * (n as f64 / 100.0).powf(0.25)).ceil() as usize;
    schwert.min((n / 2).saturating_sub(2))
}

struct OlsFit {
    beta: DVector<f64>,
    std_errors: DVector<f64>,
    ssr: f64,
    n_obs: usize,
}

impl OlsFit {
    fn aic(&self) -> f64 {
        let n = self.n_obs as f64;
        let k = self.beta.len() as f64;
        let llf = -n / 2.0 * ((2.0 * std::f64::consts::PI).ln() + (self.ssr / n).ln() + 1.0);
        -2.0 * llf + 2.0 * k
    }
}

fn ols(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<OlsFit> {
    let (n, k) = x.shape();
    if n <= k {
        return None;
    }

    let xtx_inv = (x.transpose() * x).try_inverse()?;
    let beta = &xtx_inv * x.transpose() * y;
    let residuals = y - x * &beta;
    let ssr = residuals.dot(&residuals);
    let sigma2 = ssr / (n - k) as f64;
    let std_errors = DVector::from_iterator(k, (0..k).map(|i| (sigma2 * xtx_inv[(i, i)]).sqrt()));

    Some(OlsFit {
        beta,
        std_errors,
        ssr,
        n_obs: n,
    })
}

/// Regressors `[y_{t-1}, Δy_{t-1}, .., Δy_{t-lag}, 1]` and target `Δy_t`
/// for rows `t = start..diff.len()`.
fn design(data: &[f64], diff: &[f64], lag: usize, start: usize) -> (DMatrix<f64>, DVector<f64>) {
    let rows = diff.len() - start;
    let cols = lag + 2;
    let x = DMatrix::from_fn(rows, cols, |r, c| {
        let t = start + r;
        match c {
            0 => data[t],
            c if c <= lag => diff[t - c],
            _ => 1.0,
        }
    });
    let y = DVector::from_iterator(rows, diff[start..].iter().copied());
    (x, y)
}

/// MacKinnon critical values for `n_obs` regression observations.
pub fn critical_values(n_obs: usize) -> Vec<(String, f64)> {
    let inv = 1.0 / n_obs as f64;
    CRITICAL_COEFFS
        .iter()
        .map(|(level, b)| {
            let cv = b[0] + b[1] * inv + b[2] * inv.powi(2) + b[3] * inv.powi(3);
            (level.to_string(), cv)
        })
        .collect()
}

/// Approximate p-value of a constant-only ADF statistic.
pub fn mackinnon_p_value(statistic: f64) -> f64 {
    if statistic.is_nan() {
        return f64::NAN;
    }
    if statistic > TAU_MAX {
        return 1.0;
    }
    if statistic < TAU_MIN {
        return 0.0;
    }

    let poly = if statistic <= TAU_STAR {
        TAU_SMALL_P
            .iter()
            .enumerate()
            .map(|(i, c)| c * statistic.powi(i as i32))
            .sum::<f64>()
    } else {
        TAU_LARGE_P
            .iter()
            .enumerate()
            .map(|(i, c)| c * statistic.powi(i as i32))
            .sum::<f64>()
    };

    Normal::new(0.0, 1.0).map(|n| n.cdf(poly)).unwrap_or(f64::NAN)
}

/// Run the test. The lag order is chosen by AIC over `0..=max_lag`
/// (default [`default_max_lag`]) on a common sample, then refit.
///
/// Returns `None` for series too short to fit or with a singular design.
pub fn adf_test(data: &[f64], max_lag: Option<usize>) -> Option<AdfResult> {
    let n = data.len();
    if n < 10 {
        return None;
    }

    let diff: Vec<f64> = data.windows(2).map(|w| w[1] - w[0]).collect();
    let max_lag = max_lag
        .unwrap_or_else(|| default_max_lag(n))
        .min((n / 2).saturating_sub(2));

    let best_lag = (0..=max_lag)
        .filter_map(|lag| {
            let (x, y) = design(data, &diff, lag, max_lag);
            ols(&x, &y).map(|fit| (lag, fit.aic()))
        })
        .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(lag, _)| lag)?;

    let (x, y) = design(data, &diff, best_lag, best_lag);
    let fit = ols(&x, &y)?;
    let statistic = fit.beta[0] / fit.std_errors[0];
    if !statistic.is_finite() {
        return None;
    }

    Some(AdfResult {
        statistic,
        p_value: mackinnon_p_value(statistic),
        used_lag: best_lag,
        n_obs: fit.n_obs,
        critical_values: critical_values(fit.n_obs),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lcg_noise(n: usize, seed: u64) -> Vec<f64> {
        let mut state = seed;
        (0..n)
            .map(|_| {
                state = state
                    .wrapping_mul(6364136223846793005)
                    .wrapping_add(1442695040888963407);
                (state >> 11) as f64 / (1u64 << 53) as f64 - 0.5
            })
            .collect()
    }

    #[test]
    fn test_p_value_matches_critical_points() {
        assert!((mackinnon_p_value(-2.86154) - 0.05).abs() < 0.002);
        assert!((mackinnon_p_value(-3.43035) - 0.01).abs() < 0.001);
        assert_eq!(mackinnon_p_value(5.0), 1.0);
        assert_eq!(mackinnon_p_value(-25.0), 0.0);
    }

    #[test]
    fn test_critical_values_order() {
        let cv = critical_values(500);
        assert_eq!(cv.len(), 3);
        assert!(cv[0].1 < cv[1].1 && cv[1].1 < cv[2].1);
        assert!((cv[1].1 - (-2.86154 - 2.8903 / 500.0)).abs() < 1e-3);
    }

    #[test]
    fn test_white_noise_is_stationary() {
        let data = lcg_noise(400, 3);
        let result = adf_test(&data, None).unwrap();
        assert!(result.statistic < -4.0);
        assert!(result.is_stationary());
        assert_eq!(result.critical_values.len(), 3);
    }

    #[test]
    fn test_drifting_walk_is_not_stationary() {
        let noise = lcg_noise(400, 5);
        let mut data = Vec::with_capacity(noise.len());
        let mut level = 0.0;
        for e in noise {
            level += 1.0 + e;
            data.push(level);
        }
        let result = adf_test(&data, Some(4)).unwrap();
        assert!(!result.is_stationary());
    }

    #[test]
    fn test_short_series() {
        assert!(adf_test(&[1.0, 2.0, 3.0], None).is_none());
    }

    #[test]
    fn test_default_max_lag() {
        assert_eq!(default_max_lag(100), 12);
        assert_eq!(default_max_lag(10), 3);
    }
}
