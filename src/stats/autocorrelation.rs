//! Autocorrelation analysis: ACF, PACF and their confidence bands.

use statrs::distribution::{ContinuousCDF, Normal};

/// Significance level of the plotted bands.
pub const BAND_ALPHA: f64 = 0.05;

/// Autocorrelation for lags `0..=max_lag` (biased estimator, `r[0] == 1`).
///
/// A constant series has no defined autocorrelation beyond lag 0; those lags
/// are reported as 0.
pub fn acf(data: &[f64], max_lag: usize) -> Vec<f64> {
    let n = data.len();
    if n < 2 {
        return vec![];
    }

    let max_lag = max_lag.min(n - 1);
    let m = data.iter().sum::<f64>() / n as f64;
    let c0: f64 = data.iter().map(|x| (x - m).powi(2)).sum();

    if c0 == 0.0 {
        let mut flat = vec![0.0; max_lag + 1];
        flat[0] = 1.0;
        return flat;
    }

    (0..=max_lag)
        .map(|lag| {
            if lag == 0 {
                return 1.0;
            }
            let sum: f64 = data[lag..]
                .iter()
                .zip(data[..n - lag].iter())
                .map(|(a, b)| (a - m) * (b - m))
                .sum();
            sum / c0
        })
        .collect()
}

/// Partial autocorrelation via Durbin-Levinson on the biased ACF.
pub fn pacf(data: &[f64], max_lag: usize) -> Vec<f64> {
    let r = acf(data, max_lag);
    if r.is_empty() {
        return vec![];
    }

    let max_lag = r.len() - 1;
    let mut out = vec![0.0; max_lag + 1];
    out[0] = 1.0;
    if max_lag == 0 {
        return out;
    }

    let mut phi = vec![0.0; max_lag + 1];
    let mut prev = vec![0.0; max_lag + 1];
    phi[1] = r[1];
    out[1] = r[1];

    for k in 2..=max_lag {
        prev[..k].copy_from_slice(&phi[..k]);

        let num = r[k] - (1..k).map(|j| prev[j] * r[k - j]).sum::<f64>();
        let den = 1.0 - (1..k).map(|j| prev[j] * r[j]).sum::<f64>();
        if den.abs() < 1e-12 {
            break;
        }

        phi[k] = num / den;
        for j in 1..k {
            phi[j] = prev[j] - phi[k] * prev[k - j];
        }
        out[k] = phi[k];
    }

    out
}

/// Two-sided standard normal quantile for `alpha`.
pub fn z_value(alpha: f64) -> f64 {
    Normal::new(0.0, 1.0)
        .map(|n| n.inverse_cdf(1.0 - alpha / 2.0))
        .unwrap_or(1.96)
}

/// Band half-width for the PACF under white noise: `z / sqrt(n)`.
pub fn pacf_confidence_bound(n: usize) -> f64 {
    if n == 0 {
        return f64::NAN;
    }
    z_value(BAND_ALPHA) / (n as f64).sqrt()
}

/// Per-lag ACF band half-widths using Bartlett's formula.
///
/// Lag 0 has no band and is reported as 0.
pub fn acf_confidence_bands(acf_values: &[f64], n: usize) -> Vec<f64> {
    if acf_values.is_empty() || n == 0 {
        return vec![];
    }

    let z = z_value(BAND_ALPHA);
    let mut bands = Vec::with_capacity(acf_values.len());
    bands.push(0.0);

    let mut cumulative = 0.0;
    for lag in 1..acf_values.len() {
        if lag > 1 {
            cumulative += acf_values[lag - 1].powi(2);
        }
        bands.push(z * ((1.0 + 2.0 * cumulative) / n as f64).sqrt());
    }
    bands
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
    fn test_acf_white_noise() {
        let data = lcg_noise(2000, 7);
        let r = acf(&data, 10);
        assert_eq!(r.len(), 11);
        assert!((r[0] - 1.0).abs() < 1e-12);
        let bound = pacf_confidence_bound(data.len());
        for &v in &r[1..] {
            assert!(v.abs() < bound * 2.0, "lag value {v} outside noise band");
        }
    }

    #[test]
    fn test_acf_periodic_signal() {
        let data: Vec<f64> = (0..240)
            .map(|i| (2.0 * std::f64::consts::PI * i as f64 / 12.0).sin())
            .collect();
        let r = acf(&data, 24);
        assert!(r[12] > 0.8);
        assert!(r[6] < -0.8);
    }

    #[test]
    fn test_acf_constant_and_short() {
        assert_eq!(acf(&[3.0; 5], 3), vec![1.0, 0.0, 0.0, 0.0]);
        assert!(acf(&[1.0], 3).is_empty());
        assert_eq!(acf(&[1.0, 2.0, 3.0], 50).len(), 3);
    }

    #[test]
    fn test_pacf_ar1_cuts_off() {
        let noise = lcg_noise(5000, 11);
        let mut data = vec![0.0; noise.len()];
        for t in 1..data.len() {
            data[t] = 0.7 * data[t - 1] + noise[t];
        }
        let p = pacf(&data, 5);
        assert!((p[0] - 1.0).abs() < 1e-12);
        assert!((p[1] - 0.7).abs() < 0.05);
        for &v in &p[2..] {
            assert!(v.abs() < 0.06);
        }
    }

    #[test]
    fn test_bounds() {
        assert!((z_value(0.05) - 1.959964).abs() < 1e-4);
        assert!((pacf_confidence_bound(100) - 0.1959964).abs() < 1e-4);

        let bands = acf_confidence_bands(&[1.0, 0.5, 0.25], 100);
        assert_eq!(bands[0], 0.0);
        assert!((bands[1] - 0.1959964).abs() < 1e-4);
        assert!((bands[2] - 0.1959964 * 1.5f64.sqrt()).abs() < 1e-4);
    }
}
