//! Statistics Calculator Module
//! Descriptive statistics for a single sunspot series.

/// Summary of one series, NaN entries excluded.
#[derive(Debug, Clone)]
pub struct SeriesSummary {
    pub name: String,
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub p95: f64,
    pub p05: f64,
}

impl Default for SeriesSummary {
    fn default() -> Self {
        Self {
            name: String::new(),
            count: 0,
            mean: f64::NAN,
            median: f64::NAN,
            std: f64::NAN,
            min: f64::NAN,
            max: f64::NAN,
            p95: f64::NAN,
            p05: f64::NAN,
        }
    }
}

pub struct StatsCalculator;

impl StatsCalculator {
    /// Compute descriptive statistics for an array of values.
    pub fn compute_summary(name: &str, values: &[f64]) -> SeriesSummary {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
        let n = sorted.len();
        if n == 0 {
            return SeriesSummary {
                name: name.to_string(),
                ..SeriesSummary::default()
            };
        }

        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let mean = mean(&sorted);
        let median = if n % 2 == 0 {
            (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
        } else {
            sorted[n / 2]
        };

        SeriesSummary {
            name: name.to_string(),
            count: n,
            mean,
            median,
            std: sample_variance(&sorted).sqrt(),
            min: sorted[0],
            max: sorted[n - 1],
            p95: Self::percentile(&sorted, 95.0),
            p05: Self::percentile(&sorted, 5.0),
        }
    }

    /// Calculate percentile using linear interpolation (NumPy compatible).
    fn percentile(sorted_values: &[f64], p: f64) -> f64 {
        let n = sorted_values.len();
        if n == 0 {
            return f64::NAN;
        }
        if n == 1 {
            return sorted_values[0];
        }

        let rank = (p / 100.0) * (n - 1) as f64;
        let lower = rank.floor() as usize;
        let upper = (rank.ceil() as usize).min(n - 1);
        let frac = rank - lower as f64;

        if lower == upper {
            sorted_values[lower]
        } else {
            sorted_values[lower] * (1.0 - frac) + sorted_values[upper] * frac
        }
    }
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Unbiased (n - 1) variance; zero for fewer than two values.
pub fn sample_variance(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (n - 1) as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_basic() {
        let s = StatsCalculator::compute_summary("x", &[4.0, 1.0, 3.0, 2.0]);
        assert_eq!(s.count, 4);
        assert!((s.mean - 2.5).abs() < 1e-12);
        assert!((s.median - 2.5).abs() < 1e-12);
        assert_eq!(s.min, 1.0);
        assert_eq!(s.max, 4.0);
        assert!((s.std - (5.0f64 / 3.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_summary_skips_nan() {
        let s = StatsCalculator::compute_summary("x", &[f64::NAN, 2.0, 8.0]);
        assert_eq!(s.count, 2);
        assert_eq!(s.median, 5.0);
    }

    #[test]
    fn test_summary_empty() {
        let s = StatsCalculator::compute_summary("empty", &[]);
        assert_eq!(s.count, 0);
        assert!(s.mean.is_nan());
        assert_eq!(s.name, "empty");
    }

    #[test]
    fn test_percentile_interpolates() {
        let sorted: Vec<f64> = (0..=100).map(f64::from).collect();
        assert!((StatsCalculator::percentile(&sorted, 95.0) - 95.0).abs() < 1e-12);
        assert!((StatsCalculator::percentile(&[1.0, 2.0], 50.0) - 1.5).abs() < 1e-12);
    }
}
