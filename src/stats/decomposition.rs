//! Additive STL decomposition (Seasonal-Trend decomposition using LOESS).

use thiserror::Error;

/// Smoother length statsmodels' `STL` uses when none is given.
pub const DEFAULT_SEASONAL_LENGTH: usize = 7;

#[derive(Error, Debug)]
pub enum DecompositionError {
    #[error("Seasonal period must be at least 2, got {0}")]
    Period(usize),
    #[error("STL needs at least {needed} values, got {got}")]
    TooShort { needed: usize, got: usize },
    #[error("Series contains missing values")]
    MissingValues,
    #[error("STL failed: {0}")]
    Stl(String),
}

/// Observed series split as `observed = trend + seasonal + residual`.
#[derive(Debug, Clone)]
pub struct Decomposition {
    pub observed: Vec<f64>,
    pub trend: Vec<f64>,
    pub seasonal: Vec<f64>,
    pub residual: Vec<f64>,
    pub period: usize,
}

impl Decomposition {
    /// Share of the detrended variance explained by the seasonal component,
    /// `max(0, 1 - Var(R) / Var(S + R))`.
    pub fn seasonal_strength(&self) -> f64 {
        let detrended: Vec<f64> = self
            .residual
            .iter()
            .zip(&self.seasonal)
            .map(|(r, s)| r + s)
            .collect();

        let var_detrended = super::sample_variance(&detrended);
        if var_detrended == 0.0 {
            return 0.0;
        }
        (1.0 - super::sample_variance(&self.residual) / var_detrended).max(0.0)
    }
}

/// Minimum series length for a decomposition with `period`.
pub fn min_length(period: usize) -> usize {
    period * 2
}

/// Additive STL decomposition, non-robust, with a seasonal smoother of
/// `seasonal_length` (odd, at least 3).
///
/// The seasonal component is re-estimated per cycle, so its shape and
/// amplitude may drift along the series.
pub fn decompose_stl(
    data: &[f64],
    period: usize,
    seasonal_length: usize,
) -> Result<Decomposition, DecompositionError> {
    if period < 2 {
        return Err(DecompositionError::Period(period));
    }
    if data.len() < min_length(period) {
        return Err(DecompositionError::TooShort {
            needed: min_length(period),
            got: data.len(),
        });
    }
    if data.iter().any(|v| !v.is_finite()) {
        return Err(DecompositionError::MissingValues);
    }

    let series: Vec<f32> = data.iter().map(|&v| v as f32).collect();
    let fit = stlrs::params()
        .seasonal_length(seasonal_length)
        .robust(false)
        .fit(&series, period)
        .map_err(|e| DecompositionError::Stl(e.to_string()))?;

    let widen = |values: &[f32]| -> Vec<f64> { values.iter().map(|&v| f64::from(v)).collect() };
    let trend = widen(fit.trend());
    let seasonal = widen(fit.seasonal());
    let residual: Vec<f64> = data
        .iter()
        .zip(&trend)
        .zip(&seasonal)
        .map(|((&y, &t), &s)| y - t - s)
        .collect();

    Ok(Decomposition {
        observed: data.to_vec(),
        trend,
        seasonal,
        residual,
        period,
    })
}
