//! Statistics module - descriptive stats and time-series diagnostics

mod autocorrelation;
mod calculator;
mod decomposition;
mod stationarity;

pub use autocorrelation::{acf, acf_confidence_bands, pacf, pacf_confidence_bound};
pub use calculator::{sample_variance, SeriesSummary, StatsCalculator};
pub use decomposition::{decompose_stl, min_length, DecompositionError, DEFAULT_SEASONAL_LENGTH};
pub use stationarity::{adf_test, AdfResult};
