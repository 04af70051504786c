//! Data Processor Module
//! Min-max normalization and extraction of plottable series from loaded tables.

use crate::data::loader::{date_to_fractional_year, LoaderError, SunspotData, SunspotTable, TableKind};
use polars::prelude::*;
use thiserror::Error;

/// Suffix of the column holding a normalized copy.
pub const SCALED_SUFFIX: &str = "_scaled";

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error(transparent)]
    Loader(#[from] LoaderError),
    #[error("Column '{0}' has no finite values")]
    EmptyColumn(String),
}

/// Columns rescaled for cross-series comparison.
pub fn normalized_columns(kind: TableKind) -> &'static [&'static str] {
    if kind.is_hemispheric() {
        &["north", "south"]
    } else {
        &["total_sunspots"]
    }
}

pub fn scaled_name(column: &str) -> String {
    format!("{column}{SCALED_SUFFIX}")
}

/// Rescale linearly so the minimum maps to 0 and the maximum to 1.
///
/// NaN entries stay NaN and are ignored when fitting. A constant input maps
/// to all zeros. Returns `None` when there is nothing finite to fit.
pub fn min_max_scale(values: &[f64]) -> Option<Vec<f64>> {
    let (min, max) = values
        .iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc: Option<(f64, f64)>, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })?;

    let range = max - min;
    Some(
        values
            .iter()
            .map(|&v| {
                if v.is_nan() {
                    f64::NAN
                } else if range == 0.0 {
                    0.0
                } else {
                    (v - min) / range
                }
            })
            .collect(),
    )
}

/// First difference, `x[i] - x[i-1]`; one element shorter than the input.
pub fn first_difference(values: &[f64]) -> Vec<f64> {
    values.windows(2).map(|w| w[1] - w[0]).collect()
}

/// Handles normalization and series extraction.
pub struct DataProcessor;

impl DataProcessor {
    /// Add `<column>_scaled` to the table, fit on that column alone.
    pub fn normalize_column(
        table: &mut SunspotTable,
        column: &str,
    ) -> Result<String, ProcessorError> {
        let values = table.values(column)?;
        let scaled =
            min_max_scale(&values).ok_or_else(|| ProcessorError::EmptyColumn(column.to_string()))?;

        if scaled.iter().filter(|v| v.is_finite()).all(|&v| v == 0.0) {
            log::warn!(
                "{}: column '{}' is constant, normalized to zeros",
                table.kind().label(),
                column
            );
        }

        let name = scaled_name(column);
        table.set_column(Column::new(name.as_str().into(), scaled))?;
        Ok(name)
    }

    /// Normalize every comparison column of every table independently.
    pub fn normalize_all(data: &mut SunspotData) -> Result<(), ProcessorError> {
        for kind in TableKind::ALL {
            let table = data.table_mut(kind);
            if table.height() == 0 {
                log::warn!("{}: empty table, skipping normalization", kind.label());
                continue;
            }
            for column in normalized_columns(kind) {
                let name = Self::normalize_column(table, column)?;
                log::debug!("{}: added {}", kind.label(), name);
            }
        }
        Ok(())
    }

    /// `(fractional year, value)` pairs for plotting; NaN values are skipped.
    pub fn series_points(
        table: &SunspotTable,
        column: &str,
    ) -> Result<Vec<[f64; 2]>, ProcessorError> {
        let dates = table.dates()?;
        let values = table.values(column)?;

        Ok(dates
            .into_iter()
            .zip(values)
            .filter(|(_, v)| !v.is_nan())
            .map(|(d, v)| [date_to_fractional_year(d), v])
            .collect())
    }
}
