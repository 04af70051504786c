//! Sunspot Data Loader Module
//! Reads the header-less SILSO tables with Polars, derives calendar dates
//! from the fractional-year column and drops invalid rows.

use crate::config::AnalysisConfig;
use chrono::{Datelike, NaiveDate};
use polars::io::mmap::MmapBytesReader;
use polars::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Value the source files use for a missing observation.
pub const MISSING_SENTINEL: f64 = -1.0;

/// Fractional years are printed with three decimals, so a month start such as
/// `2023 + 1/12` appears as `2023.083`. The slack lifts those back over the
/// month boundary without touching mid-month encodings.
const MONTH_ROUNDING_SLACK: f64 = 0.01;

pub const MONTHLY_COLUMNS: [&str; 7] = [
    "year",
    "month",
    "date_in_fraction",
    "total_sunspots",
    "deviation",
    "number_of_observations",
    "definitive_provisional",
];

pub const HEMISPHERIC_COLUMNS: [&str; 13] = [
    "year",
    "month",
    "date_in_fraction",
    "north_south",
    "north",
    "south",
    "deviation",
    "deviation_north",
    "deviation_south",
    "observations",
    "observations_north",
    "observations_south",
    "definitive_provisional",
];

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("Failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to load {path}: {source}")]
    File { path: PathBuf, source: PolarsError },
    #[error("Invalid fractional-year date: {0}")]
    InvalidFractionalDate(f64),
    #[error("Missing value in column '{column}' at row {row}")]
    MissingValue { column: &'static str, row: usize },
    #[error("{0}")]
    Config(#[from] crate::config::ConfigError),
}

/// Which of the four source tables a frame holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableKind {
    MonthlyTotal,
    MonthlySmoothed,
    HemisphericTotal,
    HemisphericSmoothed,
}

impl TableKind {
    pub const ALL: [TableKind; 4] = [
        TableKind::MonthlyTotal,
        TableKind::MonthlySmoothed,
        TableKind::HemisphericTotal,
        TableKind::HemisphericSmoothed,
    ];

    pub fn columns(self) -> &'static [&'static str] {
        if self.is_hemispheric() {
            &HEMISPHERIC_COLUMNS
        } else {
            &MONTHLY_COLUMNS
        }
    }

    /// Column whose sentinel marks the whole row as missing.
    pub fn primary_column(self) -> &'static str {
        if self.is_hemispheric() {
            "north_south"
        } else {
            "total_sunspots"
        }
    }

    pub fn is_hemispheric(self) -> bool {
        matches!(
            self,
            TableKind::HemisphericTotal | TableKind::HemisphericSmoothed
        )
    }

    pub fn is_smoothed(self) -> bool {
        matches!(
            self,
            TableKind::MonthlySmoothed | TableKind::HemisphericSmoothed
        )
    }

    pub fn label(self) -> &'static str {
        match self {
            TableKind::MonthlyTotal => "Monthly Total",
            TableKind::MonthlySmoothed => "Monthly Smoothed",
            TableKind::HemisphericTotal => "Hemispheric Total",
            TableKind::HemisphericSmoothed => "Hemispheric Smoothed",
        }
    }

    fn column_type(name: &str) -> DataType {
        match name {
            "year" | "month" | "number_of_observations" | "observations"
            | "observations_north" | "observations_south" => DataType::Int32,
            "definitive_provisional" => DataType::String,
            _ => DataType::Float64,
        }
    }
}

/// One loaded table with its derived `date` column.
#[derive(Debug, Clone)]
pub struct SunspotTable {
    kind: TableKind,
    df: DataFrame,
}

impl SunspotTable {
    pub fn new(kind: TableKind, df: DataFrame) -> Self {
        Self { kind, df }
    }

    pub fn kind(&self) -> TableKind {
        self.kind
    }

    pub fn height(&self) -> usize {
        self.df.height()
    }

    /// Add or replace a derived column.
    pub fn set_column(&mut self, column: Column) -> Result<(), LoaderError> {
        self.df.with_column(column)?;
        Ok(())
    }

    /// Row index as calendar dates.
    pub fn dates(&self) -> Result<Vec<NaiveDate>, LoaderError> {
        let dates = self.df.column("date")?.date()?;
        dates
            .as_date_iter()
            .enumerate()
            .map(|(row, d)| d.ok_or(LoaderError::MissingValue { column: "date", row }))
            .collect()
    }

    /// Numeric column as plain values; nulls become NaN.
    pub fn values(&self, column: &str) -> Result<Vec<f64>, LoaderError> {
        let series = self.df.column(column)?.cast(&DataType::Float64)?;
        Ok(series
            .f64()?
            .into_iter()
            .map(|v| v.unwrap_or(f64::NAN))
            .collect())
    }

    /// Earliest and latest date, or `None` for an empty table.
    pub fn date_range(&self) -> Result<Option<(NaiveDate, NaiveDate)>, LoaderError> {
        let dates = self.dates()?;
        Ok(dates
            .iter()
            .min()
            .copied()
            .zip(dates.iter().max().copied()))
    }
}

/// The four tables of one run.
#[derive(Debug, Clone)]
pub struct SunspotData {
    pub monthly: SunspotTable,
    pub monthly_smoothed: SunspotTable,
    pub hemispheric: SunspotTable,
    pub hemispheric_smoothed: SunspotTable,
}

impl SunspotData {
    pub fn table(&self, kind: TableKind) -> &SunspotTable {
        match kind {
            TableKind::MonthlyTotal => &self.monthly,
            TableKind::MonthlySmoothed => &self.monthly_smoothed,
            TableKind::HemisphericTotal => &self.hemispheric,
            TableKind::HemisphericSmoothed => &self.hemispheric_smoothed,
        }
    }

    pub fn table_mut(&mut self, kind: TableKind) -> &mut SunspotTable {
        match kind {
            TableKind::MonthlyTotal => &mut self.monthly,
            TableKind::MonthlySmoothed => &mut self.monthly_smoothed,
            TableKind::HemisphericTotal => &mut self.hemispheric,
            TableKind::HemisphericSmoothed => &mut self.hemispheric_smoothed,
        }
    }
}

/// Decompose a fractional year into the first day of its month.
///
/// The integer part is the year; `floor(fraction * 12) + 1` is the month.
pub fn fractional_year_to_date(value: f64) -> Result<NaiveDate, LoaderError> {
    if !value.is_finite() || value < 0.0 || value >= i32::MAX as f64 {
        return Err(LoaderError::InvalidFractionalDate(value));
    }

    let year = value.trunc();
    let fraction = value - year;
    let month_index = ((fraction * 12.0 + MONTH_ROUNDING_SLACK).floor() as u32).min(11);

    NaiveDate::from_ymd_opt(year as i32, month_index + 1, 1)
        .ok_or(LoaderError::InvalidFractionalDate(value))
}

/// Inverse of [`fractional_year_to_date`] for month starts.
pub fn date_to_fractional_year(date: NaiveDate) -> f64 {
    date.year() as f64 + date.month0() as f64 / 12.0
}

/// Loads and cleans the sunspot tables.
pub struct DataLoader {
    separator: u8,
    smoothing_trim: usize,
    start_date: NaiveDate,
}

impl DataLoader {
    pub fn new(config: &AnalysisConfig) -> Result<Self, LoaderError> {
        Ok(Self {
            separator: config.separator_byte()?,
            smoothing_trim: config.smoothing_trim,
            start_date: config.start_date,
        })
    }

    /// Load all four tables from the configured paths.
    pub fn load_all(&self, config: &AnalysisConfig) -> Result<SunspotData, LoaderError> {
        Ok(SunspotData {
            monthly: self.load_file(&config.monthly_path(), TableKind::MonthlyTotal)?,
            monthly_smoothed: self
                .load_file(&config.monthly_smoothed_path(), TableKind::MonthlySmoothed)?,
            hemispheric: self.load_file(&config.hemispheric_path(), TableKind::HemisphericTotal)?,
            hemispheric_smoothed: self.load_file(
                &config.hemispheric_smoothed_path(),
                TableKind::HemisphericSmoothed,
            )?,
        })
    }

    /// Load one table from disk.
    pub fn load_file(&self, path: &Path, kind: TableKind) -> Result<SunspotTable, LoaderError> {
        let file = std::fs::File::open(path).map_err(|source| LoaderError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let table = self.load_reader(file, kind).map_err(|e| match e {
            LoaderError::CsvError(source) => LoaderError::File {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })?;
        log::info!(
            "Loaded {} ({} rows) from {}",
            kind.label(),
            table.height(),
            path.display()
        );
        Ok(table)
    }

    /// Load one table from any in-memory or mapped source.
    pub fn load_reader<R: MmapBytesReader>(
        &self,
        reader: R,
        kind: TableKind,
    ) -> Result<SunspotTable, LoaderError> {
        let raw = self
            .read_options(kind)
            .into_reader_with_file_handle(reader)
            .finish()?;
        self.prepare(raw, kind)
    }

    /// Header-less read options with every column typed as `String`.
    fn read_options(&self, kind: TableKind) -> CsvReadOptions {
        let mut schema = Schema::with_capacity(kind.columns().len());
        for name in kind.columns() {
            schema.with_column((*name).into(), DataType::String);
        }

        let separator = self.separator;
        CsvReadOptions::default()
            .with_has_header(false)
            .with_schema(Some(Arc::new(schema)))
            .map_parse_options(|opts| opts.with_separator(separator))
    }

    fn prepare(&self, raw: DataFrame, kind: TableKind) -> Result<SunspotTable, LoaderError> {
        let typed = Self::parse_columns(raw, kind)?;
        let raw_rows = typed.height();
        let dated = Self::with_dates(typed)?;

        // Only the primary column is checked for the sentinel
        let mut df = dated
            .lazy()
            .filter(col(kind.primary_column()).neq(lit(MISSING_SENTINEL)))
            .collect()?;
        log::debug!(
            "{}: dropped {} rows with missing {}",
            kind.label(),
            raw_rows - df.height(),
            kind.primary_column()
        );

        if kind.is_hemispheric() {
            return Ok(SunspotTable::new(kind, df));
        }

        if !kind.is_smoothed() {
            df = self.trim_smoothing_window(&df);
        }

        let before = df.height();
        let df = df
            .lazy()
            .filter(col("date").gt_eq(lit(self.start_date)))
            .collect()?;
        log::debug!(
            "{}: dropped {} rows before {}",
            kind.label(),
            before - df.height(),
            self.start_date
        );

        Ok(SunspotTable::new(kind, df))
    }

    /// Strip padding and cast every field to its column type.
    fn parse_columns(raw: DataFrame, kind: TableKind) -> Result<DataFrame, LoaderError> {
        let exprs: Vec<Expr> = kind
            .columns()
            .iter()
            .map(|name| {
                let stripped = col(*name).str().strip_chars(lit(" "));
                match TableKind::column_type(name) {
                    DataType::String => stripped,
                    dtype => stripped.strict_cast(dtype),
                }
                .alias(*name)
            })
            .collect();

        Ok(raw.lazy().select(exprs).collect()?)
    }

    fn with_dates(mut df: DataFrame) -> Result<DataFrame, LoaderError> {
        let dates = df
            .column("date_in_fraction")?
            .f64()?
            .into_iter()
            .enumerate()
            .map(|(row, value)| {
                value
                    .ok_or(LoaderError::MissingValue {
                        column: "date_in_fraction",
                        row,
                    })
                    .and_then(fractional_year_to_date)
            })
            .collect::<Result<Vec<NaiveDate>, LoaderError>>()?;

        df.with_column(Column::new("date".into(), dates))?;
        Ok(df)
    }

    /// Drop the rows the smoothed series has no value for, so both monthly
    /// series share one date range.
    fn trim_smoothing_window(&self, df: &DataFrame) -> DataFrame {
        let keep = df.height().saturating_sub(2 * self.smoothing_trim);
        df.slice(self.smoothing_trim as i64, keep)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn ymd(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    fn loader() -> DataLoader {
        DataLoader::new(&AnalysisConfig::default()).unwrap()
    }

    /// Monthly rows in the SILSO layout, mid-month fractions and padded fields.
    fn monthly_text(first_year: i32, last_year: i32, smoothed: bool) -> String {
        let total = ((last_year - first_year + 1) * 12) as usize;
        let mut out = String::new();
        for i in 0..total {
            let year = first_year + (i / 12) as i32;
            let month = (i % 12) as u32 + 1;
            let fraction = year as f64 + (month as f64 - 0.5) / 12.0;
            let missing = smoothed && (i < 6 || i >= total - 6);
            let value = if missing { -1.0 } else { 50.0 + (i % 37) as f64 };
            out.push_str(&format!(
                "{};{:02};{:.3};{:>6.1};{:>5.1};{:>5};1\n",
                year, month, fraction, value, 3.1, 25
            ));
        }
        out
    }

    fn hemispheric_text(rows: &[(i32, u32, f64)]) -> String {
        rows.iter()
            .map(|&(year, month, total)| {
                let fraction = year as f64 + (month as f64 - 0.5) / 12.0;
                format!(
                    "{};{:02};{:.3};{:>6.1};{:>6.1};{:>6.1};  5.0;  3.0;  3.0;  30;  15;  15;0\n",
                    year,
                    month,
                    fraction,
                    total,
                    total / 2.0,
                    total / 2.0
                )
            })
            .collect()
    }

    fn load(text: String, kind: TableKind) -> SunspotTable {
        loader()
            .load_reader(Cursor::new(text.into_bytes()), kind)
            .unwrap()
    }

    #[test]
    fn test_fraction_2023_083_is_february() {
        let date = fractional_year_to_date(2023.083).unwrap();
        assert_eq!(date.year(), 2023);
        assert_eq!(date.month(), 2);
        assert_eq!(date.day(), 1);
    }

    #[test]
    fn test_mid_month_fractions() {
        assert_eq!(fractional_year_to_date(1749.042).unwrap(), ymd(1749, 1));
        assert_eq!(fractional_year_to_date(2023.123).unwrap(), ymd(2023, 2));
        assert_eq!(fractional_year_to_date(2024.958).unwrap(), ymd(2024, 12));
        assert_eq!(fractional_year_to_date(2000.0).unwrap(), ymd(2000, 1));
    }

    #[test]
    fn test_fraction_month_range_and_reconstruction() {
        for year in [1749, 1800, 1999, 2024] {
            for thousandths in 0..1000 {
                let x = year as f64 + thousandths as f64 / 1000.0;
                let date = fractional_year_to_date(x).unwrap();
                assert!((1..=12).contains(&date.month()), "month out of range for {x}");
                let back = date_to_fractional_year(date);
                assert!((x - back).abs() < 1.0 / 12.0, "{x} reconstructed as {back}");
            }
        }
    }

    #[test]
    fn test_invalid_fractions() {
        for bad in [f64::NAN, f64::INFINITY, -3.5, 1.0e12] {
            assert!(matches!(
                fractional_year_to_date(bad),
                Err(LoaderError::InvalidFractionalDate(_))
            ));
        }
    }

    #[test]
    fn test_sentinel_rows_removed() {
        let smoothed = load(monthly_text(1795, 1805, true), TableKind::MonthlySmoothed);
        let values = smoothed.values("total_sunspots").unwrap();
        assert!(!values.is_empty());
        assert!(values.iter().all(|&v| v != MISSING_SENTINEL));

        let hem = load(
            hemispheric_text(&[(1992, 1, 186.4), (1992, 2, -1.0), (1992, 3, 120.0)]),
            TableKind::HemisphericTotal,
        );
        assert_eq!(hem.height(), 2);
        assert!(hem
            .values("north_south")
            .unwrap()
            .iter()
            .all(|&v| v != MISSING_SENTINEL));
    }

    #[test]
    fn test_monthly_ranges_align() {
        let monthly = load(monthly_text(1795, 1805, false), TableKind::MonthlyTotal);
        let smoothed = load(monthly_text(1795, 1805, true), TableKind::MonthlySmoothed);

        let monthly_range = monthly.date_range().unwrap().unwrap();
        let smoothed_range = smoothed.date_range().unwrap().unwrap();
        assert_eq!(monthly_range, smoothed_range);
        assert_eq!(monthly_range, (ymd(1800, 1), ymd(1805, 6)));
        assert_eq!(monthly.height(), smoothed.height());
    }

    #[test]
    fn test_trim_applies_before_date_cutoff() {
        // Coverage starts after the cutoff, so only the trim shortens the series
        let monthly = load(monthly_text(1900, 1901, false), TableKind::MonthlyTotal);
        assert_eq!(monthly.height(), 12);
        assert_eq!(
            monthly.date_range().unwrap().unwrap(),
            (ymd(1900, 7), ymd(1901, 6))
        );
    }

    #[test]
    fn test_no_monthly_rows_before_1800() {
        let cutoff = ymd(1800, 1);
        for kind in [TableKind::MonthlyTotal, TableKind::MonthlySmoothed] {
            let table = load(monthly_text(1749, 1802, kind.is_smoothed()), kind);
            assert!(table.dates().unwrap().iter().all(|d| *d >= cutoff));
        }
    }

    #[test]
    fn test_hemispheric_not_date_restricted() {
        let hem = load(
            hemispheric_text(&[(1700, 1, 10.0), (1992, 1, 20.0)]),
            TableKind::HemisphericSmoothed,
        );
        assert_eq!(hem.height(), 2);
    }

    #[test]
    fn test_short_monthly_file_trims_to_empty() {
        let text = monthly_text(1900, 1900, false);
        let table = load(text, TableKind::MonthlyTotal);
        assert_eq!(table.height(), 0);
        assert!(table.date_range().unwrap().is_none());
    }

    #[test]
    fn test_loading_is_deterministic() {
        let text = monthly_text(1790, 1810, false);
        let first = load(text.clone(), TableKind::MonthlyTotal);
        let second = load(text, TableKind::MonthlyTotal);
        assert_eq!(first.height(), second.height());
        assert_eq!(first.date_range().unwrap(), second.date_range().unwrap());
    }

    #[test]
    fn test_malformed_value_fails() {
        let text = "1900;01;1900.042;  abc; 1.0;   10;1\n".to_string();
        let result = loader().load_reader(Cursor::new(text.into_bytes()), TableKind::MonthlyTotal);
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = loader()
            .load_file(Path::new("no/such/SN_m_tot.csv"), TableKind::MonthlyTotal)
            .unwrap_err();
        assert!(matches!(err, LoaderError::Open { .. }));
        assert!(err.to_string().contains("SN_m_tot.csv"));
    }

    #[test]
    fn test_load_file_from_disk() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("SN_ms_tot.csv");
        std::fs::write(
            &path,
            "1800;01;1800.042;  80.0; 10.0;   20;1\n1800;02;1800.123;  -1.0; 10.0;   20;1\n1800;03;1800.204;  82.5; 10.0;   20;1\n",
        )
        .unwrap();

        let table = loader().load_file(&path, TableKind::MonthlySmoothed).unwrap();
        assert_eq!(table.height(), 2);
        assert_eq!(table.values("total_sunspots").unwrap(), vec![80.0, 82.5]);
    }

    #[test]
    fn test_malformed_file_reports_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("broken.csv");
        std::fs::write(&path, "1800;01;1800.042;  abc; 10.0;   20;1\n").unwrap();

        let err = loader()
            .load_file(&path, TableKind::MonthlySmoothed)
            .unwrap_err();
        assert!(matches!(err, LoaderError::File { .. }), "{err:?}");
        assert!(err.to_string().contains("broken.csv"));
    }
}
