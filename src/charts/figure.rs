//! Figure Module
//! Explicit chart description shared by the interactive viewer and the
//! static renderer, plus the builders for each diagnostic chart.

use crate::config::AnalysisConfig;
use crate::data::{date_to_fractional_year, scaled_name, DataProcessor, ProcessorError, SunspotData, SunspotTable};
use crate::stats::{
    acf, acf_confidence_bands, decompose_stl, min_length, pacf, pacf_confidence_bound,
    DecompositionError,
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChartError {
    #[error(transparent)]
    Processor(#[from] ProcessorError),
    #[error("{what} needs at least {needed} values, got {got}")]
    TooShort {
        what: &'static str,
        needed: usize,
        got: usize,
    },
    #[error(transparent)]
    Decomposition(#[from] DecompositionError),
}

/// Plain RGB so the figure model stays independent of either backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesColor(pub u8, pub u8, pub u8);

pub const BLUE: SeriesColor = SeriesColor(31, 119, 180);
pub const ORANGE: SeriesColor = SeriesColor(255, 127, 14);
pub const RED: SeriesColor = SeriesColor(214, 39, 40);
pub const GREEN: SeriesColor = SeriesColor(44, 160, 44);
pub const BAND: SeriesColor = SeriesColor(120, 120, 200);

#[derive(Debug, Clone, PartialEq)]
pub struct LineData {
    pub label: String,
    pub color: SeriesColor,
    pub points: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarData {
    pub label: String,
    pub color: SeriesColor,
    /// `[lag, value]`
    pub bars: Vec<[f64; 2]>,
    /// `[lag, half-width]` of the confidence band around zero.
    pub band: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PanelContent {
    Lines(Vec<LineData>),
    Bars(BarData),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub content: PanelContent,
}

/// One chart window: a title and vertically stacked panels.
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub kind: ChartKind,
    pub title: String,
    pub panels: Vec<Panel>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChartKind {
    RawSeries,
    Normalized,
    Decomposition,
    Acf,
    Pacf,
}

impl ChartKind {
    pub const ALL: [ChartKind; 5] = [
        ChartKind::RawSeries,
        ChartKind::Normalized,
        ChartKind::Decomposition,
        ChartKind::Acf,
        ChartKind::Pacf,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ChartKind::RawSeries => "Raw Series",
            ChartKind::Normalized => "Normalized Series",
            ChartKind::Decomposition => "Decomposition",
            ChartKind::Acf => "Autocorrelation",
            ChartKind::Pacf => "Partial Autocorrelation",
        }
    }

    /// File name stem used for PNG export.
    pub fn file_stem(self) -> &'static str {
        match self {
            ChartKind::RawSeries => "raw_series",
            ChartKind::Normalized => "normalized_series",
            ChartKind::Decomposition => "decomposition",
            ChartKind::Acf => "acf",
            ChartKind::Pacf => "pacf",
        }
    }
}

fn line(label: &str, color: SeriesColor, points: Vec<[f64; 2]>) -> LineData {
    LineData {
        label: label.to_string(),
        color,
        points,
    }
}

fn lines_panel(title: &str, y_label: &str, lines: Vec<LineData>) -> Panel {
    Panel {
        title: title.to_string(),
        x_label: "Year".to_string(),
        y_label: y_label.to_string(),
        content: PanelContent::Lines(lines),
    }
}

/// Builds figures from the loaded tables.
pub struct FigureBuilder<'a> {
    data: &'a SunspotData,
    config: &'a AnalysisConfig,
}

impl<'a> FigureBuilder<'a> {
    pub fn new(data: &'a SunspotData, config: &'a AnalysisConfig) -> Self {
        Self { data, config }
    }

    pub fn build(&self, kind: ChartKind) -> Result<Figure, ChartError> {
        match kind {
            ChartKind::RawSeries => self.series_figure(kind, false),
            ChartKind::Normalized => self.series_figure(kind, true),
            ChartKind::Decomposition => self.decomposition(),
            ChartKind::Acf => self.correlogram(kind),
            ChartKind::Pacf => self.correlogram(kind),
        }
    }

    /// Four stacked panels: monthly total, monthly smoothed, and north/south
    /// for both hemispheric tables.
    fn series_figure(&self, kind: ChartKind, normalized: bool) -> Result<Figure, ChartError> {
        let column = |name: &str| {
            if normalized {
                scaled_name(name)
            } else {
                name.to_string()
            }
        };
        let prefix = if normalized { "Normalized " } else { "" };
        let y_label = if normalized { "Scaled [0, 1]" } else { "Sunspot number" };

        let points = |table: &SunspotTable, name: &str| {
            DataProcessor::series_points(table, &column(name))
        };
        let hemispheres = |table: &SunspotTable| -> Result<Vec<LineData>, ChartError> {
            Ok(vec![
                line(
                    &format!("{prefix}Northern Hemisphere"),
                    RED,
                    points(table, "north")?,
                ),
                line(
                    &format!("{prefix}Southern Hemisphere"),
                    GREEN,
                    points(table, "south")?,
                ),
            ])
        };

        let panels = vec![
            lines_panel(
                "Monthly Total",
                y_label,
                vec![line(
                    &format!("{prefix}Monthly Total Sunspots"),
                    BLUE,
                    points(&self.data.monthly, "total_sunspots")?,
                )],
            ),
            lines_panel(
                "Monthly Smoothed",
                y_label,
                vec![line(
                    &format!("{prefix}Monthly Smoothed Sunspots"),
                    ORANGE,
                    points(&self.data.monthly_smoothed, "total_sunspots")?,
                )],
            ),
            lines_panel("Hemispheric Monthly", y_label, hemispheres(&self.data.hemispheric)?),
            lines_panel(
                "Hemispheric Smoothed",
                y_label,
                hemispheres(&self.data.hemispheric_smoothed)?,
            ),
        ];

        Ok(Figure {
            kind,
            title: format!("{prefix}Sunspot Series"),
            panels,
        })
    }

    /// Additive STL decomposition of the monthly total series.
    fn decomposition(&self) -> Result<Figure, ChartError> {
        let table = &self.data.monthly;
        let period = self.config.decomposition_period;
        let values = table.values("total_sunspots").map_err(ProcessorError::from)?;
        let x: Vec<f64> = table
            .dates()
            .map_err(ProcessorError::from)?
            .into_iter()
            .map(date_to_fractional_year)
            .collect();

        if values.len() < min_length(period) {
            return Err(ChartError::TooShort {
                what: "Decomposition",
                needed: min_length(period),
                got: values.len(),
            });
        }
        let result = decompose_stl(&values, period, self.config.stl_seasonal_length)?;

        let component = |values: &[f64]| -> Vec<[f64; 2]> {
            x.iter()
                .zip(values)
                .filter(|(_, v)| !v.is_nan())
                .map(|(&x, &v)| [x, v])
                .collect()
        };

        let panels = vec![
            lines_panel("Observed", "Sunspots", vec![line("Observed", BLUE, component(&result.observed))]),
            lines_panel("Trend", "Trend", vec![line("Trend", ORANGE, component(&result.trend))]),
            lines_panel(
                &format!("Seasonal (strength {:.2})", result.seasonal_strength()),
                "Season",
                vec![line("Seasonal", GREEN, component(&result.seasonal))],
            ),
            lines_panel("Residual", "Resid", vec![line("Residual", RED, component(&result.residual))]),
        ];

        Ok(Figure {
            kind: ChartKind::Decomposition,
            title: format!(
                "STL Decomposition of Monthly Total Sunspots (period {})",
                result.period
            ),
            panels,
        })
    }

    /// ACF or PACF of the monthly smoothed series with its 95% band.
    fn correlogram(&self, kind: ChartKind) -> Result<Figure, ChartError> {
        let values: Vec<f64> = self
            .data
            .monthly_smoothed
            .values("total_sunspots")
            .map_err(ProcessorError::from)?
            .into_iter()
            .filter(|v| !v.is_nan())
            .collect();
        let n = values.len();
        if n < 3 {
            return Err(ChartError::TooShort {
                what: kind.label(),
                needed: 3,
                got: n,
            });
        }

        let lags = self.config.acf_lags;
        let (coefficients, bands, y_label) = if kind == ChartKind::Acf {
            let r = acf(&values, lags);
            let bands = acf_confidence_bands(&r, n);
            (r, bands, "Autocorrelation")
        } else {
            let p = pacf(&values, lags);
            let bound = pacf_confidence_bound(n);
            let bands = (0..p.len()).map(|lag| if lag == 0 { 0.0 } else { bound }).collect();
            (p, bands, "Partial Autocorrelation")
        };

        let indexed = |v: &[f64]| -> Vec<[f64; 2]> {
            v.iter().enumerate().map(|(lag, &c)| [lag as f64, c]).collect()
        };

        let panel = Panel {
            title: format!("{} Function of Monthly Smoothed Sunspots", kind.label()),
            x_label: "Lags".to_string(),
            y_label: y_label.to_string(),
            content: PanelContent::Bars(BarData {
                label: y_label.to_string(),
                color: BLUE,
                bars: indexed(&coefficients),
                band: indexed(&bands),
            }),
        };

        Ok(Figure {
            kind,
            title: kind.label().to_string(),
            panels: vec![panel],
        })
    }
}
