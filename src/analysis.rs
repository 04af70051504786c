//! Analysis Module
//! Runs every diagnostic over the loaded tables once and keeps the results
//! for the viewer and for export.

use crate::charts::{ChartKind, Figure, FigureBuilder};
use crate::config::AnalysisConfig;
use crate::data::{first_difference, LoaderError, SunspotData, TableKind};
use crate::stats::{adf_test, AdfResult, SeriesSummary, StatsCalculator};
use chrono::NaiveDate;
use std::collections::HashMap;

/// Row count and coverage of one loaded table.
#[derive(Debug, Clone)]
pub struct TableInfo {
    pub kind: TableKind,
    pub rows: usize,
    pub range: Option<(NaiveDate, NaiveDate)>,
}

impl TableInfo {
    pub fn describe(&self) -> String {
        match self.range {
            Some((first, last)) => format!(
                "{}: {} rows, {} to {}",
                self.kind.label(),
                self.rows,
                first.format("%Y-%m"),
                last.format("%Y-%m")
            ),
            None => format!("{}: no rows", self.kind.label()),
        }
    }
}

/// Everything the viewer displays.
#[derive(Debug, Clone, Default)]
pub struct AnalysisReport {
    pub tables: Vec<TableInfo>,
    pub figures: HashMap<ChartKind, Figure>,
    /// Figures that could not be built, with the reason.
    pub unavailable: HashMap<ChartKind, String>,
    pub summaries: Vec<SeriesSummary>,
    /// ADF test on the differenced monthly total series.
    pub adf: Option<AdfResult>,
}

impl AnalysisReport {
    pub fn compute(data: &SunspotData, config: &AnalysisConfig) -> Result<Self, LoaderError> {
        let mut report = Self::default();

        for kind in TableKind::ALL {
            let table = data.table(kind);
            let info = TableInfo {
                kind,
                rows: table.height(),
                range: table.date_range()?,
            };
            log::info!("{}", info.describe());
            report.tables.push(info);
        }

        let summary_columns: [(&str, TableKind, &str); 6] = [
            ("Monthly Total", TableKind::MonthlyTotal, "total_sunspots"),
            ("Monthly Smoothed", TableKind::MonthlySmoothed, "total_sunspots"),
            ("North", TableKind::HemisphericTotal, "north"),
            ("South", TableKind::HemisphericTotal, "south"),
            ("North Smoothed", TableKind::HemisphericSmoothed, "north"),
            ("South Smoothed", TableKind::HemisphericSmoothed, "south"),
        ];
        for (name, kind, column) in summary_columns {
            let values = data.table(kind).values(column)?;
            report
                .summaries
                .push(StatsCalculator::compute_summary(name, &values));
        }

        let builder = FigureBuilder::new(data, config);
        for kind in ChartKind::ALL {
            match builder.build(kind) {
                Ok(figure) => {
                    report.figures.insert(kind, figure);
                }
                Err(e) => {
                    log::warn!("{} unavailable: {}", kind.label(), e);
                    report.unavailable.insert(kind, e.to_string());
                }
            }
        }

        let monthly = data.monthly.values("total_sunspots")?;
        let differenced = first_difference(&monthly);
        report.adf = adf_test(&differenced, None);
        match &report.adf {
            Some(adf) => log::info!("ADF on differenced monthly totals:\n{adf}"),
            None => log::warn!(
                "ADF test skipped: {} differenced values are not enough",
                differenced.len()
            ),
        }

        Ok(report)
    }
}
