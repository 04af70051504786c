//! Chart Viewer Widget
//! Central scrollable area showing the selected figure or the ADF report.

use crate::analysis::AnalysisReport;
use crate::charts::{ChartKind, ChartPlotter};
use crate::gui::View;
use egui::{Color32, RichText, ScrollArea};

const PANEL_HEIGHT: f32 = 260.0;
const CORRELOGRAM_HEIGHT: f32 = 420.0;

pub struct ChartViewer {
    pub report: AnalysisReport,
}

impl ChartViewer {
    pub fn new(report: AnalysisReport) -> Self {
        Self { report }
    }

    pub fn show(&self, ui: &mut egui::Ui, view: View) {
        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| match view {
                View::Chart(kind) => self.show_chart(ui, kind),
                View::Stationarity => self.show_stationarity(ui),
            });
    }

    fn show_chart(&self, ui: &mut egui::Ui, kind: ChartKind) {
        let Some(figure) = self.report.figures.get(&kind) else {
            let reason = self
                .report
                .unavailable
                .get(&kind)
                .map(String::as_str)
                .unwrap_or("No Data");
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new(reason).size(20.0));
            });
            return;
        };

        let height = match kind {
            ChartKind::Acf | ChartKind::Pacf => CORRELOGRAM_HEIGHT,
            _ => PANEL_HEIGHT,
        };
        ChartPlotter::draw_figure(ui, figure, height);

        if kind == ChartKind::RawSeries {
            ui.add_space(10.0);
            ui.label(RichText::new("Summary").size(14.0).strong());
            ChartPlotter::draw_summary_table(ui, &self.report.summaries);
        }
    }

    fn show_stationarity(&self, ui: &mut egui::Ui) {
        ui.label(
            RichText::new("Augmented Dickey-Fuller Test on Differenced Monthly Totals")
                .size(18.0)
                .strong(),
        );
        ui.add_space(8.0);

        let Some(adf) = &self.report.adf else {
            ui.label(RichText::new("Not enough data for the test").size(14.0));
            return;
        };

        let verdict_color = if adf.is_stationary() {
            Color32::from_rgb(40, 167, 69)
        } else {
            Color32::from_rgb(220, 53, 69)
        };

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(12.0)
            .show(ui, |ui| {
                egui::Grid::new("adf_table")
                    .striped(true)
                    .spacing([16.0, 4.0])
                    .show(ui, |ui| {
                        ui.label("ADF Statistic");
                        ui.label(format!("{:.6}", adf.statistic));
                        ui.end_row();
                        ui.label("p-value");
                        ui.label(format!("{:.6}", adf.p_value));
                        ui.end_row();
                        ui.label("Lags used");
                        ui.label(adf.used_lag.to_string());
                        ui.end_row();
                        ui.label("Observations");
                        ui.label(adf.n_obs.to_string());
                        ui.end_row();
                        for (level, value) in &adf.critical_values {
                            ui.label(format!("Critical value ({level})"));
                            ui.label(format!("{:.4}", value));
                            ui.end_row();
                        }
                    });
                ui.add_space(8.0);
                ui.label(RichText::new(adf.verdict()).size(14.0).color(verdict_color));
            });
    }
}
