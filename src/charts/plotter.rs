//! Chart Plotter Module
//! Draws figures interactively using egui_plot.

use crate::charts::figure::{BarData, Figure, LineData, Panel, PanelContent, SeriesColor};
use crate::stats::SeriesSummary;
use egui::{Color32, RichText};
use egui_plot::{Bar, BarChart, Legend, Line, LineStyle, Plot, PlotPoints};

impl From<SeriesColor> for Color32 {
    fn from(c: SeriesColor) -> Self {
        Color32::from_rgb(c.0, c.1, c.2)
    }
}

/// Draws [`Figure`]s into an egui `Ui`.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Draw every panel of a figure stacked vertically.
    pub fn draw_figure(ui: &mut egui::Ui, figure: &Figure, panel_height: f32) {
        ui.label(RichText::new(&figure.title).size(18.0).strong());
        ui.add_space(6.0);

        for (idx, panel) in figure.panels.iter().enumerate() {
            Self::draw_panel(ui, &format!("{:?}_{}", figure.kind, idx), panel, panel_height);
            ui.add_space(8.0);
        }
    }

    fn draw_panel(ui: &mut egui::Ui, id: &str, panel: &Panel, height: f32) {
        ui.label(RichText::new(&panel.title).size(14.0).strong());

        Plot::new(id)
            .height(height)
            .legend(Legend::default())
            .x_axis_label(panel.x_label.clone())
            .y_axis_label(panel.y_label.clone())
            .allow_scroll(false)
            .show(ui, |plot_ui| match &panel.content {
                PanelContent::Lines(lines) => {
                    for l in lines {
                        plot_ui.line(Self::line(l));
                    }
                }
                PanelContent::Bars(bars) => {
                    plot_ui.bar_chart(Self::bar_chart(bars));
                    for l in Self::band_lines(bars) {
                        plot_ui.line(l);
                    }
                }
            });
    }

    fn line(data: &LineData) -> Line {
        Line::new(PlotPoints::new(data.points.clone()))
            .color(Color32::from(data.color))
            .width(1.5)
            .name(&data.label)
    }

    fn bar_chart(data: &BarData) -> BarChart {
        let bars: Vec<Bar> = data
            .bars
            .iter()
            .map(|&[lag, value]| Bar::new(lag, value).width(0.3))
            .collect();
        BarChart::new(bars)
            .color(Color32::from(data.color))
            .name(&data.label)
    }

    /// Upper and lower edges of the confidence band, skipping lag 0.
    fn band_lines(data: &BarData) -> [Line; 2] {
        let upper: Vec<[f64; 2]> = data.band.iter().skip(1).map(|&[x, w]| [x, w]).collect();
        let lower: Vec<[f64; 2]> = data.band.iter().skip(1).map(|&[x, w]| [x, -w]).collect();
        let color = Color32::from(crate::charts::figure::BAND);

        [
            Line::new(PlotPoints::new(upper))
                .color(color)
                .style(LineStyle::dashed_loose())
                .name("95% confidence"),
            Line::new(PlotPoints::new(lower))
                .color(color)
                .style(LineStyle::dashed_loose()),
        ]
    }

    /// Descriptive statistics table, one row per series.
    pub fn draw_summary_table(ui: &mut egui::Ui, summaries: &[SeriesSummary]) {
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                egui::Grid::new("series_summary_table")
                    .striped(true)
                    .min_col_width(55.0)
                    .spacing([8.0, 4.0])
                    .show(ui, |ui| {
                        for header in ["Series", "N", "Mean", "Median", "Std", "Min", "Max", "P05", "P95"] {
                            ui.label(RichText::new(header).strong().size(11.0));
                        }
                        ui.end_row();

                        for s in summaries {
                            ui.label(RichText::new(&s.name).size(11.0));
                            ui.label(RichText::new(s.count.to_string()).size(11.0));
                            for value in [s.mean, s.median, s.std, s.min, s.max, s.p05, s.p95] {
                                ui.label(RichText::new(format!("{:.2}", value)).size(11.0));
                            }
                            ui.end_row();
                        }
                    });
            });
    }
}
