//! Sunspot Explorer Main Application
//! Main window with control panel and chart viewer.

use crate::analysis::AnalysisReport;
use crate::charts::{ChartKind, StaticChartRenderer};
use crate::config::AnalysisConfig;
use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction};
use egui::SidePanel;

/// Main application window.
pub struct SunspotApp {
    config: AnalysisConfig,
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,
}

impl SunspotApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        config: AnalysisConfig,
        report: AnalysisReport,
    ) -> Self {
        Self {
            config,
            control_panel: ControlPanel::new(&report.tables),
            chart_viewer: ChartViewer::new(report),
        }
    }

    /// Export the current figure to a user-chosen PNG and open it.
    fn handle_export_current(&mut self) {
        let Some(kind) = self.control_panel.view.chart_kind() else {
            return;
        };
        let Some(figure) = self.chart_viewer.report.figures.get(&kind) else {
            self.control_panel
                .set_status(format!("{} is not available", kind.label()));
            return;
        };

        let output_path = match rfd::FileDialog::new()
            .add_filter("PNG Image", &["png"])
            .set_directory(&self.config.export_dir)
            .set_file_name(format!("{}.png", kind.file_stem()))
            .save_file()
        {
            Some(path) => path,
            None => return, // User cancelled
        };

        match StaticChartRenderer::export_png(figure, &output_path) {
            Ok(()) => {
                self.control_panel
                    .set_status(format!("Saved {}", output_path.display()));
                if let Err(e) = open::that(&output_path) {
                    log::warn!("Could not open {}: {}", output_path.display(), e);
                }
            }
            Err(e) => {
                log::error!("Export failed: {e}");
                self.control_panel.set_status(format!("Export error: {e}"));
            }
        }
    }

    /// Write every available figure into the configured export directory.
    fn handle_export_all(&mut self) {
        let mut written = 0;
        for kind in ChartKind::ALL {
            let Some(figure) = self.chart_viewer.report.figures.get(&kind) else {
                continue;
            };
            let path = StaticChartRenderer::export_path(&self.config.export_dir, kind);
            if let Err(e) = StaticChartRenderer::export_png(figure, &path) {
                log::error!("Export failed: {e}");
                self.control_panel.set_status(format!("Export error: {e}"));
                return;
            }
            written += 1;
        }

        self.control_panel.set_status(format!(
            "Exported {} charts to {}",
            written,
            self.config.export_dir.display()
        ));
    }
}

impl eframe::App for SunspotApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(300.0)
            .max_width(350.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    match self.control_panel.show(ui) {
                        ControlPanelAction::ExportCurrent => self.handle_export_current(),
                        ControlPanelAction::ExportAll => self.handle_export_all(),
                        ControlPanelAction::None => {}
                    }
                });
            });

        // Central panel - Chart Viewer
        egui::CentralPanel::default().show(ctx, |ui| {
            self.chart_viewer.show(ui, self.control_panel.view);
        });
    }
}
