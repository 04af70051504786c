//! Control Panel Widget
//! Left side panel with view selection, dataset overview and export controls.

use crate::analysis::TableInfo;
use crate::charts::ChartKind;
use egui::{Color32, RichText};

/// What the central area shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Chart(ChartKind),
    Stationarity,
}

impl View {
    pub const ALL: [View; 6] = [
        View::Chart(ChartKind::RawSeries),
        View::Chart(ChartKind::Normalized),
        View::Chart(ChartKind::Decomposition),
        View::Chart(ChartKind::Acf),
        View::Chart(ChartKind::Pacf),
        View::Stationarity,
    ];

    pub fn label(self) -> &'static str {
        match self {
            View::Chart(kind) => kind.label(),
            View::Stationarity => "Stationarity (ADF)",
        }
    }

    pub fn chart_kind(self) -> Option<ChartKind> {
        match self {
            View::Chart(kind) => Some(kind),
            View::Stationarity => None,
        }
    }
}

impl Default for View {
    fn default() -> Self {
        View::Chart(ChartKind::RawSeries)
    }
}

/// Action requested by the control panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlPanelAction {
    None,
    ExportCurrent,
    ExportAll,
}

/// Left side control panel.
pub struct ControlPanel {
    pub view: View,
    pub status: String,
    table_lines: Vec<String>,
}

impl ControlPanel {
    pub fn new(tables: &[TableInfo]) -> Self {
        Self {
            view: View::default(),
            status: "Ready".to_string(),
            table_lines: tables.iter().map(TableInfo::describe).collect(),
        }
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("☀ Sunspot Explorer")
                    .size(22.0)
                    .color(Color32::from_rgb(255, 165, 0)),
            );
        });
        ui.add_space(10.0);
        ui.separator();

        // ===== Dataset Section =====
        ui.label(RichText::new("📁 Datasets").size(14.0).strong());
        ui.add_space(5.0);
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                for line in &self.table_lines {
                    ui.label(RichText::new(line).size(11.0));
                }
            });
        ui.add_space(10.0);

        // ===== View Section =====
        ui.label(RichText::new("📊 View").size(14.0).strong());
        ui.add_space(5.0);
        for view in View::ALL {
            ui.radio_value(&mut self.view, view, view.label());
        }
        ui.add_space(10.0);
        ui.separator();

        // ===== Export Section =====
        ui.label(RichText::new("💾 Export").size(14.0).strong());
        ui.add_space(5.0);
        ui.horizontal(|ui| {
            let chart_selected = self.view.chart_kind().is_some();
            if ui
                .add_enabled(chart_selected, egui::Button::new("Export PNG…"))
                .clicked()
            {
                action = ControlPanelAction::ExportCurrent;
            }
            if ui.button("Export all").clicked() {
                action = ControlPanelAction::ExportAll;
            }
        });

        ui.add_space(10.0);
        ui.separator();
        ui.label(RichText::new(&self.status).size(11.0).color(Color32::GRAY));

        action
    }
}
