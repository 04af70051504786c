//! Sunspot Explorer - Sunspot Time-Series Analysis & Diagnostic Chart Viewer
//!
//! Loads the SILSO sunspot tables, runs the diagnostics once and shows the
//! resulting charts in an interactive window.

mod analysis;
mod charts;
mod config;
mod data;
mod gui;
mod stats;

use analysis::AnalysisReport;
use anyhow::Context;
use config::{AnalysisConfig, CONFIG_FILE_NAME};
use data::{DataLoader, DataProcessor};
use eframe::egui;
use gui::SunspotApp;
use std::path::Path;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = AnalysisConfig::load_or_default(Path::new(CONFIG_FILE_NAME))
        .context("Failed to read configuration")?;

    let loader = DataLoader::new(&config)?;
    let mut data = loader
        .load_all(&config)
        .with_context(|| format!("Failed to load sunspot data from {}", config.data_dir.display()))?;
    DataProcessor::normalize_all(&mut data).context("Failed to normalize series")?;

    let report = AnalysisReport::compute(&data, &config).context("Failed to analyze series")?;

    // Configure native options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 800.0])
            .with_min_inner_size([1200.0, 700.0])
            .with_title("Sunspot Explorer"),
        ..Default::default()
    };

    eframe::run_native(
        "Sunspot Explorer",
        options,
        Box::new(move |cc| Ok(Box::new(SunspotApp::new(cc, config, report)))),
    )
    .map_err(|e| anyhow::anyhow!("GUI error: {e}"))
}
