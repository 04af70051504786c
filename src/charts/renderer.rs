//! Static Chart Renderer
//! Renders figures to PNG with plotters.
//!
//! Layout:
//! 1. Figure title centered at the top
//! 2. Panels stacked vertically, each with its own caption, axes and legend
//! 3. Line panels: one line per series; bar panels: one bar per lag with the
//!    confidence band around zero

use crate::charts::figure::{BarData, ChartKind, Figure, LineData, Panel, PanelContent, SeriesColor, BAND};
use image::{ImageFormat, RgbImage};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::io::Cursor;
use std::ops::Range;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_WIDTH: u32 = 1500;
/// Height given to each stacked panel.
pub const PANEL_HEIGHT: u32 = 450;
const TITLE_HEIGHT: u32 = 50;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Drawing failed: {0}")]
    Draw(String),
    #[error("Image encoding failed: {0}")]
    Encode(#[from] image::ImageError),
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Pixel buffer does not match {0}x{1}")]
    Buffer(u32, u32),
}

fn draw_err<E: std::fmt::Display>(e: E) -> RenderError {
    RenderError::Draw(e.to_string())
}

impl From<SeriesColor> for RGBColor {
    fn from(c: SeriesColor) -> Self {
        RGBColor(c.0, c.1, c.2)
    }
}

/// Axis range covering `values` with 5% padding on each side.
///
/// Empty input falls back to `0..1`; a single value is widened by ±1.
pub fn padded_range(values: impl IntoIterator<Item = f64>) -> Range<f64> {
    let (min, max) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });

    if !min.is_finite() || !max.is_finite() {
        return 0.0..1.0;
    }
    if min == max {
        return (min - 1.0)..(max + 1.0);
    }
    let pad = (max - min) * 0.05;
    (min - pad)..(max + pad)
}

/// Pixel size of a rendered figure.
pub fn figure_size(figure: &Figure, width: u32) -> (u32, u32) {
    let panels = figure.panels.len().max(1) as u32;
    (width, TITLE_HEIGHT + panels * PANEL_HEIGHT)
}

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Render a figure into PNG bytes.
    pub fn render_png(figure: &Figure, width: u32) -> Result<Vec<u8>, RenderError> {
        let (w, h) = figure_size(figure, width);
        let mut buffer = vec![0u8; (w * h * 3) as usize];

        {
            let root = BitMapBackend::with_buffer(&mut buffer, (w, h)).into_drawing_area();
            root.fill(&WHITE).map_err(draw_err)?;
            let body = root
                .titled(&figure.title, ("sans-serif", 28))
                .map_err(draw_err)?;

            let areas = body.split_evenly((figure.panels.len().max(1), 1));
            for (panel, area) in figure.panels.iter().zip(areas.iter()) {
                Self::draw_panel(area, panel)?;
            }
            root.present().map_err(draw_err)?;
        }

        let image = RgbImage::from_raw(w, h, buffer).ok_or(RenderError::Buffer(w, h))?;
        let mut bytes = Cursor::new(Vec::new());
        image.write_to(&mut bytes, ImageFormat::Png)?;
        Ok(bytes.into_inner())
    }

    /// Render a figure and write it to `path`.
    pub fn export_png(figure: &Figure, path: &Path) -> Result<(), RenderError> {
        let bytes = Self::render_png(figure, DEFAULT_WIDTH)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| RenderError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(path, bytes).map_err(|source| RenderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Exported {} to {}", figure.title, path.display());
        Ok(())
    }

    /// Default export location for a chart kind.
    pub fn export_path(dir: &Path, kind: ChartKind) -> PathBuf {
        dir.join(format!("{}.png", kind.file_stem()))
    }

    fn draw_panel(
        area: &DrawingArea<BitMapBackend<'_>, Shift>,
        panel: &Panel,
    ) -> Result<(), RenderError> {
        match &panel.content {
            PanelContent::Lines(lines) => Self::draw_lines(area, panel, lines),
            PanelContent::Bars(bars) => Self::draw_bars(area, panel, bars),
        }
    }

    fn draw_lines(
        area: &DrawingArea<BitMapBackend<'_>, Shift>,
        panel: &Panel,
        lines: &[LineData],
    ) -> Result<(), RenderError> {
        let x_range = padded_range(lines.iter().flat_map(|l| l.points.iter().map(|p| p[0])));
        let y_range = padded_range(lines.iter().flat_map(|l| l.points.iter().map(|p| p[1])));

        let mut chart = ChartBuilder::on(area)
            .caption(&panel.title, ("sans-serif", 20))
            .margin(12)
            .x_label_area_size(36)
            .y_label_area_size(60)
            .build_cartesian_2d(x_range, y_range)
            .map_err(draw_err)?;

        chart
            .configure_mesh()
            .x_desc(panel.x_label.as_str())
            .y_desc(panel.y_label.as_str())
            .x_label_formatter(&|x| format!("{:.0}", x))
            .draw()
            .map_err(draw_err)?;

        for l in lines {
            let color = RGBColor::from(l.color);
            chart
                .draw_series(LineSeries::new(
                    l.points.iter().map(|p| (p[0], p[1])),
                    color.stroke_width(1),
                ))
                .map_err(draw_err)?
                .label(l.label.as_str())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(draw_err)?;
        Ok(())
    }

    fn draw_bars(
        area: &DrawingArea<BitMapBackend<'_>, Shift>,
        panel: &Panel,
        data: &BarData,
    ) -> Result<(), RenderError> {
        let max_lag = data.bars.last().map(|b| b[0]).unwrap_or(1.0);
        let y_range = padded_range(
            data.bars
                .iter()
                .map(|b| b[1])
                .chain(data.band.iter().flat_map(|b| [b[1], -b[1]]))
                .chain([0.0]),
        );

        let mut chart = ChartBuilder::on(area)
            .caption(&panel.title, ("sans-serif", 20))
            .margin(12)
            .x_label_area_size(36)
            .y_label_area_size(60)
            .build_cartesian_2d(-1.0..max_lag + 1.0, y_range)
            .map_err(draw_err)?;

        chart
            .configure_mesh()
            .x_desc(panel.x_label.as_str())
            .y_desc(panel.y_label.as_str())
            .draw()
            .map_err(draw_err)?;

        let color = RGBColor::from(data.color);
        chart
            .draw_series(data.bars.iter().map(|&[lag, value]| {
                Rectangle::new([(lag - 0.15, 0.0), (lag + 0.15, value)], color.filled())
            }))
            .map_err(draw_err)?
            .label(data.label.as_str())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));

        chart
            .draw_series(LineSeries::new(
                [(-1.0, 0.0), (max_lag + 1.0, 0.0)],
                BLACK.stroke_width(1),
            ))
            .map_err(draw_err)?;

        let band_color = RGBColor::from(BAND);
        let band: Vec<(f64, f64)> = data.band.iter().skip(1).map(|b| (b[0], b[1])).collect();
        for sign in [1.0, -1.0] {
            chart
                .draw_series(LineSeries::new(
                    band.iter().map(|&(x, w)| (x, sign * w)),
                    band_color.stroke_width(1),
                ))
                .map_err(draw_err)?;
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(draw_err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padded_range() {
        let r = padded_range([0.0, 10.0]);
        assert!((r.start + 0.5).abs() < 1e-12);
        assert!((r.end - 10.5).abs() < 1e-12);

        assert_eq!(padded_range([3.0, 3.0]), 2.0..4.0);
        assert_eq!(padded_range(std::iter::empty()), 0.0..1.0);
        assert_eq!(padded_range([f64::NAN, 2.0]), 1.0..3.0);
    }

    #[test]
    fn test_figure_size_scales_with_panels() {
        let figure = Figure {
            kind: ChartKind::RawSeries,
            title: "t".to_string(),
            panels: Vec::new(),
        };
        assert_eq!(figure_size(&figure, 800), (800, TITLE_HEIGHT + PANEL_HEIGHT));
    }

    const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    fn line_figure() -> Figure {
        let points: Vec<[f64; 2]> = (0..24).map(|i| [1900.0 + i as f64 / 12.0, (i % 7) as f64]).collect();
        Figure {
            kind: ChartKind::RawSeries,
            title: "Monthly Total".to_string(),
            panels: vec![Panel {
                title: "Monthly".to_string(),
                x_label: "Year".to_string(),
                y_label: "Sunspots".to_string(),
                content: PanelContent::Lines(vec![LineData {
                    label: "Monthly".to_string(),
                    color: SeriesColor(31, 119, 180),
                    points,
                }]),
            }],
        }
    }

    fn bar_figure() -> Figure {
        let bars: Vec<[f64; 2]> = (0..=10).map(|lag| [lag as f64, 0.8_f64.powi(lag)]).collect();
        let band: Vec<[f64; 2]> = (0..=10).map(|lag| [lag as f64, 0.2]).collect();
        Figure {
            kind: ChartKind::Acf,
            title: "ACF".to_string(),
            panels: vec![Panel {
                title: "Autocorrelation".to_string(),
                x_label: "Lag".to_string(),
                y_label: "ACF".to_string(),
                content: PanelContent::Bars(BarData {
                    label: "ACF".to_string(),
                    color: SeriesColor(31, 119, 180),
                    bars,
                    band,
                }),
            }],
        }
    }

    #[test]
    fn test_render_line_and_bar_figures() {
        for figure in [line_figure(), bar_figure()] {
            let bytes = StaticChartRenderer::render_png(&figure, 400).unwrap();
            assert!(bytes.len() > PNG_SIGNATURE.len());
            assert_eq!(&bytes[..8], &PNG_SIGNATURE);

            let decoded = image::load_from_memory(&bytes).unwrap();
            assert_eq!((decoded.width(), decoded.height()), figure_size(&figure, 400));
        }
    }

    #[test]
    fn test_export_creates_missing_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = StaticChartRenderer::export_path(&dir.path().join("out/charts"), ChartKind::Acf);
        assert!(!path.parent().unwrap().exists());

        StaticChartRenderer::export_png(&bar_figure(), &path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..8], &PNG_SIGNATURE);
    }

    #[test]
    fn test_export_path() {
        let path = StaticChartRenderer::export_path(Path::new("charts"), ChartKind::Pacf);
        assert_eq!(path, PathBuf::from("charts/pacf.png"));
    }
}
