//! Charts module - Figure building and rendering

mod figure;
mod plotter;
mod renderer;

pub use figure::{ChartKind, Figure, FigureBuilder};
pub use plotter::ChartPlotter;
pub use renderer::StaticChartRenderer;
