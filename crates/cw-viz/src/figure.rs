//! Native multi-panel figure produced by simulation engines.

use serde::Serialize;

use crate::color::{palette_color, Color};
use crate::config::{MarginsConfig, PlotOptions};

/// One line series.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    /// Legend label.
    pub label: String,
    /// x values.
    pub x: Vec<f64>,
    /// y values, same length as `x`.
    pub y: Vec<f64>,
    /// Line color.
    pub color: Color,
    /// Line width in points.
    pub linewidth: f64,
}

impl Series {
    /// Series with the default line width.
    pub fn new(label: &str, x: Vec<f64>, y: Vec<f64>, color: Color) -> Self {
        Self { label: label.to_string(), x, y, color, linewidth: 2.0 }
    }
}

/// One set of axes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Panel {
    /// Axes title.
    pub title: String,
    /// x-axis label.
    pub xlabel: String,
    /// y-axis label.
    pub ylabel: String,
    /// Lines, drawn in order.
    pub series: Vec<Series>,
    /// Show a legend of series labels.
    pub legend: bool,
}

impl Panel {
    /// Empty panel with a legend.
    pub fn new(title: &str, xlabel: &str, ylabel: &str) -> Self {
        Self {
            title: title.to_string(),
            xlabel: xlabel.to_string(),
            ylabel: ylabel.to_string(),
            series: Vec::new(),
            legend: true,
        }
    }

    /// Add a series colored by its position in the panel.
    pub fn line(mut self, label: &str, x: Vec<f64>, y: Vec<f64>) -> Self {
        let color = palette_color(self.series.len());
        self.series.push(Series::new(label, x, y, color));
        self
    }
}

/// Interactive behaviour attached to a figure for the browser renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Plugin {
    /// Live readout of the data coordinates under the cursor.
    MousePosition {
        /// Readout font size (points).
        fontsize: f64,
        /// d3 number format of the readout.
        fmt: String,
    },
}

impl Plugin {
    /// Mouse-position readout.
    pub fn mouse_position(fontsize: f64, fmt: &str) -> Self {
        Plugin::MousePosition { fontsize, fmt: fmt.to_string() }
    }
}

/// Figure with vertically stacked panels.
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    /// Width in inches.
    pub width_in: f64,
    /// Height in inches.
    pub height_in: f64,
    /// Pixels per inch.
    pub dpi: f64,
    /// Subplot placement.
    pub margins: MarginsConfig,
    /// Text size (points).
    pub font_size: f64,
    /// Grid lines on every panel.
    pub use_grid: bool,
    /// Panels, top to bottom.
    pub panels: Vec<Panel>,
    /// Attached interactive plugins.
    pub plugins: Vec<Plugin>,
}

impl Figure {
    /// Empty figure sized by `options`.
    pub fn new(options: &PlotOptions) -> Self {
        Self {
            width_in: options.figure.width,
            height_in: options.figure.height,
            dpi: options.figure.dpi,
            margins: options.margins,
            font_size: options.font_size,
            use_grid: options.use_grid,
            panels: Vec::new(),
            plugins: Vec::new(),
        }
    }

    /// Append a panel below the existing ones.
    pub fn add_panel(&mut self, panel: Panel) {
        self.panels.push(panel);
    }

    /// Attach an interactive plugin.
    pub fn connect(&mut self, plugin: Plugin) {
        self.plugins.push(plugin);
    }
}
