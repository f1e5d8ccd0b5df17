//! # cw-viz
//!
//! Native figure model for simulation plots and its conversion into a
//! transport-safe JSON structure that a browser renderer can draw.

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Series colors.
pub mod color;
/// Figure size, margins and font options.
pub mod config;
/// Figure, panel and series model.
pub mod figure;
/// Axes placement and axis limits.
pub mod layout;
/// Figure to JSON conversion.
pub mod serialize;

use thiserror::Error;

pub use color::Color;
pub use config::PlotOptions;
pub use figure::{Figure, Panel, Plugin, Series};
pub use serialize::{FigureSerializer, JsonFigureSerializer};

/// Rendering error type
#[derive(Debug, Error)]
pub enum RenderError {
    /// Nothing to draw.
    #[error("figure has no panels")]
    EmptyFigure,
    /// x and y lengths differ.
    #[error("series '{label}' has {x} x-values but {y} y-values")]
    SeriesLength {
        /// Series label.
        label: String,
        /// Number of x values.
        x: usize,
        /// Number of y values.
        y: usize,
    },
    /// NaN or infinite data.
    #[error("series '{label}' contains non-finite values")]
    NonFinite {
        /// Series label.
        label: String,
    },
    /// Margins or figure size leave no room for axes.
    #[error("layout error: {0}")]
    Layout(String),
    /// JSON encoding failed.
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, RenderError>;
