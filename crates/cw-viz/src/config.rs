use serde::Deserialize;

/// Layout options for simulation figures.
///
/// Defaults reproduce the web app's fixed layout: an 8x9 inch figure,
/// subplot margins 0.15/0.1/0.9/0.95, font size 12 and no grid.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlotOptions {
    /// Figure size and resolution.
    pub figure: FigureConfig,
    /// Subplot placement.
    pub margins: MarginsConfig,
    /// Font size for titles, labels and plugins (points).
    pub font_size: f64,
    /// Draw grid lines on every panel.
    pub use_grid: bool,
}

impl Default for PlotOptions {
    fn default() -> Self {
        Self {
            figure: FigureConfig::default(),
            margins: MarginsConfig::default(),
            font_size: 12.0,
            use_grid: false,
        }
    }
}

/// Figure dimensions.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FigureConfig {
    /// Width in inches.
    pub width: f64,
    /// Height in inches.
    pub height: f64,
    /// Pixels per inch.
    pub dpi: f64,
}

impl Default for FigureConfig {
    fn default() -> Self {
        Self { width: 8.0, height: 9.0, dpi: 100.0 }
    }
}

/// Subplot placement as figure fractions plus inter-panel spacing
/// (fractions of the average panel size).
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct MarginsConfig {
    /// Left edge of the axes area.
    pub left: f64,
    /// Bottom edge of the axes area.
    pub bottom: f64,
    /// Right edge of the axes area.
    pub right: f64,
    /// Top edge of the axes area.
    pub top: f64,
    /// Horizontal gap between columns. Figures here use a single column, so
    /// layout ignores it; it is carried to mirror the subplot parameters.
    pub wspace: f64,
    /// Vertical gap between rows.
    pub hspace: f64,
}

impl Default for MarginsConfig {
    fn default() -> Self {
        Self { left: 0.15, bottom: 0.1, right: 0.9, top: 0.95, wspace: 0.2, hspace: 0.25 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let opts: PlotOptions =
            serde_json::from_str(r#"{"font_size": 10, "margins": {"left": 0.2}}"#).unwrap();
        assert_eq!(opts.font_size, 10.0);
        assert_eq!(opts.margins.left, 0.2);
        assert_eq!(opts.margins.top, 0.95);
        assert_eq!(opts.figure, FigureConfig::default());
        assert!(!opts.use_grid);
    }
}
