//! Conversion of a [`Figure`] into a JSON-safe structure.
//!
//! The output follows the mpld3 figure layout (`axes`, `data`, `plugins`)
//! so browser-side mpld3 can draw it directly. Every series gets its own
//! data table of `[x, y]` rows referenced from the line descriptor.

use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::{json, Map, Value};

use crate::figure::{Figure, Panel, Series};
use crate::layout::{auto_limits, stacked_panels, AxesBox};
use crate::{RenderError, Result};

static FIGURE_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Turns a native figure into a transport-safe value.
pub trait FigureSerializer: Send + Sync {
    /// Serialize `figure`, rejecting malformed series.
    fn serialize(&self, figure: &Figure) -> Result<Value>;
}

/// mpld3-compatible JSON serializer.
#[derive(Debug, Clone, Default)]
pub struct JsonFigureSerializer;

impl FigureSerializer for JsonFigureSerializer {
    fn serialize(&self, figure: &Figure) -> Result<Value> {
        if figure.panels.is_empty() {
            return Err(RenderError::EmptyFigure);
        }
        if !(figure.dpi > 0.0 && figure.width_in > 0.0 && figure.height_in > 0.0) {
            return Err(RenderError::Layout(format!(
                "invalid figure size {}x{} in at {} dpi",
                figure.width_in, figure.height_in, figure.dpi
            )));
        }
        for series in figure.panels.iter().flat_map(|p| &p.series) {
            validate_series(series)?;
        }

        let boxes = stacked_panels(figure.panels.len(), &figure.margins)?;
        let fig_id = format!("fig_el{}", FIGURE_COUNTER.fetch_add(1, Ordering::Relaxed));

        let mut data = Map::new();
        let mut axes = Vec::with_capacity(figure.panels.len());
        for (i, (panel, bbox)) in figure.panels.iter().zip(boxes).enumerate() {
            axes.push(axes_json(figure, panel, bbox, &format!("{fig_id}_ax{i}"), &mut data));
        }

        Ok(json!({
            "id": fig_id,
            "width": figure.width_in * figure.dpi,
            "height": figure.height_in * figure.dpi,
            "axes": axes,
            "data": data,
            "plugins": serde_json::to_value(&figure.plugins)?,
        }))
    }
}

fn validate_series(series: &Series) -> Result<()> {
    if series.x.len() != series.y.len() {
        return Err(RenderError::SeriesLength {
            label: series.label.clone(),
            x: series.x.len(),
            y: series.y.len(),
        });
    }
    if series.x.iter().chain(&series.y).any(|v| !v.is_finite()) {
        return Err(RenderError::NonFinite { label: series.label.clone() });
    }
    Ok(())
}

fn axes_json(
    figure: &Figure,
    panel: &Panel,
    bbox: AxesBox,
    axes_id: &str,
    data: &mut Map<String, Value>,
) -> Value {
    let xlim = auto_limits(panel.series.iter().flat_map(|s| &s.x));
    let ylim = auto_limits(panel.series.iter().flat_map(|s| &s.y));
    let font = figure.font_size;

    let mut lines = Vec::with_capacity(panel.series.len());
    for (j, series) in panel.series.iter().enumerate() {
        let key = format!("data{:02}", data.len() + 1);
        let rows: Vec<Value> = series.x.iter().zip(&series.y).map(|(x, y)| json!([x, y])).collect();
        data.insert(key.clone(), Value::Array(rows));
        lines.push(json!({
            "id": format!("{axes_id}_line{j}"),
            "label": series.label,
            "data": key,
            "xindex": 0,
            "yindex": 1,
            "coordinates": "data",
            "color": series.color,
            "linewidth": series.linewidth,
            "dasharray": "none",
            "alpha": 1,
            "zorder": 2,
            "drawstyle": "default",
        }));
    }

    let mut texts = vec![
        text_json(&panel.title, [0.5, 1.02], "middle", 0, font, &format!("{axes_id}_title")),
        text_json(&panel.xlabel, [0.5, -0.12], "middle", 0, font, &format!("{axes_id}_xlabel")),
        text_json(&panel.ylabel, [-0.1, 0.5], "middle", -90, font, &format!("{axes_id}_ylabel")),
    ];
    if panel.legend {
        for (j, series) in panel.series.iter().enumerate() {
            let y = 0.95 - 0.07 * j as f64;
            let mut t = text_json(&series.label, [0.03, y], "start", 0, font * 0.85, &format!("{axes_id}_legend{j}"));
            t["color"] = json!(series.color);
            texts.push(t);
        }
    }

    let grid = if figure.use_grid {
        json!({"gridOn": true, "color": "#B0B0B0", "dasharray": "none", "alpha": 1.0})
    } else {
        json!({"gridOn": false})
    };

    json!({
        "id": axes_id,
        "bbox": bbox.to_array(),
        "xlim": xlim,
        "ylim": ylim,
        "xdomain": xlim,
        "ydomain": ylim,
        "xscale": "linear",
        "yscale": "linear",
        "axes": [
            axis_json("bottom", font, &grid),
            axis_json("left", font, &grid),
        ],
        "axesbg": "#FFFFFF",
        "axesbgalpha": null,
        "zoomable": true,
        "lines": lines,
        "paths": [],
        "markers": [],
        "texts": texts,
        "collections": [],
        "images": [],
        "sharex": [],
        "sharey": [],
    })
}

fn axis_json(position: &str, fontsize: f64, grid: &Value) -> Value {
    json!({
        "position": position,
        "nticks": 6,
        "tickvalues": null,
        "tickformat": null,
        "scale": "linear",
        "fontsize": fontsize,
        "grid": grid,
        "visible": true,
    })
}

fn text_json(text: &str, position: [f64; 2], anchor: &str, rotation: i32, fontsize: f64, id: &str) -> Value {
    json!({
        "id": id,
        "text": text,
        "position": position,
        "coordinates": "axes",
        "h_anchor": anchor,
        "v_baseline": "auto",
        "rotation": rotation,
        "fontsize": fontsize,
        "color": "#000000",
        "alpha": 1,
        "zorder": 3,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlotOptions;
    use crate::figure::{Panel, Plugin};

    fn two_panel_figure() -> Figure {
        let mut fig = Figure::new(&PlotOptions::default());
        fig.add_panel(Panel::new("A", "Day", "Count").line("s", vec![0.0, 1.0, 2.0], vec![5.0, 4.0, 3.0]));
        fig.add_panel(
            Panel::new("B", "Day", "Count")
                .line("p", vec![0.0, 1.0], vec![1.0, 2.0])
                .line("q", vec![0.0, 1.0], vec![0.0, 0.5]),
        );
        fig
    }

    #[test]
    fn serializes_axes_data_and_plugins() {
        let mut fig = two_panel_figure();
        fig.connect(Plugin::mouse_position(12.0, ".4r"));

        let v = JsonFigureSerializer.serialize(&fig).unwrap();
        assert_eq!(v["width"], 800.0);
        assert_eq!(v["height"], 900.0);
        assert_eq!(v["axes"].as_array().unwrap().len(), 2);
        assert_eq!(v["data"].as_object().unwrap().len(), 3);
        assert_eq!(v["plugins"][0]["type"], "mouseposition");

        let line = &v["axes"][1]["lines"][1];
        assert_eq!(line["data"], "data03");
        assert_eq!(v["data"]["data03"], json!([[0.0, 0.0], [1.0, 0.5]]));
        assert_eq!(v["axes"][0]["axes"][0]["grid"]["gridOn"], false);
    }

    #[test]
    fn empty_figure_is_an_error() {
        let fig = Figure::new(&PlotOptions::default());
        assert!(matches!(JsonFigureSerializer.serialize(&fig), Err(RenderError::EmptyFigure)));
    }

    #[test]
    fn mismatched_series_is_an_error() {
        let mut fig = Figure::new(&PlotOptions::default());
        fig.add_panel(Panel::new("A", "x", "y").line("bad", vec![0.0, 1.0], vec![1.0]));
        let err = JsonFigureSerializer.serialize(&fig).unwrap_err();
        assert!(err.to_string().contains("bad"));
    }

    #[test]
    fn non_finite_values_are_rejected() {
        let mut fig = Figure::new(&PlotOptions::default());
        fig.add_panel(Panel::new("A", "x", "y").line("nan", vec![0.0], vec![f64::NAN]));
        assert!(matches!(JsonFigureSerializer.serialize(&fig), Err(RenderError::NonFinite { .. })));
    }

    #[test]
    fn grid_flag_is_carried() {
        let opts = PlotOptions { use_grid: true, ..Default::default() };
        let mut fig = Figure::new(&opts);
        fig.add_panel(Panel::new("A", "x", "y").line("s", vec![0.0], vec![1.0]));
        let v = JsonFigureSerializer.serialize(&fig).unwrap();
        assert_eq!(v["axes"][0]["axes"][1]["grid"]["gridOn"], true);
    }
}
