use crate::config::MarginsConfig;
use crate::{RenderError, Result};

/// Axes rectangle in figure fractions, origin bottom-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxesBox {
    /// Left edge.
    pub x0: f64,
    /// Bottom edge.
    pub y0: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

impl AxesBox {
    /// `[x0, y0, width, height]`.
    pub fn to_array(self) -> [f64; 4] {
        [self.x0, self.y0, self.width, self.height]
    }
}

/// Single-column grid of `n` panels, first panel on top.
///
/// Spacing follows subplot semantics: `hspace` is the gap between rows as
/// a fraction of the row height.
pub fn stacked_panels(n: usize, margins: &MarginsConfig) -> Result<Vec<AxesBox>> {
    let MarginsConfig { left, bottom, right, top, hspace, .. } = *margins;
    let in_unit = |v: f64| (0.0..=1.0).contains(&v);
    if !(in_unit(left) && in_unit(right) && in_unit(bottom) && in_unit(top)) {
        return Err(RenderError::Layout("margins must lie in [0, 1]".into()));
    }
    if left >= right || bottom >= top {
        return Err(RenderError::Layout(format!(
            "degenerate plot area: left={left}, right={right}, bottom={bottom}, top={top}"
        )));
    }
    if hspace.is_nan() || hspace < 0.0 {
        return Err(RenderError::Layout(format!("invalid hspace {hspace}")));
    }
    if n == 0 {
        return Ok(Vec::new());
    }

    let rows = n as f64;
    let row_h = (top - bottom) / (rows + hspace * (rows - 1.0));
    let gap = hspace * row_h;

    Ok((0..n)
        .map(|i| {
            let i = i as f64;
            AxesBox { x0: left, y0: top - (i + 1.0) * row_h - i * gap, width: right - left, height: row_h }
        })
        .collect())
}

/// Data limits with a 5% margin on each side.
///
/// Empty input yields `[0, 1]`; a constant series is widened to a unit span.
pub fn auto_limits<'a>(values: impl IntoIterator<Item = &'a f64>) -> [f64; 2] {
    let (lo, hi) = values
        .into_iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    if lo > hi {
        return [0.0, 1.0];
    }
    if lo == hi {
        return [lo - 0.5, hi + 0.5];
    }
    let pad = 0.05 * (hi - lo);
    [lo - pad, hi + pad]
}
