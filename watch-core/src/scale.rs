use crate::record::PricePoint;

/// Layout constants for the price chart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartConfig {
    /// Pixels kept free on every side of the plot area.
    pub padding: f64,
    pub radius: f64,
    pub hover_radius: f64,
    /// Share of the viewport height the chart may extend to.
    pub height_fraction: f64,
    pub tick_count: usize,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            padding: 50.0,
            radius: 4.0,
            hover_radius: 6.0,
            height_fraction: 0.95,
            tick_count: 5,
        }
    }
}

/// Height that keeps an element's bottom edge at `fraction` of the viewport.
pub fn fill_height(viewport_height: f64, top_offset: f64, fraction: f64) -> f64 {
    (viewport_height * fraction - top_offset).max(0.0)
}

/// Affine map from a data domain onto a pixel range:
/// `scale = (r1 - r0) / (d1 - d0)`, `offset = r0 - scale * d0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
    scale: f64,
    offset: f64,
}

impl LinearScale {
    /// A zero-width domain maps every value onto the middle of the range.
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        let span = domain.1 - domain.0;
        if span == 0.0 || !span.is_finite() {
            let mid = (range.0 + range.1) / 2.0;
            return Self {
                domain,
                range,
                scale: 0.0,
                offset: mid,
            };
        }
        let scale = (range.1 - range.0) / span;
        Self {
            domain,
            range,
            scale,
            offset: range.0 - scale * domain.0,
        }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn is_degenerate(&self) -> bool {
        self.scale == 0.0
    }

    pub fn map(&self, value: f64) -> f64 {
        if self.is_degenerate() {
            return self.offset;
        }
        // Same line as `scale * value + offset`; anchoring at the domain
        // start keeps millisecond timestamps from eating the precision.
        self.range.0 + self.scale * (value - self.domain.0)
    }

    /// `count` evenly spaced domain values including both ends.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        if self.is_degenerate() {
            return vec![self.domain.0];
        }
        if count < 2 {
            return Vec::new();
        }
        let step = (self.domain.1 - self.domain.0) / (count as f64 - 1.0);
        (0..count)
            .map(|i| self.domain.0 + step * i as f64)
            .collect()
    }
}

/// Pixel rectangle the markers are placed in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotArea {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl PlotArea {
    /// Container size minus `padding` on every side. A side shorter than
    /// twice the padding collapses onto its centre line.
    pub fn from_container(width: f64, height: f64, padding: f64) -> Self {
        let (left, right) = inset(width, padding);
        let (top, bottom) = inset(height, padding);
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }
}

fn inset(length: f64, padding: f64) -> (f64, f64) {
    let length = length.max(0.0);
    if length < padding * 2.0 {
        let mid = length / 2.0;
        (mid, mid)
    } else {
        (padding, length - padding)
    }
}

/// Smallest and largest value, ignoring NaN. `None` when nothing is left.
pub fn extent<I: IntoIterator<Item = f64>>(values: I) -> Option<(f64, f64)> {
    values
        .into_iter()
        .filter(|v| !v.is_nan())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Time on x, price on y (inverted, SVG y grows downward).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisMapping {
    pub x: LinearScale,
    pub y: LinearScale,
    pub area: PlotArea,
}

impl AxisMapping {
    /// Never computed for an empty series.
    pub fn fit(points: &[PricePoint], area: PlotArea) -> Option<Self> {
        let x_domain = extent(points.iter().map(|p| p.timestamp_ms() as f64))?;
        let y_domain = extent(points.iter().map(|p| p.price))?;
        Some(Self {
            x: LinearScale::new(x_domain, (area.left, area.right)),
            y: LinearScale::new(y_domain, (area.bottom, area.top)),
            area,
        })
    }

    pub fn position(&self, point: &PricePoint) -> (f64, f64) {
        (
            self.x.map(point.timestamp_ms() as f64),
            self.y.map(point.price),
        )
    }
}
