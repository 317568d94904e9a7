//! Chart scaling
//!
//! Maps a labelled numeric series onto a virtual canvas that is 100 units
//! wide and `height` units tall, with y growing downwards. Nothing here
//! knows about weather; the output is plain geometry for filled-line (area)
//! or bar rendering.

use serde::{Deserialize, Serialize};

/// Virtual canvas width
pub const VIEW_WIDTH: f64 = 100.0;

/// Lowest value the top of the range is allowed to take
pub const VALUE_FLOOR: f64 = 10.0;

/// Space left under the lowest point in area mode
pub const AREA_HEADROOM: f64 = 5.0;

pub const BAR_WIDTH: f64 = 2.0;

/// Gridline positions as fractions of the canvas height
pub const GRIDLINE_FRACTIONS: [f64; 3] = [0.25, 0.5, 0.75];

/// Every n-th axis label is shown, plus the last one
pub const LABEL_STRIDE: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartMode {
    Area,
    Bar,
}

/// One input sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub label: String,
    pub value: f64,
}

impl ChartPoint {
    pub fn new<S: Into<String>>(label: S, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

/// Canvas coordinate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Value range the series was scaled against
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    /// Range for `values` under `mode`; `values` must be non-empty
    #[must_use]
    pub fn for_values(values: &[f64], mode: ChartMode) -> Self {
        let max = values.iter().copied().fold(VALUE_FLOOR, f64::max);
        let min = match mode {
            ChartMode::Bar => 0.0,
            ChartMode::Area => values.iter().copied().fold(f64::INFINITY, f64::min) - AREA_HEADROOM,
        };
        Self { min, max }
    }

    #[must_use]
    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    fn is_degenerate(&self) -> bool {
        let span = self.span();
        !(span.is_finite() && span > 0.0)
    }
}

/// Bar anchored at the baseline
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BarRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisLabel {
    pub x: f64,
    pub label: String,
    pub visible: bool,
}

/// Scaled drawing data for one series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartGeometry {
    pub mode: ChartMode,
    pub height: f64,
    pub range: ValueRange,
    /// One point per input sample, same order
    pub points: Vec<Point>,
    /// Horizontal gridline y positions
    pub gridlines: Vec<f64>,
    /// `"x,y x,y ..."` polyline through `points`
    pub line_path: String,
    /// Closed fill polygon (area mode only)
    pub area_path: Option<String>,
    /// One rectangle per point (bar mode only)
    pub bars: Vec<BarRect>,
    pub labels: Vec<AxisLabel>,
}

fn x_for_index(index: usize, count: usize) -> f64 {
    if count <= 1 {
        0.0
    } else {
        index as f64 / (count - 1) as f64 * VIEW_WIDTH
    }
}

/// True when every sample carries the same value
fn is_flat(values: &[f64]) -> bool {
    values
        .split_first()
        .is_some_and(|(first, rest)| rest.iter().all(|v| v == first))
}

fn y_for_value(value: f64, range: &ValueRange, height: f64, flat: bool) -> f64 {
    if flat || range.is_degenerate() {
        return height / 2.0;
    }
    if !value.is_finite() {
        return height;
    }
    height - ((value - range.min) / range.span()) * height
}

fn format_points(points: &[Point]) -> String {
    points
        .iter()
        .map(|p| format!("{},{}", p.x, p.y))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Scale `series` onto a canvas of the given height.
///
/// Returns `None` for an empty series. A series of equal values is drawn
/// on the midline. Pure: identical input always yields identical output.
#[must_use]
pub fn scale(series: &[ChartPoint], mode: ChartMode, height: f64) -> Option<ChartGeometry> {
    if series.is_empty() {
        return None;
    }

    let values: Vec<f64> = series.iter().map(|p| p.value).collect();
    let range = ValueRange::for_values(&values, mode);
    let count = series.len();
    let flat = is_flat(&values);

    let points: Vec<Point> = values
        .iter()
        .enumerate()
        .map(|(i, value)| Point {
            x: x_for_index(i, count),
            y: y_for_value(*value, &range, height, flat),
        })
        .collect();

    let line_path = format_points(&points);

    let (area_path, bars) = match mode {
        ChartMode::Area => (
            Some(format!("{line_path} {VIEW_WIDTH},{height} 0,{height}")),
            Vec::new(),
        ),
        ChartMode::Bar => (
            None,
            points
                .iter()
                .map(|p| BarRect {
                    x: p.x - BAR_WIDTH / 2.0,
                    y: p.y,
                    width: BAR_WIDTH,
                    height: (height - p.y).max(0.0),
                })
                .collect(),
        ),
    };

    let labels = series
        .iter()
        .zip(&points)
        .enumerate()
        .map(|(i, (sample, point))| AxisLabel {
            x: point.x,
            label: sample.label.clone(),
            visible: i % LABEL_STRIDE == 0 || i == count - 1,
        })
        .collect();

    Some(ChartGeometry {
        mode,
        height,
        range,
        points,
        gridlines: GRIDLINE_FRACTIONS.iter().map(|f| height * f).collect(),
        line_path,
        area_path,
        bars,
        labels,
    })
}
