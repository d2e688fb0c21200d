//! SVG rendering of a [`GraphMatrix`].
//!
//! [`layout`] is pure geometry so it can be tested without a DOM; [`GraphChart`]
//! only turns the result into elements.

use dioxus::prelude::*;

use crate::core::format::format_value;

use super::graph::{ChartKind, GraphMatrix, PointStyle};

const PAD_LEFT: f64 = 56.0;
const PAD_RIGHT: f64 = 16.0;
const PAD_TOP: f64 = 16.0;
const PAD_BOTTOM: f64 = 40.0;
const Y_TICKS: usize = 5;
/// Share of a date slot covered by the bars of that date.
const BAR_GROUP_WIDTH: f64 = 0.7;
const MARKER_RADIUS: f64 = 3.5;

#[derive(Debug, Clone, PartialEq)]
pub struct LineShape {
    pub label: String,
    pub color: String,
    /// SVG path; a missing value starts a new segment.
    pub path: String,
    pub points: Vec<(f64, f64)>,
    pub markers: Vec<Marker>,
}

/// One point marker as an SVG path.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub d: String,
    pub filled: bool,
}

/// Marker of `style` centred on `(x, y)`.
pub fn marker(style: PointStyle, x: f64, y: f64, r: f64) -> Marker {
    let d = match style {
        PointStyle::Circle => format!(
            "M{:.1},{y:.1} a{r:.1},{r:.1} 0 1,0 {:.1},0 a{r:.1},{r:.1} 0 1,0 {:.1},0",
            x - r,
            2.0 * r,
            -2.0 * r
        ),
        PointStyle::Rect => format!(
            "M{:.1},{:.1} h{:.1} v{:.1} h{:.1} Z",
            x - r,
            y - r,
            2.0 * r,
            2.0 * r,
            -2.0 * r
        ),
        PointStyle::RectRot => format!(
            "M{x:.1},{:.1} L{:.1},{y:.1} L{x:.1},{:.1} L{:.1},{y:.1} Z",
            y - r,
            x + r,
            y + r,
            x - r
        ),
        PointStyle::Triangle => format!(
            "M{x:.1},{:.1} L{:.1},{:.1} L{:.1},{:.1} Z",
            y - r,
            x + r,
            y + r,
            x - r,
            y + r
        ),
        PointStyle::Cross => cross(x, y, r),
        PointStyle::CrossRot => cross_rot(x, y, r),
        PointStyle::Star => format!("{} {}", cross(x, y, r), cross_rot(x, y, r)),
        PointStyle::Line => format!("M{:.1},{y:.1} H{:.1}", x - r, x + r),
        PointStyle::Dash => format!("M{x:.1},{y:.1} H{:.1}", x + r),
    };
    Marker {
        d,
        filled: !style.is_stroked(),
    }
}

fn cross(x: f64, y: f64, r: f64) -> String {
    format!(
        "M{:.1},{y:.1} H{:.1} M{x:.1},{:.1} V{:.1}",
        x - r,
        x + r,
        y - r,
        y + r
    )
}

fn cross_rot(x: f64, y: f64, r: f64) -> String {
    let d = r * std::f64::consts::FRAC_1_SQRT_2;
    format!(
        "M{:.1},{:.1} L{:.1},{:.1} M{:.1},{:.1} L{:.1},{:.1}",
        x - d,
        y - d,
        x + d,
        y + d,
        x + d,
        y - d,
        x - d,
        y + d
    )
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarShape {
    pub label: String,
    pub color: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartLayout {
    pub width: f64,
    pub height: f64,
    pub baseline: f64,
    pub y_ticks: Vec<(f64, String)>,
    pub x_labels: Vec<(f64, String)>,
    pub lines: Vec<LineShape>,
    pub bars: Vec<BarShape>,
}

pub fn layout(matrix: &GraphMatrix, width: f64, height: f64) -> ChartLayout {
    let plot_w = (width - PAD_LEFT - PAD_RIGHT).max(1.0);
    let plot_h = (height - PAD_TOP - PAD_BOTTOM).max(1.0);

    let y_min = matrix.y_min();
    let mut y_max = matrix.y_max();
    if y_max <= y_min {
        y_max = y_min + 1.0;
    }
    let to_y = |value: f64| PAD_TOP + plot_h * (1.0 - (value - y_min) / (y_max - y_min));

    let slots = matrix.dates.len().max(1) as f64;
    let slot_w = plot_w / slots;
    let to_x = |index: usize| PAD_LEFT + slot_w * (index as f64 + 0.5);

    let y_ticks = (0..=Y_TICKS)
        .map(|step| {
            let value = y_min + (y_max - y_min) * step as f64 / Y_TICKS as f64;
            (to_y(value), format_value(value))
        })
        .collect();

    let x_labels = matrix
        .dates
        .iter()
        .enumerate()
        .map(|(index, date)| (to_x(index), date.label()))
        .collect();

    let baseline = to_y(0.0);
    let lines = matrix
        .series
        .iter()
        .filter(|series| series.kind == ChartKind::Line)
        .map(|series| {
            let mut path = String::new();
            let mut points = Vec::new();
            let mut pen_down = false;
            for (index, value) in series.data.iter().enumerate() {
                match value {
                    Some(value) => {
                        let (x, y) = (to_x(index), to_y(*value));
                        let command = if pen_down { 'L' } else { 'M' };
                        path.push_str(&format!("{command}{x:.1},{y:.1} "));
                        points.push((x, y));
                        pen_down = true;
                    }
                    None => pen_down = false,
                }
            }
            let markers = points
                .iter()
                .map(|&(x, y)| marker(series.point_style, x, y, MARKER_RADIUS))
                .collect();
            LineShape {
                label: series.label.clone(),
                color: series.color.clone(),
                path: path.trim_end().to_string(),
                points,
                markers,
            }
        })
        .collect();

    let bar_series: Vec<_> = matrix
        .series
        .iter()
        .filter(|series| series.kind == ChartKind::Bar)
        .collect();
    let bar_w = if bar_series.is_empty() {
        0.0
    } else {
        slot_w * BAR_GROUP_WIDTH / bar_series.len() as f64
    };
    let mut bars = Vec::new();
    for (position, series) in bar_series.iter().enumerate() {
        for (index, value) in series.data.iter().enumerate() {
            let Some(value) = value else { continue };
            let left = to_x(index) - slot_w * BAR_GROUP_WIDTH / 2.0 + bar_w * position as f64;
            let top = to_y(*value).min(baseline);
            bars.push(BarShape {
                label: series.label.clone(),
                color: series.color.clone(),
                x: left,
                y: top,
                width: bar_w,
                height: (to_y(*value) - baseline).abs(),
            });
        }
    }

    ChartLayout {
        width,
        height,
        baseline,
        y_ticks,
        x_labels,
        lines,
        bars,
    }
}

#[component]
pub fn GraphChart(matrix: GraphMatrix) -> Element {
    let chart = layout(&matrix, 960.0, 420.0);
    let view_box = format!("0 0 {} {}", chart.width, chart.height);
    let right = chart.width - PAD_RIGHT;
    let tick_x = PAD_LEFT - 6.0;
    let label_y = chart.height - PAD_BOTTOM + 18.0;
    let baseline = chart.baseline;

    rsx! {
        svg {
            class: "graph-chart",
            view_box: "{view_box}",
            preserve_aspect_ratio: "xMidYMid meet",
            role: "img",
            for (y, label) in chart.y_ticks.iter().cloned() {
                line { class: "graph-chart__grid", x1: "{PAD_LEFT}", x2: "{right}", y1: "{y}", y2: "{y}" }
                text { class: "graph-chart__tick", x: "{tick_x}", y: "{y}", text_anchor: "end", "{label}" }
            }
            for (x, label) in chart.x_labels.iter().cloned() {
                text {
                    class: "graph-chart__tick",
                    x: "{x}",
                    y: "{label_y}",
                    text_anchor: "middle",
                    "{label}"
                }
            }
            line { class: "graph-chart__axis", x1: "{PAD_LEFT}", x2: "{right}", y1: "{baseline}", y2: "{baseline}" }
            for bar in chart.bars.iter().cloned() {
                rect {
                    x: "{bar.x}",
                    y: "{bar.y}",
                    width: "{bar.width}",
                    height: "{bar.height}",
                    fill: "{bar.color}",
                    title { "{bar.label}" }
                }
            }
            for series in chart.lines.iter().cloned() {
                g {
                    path { d: "{series.path}", fill: "none", stroke: "{series.color}", stroke_width: "2" }
                    for marker in series.markers.iter() {
                        path {
                            d: "{marker.d}",
                            fill: if marker.filled { series.color.as_str() } else { "none" },
                            stroke: "{series.color}",
                            stroke_width: "1.5",
                        }
                    }
                    title { "{series.label}" }
                }
            }
        }
        ul { class: "graph-legend",
            for series in matrix.series.iter() {
                li { key: "{series.id}",
                    span { class: "graph-legend__swatch", style: "background:{series.color}" }
                    "{series.label}"
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statistics::dates::SampleDate;
    use crate::statistics::graph::GraphSeries;
    use time::macros::date;

    fn matrix(kind: ChartKind, data: Vec<Option<f64>>) -> GraphMatrix {
        GraphMatrix {
            dates: vec![
                SampleDate::new(date!(2024 - 01 - 01)),
                SampleDate::new(date!(2024 - 02 - 01)),
                SampleDate::new(date!(2024 - 03 - 01)),
            ],
            series: vec![GraphSeries {
                id: "members".into(),
                label: "Members".into(),
                kind,
                color: "#318ce7".into(),
                point_style: PointStyle::Circle,
                data,
            }],
        }
    }

    #[test]
    fn gaps_split_the_line() {
        let chart = layout(&matrix(ChartKind::Line, vec![Some(10.0), None, Some(12.0)]), 400.0, 200.0);
        let line = &chart.lines[0];
        assert_eq!(line.points.len(), 2);
        assert_eq!(line.path.matches('M').count(), 2);
        assert!(!line.path.contains('L'));
    }

    #[test]
    fn baseline_sits_at_the_bottom_for_positive_data() {
        let chart = layout(&matrix(ChartKind::Line, vec![Some(10.0), Some(20.0), None]), 400.0, 200.0);
        assert!((chart.baseline - (200.0 - PAD_BOTTOM)).abs() < 1e-9);
        assert_eq!(chart.y_ticks.first().map(|t| t.1.as_str()), Some("0"));
        assert_eq!(chart.y_ticks.last().map(|t| t.1.as_str()), Some("20"));
    }

    #[test]
    fn negative_bars_hang_below_the_baseline() {
        let chart = layout(&matrix(ChartKind::Bar, vec![Some(4.0), Some(-4.0), None]), 400.0, 200.0);
        assert_eq!(chart.bars.len(), 2);
        let (up, down) = (&chart.bars[0], &chart.bars[1]);
        assert!((up.y + up.height - chart.baseline).abs() < 1e-9);
        assert!((down.y - chart.baseline).abs() < 1e-9);
        assert!((up.height - down.height).abs() < 1e-9);
        assert!(chart.lines.is_empty());
    }

    #[test]
    fn markers_follow_the_series_point_style() {
        let mut m = matrix(ChartKind::Line, vec![Some(10.0), None, Some(12.0)]);
        m.series[0].point_style = PointStyle::CrossRot;
        let chart = layout(&m, 400.0, 200.0);
        let markers = &chart.lines[0].markers;
        assert_eq!(markers.len(), 2);
        assert!(markers.iter().all(|m| !m.filled));
        assert_eq!(markers[0].d.matches('M').count(), 2);

        let dot = marker(PointStyle::Circle, 10.0, 20.0, 2.0);
        assert!(dot.filled);
        assert_eq!(dot.d, "M8.0,20.0 a2.0,2.0 0 1,0 4.0,0 a2.0,2.0 0 1,0 -4.0,0");
        assert_eq!(
            marker(PointStyle::Rect, 10.0, 20.0, 2.0).d,
            "M8.0,18.0 h4.0 v4.0 h-4.0 Z"
        );
        assert_eq!(
            marker(PointStyle::Star, 0.0, 0.0, 1.0).d.matches('M').count(),
            4
        );
    }

    #[test]
    fn empty_matrix_still_lays_out() {
        let chart = layout(&GraphMatrix::default(), 400.0, 200.0);
        assert!(chart.lines.is_empty() && chart.bars.is_empty());
        assert_eq!(chart.y_ticks.len(), Y_TICKS + 1);
    }
}
