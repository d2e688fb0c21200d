//! Projection of the point cache into chart-ready series.

use api::Dataset;

use super::cache::{CacheKey, CellState, EnabledDatasets, PointCache, Variant};
use super::dates::SampleDate;

const FALLBACK_COLOR: &str = "#6c757d";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Line,
    Bar,
}

/// Marker drawn at each point of a line series. Names follow the
/// `point_style` values the server assigns to datasets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointStyle {
    #[default]
    Circle,
    Cross,
    CrossRot,
    Dash,
    Line,
    Rect,
    RectRot,
    Star,
    Triangle,
}

impl PointStyle {
    /// Unknown names fall back to a circle.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "cross" => Self::Cross,
            "crossRot" => Self::CrossRot,
            "dash" => Self::Dash,
            "line" => Self::Line,
            "rect" | "rectRounded" => Self::Rect,
            "rectRot" => Self::RectRot,
            "star" => Self::Star,
            "triangle" => Self::Triangle,
            _ => Self::Circle,
        }
    }

    /// Outline-only styles have no area to fill.
    pub fn is_stroked(self) -> bool {
        matches!(
            self,
            Self::Cross | Self::CrossRot | Self::Dash | Self::Line | Self::Star
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GraphSeries {
    /// `<dataset>` or `<dataset>_relative`; also the export column header.
    pub id: String,
    pub label: String,
    pub kind: ChartKind,
    pub color: String,
    pub point_style: PointStyle,
    /// One entry per sample date; `None` for missing or not-yet-fetched values.
    pub data: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct GraphMatrix {
    pub dates: Vec<SampleDate>,
    pub series: Vec<GraphSeries>,
}

impl GraphMatrix {
    pub fn labels(&self) -> Vec<String> {
        self.dates.iter().map(|date| date.label()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty() || self.dates.is_empty()
    }

    fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.series
            .iter()
            .flat_map(|series| series.data.iter().flatten().copied())
    }

    /// Lower bound of the y axis: zero unless a relative series dips below it.
    pub fn y_min(&self) -> f64 {
        self.values().fold(0.0, f64::min)
    }

    pub fn y_max(&self) -> f64 {
        self.values().fold(0.0, f64::max)
    }
}

/// Builds the matrix for the currently enabled datasets. Absolute series come
/// first, then relative ones, each in the order they were enabled.
pub fn project(
    cache: &PointCache,
    enabled: &EnabledDatasets,
    dates: &[SampleDate],
    datasets: &[Dataset],
) -> GraphMatrix {
    let series = enabled
        .keys()
        .into_iter()
        .map(|key| build_series(cache, &key, dates, datasets))
        .collect();

    GraphMatrix {
        dates: dates.to_vec(),
        series,
    }
}

fn build_series(
    cache: &PointCache,
    key: &CacheKey,
    dates: &[SampleDate],
    datasets: &[Dataset],
) -> GraphSeries {
    let meta = datasets.iter().find(|dataset| dataset.id == key.dataset);
    let name = meta
        .map(|dataset| dataset.display_name.clone())
        .unwrap_or_else(|| key.dataset.to_string());

    let (label, kind) = match key.variant {
        Variant::Absolute => (name, ChartKind::Line),
        Variant::Relative => (format!("{name} (relative)"), ChartKind::Bar),
    };

    let data = dates
        .iter()
        .map(|date| {
            cache
                .read(key, *date)
                .and_then(CellState::value)
        })
        .collect();

    GraphSeries {
        id: key.series_id(),
        label,
        kind,
        color: meta
            .map(|dataset| dataset.color.clone())
            .unwrap_or_else(|| FALLBACK_COLOR.to_string()),
        point_style: meta
            .map(|dataset| PointStyle::parse(&dataset.point_style))
            .unwrap_or_default(),
        data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use api::DatasetId;
    use time::macros::date;

    fn dataset(id: &str, name: &str) -> Dataset {
        Dataset {
            id: DatasetId::new(id),
            display_name: name.to_string(),
            description: String::new(),
            color: "#318ce7".to_string(),
            point_style: "crossRot".to_string(),
        }
    }

    fn dates() -> Vec<SampleDate> {
        vec![
            SampleDate::new(date!(2024 - 01 - 01)),
            SampleDate::new(date!(2024 - 02 - 01)),
            SampleDate::new(date!(2024 - 03 - 01)),
        ]
    }

    #[test]
    fn fetched_values_become_one_series() {
        let dates = dates();
        let key = CacheKey::absolute("members");
        let mut cache = PointCache::new();
        cache.ensure_keys_exist(&key, &dates);
        cache.write(&key, dates[0], Some(10.0));
        cache.write(&key, dates[1], Some(12.0));
        cache.write(&key, dates[2], None);

        let mut enabled = EnabledDatasets::new();
        enabled.set(Variant::Absolute, "members".into(), true);

        let matrix = project(&cache, &enabled, &dates, &[dataset("members", "Members")]);
        assert_eq!(matrix.series.len(), 1);
        assert_eq!(matrix.series[0].data, vec![Some(10.0), Some(12.0), None]);
        assert_eq!(matrix.series[0].label, "Members");
        assert_eq!(matrix.series[0].kind, ChartKind::Line);
        assert_eq!(matrix.labels(), vec!["01.01.2024", "01.02.2024", "01.03.2024"]);
    }

    #[test]
    fn relative_series_follow_absolute_ones() {
        let dates = dates();
        let mut enabled = EnabledDatasets::new();
        enabled.set(Variant::Relative, "frozen".into(), true);
        enabled.set(Variant::Absolute, "members".into(), true);

        let datasets = [dataset("members", "Members"), dataset("frozen", "Frozen members")];
        let matrix = project(&PointCache::new(), &enabled, &dates, &datasets);

        let labels: Vec<&str> = matrix.series.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["Members", "Frozen members (relative)"]);
        assert_eq!(matrix.series[1].id, "frozen_relative");
        assert_eq!(matrix.series[1].kind, ChartKind::Bar);
        assert!(matrix.series[1].data.iter().all(Option::is_none));
    }

    #[test]
    fn unknown_dataset_falls_back_to_its_id() {
        let mut enabled = EnabledDatasets::new();
        enabled.set(Variant::Absolute, "gone".into(), true);
        let matrix = project(&PointCache::new(), &enabled, &dates(), &[]);
        assert_eq!(matrix.series[0].label, "gone");
        assert_eq!(matrix.series[0].color, FALLBACK_COLOR);
        assert_eq!(matrix.series[0].point_style, PointStyle::Circle);
    }

    #[test]
    fn dataset_point_style_is_carried_over() {
        let mut enabled = EnabledDatasets::new();
        enabled.set(Variant::Absolute, "members".into(), true);
        let matrix = project(
            &PointCache::new(),
            &enabled,
            &dates(),
            &[dataset("members", "Members")],
        );
        assert_eq!(matrix.series[0].point_style, PointStyle::CrossRot);
        assert!(matrix.series[0].point_style.is_stroked());
        assert_eq!(PointStyle::parse("rectRounded"), PointStyle::Rect);
        assert_eq!(PointStyle::parse("bogus"), PointStyle::Circle);
    }

    #[test]
    fn y_min_is_clamped_to_zero() {
        let mut matrix = GraphMatrix {
            dates: dates(),
            series: vec![GraphSeries {
                id: "a".into(),
                label: "a".into(),
                kind: ChartKind::Line,
                color: FALLBACK_COLOR.into(),
                point_style: PointStyle::Circle,
                data: vec![Some(4.0), None, Some(9.0)],
            }],
        };
        assert_eq!(matrix.y_min(), 0.0);
        assert_eq!(matrix.y_max(), 9.0);

        matrix.series[0].data[1] = Some(-3.0);
        assert_eq!(matrix.y_min(), -3.0);
    }
}
