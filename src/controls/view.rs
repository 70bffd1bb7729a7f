//! Dashboard views
//!
//! A view is one chart in a tab. Rendering a view runs one full pipeline
//! pass: selection → executor → renderer.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::controls::session::Tab;
use crate::dataset::StatMode;
use crate::query::{
    AggregatedRow, GroupKey, MapRegion, QueryExecutor, Selection, TrendPoint, YearFilter,
};
use crate::render::{BarFill, ChartLabels, ChartRenderer, Palette, RenderArtifact};

/// One chart of the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    CountryTrend,
    DiseaseTrend,
    CountryRanking,
    DiseaseRanking,
    Map,
}

impl View {
    pub fn all() -> &'static [View] {
        &[
            View::CountryTrend,
            View::DiseaseTrend,
            View::CountryRanking,
            View::DiseaseRanking,
            View::Map,
        ]
    }

    /// Views shown in a tab
    pub fn for_tab(tab: Tab) -> &'static [View] {
        match tab {
            Tab::Trend => &[View::CountryTrend, View::DiseaseTrend],
            Tab::Snapshot => &[View::CountryRanking, View::DiseaseRanking, View::Map],
        }
    }

    pub fn tab(&self) -> Tab {
        match self {
            View::CountryTrend | View::DiseaseTrend => Tab::Trend,
            View::CountryRanking | View::DiseaseRanking | View::Map => Tab::Snapshot,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            View::CountryTrend => "country_trend",
            View::DiseaseTrend => "disease_trend",
            View::CountryRanking => "country_ranking",
            View::DiseaseRanking => "disease_ranking",
            View::Map => "map",
        }
    }

    fn group_key(&self) -> GroupKey {
        match self {
            View::CountryTrend | View::CountryRanking | View::Map => GroupKey::Country,
            View::DiseaseTrend | View::DiseaseRanking => GroupKey::Disease,
        }
    }

    /// Chart text for a pass over `year_filter`
    pub fn labels(&self, mode: StatMode, year_filter: YearFilter) -> ChartLabels {
        let key = self.group_key();
        let (title, metric) = match self {
            View::CountryTrend | View::DiseaseTrend => (
                format!("Child deaths by {}, {}", key.label().to_lowercase(), year_filter),
                mode.axis_label(),
            ),
            View::CountryRanking => (
                format!("Top countries, {}", year_filter),
                mode.axis_label(),
            ),
            View::DiseaseRanking => (
                format!("Top diseases, {}", year_filter),
                mode.axis_label(),
            ),
            View::Map => (
                format!("Child deaths in Africa, {}", year_filter),
                mode.legend_label(),
            ),
        };
        ChartLabels {
            title,
            metric: metric.to_string(),
            key: key.label().to_string(),
            precision: mode.precision(),
            palette: match self {
                View::DiseaseTrend => Palette::Cividis,
                _ => Palette::Categorical,
            },
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Data behind a rendered view
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum ViewData {
    Trend(Vec<TrendPoint>),
    Ranking(Vec<AggregatedRow>),
    Map(Vec<MapRegion>),
}

impl ViewData {
    pub fn len(&self) -> usize {
        match self {
            ViewData::Trend(points) => points.len(),
            ViewData::Ranking(rows) => rows.len(),
            ViewData::Map(regions) => regions.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A view after one pipeline pass
#[derive(Debug, Clone, Serialize)]
pub struct RenderedView {
    pub tab: Tab,
    pub view: View,
    pub artifact: RenderArtifact,
    pub data: ViewData,
    pub year_filter: YearFilter,
    pub rows_matched: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<String>,
}

/// Run the pipeline for `view` and render the result
pub fn render_view(
    view: View,
    selection: &Selection,
    executor: &QueryExecutor,
    renderer: &dyn ChartRenderer,
) -> RenderedView {
    let mode = selection.stat_mode;
    let (artifact, data, year_filter, rows_matched, diagnostic) = match view {
        View::CountryTrend | View::DiseaseTrend => {
            let output = executor.trend(selection, view.group_key());
            let labels = view.labels(mode, output.year_filter);
            (
                renderer.line_chart(&output.data, &labels),
                ViewData::Trend(output.data.points),
                output.year_filter,
                output.rows_matched,
                output.diagnostic,
            )
        }
        View::CountryRanking | View::DiseaseRanking => {
            let output = executor.ranking(selection, view.group_key());
            let labels = view.labels(mode, output.year_filter);
            let fill = match view {
                View::CountryRanking => BarFill::Scaled,
                _ => BarFill::Uniform,
            };
            (
                renderer.bar_chart(&output.data, &labels, fill),
                ViewData::Ranking(output.data.rows),
                output.year_filter,
                output.rows_matched,
                output.diagnostic,
            )
        }
        View::Map => {
            let output = executor.map(selection);
            let labels = view.labels(mode, output.year_filter);
            (
                renderer.choropleth(&output.data, &labels),
                ViewData::Map(output.data.regions),
                output.year_filter,
                output.rows_matched,
                output.diagnostic,
            )
        }
    };

    tracing::debug!(
        view = %view,
        rows_matched,
        placeholder = artifact.is_placeholder(),
        "View rendered"
    );

    RenderedView {
        tab: view.tab(),
        view,
        artifact,
        data,
        year_filter,
        rows_matched,
        diagnostic,
    }
}
