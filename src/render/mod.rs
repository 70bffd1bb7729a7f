//! Render Adapters
//!
//! Turn aggregated tables into artifacts the browser can display. The
//! pipeline only depends on the `ChartRenderer` trait; `SvgRenderer` is the
//! bundled implementation:
//!
//! - line and bar charts as standalone SVG markup
//! - the choropleth as a figure description (locations, values, colours)
//!   for a client-side map library that owns the geometry
//!
//! Empty inputs always produce `RenderArtifact::Placeholder`.

mod choropleth;
mod color;
mod svg;

pub use choropleth::choropleth_figure;
pub use color::{plasma, sequential, Palette, Rgb};
pub use svg::SvgRenderer;

use serde::Serialize;

use crate::query::{Aggregation, MapData, TrendSeries};

/// Message shown when a selection leaves nothing to draw
pub const PLACEHOLDER_MESSAGE: &str = "No data for the current selection";

/// Something the client can display
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RenderArtifact {
    /// Standalone SVG document
    Svg { markup: String },
    /// JSON figure description
    Figure { figure: serde_json::Value },
    /// Nothing to draw
    Placeholder { message: String },
}

impl RenderArtifact {
    pub fn placeholder() -> Self {
        RenderArtifact::Placeholder {
            message: PLACEHOLDER_MESSAGE.to_string(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, RenderArtifact::Placeholder { .. })
    }

    /// SVG markup, if this is an SVG artifact
    pub fn svg(&self) -> Option<&str> {
        match self {
            RenderArtifact::Svg { markup } => Some(markup),
            _ => None,
        }
    }
}

/// Text around a chart
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChartLabels {
    pub title: String,
    /// Metric axis / colour bar title
    pub metric: String,
    /// Legend title for the group key
    pub key: String,
    /// Decimal places for values
    pub precision: usize,
    pub palette: Palette,
}

/// How bars are filled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarFill {
    /// Colour each bar by its metric on the sequential scale
    Scaled,
    /// One neutral colour for every bar
    Uniform,
}

/// A chart backend
pub trait ChartRenderer: Send + Sync {
    /// Backend name, reported by health checks
    fn name(&self) -> &str;

    /// One line per key across years
    fn line_chart(&self, series: &TrendSeries, labels: &ChartLabels) -> RenderArtifact;

    /// Horizontal bars in rank order
    fn bar_chart(&self, ranking: &Aggregation, labels: &ChartLabels, fill: BarFill)
        -> RenderArtifact;

    /// Regions coloured by metric
    fn choropleth(&self, map: &MapData, labels: &ChartLabels) -> RenderArtifact;
}
