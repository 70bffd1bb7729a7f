//! SVG chart renderer
//!
//! Draws the trend and ranking charts with plotters into in-memory SVG
//! documents and delegates the map to the choropleth figure builder.

use std::error::Error;

use plotters::coord::Shift;
use plotters::prelude::*;

use super::choropleth::choropleth_figure;
use super::color::{sequential, Rgb};
use super::{BarFill, ChartLabels, ChartRenderer, RenderArtifact};
use crate::query::{AggregatedRow, Aggregation, ColorDomain, MapData, TrendSeries};

type DrawResult = Result<(), Box<dyn Error>>;

const FONT: &str = "sans-serif";

/// Chart renderer producing SVG markup
#[derive(Debug, Clone)]
pub struct SvgRenderer {
    line_size: (u32, u32),
    bar_size: (u32, u32),
    map_size: (u32, u32),
}

impl Default for SvgRenderer {
    fn default() -> Self {
        Self {
            line_size: (700, 300),
            bar_size: (400, 300),
            map_size: (700, 800),
        }
    }
}

impl SvgRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the line chart size in pixels
    pub fn with_line_size(mut self, width: u32, height: u32) -> Self {
        self.line_size = (width, height);
        self
    }

    /// Set the bar chart size in pixels
    pub fn with_bar_size(mut self, width: u32, height: u32) -> Self {
        self.bar_size = (width, height);
        self
    }

    /// Set the map size passed through to the figure layout
    pub fn with_map_size(mut self, width: u32, height: u32) -> Self {
        self.map_size = (width, height);
        self
    }
}

impl ChartRenderer for SvgRenderer {
    fn name(&self) -> &str {
        "svg"
    }

    fn line_chart(&self, series: &TrendSeries, labels: &ChartLabels) -> RenderArtifact {
        let (Some(domain), Some(span)) = (series.domain, series.year_span()) else {
            return RenderArtifact::placeholder();
        };
        finish(
            "line",
            render_svg(self.line_size, |root| {
                draw_lines(root, series, labels, domain, span)
            }),
        )
    }

    fn bar_chart(
        &self,
        ranking: &Aggregation,
        labels: &ChartLabels,
        fill: BarFill,
    ) -> RenderArtifact {
        if ranking.is_empty() {
            return RenderArtifact::placeholder();
        }
        finish(
            "bar",
            render_svg(self.bar_size, |root| {
                draw_bars(root, ranking, labels, fill)
            }),
        )
    }

    fn choropleth(&self, map: &MapData, labels: &ChartLabels) -> RenderArtifact {
        match choropleth_figure(map, labels, self.map_size) {
            Some(figure) => RenderArtifact::Figure { figure },
            None => RenderArtifact::placeholder(),
        }
    }
}

fn finish(chart: &str, result: Result<String, Box<dyn Error>>) -> RenderArtifact {
    match result {
        Ok(markup) => RenderArtifact::Svg { markup },
        Err(e) => {
            tracing::warn!(chart, error = %e, "Chart drawing failed");
            RenderArtifact::placeholder()
        }
    }
}

/// Run `draw` on a white canvas and return the finished document
fn render_svg<F>(size: (u32, u32), draw: F) -> Result<String, Box<dyn Error>>
where
    F: FnOnce(&DrawingArea<SVGBackend<'_>, Shift>) -> DrawResult,
{
    let mut markup = String::new();
    {
        let root = SVGBackend::with_string(&mut markup, size).into_drawing_area();
        root.fill(&WHITE)?;
        draw(&root)?;
        root.present()?;
    }
    Ok(markup)
}

fn plot_color(color: Rgb) -> RGBColor {
    RGBColor(color.0, color.1, color.2)
}

/// Headroom above the largest value so the top point is not clipped
fn axis_max(max: f64) -> f64 {
    if max.is_finite() && max > 0.0 {
        max * 1.1
    } else {
        1.0
    }
}

fn draw_lines(
    root: &DrawingArea<SVGBackend<'_>, Shift>,
    series: &TrendSeries,
    labels: &ChartLabels,
    domain: ColorDomain,
    (first_year, last_year): (i32, i32),
) -> DrawResult {
    // A single year still needs a non-empty axis
    let years = if first_year == last_year {
        first_year - 1..last_year + 1
    } else {
        first_year..last_year
    };
    let year_labels = usize::try_from(years.end - years.start)
        .unwrap_or(0)
        .saturating_add(1)
        .min(12);
    let precision = labels.precision;

    let mut chart = ChartBuilder::on(root)
        .caption(&labels.title, (FONT, 16))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(years, 0f64..axis_max(domain.max))?;

    chart
        .configure_mesh()
        .x_desc("Year")
        .y_desc(labels.metric.as_str())
        .x_labels(year_labels)
        .y_label_formatter(&|v| format!("{:.*}", precision, v))
        .draw()?;

    for (index, key) in series.keys().into_iter().enumerate() {
        let color = plot_color(labels.palette.color(index));
        let points: Vec<(i32, f64)> = series.series(key).map(|p| (p.year, p.metric)).collect();

        chart
            .draw_series(LineSeries::new(points.iter().copied(), color.stroke_width(2)))?
            .label(key)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 16, y)], color.stroke_width(2)));
        chart.draw_series(
            points
                .iter()
                .map(|&point| Circle::new(point, 3, color.filled())),
        )?;
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .label_font((FONT, 12))
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;
    Ok(())
}

fn draw_bars(
    root: &DrawingArea<SVGBackend<'_>, Shift>,
    ranking: &Aggregation,
    labels: &ChartLabels,
    fill: BarFill,
) -> DrawResult {
    let rows = ranking.rows.as_slice();
    let slots = rows.len() as f64;
    let max = rows.iter().map(|r| r.metric).fold(0.0, f64::max);
    let precision = labels.precision;

    let mut chart = ChartBuilder::on(root)
        .caption(&labels.title, (FONT, 16))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(110)
        .build_cartesian_2d(0f64..axis_max(max), -0.5f64..slots - 0.5)?;

    chart
        .configure_mesh()
        .disable_y_mesh()
        .x_desc(labels.metric.as_str())
        .y_labels(rows.len())
        .x_label_formatter(&|v| format!("{:.*}", precision, v))
        .y_label_formatter(&|y| row_at(rows, *y).map(|r| r.key.clone()).unwrap_or_default())
        .draw()?;

    chart.draw_series(rows.iter().enumerate().map(|(index, row)| {
        let color = match (fill, ranking.domain) {
            (BarFill::Scaled, Some(domain)) => sequential(&domain, row.metric),
            _ => Rgb::GREY,
        };
        let center = slot_of(rows.len(), index);
        Rectangle::new(
            [(0.0, center - 0.4), (row.metric.max(0.0), center + 0.4)],
            plot_color(color).filled(),
        )
    }))?;
    Ok(())
}

/// Vertical slot of the `index`-th row, rank 1 on top
fn slot_of(len: usize, index: usize) -> f64 {
    (len - 1 - index) as f64
}

/// Row drawn at axis position `y`, if it sits on a slot centre
fn row_at(rows: &[AggregatedRow], y: f64) -> Option<&AggregatedRow> {
    let slot = y.round();
    if (y - slot).abs() > 1e-6 || slot < 0.0 {
        return None;
    }
    let from_top = rows.len().checked_sub(1)?.checked_sub(slot as usize)?;
    rows.get(from_top)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::TrendPoint;
    use crate::render::Palette;

    fn labels() -> ChartLabels {
        ChartLabels {
            title: "Deaths by country".to_string(),
            metric: "Number of deaths".to_string(),
            key: "Country".to_string(),
            precision: 0,
            palette: Palette::Categorical,
        }
    }

    fn ranking() -> Aggregation {
        Aggregation {
            rows: vec![
                AggregatedRow {
                    key: "Nigeria".to_string(),
                    metric: 80.0,
                    rank: 1,
                },
                AggregatedRow {
                    key: "Chad".to_string(),
                    metric: 20.0,
                    rank: 2,
                },
            ],
            domain: Some(ColorDomain { min: 20.0, max: 80.0 }),
            group_count: 2,
        }
    }

    fn point(key: &str, year: i32, metric: f64) -> TrendPoint {
        TrendPoint {
            key: key.to_string(),
            year,
            metric,
        }
    }

    #[test]
    fn test_bar_chart_colours_by_metric() {
        let artifact = SvgRenderer::new().bar_chart(&ranking(), &labels(), BarFill::Scaled);
        let svg = artifact.svg().unwrap();

        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("Deaths by country"));
        assert!(svg.contains("Nigeria"));
        assert!(svg.contains("Chad"));
        // Largest bar takes the top of the scale, smallest the bottom
        let upper = svg.to_uppercase();
        assert!(upper.contains("#F0F921"));
        assert!(upper.contains("#0D0887"));
    }

    #[test]
    fn test_uniform_bars_are_grey() {
        let artifact = SvgRenderer::new().bar_chart(&ranking(), &labels(), BarFill::Uniform);
        let upper = artifact.svg().unwrap().to_uppercase();
        assert!(upper.contains("#808080"));
        assert!(!upper.contains("#F0F921"));
    }

    #[test]
    fn test_line_chart_series_and_legend() {
        let series = TrendSeries {
            points: vec![
                point("Chad", 2000, 10.0),
                point("Chad", 2001, 12.0),
                point("Niger", 2000, 30.0),
                point("Niger", 2001, 25.0),
            ],
            domain: Some(ColorDomain { min: 10.0, max: 30.0 }),
        };
        let artifact = SvgRenderer::new().line_chart(&series, &labels());
        let svg = artifact.svg().unwrap();

        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert!(svg.contains("Chad"));
        assert!(svg.contains("Niger"));
        assert!(svg.contains("Year"));
        let upper = svg.to_uppercase();
        assert!(upper.contains(&Palette::Categorical.color(0).hex().to_uppercase()));
        assert!(upper.contains(&Palette::Categorical.color(1).hex().to_uppercase()));
    }

    #[test]
    fn test_single_year_line_chart_draws() {
        let series = TrendSeries {
            points: vec![point("Chad", 2005, 10.0)],
            domain: Some(ColorDomain { min: 10.0, max: 10.0 }),
        };
        let artifact = SvgRenderer::new().line_chart(&series, &labels());
        assert!(artifact.svg().is_some());
    }

    #[test]
    fn test_empty_inputs_render_placeholder() {
        let renderer = SvgRenderer::new();
        assert!(renderer
            .line_chart(&TrendSeries::default(), &labels())
            .is_placeholder());
        assert!(renderer
            .bar_chart(&Aggregation::default(), &labels(), BarFill::Scaled)
            .is_placeholder());
        assert!(renderer
            .choropleth(&MapData::default(), &labels())
            .is_placeholder());
    }

    #[test]
    fn test_rank_one_sits_on_top_slot() {
        let rows = ranking().rows;
        assert_eq!(slot_of(rows.len(), 0), 1.0);
        assert_eq!(row_at(&rows, 1.0).unwrap().key, "Nigeria");
        assert_eq!(row_at(&rows, 0.0).unwrap().key, "Chad");
        assert!(row_at(&rows, 0.5).is_none());
        assert!(row_at(&rows, 2.0).is_none());
        assert!(row_at(&rows, -1.0).is_none());
    }
}
