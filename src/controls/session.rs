//! Dashboard session
//!
//! Widget state for the two tabs of one client. Each tab owns its own
//! country selector; a change in one tab never touches the other. Applying
//! a change returns the views whose inputs it affected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::config::DashboardConfig;
use crate::controls::error::{ControlError, ControlResult};
use crate::controls::selector::{CountrySelector, SelectorEvent, SelectorState};
use crate::controls::view::{render_view, RenderedView, View};
use crate::dataset::{Disease, StatMode};
use crate::query::{QueryExecutor, Selection};
use crate::render::ChartRenderer;

/// Dashboard tab
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tab {
    /// Year-range line charts
    Trend,
    /// Single-year bar charts and map
    Snapshot,
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tab::Trend => f.write_str("trend"),
            Tab::Snapshot => f.write_str("snapshot"),
        }
    }
}

/// A new value for one widget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "control", content = "value", rename_all = "snake_case")]
pub enum WidgetChange {
    StatMode(StatMode),
    YearRange(i32, i32),
    Year(i32),
    Countries(Vec<String>),
    SelectAll(bool),
    DeselectAll(bool),
    Diseases(Vec<Disease>),
    TopN(usize),
}

impl WidgetChange {
    pub fn name(&self) -> &'static str {
        match self {
            WidgetChange::StatMode(_) => "stat_mode",
            WidgetChange::YearRange(..) => "year_range",
            WidgetChange::Year(_) => "year",
            WidgetChange::Countries(_) => "countries",
            WidgetChange::SelectAll(_) => "select_all",
            WidgetChange::DeselectAll(_) => "deselect_all",
            WidgetChange::Diseases(_) => "diseases",
            WidgetChange::TopN(_) => "top_n",
        }
    }

    /// Whether the client needs the reconciled country widgets echoed back
    pub fn echoes_controls(&self) -> bool {
        matches!(
            self,
            WidgetChange::SelectAll(true) | WidgetChange::DeselectAll(true)
        )
    }
}

/// Widgets of the trend tab
#[derive(Debug, Clone)]
pub struct TrendTab {
    pub stat_mode: StatMode,
    pub year_range: (i32, i32),
    pub countries: CountrySelector,
    pub diseases: Vec<Disease>,
}

/// Widgets of the snapshot tab
#[derive(Debug, Clone)]
pub struct SnapshotTab {
    pub stat_mode: StatMode,
    pub year: i32,
    pub countries: CountrySelector,
    pub diseases: Vec<Disease>,
    pub top_n: usize,
}

/// Widget state of one client
#[derive(Debug, Clone)]
pub struct DashboardSession {
    config: DashboardConfig,
    universe: Arc<[String]>,
    trend: TrendTab,
    snapshot: SnapshotTab,
}

impl DashboardSession {
    /// Fresh session with every widget at its default
    pub fn new(universe: Arc<[String]>, config: DashboardConfig) -> Self {
        let trend = Self::default_trend(&universe, &config);
        let snapshot = Self::default_snapshot(&universe, &config);
        Self {
            config,
            universe,
            trend,
            snapshot,
        }
    }

    fn default_trend(universe: &Arc<[String]>, config: &DashboardConfig) -> TrendTab {
        let (lo, hi) = config.trend_year_range;
        TrendTab {
            stat_mode: StatMode::Absolute,
            year_range: (lo.min(hi), lo.max(hi)),
            countries: CountrySelector::new(universe.clone(), &config.default_countries),
            diseases: Disease::specific().to_vec(),
        }
    }

    fn default_snapshot(universe: &Arc<[String]>, config: &DashboardConfig) -> SnapshotTab {
        SnapshotTab {
            stat_mode: StatMode::Absolute,
            year: config.snapshot_year,
            countries: CountrySelector::new(universe.clone(), &config.default_countries),
            diseases: Disease::specific().to_vec(),
            top_n: config.top_n,
        }
    }

    /// Back to the defaults of a fresh load
    pub fn reset(&mut self) {
        self.trend = Self::default_trend(&self.universe, &self.config);
        self.snapshot = Self::default_snapshot(&self.universe, &self.config);
    }

    pub fn trend(&self) -> &TrendTab {
        &self.trend
    }

    pub fn snapshot(&self) -> &SnapshotTab {
        &self.snapshot
    }

    /// Country widgets of a tab
    pub fn controls(&self, tab: Tab) -> &SelectorState {
        match tab {
            Tab::Trend => self.trend.countries.state(),
            Tab::Snapshot => self.snapshot.countries.state(),
        }
    }

    /// Apply a widget change and return the views to recompute
    pub fn apply(&mut self, tab: Tab, change: WidgetChange) -> ControlResult<Vec<View>> {
        let unsupported = |change: &WidgetChange| ControlError::UnsupportedControl {
            tab: tab.to_string(),
            control: change.name().to_string(),
        };

        // Turning a toggle off leaves the selection as it was
        let affects_selection = !matches!(
            change,
            WidgetChange::SelectAll(false) | WidgetChange::DeselectAll(false)
        );

        match tab {
            Tab::Trend => {
                let t = &mut self.trend;
                match change {
                    WidgetChange::StatMode(mode) => t.stat_mode = mode,
                    WidgetChange::YearRange(a, b) => t.year_range = (a.min(b), a.max(b)),
                    WidgetChange::Diseases(list) => t.diseases = dedup(list),
                    WidgetChange::Countries(list) => {
                        t.countries.apply(SelectorEvent::Edit(list));
                    }
                    WidgetChange::SelectAll(on) => {
                        t.countries.apply(SelectorEvent::SelectAll(on));
                    }
                    WidgetChange::DeselectAll(on) => {
                        t.countries.apply(SelectorEvent::DeselectAll(on));
                    }
                    other @ (WidgetChange::Year(_) | WidgetChange::TopN(_)) => {
                        return Err(unsupported(&other))
                    }
                }
            }
            Tab::Snapshot => {
                let s = &mut self.snapshot;
                match change {
                    WidgetChange::StatMode(mode) => s.stat_mode = mode,
                    WidgetChange::Year(year) => s.year = year,
                    WidgetChange::Diseases(list) => s.diseases = dedup(list),
                    WidgetChange::Countries(list) => {
                        s.countries.apply(SelectorEvent::Edit(list));
                    }
                    WidgetChange::SelectAll(on) => {
                        s.countries.apply(SelectorEvent::SelectAll(on));
                    }
                    WidgetChange::DeselectAll(on) => {
                        s.countries.apply(SelectorEvent::DeselectAll(on));
                    }
                    WidgetChange::TopN(n) => {
                        if !self.config.allows_top_n(n) {
                            return Err(ControlError::TopNOutOfRange {
                                value: n,
                                min: self.config.top_n_min,
                                max: self.config.top_n_max,
                            });
                        }
                        s.top_n = n;
                        return Ok(vec![View::CountryRanking]);
                    }
                    other @ WidgetChange::YearRange(..) => return Err(unsupported(&other)),
                }
            }
        }

        if affects_selection {
            Ok(View::for_tab(tab).to_vec())
        } else {
            Ok(Vec::new())
        }
    }

    /// Current selection behind a view
    pub fn selection_for(&self, view: View) -> Selection {
        match view.tab() {
            Tab::Trend => {
                let t = &self.trend;
                Selection::years(t.year_range.0, t.year_range.1)
                    .countries(t.countries.selected_set())
                    .diseases(t.diseases.iter().copied())
                    .stat_mode(t.stat_mode)
                    .build()
            }
            Tab::Snapshot => {
                let s = &self.snapshot;
                let builder = Selection::year(s.year)
                    .countries(s.countries.selected_set())
                    .diseases(s.diseases.iter().copied())
                    .stat_mode(s.stat_mode);
                match view {
                    View::CountryRanking => builder.top_n(s.top_n).build(),
                    View::DiseaseRanking => builder.top_n(self.config.disease_top_n).build(),
                    _ => builder.build(),
                }
            }
        }
    }

    /// Render one view from the current state
    pub fn render(
        &self,
        view: View,
        executor: &QueryExecutor,
        renderer: &dyn ChartRenderer,
    ) -> RenderedView {
        render_view(view, &self.selection_for(view), executor, renderer)
    }

    /// Render several views in order
    pub fn render_all(
        &self,
        views: &[View],
        executor: &QueryExecutor,
        renderer: &dyn ChartRenderer,
    ) -> Vec<RenderedView> {
        views
            .iter()
            .map(|view| self.render(*view, executor, renderer))
            .collect()
    }
}

fn dedup(list: Vec<Disease>) -> Vec<Disease> {
    let mut out: Vec<Disease> = Vec::with_capacity(list.len());
    for disease in list {
        if !out.contains(&disease) {
            out.push(disease);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controls::view::ViewData;
    use crate::dataset::{DatasetStore, DeathRecord, IsoLookup};
    use crate::render::SvgRenderer;

    fn universe() -> Arc<[String]> {
        ["Nigeria", "Chad", "Mali", "Niger"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn config() -> DashboardConfig {
        DashboardConfig {
            default_countries: vec!["Chad".to_string(), "Niger".to_string()],
            ..DashboardConfig::default()
        }
    }

    fn session() -> DashboardSession {
        DashboardSession::new(universe(), config())
    }

    #[test]
    fn test_defaults() {
        let s = session();
        assert_eq!(s.trend().year_range, (2000, 2010));
        assert_eq!(s.snapshot().year, 2005);
        assert_eq!(s.snapshot().top_n, 8);
        assert_eq!(s.trend().diseases.len(), 5);
        assert_eq!(s.controls(Tab::Trend).selected, vec!["Chad", "Niger"]);
    }

    #[test]
    fn test_tabs_are_independent() {
        let mut s = session();
        s.apply(Tab::Trend, WidgetChange::SelectAll(true)).unwrap();
        assert_eq!(s.controls(Tab::Trend).selected.len(), 4);
        assert_eq!(s.controls(Tab::Snapshot).selected, vec!["Chad", "Niger"]);
        assert!(!s.controls(Tab::Snapshot).select_all);
    }

    #[test]
    fn test_affected_views() {
        let mut s = session();
        assert_eq!(
            s.apply(Tab::Trend, WidgetChange::YearRange(2010, 1995)).unwrap(),
            vec![View::CountryTrend, View::DiseaseTrend]
        );
        assert_eq!(s.trend().year_range, (1995, 2010));

        assert_eq!(
            s.apply(Tab::Snapshot, WidgetChange::TopN(5)).unwrap(),
            vec![View::CountryRanking]
        );
        assert_eq!(
            s.apply(Tab::Snapshot, WidgetChange::Year(2012)).unwrap(),
            vec![View::CountryRanking, View::DiseaseRanking, View::Map]
        );
        assert!(s
            .apply(Tab::Snapshot, WidgetChange::SelectAll(false))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_unsupported_controls() {
        let mut s = session();
        let err = s.apply(Tab::Trend, WidgetChange::TopN(5)).unwrap_err();
        assert!(matches!(err, ControlError::UnsupportedControl { .. }));
        let err = s
            .apply(Tab::Snapshot, WidgetChange::YearRange(2000, 2001))
            .unwrap_err();
        assert!(matches!(err, ControlError::UnsupportedControl { .. }));
    }

    #[test]
    fn test_top_n_bounds() {
        let mut s = session();
        for n in [0, 2, 11] {
            let err = s.apply(Tab::Snapshot, WidgetChange::TopN(n)).unwrap_err();
            assert_eq!(
                err,
                ControlError::TopNOutOfRange {
                    value: n,
                    min: 3,
                    max: 10
                }
            );
        }
        assert_eq!(s.snapshot().top_n, 8);
    }

    #[test]
    fn test_selection_for_views() {
        let mut s = session();
        s.apply(Tab::Snapshot, WidgetChange::TopN(3)).unwrap();

        let country = s.selection_for(View::CountryRanking);
        assert_eq!(country.top_n, Some(3));
        assert_eq!(s.selection_for(View::DiseaseRanking).top_n, Some(5));
        assert_eq!(s.selection_for(View::Map).top_n, None);
        assert_eq!(country.countries.len(), 2);

        let trend = s.selection_for(View::CountryTrend);
        assert_eq!(trend.year_filter, crate::query::YearFilter::Range(2000, 2010));
        assert_eq!(trend.top_n, None);
    }

    #[test]
    fn test_deselect_all_then_reset() {
        let mut s = session();
        s.apply(Tab::Snapshot, WidgetChange::DeselectAll(true)).unwrap();
        assert!(s.selection_for(View::Map).countries.is_empty());

        s.reset();
        assert_eq!(s.controls(Tab::Snapshot).selected, vec!["Chad", "Niger"]);
        assert!(!s.controls(Tab::Snapshot).deselect_all);
    }

    #[test]
    fn test_render_after_change() {
        let records = vec![
            DeathRecord::new("Chad", 2005, Disease::Hiv, 20.0).iso("TCD"),
            DeathRecord::new("Mali", 2005, Disease::Hiv, 35.0).iso("MLI"),
        ];
        let store = DatasetStore::from_records(records, IsoLookup::builtin()).unwrap();
        let executor = QueryExecutor::new(Arc::new(store));
        let renderer = SvgRenderer::new();

        let mut s = session();
        let views = s.apply(Tab::Snapshot, WidgetChange::SelectAll(true)).unwrap();
        let rendered = s.render_all(&views, &executor, &renderer);
        assert_eq!(rendered.len(), 3);
        match &rendered[0].data {
            ViewData::Ranking(rows) => {
                assert_eq!(rows[0].key, "Mali");
                assert_eq!(rows[1].key, "Chad");
            }
            other => panic!("unexpected data: {other:?}"),
        }
    }

    #[test]
    fn test_change_wire_format() {
        let change: WidgetChange =
            serde_json::from_str(r#"{"control":"year_range","value":[1995,2000]}"#).unwrap();
        assert_eq!(change, WidgetChange::YearRange(1995, 2000));

        let change: WidgetChange =
            serde_json::from_str(r#"{"control":"stat_mode","value":"pc_k"}"#).unwrap();
        assert_eq!(change, WidgetChange::StatMode(StatMode::PerCapita));

        let change: WidgetChange =
            serde_json::from_str(r#"{"control":"diseases","value":["HIV","ncd"]}"#).unwrap();
        assert_eq!(change, WidgetChange::Diseases(vec![Disease::Hiv, Disease::Ncd]));
    }
}
