//! Aggregation engine
//!
//! Reduces filtered records to per-group sums and ranks them:
//!
//! ```text
//! rows → group by key → sum metric → colour domain → rank → top-N
//! ```
//!
//! Ranking is competition ranking: groups with equal sums share the
//! smallest rank and the next distinct sum skips ahead ("1, 2, 2, 4").
//! Top-N keeps every group whose rank is within N, so a tie on the
//! boundary can return more than N rows.

use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::dataset::{DeathRecord, StatMode};
use crate::query::selection::GroupKey;

/// One group of an aggregation
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AggregatedRow {
    pub key: String,
    pub metric: f64,
    /// 1 = largest metric
    pub rank: usize,
}

/// Value range used to normalize a colour scale
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct ColorDomain {
    pub min: f64,
    pub max: f64,
}

impl ColorDomain {
    /// Domain over a set of values, `None` when there are none
    pub fn from_values<I: IntoIterator<Item = f64>>(values: I) -> Option<Self> {
        values.into_iter().fold(None, |domain, v| match domain {
            None => Some(ColorDomain { min: v, max: v }),
            Some(d) => Some(ColorDomain {
                min: d.min.min(v),
                max: d.max.max(v),
            }),
        })
    }

    /// Position of `value` within the domain, in `[0, 1]`
    ///
    /// A degenerate domain (min == max) maps everything to 1.
    pub fn normalize(&self, value: f64) -> f64 {
        let span = self.max - self.min;
        if span <= 0.0 {
            return 1.0;
        }
        ((value - self.min) / span).clamp(0.0, 1.0)
    }
}

/// Ranked groups plus the colour domain over all groups
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct Aggregation {
    /// Rows ascending by rank
    pub rows: Vec<AggregatedRow>,
    /// Min/max over every group, before top-N truncation
    pub domain: Option<ColorDomain>,
    /// Number of groups before truncation
    pub group_count: usize,
}

impl Aggregation {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Metric for a key, if present
    pub fn get(&self, key: &str) -> Option<f64> {
        self.rows.iter().find(|r| r.key == key).map(|r| r.metric)
    }
}

/// One point of a trend line
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TrendPoint {
    pub key: String,
    pub year: i32,
    pub metric: f64,
}

/// Per-(key, year) sums ordered by key then year
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct TrendSeries {
    pub points: Vec<TrendPoint>,
    /// Min/max over every point
    pub domain: Option<ColorDomain>,
}

impl TrendSeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Distinct keys in plotting order
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = Vec::new();
        for point in &self.points {
            if keys.last() != Some(&point.key.as_str()) {
                keys.push(&point.key);
            }
        }
        keys
    }

    /// Points belonging to one key, ascending by year
    pub fn series(&self, key: &str) -> impl Iterator<Item = &TrendPoint> + '_ {
        let key = key.to_string();
        self.points.iter().filter(move |p| p.key == key)
    }

    /// First and last year present
    pub fn year_span(&self) -> Option<(i32, i32)> {
        let min = self.points.iter().map(|p| p.year).min()?;
        let max = self.points.iter().map(|p| p.year).max()?;
        Some((min, max))
    }
}

/// Sum the metric per group; missing values contribute 0
pub fn group_sums(rows: &[&DeathRecord], key: GroupKey, mode: StatMode) -> BTreeMap<String, f64> {
    let mut sums: BTreeMap<String, f64> = BTreeMap::new();
    for record in rows {
        *sums.entry(key.key_of(record).to_string()).or_insert(0.0) += record.value(mode);
    }
    sums
}

/// Order groups by descending metric (ties by ascending key) and assign
/// competition ranks
pub fn rank(sums: BTreeMap<String, f64>) -> Vec<AggregatedRow> {
    let mut ordered: Vec<(String, f64)> = sums.into_iter().collect();
    ordered.sort_by(|(ka, ma), (kb, mb)| match mb.total_cmp(ma) {
        Ordering::Equal => ka.cmp(kb),
        other => other,
    });

    let mut rows: Vec<AggregatedRow> = Vec::with_capacity(ordered.len());
    for (position, (key, metric)) in ordered.into_iter().enumerate() {
        let rank = match rows.last() {
            Some(prev) if prev.metric == metric => prev.rank,
            _ => position + 1,
        };
        rows.push(AggregatedRow { key, metric, rank });
    }
    rows
}

/// Group, sum, rank and optionally truncate to the top `top_n` ranks
pub fn aggregate(
    rows: &[&DeathRecord],
    key: GroupKey,
    mode: StatMode,
    top_n: Option<usize>,
) -> Aggregation {
    let sums = group_sums(rows, key, mode);
    let group_count = sums.len();
    let domain = ColorDomain::from_values(sums.values().copied());

    let mut ranked = rank(sums);
    if let Some(n) = top_n {
        ranked.retain(|row| row.rank <= n);
    }

    Aggregation {
        rows: ranked,
        domain,
        group_count,
    }
}

/// Per-(key, year) sums for line charts; no ranking or truncation
pub fn trend(rows: &[&DeathRecord], key: GroupKey, mode: StatMode) -> TrendSeries {
    let mut sums: BTreeMap<(String, i32), f64> = BTreeMap::new();
    for record in rows {
        *sums
            .entry((key.key_of(record).to_string(), record.year))
            .or_insert(0.0) += record.value(mode);
    }

    let domain = ColorDomain::from_values(sums.values().copied());
    let points = sums
        .into_iter()
        .map(|((key, year), metric)| TrendPoint { key, year, metric })
        .collect();

    TrendSeries { points, domain }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Disease;
    use crate::query::filter::filter;
    use crate::query::selection::Selection;

    fn scenario_table() -> Vec<DeathRecord> {
        vec![
            DeathRecord::new("Nigeria", 2010, Disease::Hiv, 50.0),
            DeathRecord::new("Nigeria", 2010, Disease::Malaria, 30.0),
            DeathRecord::new("Chad", 2010, Disease::Hiv, 20.0),
        ]
    }

    fn scenario_selection() -> Selection {
        Selection::year(2010)
            .countries(["Nigeria", "Chad"])
            .diseases([Disease::Hiv, Disease::Malaria])
            .build()
    }

    fn row(key: &str, metric: f64, rank: usize) -> AggregatedRow {
        AggregatedRow {
            key: key.to_string(),
            metric,
            rank,
        }
    }

    #[test]
    fn test_group_by_country_scenario() {
        let table = scenario_table();
        let rows = filter(&table, &scenario_selection());
        let result = aggregate(&rows, GroupKey::Country, StatMode::Absolute, None);

        assert_eq!(result.rows, vec![row("Nigeria", 80.0, 1), row("Chad", 20.0, 2)]);
        assert_eq!(result.domain, Some(ColorDomain { min: 20.0, max: 80.0 }));
    }

    #[test]
    fn test_group_by_disease_scenario() {
        let table = scenario_table();
        let rows = filter(&table, &scenario_selection());
        let result = aggregate(&rows, GroupKey::Disease, StatMode::Absolute, None);

        assert_eq!(result.rows, vec![row("HIV", 70.0, 1), row("Malaria", 30.0, 2)]);
    }

    #[test]
    fn test_sums_match_manual_summation() {
        let mut table = Vec::new();
        for (i, country) in ["Angola", "Benin", "Chad", "Mali"].iter().enumerate() {
            for year in 2000..2005 {
                for (j, disease) in Disease::specific().iter().enumerate() {
                    let count = (i * 100 + j * 7) as f64 + (year - 2000) as f64 * 1.5;
                    table.push(DeathRecord::new(*country, year, *disease, count));
                }
            }
        }

        let selection = Selection::years(2001, 2003)
            .countries(["Angola", "Chad", "Mali"])
            .diseases([Disease::Hiv, Disease::Ncd, Disease::Measles])
            .build();
        let rows = filter(&table, &selection);
        let result = aggregate(&rows, GroupKey::Country, StatMode::Absolute, None);

        for agg in &result.rows {
            let manual: f64 = table
                .iter()
                .filter(|r| r.country == agg.key && selection.diseases.contains(&r.disease))
                .filter(|r| (2001..=2003).contains(&r.year))
                .filter_map(|r| r.count)
                .sum();
            assert!((agg.metric - manual).abs() < 1e-9, "{}: {} vs {}", agg.key, agg.metric, manual);
        }
        assert_eq!(result.group_count, 3);
    }

    #[test]
    fn test_rank_one_is_max_and_order_is_consistent() {
        let mut sums = BTreeMap::new();
        sums.insert("b".to_string(), 10.0);
        sums.insert("a".to_string(), 10.0);
        sums.insert("c".to_string(), 30.0);
        sums.insert("d".to_string(), 5.0);

        let ranked = rank(sums);
        assert_eq!(
            ranked,
            vec![row("c", 30.0, 1), row("a", 10.0, 2), row("b", 10.0, 2), row("d", 5.0, 4)]
        );
        for pair in ranked.windows(2) {
            assert!(pair[0].metric >= pair[1].metric);
            assert!(pair[0].rank <= pair[1].rank);
            if pair[0].metric == pair[1].metric {
                assert!(pair[0].key < pair[1].key);
            }
        }
    }

    #[test]
    fn test_top_n_keeps_boundary_ties() {
        let table: Vec<DeathRecord> = [
            ("A", 500.0),
            ("B", 400.0),
            ("C", 300.0),
            ("D", 200.0),
            ("E", 100.0),
            ("F", 100.0),
            ("G", 50.0),
        ]
        .iter()
        .map(|(c, v)| DeathRecord::new(*c, 2010, Disease::Hiv, *v))
        .collect();
        let rows: Vec<&DeathRecord> = table.iter().collect();

        let result = aggregate(&rows, GroupKey::Country, StatMode::Absolute, Some(5));

        let keys: Vec<&str> = result.rows.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["A", "B", "C", "D", "E", "F"]);
        assert_eq!(result.rows[4].rank, 5);
        assert_eq!(result.rows[5].rank, 5);
        assert_eq!(result.group_count, 7);
        // Domain covers the truncated group too
        assert_eq!(result.domain.unwrap().min, 50.0);
    }

    #[test]
    fn test_single_group_domain() {
        let table = vec![DeathRecord::new("Chad", 2010, Disease::Hiv, 42.0)];
        let rows: Vec<&DeathRecord> = table.iter().collect();
        let result = aggregate(&rows, GroupKey::Country, StatMode::Absolute, None);

        assert_eq!(result.domain, Some(ColorDomain { min: 42.0, max: 42.0 }));
        assert_eq!(result.domain.unwrap().normalize(42.0), 1.0);
    }

    #[test]
    fn test_empty_input_has_no_domain() {
        let result = aggregate(&[], GroupKey::Country, StatMode::Absolute, Some(3));
        assert!(result.is_empty());
        assert_eq!(result.domain, None);
        assert_eq!(result.group_count, 0);
    }

    #[test]
    fn test_missing_values_contribute_zero() {
        let mut missing = DeathRecord::new("Chad", 2010, Disease::Malaria, 0.0);
        missing.count = None;
        let table = vec![DeathRecord::new("Chad", 2010, Disease::Hiv, 20.0), missing];
        let rows: Vec<&DeathRecord> = table.iter().collect();

        let by_country = aggregate(&rows, GroupKey::Country, StatMode::Absolute, None);
        assert_eq!(by_country.get("Chad"), Some(20.0));

        // Group survives with a zero sum when every value is missing
        let per_capita = aggregate(&rows, GroupKey::Disease, StatMode::PerCapita, None);
        assert_eq!(per_capita.len(), 2);
        assert!(per_capita.rows.iter().all(|r| r.metric == 0.0 && r.rank == 1));
    }

    #[test]
    fn test_trend_orders_by_key_then_year() {
        let table = vec![
            DeathRecord::new("Nigeria", 2011, Disease::Hiv, 5.0),
            DeathRecord::new("Nigeria", 2010, Disease::Hiv, 50.0),
            DeathRecord::new("Nigeria", 2010, Disease::Malaria, 30.0),
            DeathRecord::new("Chad", 2011, Disease::Hiv, 25.0),
            DeathRecord::new("Chad", 2010, Disease::Hiv, 20.0),
        ];
        let rows: Vec<&DeathRecord> = table.iter().collect();
        let series = trend(&rows, GroupKey::Country, StatMode::Absolute);

        let flat: Vec<(&str, i32, f64)> = series
            .points
            .iter()
            .map(|p| (p.key.as_str(), p.year, p.metric))
            .collect();
        assert_eq!(
            flat,
            vec![
                ("Chad", 2010, 20.0),
                ("Chad", 2011, 25.0),
                ("Nigeria", 2010, 80.0),
                ("Nigeria", 2011, 5.0),
            ]
        );
        assert_eq!(series.keys(), vec!["Chad", "Nigeria"]);
        assert_eq!(series.series("Chad").count(), 2);
        assert_eq!(series.year_span(), Some((2010, 2011)));
    }

    #[test]
    fn test_normalize() {
        let domain = ColorDomain { min: 10.0, max: 20.0 };
        assert_eq!(domain.normalize(10.0), 0.0);
        assert_eq!(domain.normalize(15.0), 0.5);
        assert_eq!(domain.normalize(30.0), 1.0);
    }
}
